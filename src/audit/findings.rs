//! Core types for audit findings.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::surface::Location;

/// Category of a restricted-library finding.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum FindingCategory {
    #[serde(rename = "import")]
    Import,
    #[serde(rename = "export")]
    Export,
    #[serde(rename = "private_exposure")]
    PrivateExposure,
    #[serde(rename = "public_exposure")]
    PublicExposure,
    #[serde(rename = "call")]
    Call,
    #[serde(rename = "instantiation")]
    Instantiation,
}

/// All categories, in report-column order.
pub const ALL_CATEGORIES: [FindingCategory; 6] = [
    FindingCategory::Import,
    FindingCategory::Export,
    FindingCategory::PrivateExposure,
    FindingCategory::PublicExposure,
    FindingCategory::Call,
    FindingCategory::Instantiation,
];

impl FindingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCategory::Import => "import",
            FindingCategory::Export => "export",
            FindingCategory::PrivateExposure => "private_exposure",
            FindingCategory::PublicExposure => "public_exposure",
            FindingCategory::Call => "call",
            FindingCategory::Instantiation => "instantiation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "import" => Some(FindingCategory::Import),
            "export" => Some(FindingCategory::Export),
            "private_exposure" => Some(FindingCategory::PrivateExposure),
            "public_exposure" => Some(FindingCategory::PublicExposure),
            "call" => Some(FindingCategory::Call),
            "instantiation" => Some(FindingCategory::Instantiation),
            _ => None,
        }
    }
}

impl std::fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One located, categorized policy observation.
///
/// The category is the bucket the finding lives in; within a bucket,
/// equality is by (location, description), so repeated observations from
/// the exact same site collapse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Finding {
    pub location: Location,
    pub description: String,
}

/// External popularity metadata joined into an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub score: f64,
    pub popularity: f64,
    pub source_path: String,
}

/// An analyzed package/plugin with its per-category finding sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    /// Every category is present from registration, possibly empty.
    pub findings: BTreeMap<FindingCategory, BTreeSet<Finding>>,
    /// Entry-point class declared by the manifest, if any.
    pub entry_class: Option<String>,
    /// Joined external metadata; `None` renders as blank report cells.
    pub metadata: Option<EntityMetadata>,
}

impl Entity {
    pub fn new(name: &str) -> Self {
        let mut findings = BTreeMap::new();
        for category in ALL_CATEGORIES {
            findings.insert(category, BTreeSet::new());
        }
        Self {
            name: name.to_string(),
            findings,
            entry_class: None,
            metadata: None,
        }
    }

    /// Record a finding; duplicates from the same site collapse.
    pub fn record(&mut self, category: FindingCategory, finding: Finding) {
        self.findings.entry(category).or_default().insert(finding);
    }

    pub fn count(&self, category: FindingCategory) -> usize {
        self.findings.get(&category).map(|s| s.len()).unwrap_or(0)
    }

    pub fn total_findings(&self) -> usize {
        self.findings.values().map(|s| s.len()).sum()
    }

    /// Newline-joined descriptions for one category, in set order.
    pub fn descriptions(&self, category: FindingCategory) -> String {
        self.findings
            .get(&category)
            .map(|set| {
                set.iter()
                    .map(|f| f.description.as_str())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }
}

/// Registry of entities deemed eligible by manifest inspection.
///
/// Entities are registered before any of their files are traversed; their
/// finding maps are read for reports only after the whole run completes.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<String, Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an eligible entity, creating its (empty) category buckets.
    pub fn register(&mut self, name: &str) -> &mut Entity {
        self.entities
            .entry(name.to_string())
            .or_insert_with(|| Entity::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(file: &str, line: usize, column: usize, description: &str) -> Finding {
        Finding {
            location: Location {
                file: file.to_string(),
                line,
                column,
            },
            description: description.to_string(),
        }
    }

    #[test]
    fn test_entity_starts_with_all_buckets() {
        let entity = Entity::new("demo");
        assert_eq!(entity.findings.len(), ALL_CATEGORIES.len());
        assert_eq!(entity.total_findings(), 0);
    }

    #[test]
    fn test_same_site_findings_collapse() {
        let mut entity = Entity::new("demo");
        entity.record(
            FindingCategory::Import,
            finding("lib/a.dart", 1, 1, "restricted:io"),
        );
        entity.record(
            FindingCategory::Import,
            finding("lib/a.dart", 1, 1, "restricted:io"),
        );
        assert_eq!(entity.count(FindingCategory::Import), 1);

        // Same description from a distinct location stays distinct.
        entity.record(
            FindingCategory::Import,
            finding("lib/b.dart", 1, 1, "restricted:io"),
        );
        assert_eq!(entity.count(FindingCategory::Import), 2);
    }

    #[test]
    fn test_category_roundtrip() {
        for category in ALL_CATEGORIES {
            assert_eq!(FindingCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(FindingCategory::parse("bogus"), None);
    }

    #[test]
    fn test_registry_register_is_idempotent() {
        let mut registry = EntityRegistry::new();
        registry
            .register("demo")
            .record(FindingCategory::Call, finding("lib/a.dart", 3, 5, "Socket.close"));
        registry.register("demo");
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("demo").unwrap().count(FindingCategory::Call),
            1
        );
    }
}
