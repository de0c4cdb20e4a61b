//! Cross-entity aggregation of findings.
//!
//! Runs once, after every entity's traversal has completed.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use super::findings::{Entity, EntityRegistry, FindingCategory, ALL_CATEGORIES};

/// Fixed header for the entity table.
pub const TABLE_HEADER: &[&str] = &[
    "package",
    "import",
    "export",
    "private_exposure",
    "public_exposure",
    "call",
    "instantiation",
    "popularity",
    "score",
    "needs_review",
];

/// Histogram cell: occurrence count plus the distinct entities showing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistogramEntry {
    pub count: usize,
    pub entities: BTreeSet<String>,
}

/// Group all entities' findings of one category by description.
pub fn histogram(
    registry: &EntityRegistry,
    category: FindingCategory,
) -> BTreeMap<String, HistogramEntry> {
    let mut result: BTreeMap<String, HistogramEntry> = BTreeMap::new();
    for entity in registry.iter() {
        if let Some(findings) = entity.findings.get(&category) {
            for finding in findings {
                let entry = result.entry(finding.description.clone()).or_default();
                entry.count += 1;
                entry.entities.insert(entity.name.clone());
            }
        }
    }
    result
}

/// Flag an entity for manual review when its figures don't add up on
/// their own:
/// - imports with no corroborating use beyond them,
/// - restricted usage without any direct import (e.g. via a transitive
///   export),
/// - or no matching external metadata at all.
pub fn needs_review(entity: &Entity) -> bool {
    let imports = entity.count(FindingCategory::Import);
    let total = entity.total_findings();
    if imports > 0 && total <= imports {
        return true;
    }
    if imports == 0 && total > 0 {
        return true;
    }
    entity.metadata.is_none()
}

/// One row of the entity table.
#[derive(Debug, Clone, Serialize)]
pub struct EntityRow {
    pub name: String,
    /// Per-category finding counts, in `ALL_CATEGORIES` order.
    pub counts: Vec<usize>,
    /// Per-category newline-joined description lists, same order.
    pub details: Vec<String>,
    pub popularity: Option<f64>,
    pub score: Option<f64>,
    pub needs_review: bool,
}

impl EntityRow {
    /// Cells in `TABLE_HEADER` order; absent metadata renders blank.
    pub fn cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(TABLE_HEADER.len());
        cells.push(self.name.clone());
        for count in &self.counts {
            cells.push(count.to_string());
        }
        cells.push(self.popularity.map(|p| p.to_string()).unwrap_or_default());
        cells.push(self.score.map(|s| s.to_string()).unwrap_or_default());
        cells.push(if self.needs_review { "yes" } else { "" }.to_string());
        cells
    }
}

/// One row per entity, in registry (name) order.
pub fn tabulate(registry: &EntityRegistry) -> Vec<EntityRow> {
    registry
        .iter()
        .map(|entity| EntityRow {
            name: entity.name.clone(),
            counts: ALL_CATEGORIES
                .iter()
                .map(|c| entity.count(*c))
                .collect(),
            details: ALL_CATEGORIES
                .iter()
                .map(|c| entity.descriptions(*c))
                .collect(),
            popularity: entity.metadata.as_ref().map(|m| m.popularity),
            score: entity.metadata.as_ref().map(|m| m.score),
            needs_review: needs_review(entity),
        })
        .collect()
}
