//! External popularity metadata.
//!
//! An optional JSON file maps entity names to externally gathered score
//! and popularity figures. Entries are joined into entities by their
//! source-path key; packages without an entry keep blank report fields.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::audit::{EntityMetadata, EntityRegistry};

/// One downloaded metadata record.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataRecord {
    pub name: String,
    pub score: f64,
    pub popularity: f64,
    pub source_path: String,
}

/// Metadata records indexed by source path.
#[derive(Debug, Default)]
pub struct MetadataIndex {
    by_path: HashMap<String, MetadataRecord>,
}

impl MetadataIndex {
    /// Load the metadata file (a JSON array of records).
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let records: Vec<MetadataRecord> = serde_json::from_str(&content)?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<MetadataRecord>) -> Self {
        let mut by_path = HashMap::new();
        for record in records {
            by_path.insert(record.source_path.clone(), record);
        }
        Self { by_path }
    }

    pub fn lookup_path(&self, path: &str) -> Option<&MetadataRecord> {
        self.by_path.get(path)
    }

    /// Join metadata into registered entities by source-path key.
    ///
    /// `package_paths` maps entity names to their package roots; paths are
    /// compared by suffix so absolute roots match repository-relative
    /// metadata entries. Missing entries leave the entity's metadata
    /// `None`.
    pub fn attach(&self, registry: &mut EntityRegistry, package_paths: &BTreeMap<String, PathBuf>) {
        for (name, root) in package_paths {
            let root_str = root.to_string_lossy();
            let record = self
                .by_path
                .values()
                .find(|r| root_str.ends_with(&r.source_path));
            if let (Some(record), Some(entity)) = (record, registry.get_mut(name)) {
                entity.metadata = Some(EntityMetadata {
                    score: record.score,
                    popularity: record.popularity,
                    source_path: record.source_path.clone(),
                });
            }
        }
    }
}
