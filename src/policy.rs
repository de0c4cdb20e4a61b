//! Audit policy definitions.
//!
//! A policy names the restricted libraries and the layout conventions of
//! the packages under audit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Top-level policy definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditPolicy {
    pub version: String,
    pub name: String,
    pub description: Option<String>,
    /// Library identifiers flagged as incompatible with the target
    /// environment.
    pub restricted: BTreeSet<String>,
    /// Directory holding a package's public surface.
    pub public_root: String,
    /// Prefix marking a name as private to its library.
    pub private_marker: String,
    /// Top-level function excluded from the documentation audit.
    pub entry_point: String,
    /// URL scheme prefix stripped when normalizing directive targets.
    pub package_scheme: String,
    /// Manifest filename probed during package discovery.
    pub manifest_name: String,
    /// Surface dump filename expected beside the manifest.
    pub surface_name: String,
    /// Stop issuing packages after this many have been analyzed.
    pub max_packages: Option<usize>,
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            version: String::new(),
            name: String::new(),
            description: None,
            restricted: BTreeSet::new(),
            public_root: "lib".to_string(),
            private_marker: "_".to_string(),
            entry_point: "main".to_string(),
            package_scheme: "package:".to_string(),
            manifest_name: "pubspec.yaml".to_string(),
            surface_name: "surface.json".to_string(),
            max_packages: None,
        }
    }
}

impl AuditPolicy {
    /// Parse a policy from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let policy: AuditPolicy = serde_yaml::from_str(&content)?;
        Ok(policy)
    }

    /// Whether a library identifier is in the restricted set.
    ///
    /// Matching is by literal identifier.
    pub fn is_restricted(&self, library: &str) -> bool {
        self.restricted.contains(library)
    }
}

/// Validate a policy for correctness.
pub fn validate(policy: &AuditPolicy) -> anyhow::Result<()> {
    if policy.private_marker.is_empty() {
        anyhow::bail!("private_marker must not be empty");
    }
    if policy.public_root.is_empty() {
        anyhow::bail!("public_root must not be empty");
    }
    if policy.public_root.contains('/') {
        anyhow::bail!(
            "public_root must be a single directory name, got {:?}",
            policy.public_root
        );
    }
    if policy.manifest_name.is_empty() {
        anyhow::bail!("manifest_name must not be empty");
    }
    if policy.surface_name.is_empty() {
        anyhow::bail!("surface_name must not be empty");
    }
    if let Some(0) = policy.max_packages {
        anyhow::bail!("max_packages must be at least 1 when set");
    }
    Ok(())
}
