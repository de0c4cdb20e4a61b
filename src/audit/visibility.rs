//! Visibility and export resolution.
//!
//! Decides public/private status of names and files: the private-name
//! marker convention, public-source-root membership, and the per-unit
//! export set accumulated from export/part directives.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

use crate::policy::AuditPolicy;

lazy_static! {
    /// Leading `./` and `../` segments.
    static ref RELATIVE_PREFIX: Regex = Regex::new(r"^(\.\.?/)+").unwrap();
}

/// Per-unit set of normalized export/part target paths.
///
/// Rebuilt for each unit and discarded at its traversal boundary; it never
/// persists across units.
#[derive(Debug, Default)]
pub struct ExportSet {
    targets: BTreeSet<String>,
}

impl ExportSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, normalized_target: String) {
        self.targets.insert(normalized_target);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.targets.contains(key)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Visibility resolver bound to one policy.
pub struct Visibility<'a> {
    policy: &'a AuditPolicy,
}

impl<'a> Visibility<'a> {
    pub fn new(policy: &'a AuditPolicy) -> Self {
        Self { policy }
    }

    /// True iff `name` begins with the private-name marker, independent of
    /// context.
    pub fn is_private(&self, name: &str) -> bool {
        name.starts_with(&self.policy.private_marker)
    }

    /// Whether a unit lies under the package's public source root.
    pub fn unit_in_public_root(&self, unit_path: &str) -> bool {
        let root = &self.policy.public_root;
        unit_path == root.as_str() || unit_path.starts_with(&format!("{}/", root))
    }

    /// Whether a file sits directly in the public root, not in a
    /// subdirectory of it.
    pub fn file_directly_in_root(&self, unit_path: &str) -> bool {
        match unit_path.strip_prefix(&format!("{}/", self.policy.public_root)) {
            Some(rest) => !rest.contains('/'),
            None => false,
        }
    }

    /// Normalize an export/part directive target for the export set:
    /// strip leading relative segments, the package-URL prefix, and a
    /// leading public-root segment.
    pub fn normalize_target(&self, target: &str) -> String {
        let stripped = RELATIVE_PREFIX.replace(target, "");
        let mut rest: &str = &stripped;
        if let Some(after_scheme) = rest.strip_prefix(self.policy.package_scheme.as_str()) {
            // package:<name>/<path> keeps only <path>.
            rest = match after_scheme.split_once('/') {
                Some((_, path)) => path,
                None => after_scheme,
            };
        }
        if let Some(after_root) = rest.strip_prefix(&format!("{}/", self.policy.public_root)) {
            rest = after_root;
        }
        rest.to_string()
    }

    /// The key a declaration's file is looked up under in the export set.
    pub fn exposure_key(&self, unit_path: &str) -> String {
        self.normalize_target(unit_path)
    }

    /// Whether a declaration in `unit_path` is reachable from the package's
    /// public surface: directly in the public root, or its file appears in
    /// the unit's export set.
    pub fn is_exposed(&self, unit_path: &str, exports: &ExportSet) -> bool {
        self.file_directly_in_root(unit_path) || exports.contains(&self.exposure_key(unit_path))
    }
}
