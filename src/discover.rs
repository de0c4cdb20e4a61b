//! Package discovery and manifest eligibility.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A candidate entity root found under the audit directory.
#[derive(Debug, Clone)]
pub struct PackageRoot {
    pub name: String,
    pub root: PathBuf,
    pub manifest: PathBuf,
}

/// Enumerate candidate package roots.
///
/// When the root itself holds a manifest it is the single candidate;
/// otherwise each immediate subdirectory with a manifest is one. Results
/// are sorted by name for deterministic runs.
pub fn discover_packages(root: &Path, manifest_name: &str) -> anyhow::Result<Vec<PackageRoot>> {
    let own_manifest = root.join(manifest_name);
    if own_manifest.is_file() {
        return Ok(vec![PackageRoot {
            name: dir_name(root),
            root: root.to_path_buf(),
            manifest: own_manifest,
        }]);
    }

    let mut packages = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.'))
    {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let manifest = entry.path().join(manifest_name);
        if manifest.is_file() {
            packages.push(PackageRoot {
                name: dir_name(entry.path()),
                root: entry.path().to_path_buf(),
                manifest,
            });
        }
    }
    packages.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(packages)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// The `plugin:` section a manifest may declare.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginManifest {
    /// Entry-point class name, when declared.
    #[serde(default)]
    pub class: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    plugin: Option<PluginManifest>,
}

/// Report whether a manifest declares plugin eligibility.
///
/// Any read or parse failure yields `None`: the package is silently
/// excluded, never an error.
pub fn plugin_eligibility(manifest: &Path) -> Option<PluginManifest> {
    let content = fs::read_to_string(manifest).ok()?;
    let parsed: Manifest = serde_yaml::from_str(&content).ok()?;
    parsed.plugin
}
