//! Surface dump loading.
//!
//! The resolution engine writes one dump per package, next to its manifest.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::nodes::Unit;
use super::oracle::AncestryEntry;

/// Errors that can occur while loading a surface dump.
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("failed to read surface dump {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid surface dump {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One package's resolved surface: units in analysis order plus the
/// ancestry tables the inheritance oracle answers from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurfaceDump {
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub inheritance: Vec<AncestryEntry>,
}

/// Load a surface dump from a JSON file.
pub fn load_surface<P: AsRef<Path>>(path: P) -> Result<SurfaceDump, SurfaceError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| SurfaceError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SurfaceError::Parse {
        path: display,
        source,
    })
}
