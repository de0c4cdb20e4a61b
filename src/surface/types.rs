//! Resolved types and wrapper flattening.
//!
//! The resolution engine may report a type wrapped in an asynchronous
//! result or optional shell. Classification always works on the flattened
//! form, which names the library that declares the element type.

use serde::{Deserialize, Serialize};

/// Wrapper shells the engine can report around an element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapperKind {
    /// Asynchronous result (future-like).
    Async,
    /// Optional/nullable shell.
    Optional,
}

/// A type as reported by the resolution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedType {
    /// Display name of the type.
    pub name: String,
    /// Identifier of the declaring library.
    pub library: String,
    /// Set when this type is a wrapper around `inner`.
    #[serde(default)]
    pub wrapper: Option<WrapperKind>,
    #[serde(default)]
    pub inner: Option<Box<ResolvedType>>,
}

/// A wrapper-collapsed type: just a display name and its declaring library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedType {
    pub name: String,
    pub library: String,
}

/// Type-system service that collapses wrapper types.
///
/// Queries are synchronous and answered in traversal order; the classifier
/// never interleaves two flatten calls.
pub trait TypeOracle {
    fn flatten(&self, ty: &ResolvedType) -> FlattenedType;
}

/// Oracle over the wrapper chain the engine embedded inline on the type.
#[derive(Debug, Default)]
pub struct InlineTypeOracle;

impl TypeOracle for InlineTypeOracle {
    fn flatten(&self, ty: &ResolvedType) -> FlattenedType {
        let mut current = ty;
        while current.wrapper.is_some() {
            match &current.inner {
                Some(inner) => current = inner,
                // Wrapper with no recorded element type: classify the
                // wrapper itself rather than guessing.
                None => break,
            }
        }
        FlattenedType {
            name: current.name.clone(),
            library: current.library.clone(),
        }
    }
}
