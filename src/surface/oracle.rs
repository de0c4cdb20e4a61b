//! Inheritance-query service.
//!
//! Ancestor linearization (extends vs. implements vs. mixins precedence) is
//! engine-defined. The oracle is a strictly opaque query: it answers with
//! whatever member the backend recorded first for a name and never
//! recomputes precedence.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::nodes::{DeclKind, TypeRef};

/// An ancestor member as recorded by the resolution backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InheritedMember {
    pub name: String,
    pub kind: DeclKind,
    /// Whether the ancestor member itself carries a doc comment.
    pub documented: bool,
}

/// Ancestry table for one container type, members in backend order
/// (nearest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AncestryEntry {
    pub library: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<InheritedMember>,
}

/// Inheritance-query service bound to one package's resolved surface.
pub trait InheritanceOracle {
    /// Nearest ancestor member of `container` matching `name`, if any.
    fn nearest_member(&self, container: &TypeRef, name: &str) -> Option<InheritedMember>;
}

/// Oracle backed by the ancestry tables embedded in a surface dump.
#[derive(Debug, Default)]
pub struct TableOracle {
    table: HashMap<(String, String), Vec<InheritedMember>>,
}

impl TableOracle {
    pub fn new(entries: &[AncestryEntry]) -> Self {
        let mut table = HashMap::new();
        for entry in entries {
            table.insert(
                (entry.library.clone(), entry.name.clone()),
                entry.members.clone(),
            );
        }
        Self { table }
    }

    /// Oracle with no ancestry information; every query answers `None`.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl InheritanceOracle for TableOracle {
    fn nearest_member(&self, container: &TypeRef, name: &str) -> Option<InheritedMember> {
        let members = self
            .table
            .get(&(container.library.clone(), container.name.clone()))?;
        members.iter().find(|m| m.name == name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_ref(library: &str, name: &str) -> TypeRef {
        TypeRef {
            library: library.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_nearest_member_first_match_wins() {
        let oracle = TableOracle::new(&[AncestryEntry {
            library: "package:demo/lib.dart".to_string(),
            name: "Client".to_string(),
            members: vec![
                InheritedMember {
                    name: "close".to_string(),
                    kind: DeclKind::Method,
                    documented: true,
                },
                InheritedMember {
                    name: "close".to_string(),
                    kind: DeclKind::Method,
                    documented: false,
                },
            ],
        }]);

        let m = oracle
            .nearest_member(&type_ref("package:demo/lib.dart", "Client"), "close")
            .unwrap();
        // Backend order is preserved: the first recorded member answers.
        assert!(m.documented);
    }

    #[test]
    fn test_unknown_container_and_member() {
        let oracle = TableOracle::empty();
        assert!(oracle
            .nearest_member(&type_ref("lib", "Nope"), "anything")
            .is_none());
    }
}
