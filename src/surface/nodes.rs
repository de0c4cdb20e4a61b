//! Node model for resolved compilation units.
//!
//! Nodes form a closed tagged enum with one variant per kind the audits
//! care about; everything else in the source never reaches the dump.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::ResolvedType;

/// Source location (1-indexed line and column).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Kind of a directive node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveKind {
    Import,
    Export,
    Part,
}

/// An import/export/part directive with its literal target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub target: String,
    pub location: Location,
}

/// Kind of declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    /// Class-like type declaration.
    Type,
    TypeAlias,
    FunctionTypeAlias,
    Enum,
    EnumMember,
    Extension,
    Constructor,
    Field,
    Method,
    Getter,
    Setter,
    /// Free (top-level) function.
    Function,
    /// Free (top-level) variable.
    Variable,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Type => "type",
            DeclKind::TypeAlias => "type_alias",
            DeclKind::FunctionTypeAlias => "function_type_alias",
            DeclKind::Enum => "enum",
            DeclKind::EnumMember => "enum_member",
            DeclKind::Extension => "extension",
            DeclKind::Constructor => "constructor",
            DeclKind::Field => "field",
            DeclKind::Method => "method",
            DeclKind::Getter => "getter",
            DeclKind::Setter => "setter",
            DeclKind::Function => "function",
            DeclKind::Variable => "variable",
        }
    }

    /// Whether declarations of this kind contain members of their own.
    pub fn is_container(&self) -> bool {
        matches!(self, DeclKind::Type | DeclKind::Enum | DeclKind::Extension)
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, DeclKind::Getter | DeclKind::Setter)
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of a resolved type, used as the inheritance-oracle key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub library: String,
    pub name: String,
}

/// A declaration as reported by the resolution engine.
///
/// Multi-variable field/top-level declarations arrive pre-split: the engine
/// emits one `Decl` per variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decl {
    pub name: String,
    pub kind: DeclKind,
    /// Whether the declaration carries a doc comment.
    pub documented: bool,
    pub location: Location,
    /// Declared return type (functions, methods, accessors).
    #[serde(default)]
    pub return_type: Option<ResolvedType>,
    /// Members, for container kinds (types, enums, extensions).
    #[serde(default)]
    pub members: Vec<Decl>,
    /// Resolved identity of this container, for inheritance queries.
    #[serde(default)]
    pub type_ref: Option<TypeRef>,
}

/// An expression site the classifier inspects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,
    pub location: Location,
}

/// Expression kinds, each carrying the statically resolved types the
/// engine reported for that site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "expr", rename_all = "snake_case")]
pub enum ExprKind {
    /// Object construction with its static type.
    Instantiation { ty: ResolvedType },
    /// Method invocation. `target_type` is the explicit receiver's static
    /// type when present; `invocation_type` the inferred invocation type.
    MethodCall {
        #[serde(default)]
        target_type: Option<ResolvedType>,
        #[serde(default)]
        invocation_type: Option<ResolvedType>,
        member: String,
    },
    /// Property read off an explicit target.
    PropertyAccess {
        #[serde(default)]
        target_type: Option<ResolvedType>,
        member: String,
    },
    /// Prefixed-identifier read (e.g. `prefix.member`).
    PrefixedRead {
        #[serde(default)]
        target_type: Option<ResolvedType>,
        member: String,
    },
}

/// One node of a unit, in file order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum Node {
    Directive(Directive),
    Decl(Decl),
    Expr(Expr),
}

/// A resolved compilation unit (one file of a package).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Package-relative path, e.g. `lib/src/client.dart`.
    pub path: String,
    /// False when the engine could not produce an offset-to-line/column
    /// mapping for this unit; the doc auditor skips such units.
    #[serde(default = "default_true")]
    pub line_info: bool,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = Location {
            file: "lib/a.dart".to_string(),
            line: 12,
            column: 3,
        };
        assert_eq!(loc.to_string(), "lib/a.dart:12:3");
    }

    #[test]
    fn test_container_kinds() {
        assert!(DeclKind::Type.is_container());
        assert!(DeclKind::Enum.is_container());
        assert!(DeclKind::Extension.is_container());
        assert!(!DeclKind::Method.is_container());
        assert!(DeclKind::Getter.is_accessor());
        assert!(!DeclKind::Field.is_accessor());
    }

    #[test]
    fn test_unit_line_info_defaults_true() {
        let unit: Unit = serde_json::from_str(r#"{"path": "lib/a.dart"}"#).unwrap();
        assert!(unit.line_info);
        assert!(unit.nodes.is_empty());
    }

    #[test]
    fn test_node_deserializes_tagged() {
        let json = r#"{
            "node": "directive",
            "kind": "import",
            "target": "restricted:io",
            "location": {"file": "lib/a.dart", "line": 1, "column": 1}
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        match node {
            Node::Directive(d) => {
                assert_eq!(d.kind, DirectiveKind::Import);
                assert_eq!(d.target, "restricted:io");
            }
            _ => panic!("expected directive"),
        }
    }
}
