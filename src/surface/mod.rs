//! Resolved program surface consumed by the audit passes.
//!
//! The resolution engine itself is an external collaborator: it parses and
//! type-resolves source, then serializes each package's public surface into
//! a dump file. This module is the in-memory form of that dump plus the two
//! oracle seams the audits query:
//!
//! - `nodes`: compilation units and their nodes (directives, declarations,
//!   expressions) in file order
//! - `types`: resolved types and the wrapper-flattening `TypeOracle`
//! - `oracle`: the `InheritanceOracle` answering nearest-ancestor-member
//!   queries
//! - `load`: dump deserialization

mod load;
mod nodes;
mod oracle;
mod types;

pub use load::{load_surface, SurfaceDump, SurfaceError};
pub use nodes::{
    Decl, DeclKind, Directive, DirectiveKind, Expr, ExprKind, Location, Node, TypeRef, Unit,
};
pub use oracle::{AncestryEntry, InheritanceOracle, InheritedMember, TableOracle};
pub use types::{FlattenedType, InlineTypeOracle, ResolvedType, TypeOracle, WrapperKind};
