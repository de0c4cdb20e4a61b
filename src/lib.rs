//! Surfacecheck - public API surface audits.
//!
//! Surfacecheck audits the resolved public surface of plugin packages
//! against a policy. It measures documentation coverage of public API
//! elements (with inherited-member suppression and accessor pairing) and
//! flags imports, exposures, calls, and instantiations of restricted
//! libraries, then aggregates the findings across packages.
//!
//! # Architecture
//!
//! - `surface`: resolved surface dumps (nodes, types, inheritance oracle)
//! - `policy`: YAML policy schema and validation
//! - `discover`: package discovery and manifest eligibility
//! - `audit`: the documentation auditor, restricted classifier, runner,
//!   and cross-entity aggregation
//! - `metadata`: external popularity metadata joined into the report
//! - `report`: output formatting (pretty, JSON)

pub mod audit;
pub mod cli;
pub mod discover;
pub mod metadata;
pub mod policy;
pub mod report;
pub mod surface;

pub use audit::{
    AuditOutcome, CoverageStats, DocAuditor, Entity, EntityRegistry, Finding, FindingCategory,
    RestrictedClassifier, Runner, UnitPass,
};
pub use metadata::MetadataIndex;
pub use policy::AuditPolicy;
pub use surface::{InheritanceOracle, SurfaceDump, TypeOracle, Unit};
