//! Audit passes over resolved package surfaces.

mod aggregate;
mod docs;
mod findings;
mod restricted;
mod runner;
mod visibility;

pub use aggregate::{histogram, needs_review, tabulate, EntityRow, HistogramEntry, TABLE_HEADER};
pub use docs::{CoverageStats, DocAuditor, MissingDoc};
pub use findings::{
    Entity, EntityMetadata, EntityRegistry, Finding, FindingCategory, ALL_CATEGORIES,
};
pub use restricted::RestrictedClassifier;
pub use runner::{drive_unit, AuditOutcome, Runner, UnitPass};
pub use visibility::{ExportSet, Visibility};
