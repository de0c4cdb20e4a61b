//! Documentation coverage auditing.
//!
//! Walks the declarations of each in-root unit and tallies public API
//! elements that lack doc comments. Members that override an ancestor
//! member are exempt, and setters are paired with their getters so a
//! documented getter covers both accessors.

use std::collections::BTreeSet;
use std::fmt;

use crate::audit::runner::UnitPass;
use crate::audit::visibility::Visibility;
use crate::policy::AuditPolicy;
use crate::surface::{Decl, DeclKind, InheritanceOracle, Node, TypeRef, Unit};

/// One undocumented public element, reported as `name: line:column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingDoc {
    pub name: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for MissingDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}:{}", self.name, self.line, self.column)
    }
}

/// Running totals of the documentation audit.
///
/// Both counters are monotonic and only ever updated by the auditor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoverageStats {
    pub total: u64,
    pub missing: u64,
}

impl CoverageStats {
    /// Fraction of public elements that are documented, rounded to two
    /// decimals. `None` when there is no public API at all; callers report
    /// that explicitly instead of dividing by zero.
    pub fn score(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let ratio = (self.total - self.missing) as f64 / self.total as f64;
        Some((ratio * 100.0).round() / 100.0)
    }

    pub fn merge(&mut self, other: CoverageStats) {
        self.total += other.total;
        self.missing += other.missing;
    }
}

/// Documentation Coverage Auditor for one package.
///
/// State is owned by the instance: the running counters persist across the
/// package's units, everything else is per-unit.
pub struct DocAuditor<'a> {
    policy: &'a AuditPolicy,
    oracle: &'a dyn InheritanceOracle,
    stats: CoverageStats,
    missing_docs: Vec<MissingDoc>,
    /// Top-level declarations buffered during the current unit's visit.
    pending: Vec<Decl>,
}

impl<'a> DocAuditor<'a> {
    pub fn new(policy: &'a AuditPolicy, oracle: &'a dyn InheritanceOracle) -> Self {
        Self {
            policy,
            oracle,
            stats: CoverageStats::default(),
            missing_docs: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn stats(&self) -> CoverageStats {
        self.stats
    }

    pub fn missing_docs(&self) -> &[MissingDoc] {
        &self.missing_docs
    }

    pub fn into_parts(self) -> (CoverageStats, Vec<MissingDoc>) {
        (self.stats, self.missing_docs)
    }

    /// Audit a whole unit in one call.
    pub fn audit_unit(&mut self, unit: &Unit) {
        if self.pre_analysis(unit) {
            for node in &unit.nodes {
                self.visit_node(unit, node);
            }
        }
        self.post_analysis(unit);
    }

    /// Core check: count the element, flag it when undocumented and not an
    /// override. Returns whether the element was flagged.
    fn check(&mut self, decl: &Decl, container: Option<&TypeRef>) -> bool {
        self.stats.total += 1;
        if decl.documented {
            return false;
        }
        if let Some(type_ref) = container {
            // Any ancestor member of the same name suppresses the doc
            // requirement, regardless of local doc presence.
            if self.oracle.nearest_member(type_ref, &decl.name).is_some() {
                return false;
            }
        }
        self.stats.missing += 1;
        self.missing_docs.push(MissingDoc {
            name: decl.name.clone(),
            file: decl.location.file.clone(),
            line: decl.location.line,
            column: decl.location.column,
        });
        true
    }

    /// Audit one container scope: a class, extension, or the library top
    /// level. Getters run first so setter pairing can consult their
    /// outcome.
    fn audit_scope(&mut self, container: Option<&Decl>, decls: &[Decl]) {
        let vis = Visibility::new(self.policy);
        let container_ref = container.and_then(|c| c.type_ref.as_ref());

        let mut getters: Vec<&Decl> = Vec::new();
        let mut setters: Vec<&Decl> = Vec::new();
        let mut plain: Vec<&Decl> = Vec::new();
        for decl in decls {
            if vis.is_private(&decl.name) {
                continue;
            }
            match decl.kind {
                DeclKind::Getter => getters.push(decl),
                DeclKind::Setter => setters.push(decl),
                _ => plain.push(decl),
            }
        }

        let mut flagged_getters: BTreeSet<&str> = BTreeSet::new();
        for getter in &getters {
            if self.check(getter, container_ref) {
                flagged_getters.insert(getter.name.as_str());
            }
        }

        for setter in &setters {
            let has_local_getter = getters.iter().any(|g| g.name == setter.name);
            let eligible = if has_local_getter {
                // Only a getter that was itself flagged drags the setter in.
                flagged_getters.contains(setter.name.as_str())
            } else {
                // No local getter: a documented inherited accessor exempts
                // the setter; anything else (undocumented or absent) does
                // not.
                match container_ref.and_then(|t| self.oracle.nearest_member(t, &setter.name)) {
                    Some(member) => !member.documented,
                    None => true,
                }
            };
            if eligible {
                self.check(setter, container_ref);
            }
        }

        for decl in plain {
            match decl.kind {
                DeclKind::Type | DeclKind::Enum => {
                    self.check(decl, None);
                    self.audit_scope(Some(decl), &decl.members);
                }
                DeclKind::Extension => {
                    // Only named extensions are part of the public surface.
                    if decl.name.is_empty() {
                        continue;
                    }
                    self.check(decl, None);
                    self.audit_scope(Some(decl), &decl.members);
                }
                DeclKind::Function => {
                    if container.is_none() && decl.name == self.policy.entry_point {
                        continue;
                    }
                    self.check(decl, container_ref);
                }
                DeclKind::TypeAlias
                | DeclKind::FunctionTypeAlias
                | DeclKind::EnumMember
                | DeclKind::Constructor
                | DeclKind::Field
                | DeclKind::Method
                | DeclKind::Variable => {
                    self.check(decl, container_ref);
                }
                DeclKind::Getter | DeclKind::Setter => unreachable!("partitioned above"),
            }
        }
    }
}

impl UnitPass for DocAuditor<'_> {
    fn pre_analysis(&mut self, unit: &Unit) -> bool {
        let vis = Visibility::new(self.policy);
        // Units outside the public source root and units without a usable
        // location mapping are skipped wholesale; no counters move.
        vis.unit_in_public_root(&unit.path) && unit.line_info
    }

    fn visit_node(&mut self, _unit: &Unit, node: &Node) {
        if let Node::Decl(decl) = node {
            self.pending.push(decl.clone());
        }
    }

    fn post_analysis(&mut self, _unit: &Unit) {
        let pending = std::mem::take(&mut self.pending);
        self.audit_scope(None, &pending);
    }
}
