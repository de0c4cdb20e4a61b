//! Audit runner orchestrating per-package analysis.
//!
//! Units are strictly sequential: one unit is fully traversed and its
//! findings committed before the next begins. The bounded-run limit is
//! only consulted between packages; there is no mid-unit cancellation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::audit::docs::{CoverageStats, DocAuditor, MissingDoc};
use crate::audit::findings::EntityRegistry;
use crate::audit::restricted::RestrictedClassifier;
use crate::discover;
use crate::policy::AuditPolicy;
use crate::surface::{self, InlineTypeOracle, Node, TableOracle, Unit};

/// Per-unit lifecycle contract driven for each analysis pass.
///
/// The driver calls `pre_analysis` once, then `visit_node` for every node
/// in file order when `pre_analysis` allowed the unit, then
/// `post_analysis` once.
pub trait UnitPass {
    /// Decide whether this unit's nodes will be visited at all.
    fn pre_analysis(&mut self, unit: &Unit) -> bool;

    /// Visit a single node.
    fn visit_node(&mut self, unit: &Unit, node: &Node);

    /// Finish the unit; always called, even when the unit was skipped.
    fn post_analysis(&mut self, unit: &Unit);
}

/// Drive one pass over one unit.
pub fn drive_unit(pass: &mut dyn UnitPass, unit: &Unit) {
    if pass.pre_analysis(unit) {
        for node in &unit.nodes {
            pass.visit_node(unit, node);
        }
    }
    pass.post_analysis(unit);
}

/// Everything a run produces, read only after all packages completed.
#[derive(Debug, Default)]
pub struct AuditOutcome {
    pub registry: EntityRegistry,
    pub coverage: CoverageStats,
    pub missing_docs: Vec<MissingDoc>,
    /// Entity name to package root, for the external-metadata join.
    pub package_paths: BTreeMap<String, PathBuf>,
    /// Packages actually analyzed (eligible, with a loadable surface).
    pub analyzed: usize,
    /// Candidate roots skipped as ineligible or unloadable.
    pub skipped: usize,
}

/// Executes both audit passes over every eligible package under a root.
pub struct Runner<'a> {
    policy: &'a AuditPolicy,
}

impl<'a> Runner<'a> {
    pub fn new(policy: &'a AuditPolicy) -> Self {
        Self { policy }
    }

    /// Discover packages, gate on manifest eligibility, and run the
    /// documentation auditor and restricted classifier over each.
    pub fn run<P: AsRef<Path>>(&self, root: P) -> anyhow::Result<AuditOutcome> {
        let packages = discover::discover_packages(root.as_ref(), &self.policy.manifest_name)?;
        let types = InlineTypeOracle;

        let mut outcome = AuditOutcome::default();
        for package in &packages {
            if let Some(limit) = self.policy.max_packages {
                if outcome.analyzed >= limit {
                    break;
                }
            }

            // A manifest that doesn't declare plugin eligibility (or fails
            // to parse) silently excludes the package.
            let Some(manifest) = discover::plugin_eligibility(&package.manifest) else {
                outcome.skipped += 1;
                continue;
            };

            // Registration happens before any of the package's files are
            // traversed.
            let entity = outcome.registry.register(&package.name);
            entity.entry_class = manifest.class;
            outcome
                .package_paths
                .insert(package.name.clone(), package.root.clone());

            let dump = match surface::load_surface(package.root.join(&self.policy.surface_name)) {
                Ok(dump) => dump,
                Err(e) => {
                    // A package whose surface cannot be loaded must not
                    // abort the rest of the run.
                    eprintln!("Warning: skipping {}: {}", package.name, e);
                    outcome.skipped += 1;
                    continue;
                }
            };

            let oracle = TableOracle::new(&dump.inheritance);
            let mut auditor = DocAuditor::new(self.policy, &oracle);
            {
                let entity = outcome
                    .registry
                    .get_mut(&package.name)
                    .expect("entity registered above");
                let mut classifier = RestrictedClassifier::new(self.policy, &types, entity);
                for unit in &dump.units {
                    drive_unit(&mut auditor, unit);
                    drive_unit(&mut classifier, unit);
                }
            }

            let (stats, missing) = auditor.into_parts();
            outcome.coverage.merge(stats);
            outcome.missing_docs.extend(missing);
            outcome.analyzed += 1;
        }

        Ok(outcome)
    }
}
