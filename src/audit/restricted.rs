//! Restricted-library usage classification.
//!
//! Buckets every way a unit can reach into a restricted library: the
//! directives that pull it in, the constructions and call sites that use
//! it, and the declarations whose types expose it from the package's
//! surface.
//!
//! Each unit is classified in two passes: directives first (building the
//! unit's export set), then declarations and expressions. A directive
//! anywhere in the unit therefore exempts declarations anywhere in the
//! unit, regardless of file order.

use crate::audit::findings::{Entity, Finding, FindingCategory};
use crate::audit::runner::UnitPass;
use crate::audit::visibility::{ExportSet, Visibility};
use crate::policy::AuditPolicy;
use crate::surface::{
    Decl, Directive, DirectiveKind, Expr, ExprKind, Location, Node, ResolvedType, TypeOracle, Unit,
};

/// Restricted-Library Usage Classifier for one entity.
///
/// Created per package after manifest inspection has registered the
/// entity; ineligible packages never construct a classifier, so no node of
/// theirs is ever visited.
pub struct RestrictedClassifier<'a> {
    policy: &'a AuditPolicy,
    types: &'a dyn TypeOracle,
    entity: &'a mut Entity,
    /// Export set of the unit currently being classified.
    exports: ExportSet,
}

impl<'a> RestrictedClassifier<'a> {
    pub fn new(
        policy: &'a AuditPolicy,
        types: &'a dyn TypeOracle,
        entity: &'a mut Entity,
    ) -> Self {
        Self {
            policy,
            types,
            entity,
            exports: ExportSet::new(),
        }
    }

    /// Classify a whole unit in one call.
    pub fn classify_unit(&mut self, unit: &Unit) {
        if self.pre_analysis(unit) {
            for node in &unit.nodes {
                self.visit_node(unit, node);
            }
        }
        self.post_analysis(unit);
    }

    fn record(&mut self, category: FindingCategory, location: &Location, description: String) {
        self.entity.record(
            category,
            Finding {
                location: location.clone(),
                description,
            },
        );
    }

    /// Directive pass: restricted imports/exports become findings, and
    /// every export/part target feeds the unit's export set.
    fn classify_directive(&mut self, directive: &Directive) {
        match directive.kind {
            DirectiveKind::Import => {
                if self.policy.is_restricted(&directive.target) {
                    self.record(
                        FindingCategory::Import,
                        &directive.location,
                        directive.target.clone(),
                    );
                }
            }
            DirectiveKind::Export | DirectiveKind::Part => {
                let vis = Visibility::new(self.policy);
                self.exports.insert(vis.normalize_target(&directive.target));
                if self.policy.is_restricted(&directive.target) {
                    self.record(
                        FindingCategory::Export,
                        &directive.location,
                        directive.target.clone(),
                    );
                }
            }
        }
    }

    /// Declared-return-type exposure. Marker-private declarations are not
    /// part of any surface and are skipped entirely, members included.
    fn classify_decl(&mut self, unit: &Unit, decl: &Decl) {
        let vis = Visibility::new(self.policy);
        if vis.is_private(&decl.name) {
            return;
        }
        if let Some(return_type) = &decl.return_type {
            let flat = self.types.flatten(return_type);
            if self.policy.is_restricted(&flat.library) {
                let category = if vis.is_exposed(&unit.path, &self.exports) {
                    FindingCategory::PublicExposure
                } else {
                    FindingCategory::PrivateExposure
                };
                self.record(category, &decl.location, flat.name);
            }
        }
        for member in &decl.members {
            self.classify_decl(unit, member);
        }
    }

    fn classify_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Instantiation { ty } => {
                let flat = self.types.flatten(ty);
                if self.policy.is_restricted(&flat.library) {
                    self.record(FindingCategory::Instantiation, &expr.location, flat.name);
                }
            }
            ExprKind::MethodCall {
                target_type,
                invocation_type,
                member,
            } => {
                let ty = target_type.as_ref().or(invocation_type.as_ref());
                self.classify_call_site(ty, member, expr);
            }
            ExprKind::PropertyAccess {
                target_type,
                member,
            }
            | ExprKind::PrefixedRead {
                target_type,
                member,
            } => {
                self.classify_call_site(target_type.as_ref(), member, expr);
            }
        }
    }

    fn classify_call_site(&mut self, ty: Option<&ResolvedType>, member: &str, expr: &Expr) {
        let Some(ty) = ty else { return };
        let flat = self.types.flatten(ty);
        if self.policy.is_restricted(&flat.library) {
            self.record(
                FindingCategory::Call,
                &expr.location,
                format!("{}.{}", flat.name, member),
            );
        }
    }
}

impl UnitPass for RestrictedClassifier<'_> {
    fn pre_analysis(&mut self, unit: &Unit) -> bool {
        // Fresh export set for every unit; directives are collected up
        // front so later classification sees the full set.
        self.exports = ExportSet::new();
        for node in &unit.nodes {
            if let Node::Directive(directive) = node {
                self.classify_directive(directive);
            }
        }
        true
    }

    fn visit_node(&mut self, unit: &Unit, node: &Node) {
        match node {
            // Handled during pre_analysis.
            Node::Directive(_) => {}
            Node::Decl(decl) => self.classify_decl(unit, decl),
            Node::Expr(expr) => self.classify_expr(expr),
        }
    }

    fn post_analysis(&mut self, _unit: &Unit) {
        // The export set must not leak into the next unit.
        self.exports = ExportSet::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DeclKind, InlineTypeOracle, Location, WrapperKind};

    fn loc(file: &str, line: usize, column: usize) -> Location {
        Location {
            file: file.to_string(),
            line,
            column,
        }
    }

    fn restricted_ty(name: &str) -> ResolvedType {
        ResolvedType {
            name: name.to_string(),
            library: "restricted:io".to_string(),
            wrapper: None,
            inner: None,
        }
    }

    fn import(target: &str, line: usize) -> Node {
        Node::Directive(Directive {
            kind: DirectiveKind::Import,
            target: target.to_string(),
            location: loc("lib/demo.dart", line, 1),
        })
    }

    fn export(target: &str, line: usize) -> Node {
        Node::Directive(Directive {
            kind: DirectiveKind::Export,
            target: target.to_string(),
            location: loc("lib/demo.dart", line, 1),
        })
    }

    fn function(name: &str, return_type: Option<ResolvedType>, file: &str) -> Node {
        Node::Decl(Decl {
            name: name.to_string(),
            kind: DeclKind::Function,
            documented: false,
            location: loc(file, 10, 1),
            return_type,
            members: Vec::new(),
            type_ref: None,
        })
    }

    fn policy() -> AuditPolicy {
        let mut policy = AuditPolicy::default();
        policy.restricted.insert("restricted:io".to_string());
        policy
    }

    fn classify(policy: &AuditPolicy, unit: &Unit) -> Entity {
        let oracle = InlineTypeOracle;
        let mut entity = Entity::new("demo");
        let mut classifier = RestrictedClassifier::new(policy, &oracle, &mut entity);
        classifier.classify_unit(unit);
        entity
    }

    #[test]
    fn test_duplicate_imports_same_site_collapse() {
        let policy = policy();
        let unit = Unit {
            path: "lib/demo.dart".to_string(),
            line_info: true,
            nodes: vec![
                import("restricted:io", 1),
                import("restricted:io", 1),
                import("restricted:io", 2),
            ],
        };
        let entity = classify(&policy, &unit);
        // Same site collapses; a distinct location stays distinct.
        assert_eq!(entity.count(FindingCategory::Import), 2);
    }

    #[test]
    fn test_unrestricted_import_ignored() {
        let policy = policy();
        let unit = Unit {
            path: "lib/demo.dart".to_string(),
            line_info: true,
            nodes: vec![import("core:async", 1)],
        };
        let entity = classify(&policy, &unit);
        assert_eq!(entity.total_findings(), 0);
    }

    #[test]
    fn test_restricted_export_recorded_and_any_export_feeds_set() {
        let policy = policy();
        let unit = Unit {
            path: "lib/src/impl.dart".to_string(),
            line_info: true,
            nodes: vec![
                export("restricted:io", 1),
                // The export of this very file appears after the decl in
                // file order; two-pass classification still honors it.
                function("open", Some(restricted_ty("Socket")), "lib/src/impl.dart"),
                export("src/impl.dart", 20),
            ],
        };
        let entity = classify(&policy, &unit);
        assert_eq!(entity.count(FindingCategory::Export), 1);
        assert_eq!(entity.count(FindingCategory::PublicExposure), 1);
        assert_eq!(entity.count(FindingCategory::PrivateExposure), 0);
    }

    #[test]
    fn test_return_type_exposure_private_without_export() {
        let policy = policy();
        let unit = Unit {
            path: "lib/src/impl.dart".to_string(),
            line_info: true,
            nodes: vec![function(
                "open",
                Some(restricted_ty("Socket")),
                "lib/src/impl.dart",
            )],
        };
        let entity = classify(&policy, &unit);
        assert_eq!(entity.count(FindingCategory::PrivateExposure), 1);
        assert_eq!(entity.count(FindingCategory::PublicExposure), 0);
    }

    #[test]
    fn test_marker_private_decl_excluded_from_exposure() {
        let policy = policy();
        let unit = Unit {
            path: "lib/demo.dart".to_string(),
            line_info: true,
            nodes: vec![function(
                "_open",
                Some(restricted_ty("Socket")),
                "lib/demo.dart",
            )],
        };
        let entity = classify(&policy, &unit);
        assert_eq!(entity.count(FindingCategory::PublicExposure), 0);
        assert_eq!(entity.count(FindingCategory::PrivateExposure), 0);
    }

    #[test]
    fn test_instantiation_of_restricted_type() {
        let policy = policy();
        let unit = Unit {
            path: "lib/demo.dart".to_string(),
            line_info: true,
            nodes: vec![Node::Expr(Expr {
                kind: ExprKind::Instantiation {
                    ty: restricted_ty("Socket"),
                },
                location: loc("lib/demo.dart", 5, 3),
            })],
        };
        let entity = classify(&policy, &unit);
        let instantiations = &entity.findings[&FindingCategory::Instantiation];
        assert_eq!(instantiations.len(), 1);
        assert_eq!(instantiations.iter().next().unwrap().description, "Socket");
    }

    #[test]
    fn test_wrapped_return_type_flattened_before_classification() {
        let policy = policy();
        let wrapped = ResolvedType {
            name: "Future<Socket>".to_string(),
            library: "core:async".to_string(),
            wrapper: Some(WrapperKind::Async),
            inner: Some(Box::new(restricted_ty("Socket"))),
        };
        let unit = Unit {
            path: "lib/demo.dart".to_string(),
            line_info: true,
            nodes: vec![function("open", Some(wrapped), "lib/demo.dart")],
        };
        let entity = classify(&policy, &unit);
        let exposures = &entity.findings[&FindingCategory::PublicExposure];
        assert_eq!(exposures.len(), 1);
        assert_eq!(exposures.iter().next().unwrap().description, "Socket");
    }

    #[test]
    fn test_call_site_described_as_type_dot_member() {
        let policy = policy();
        let unit = Unit {
            path: "lib/demo.dart".to_string(),
            line_info: true,
            nodes: vec![
                Node::Expr(Expr {
                    kind: ExprKind::MethodCall {
                        target_type: Some(restricted_ty("Socket")),
                        invocation_type: None,
                        member: "close".to_string(),
                    },
                    location: loc("lib/demo.dart", 7, 5),
                }),
                Node::Expr(Expr {
                    kind: ExprKind::PropertyAccess {
                        target_type: Some(restricted_ty("Socket")),
                        member: "port".to_string(),
                    },
                    location: loc("lib/demo.dart", 8, 5),
                }),
            ],
        };
        let entity = classify(&policy, &unit);
        let calls = &entity.findings[&FindingCategory::Call];
        let descriptions: Vec<_> = calls.iter().map(|f| f.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Socket.close", "Socket.port"]);
    }

    #[test]
    fn test_method_call_falls_back_to_invocation_type() {
        let policy = policy();
        let unit = Unit {
            path: "lib/demo.dart".to_string(),
            line_info: true,
            nodes: vec![Node::Expr(Expr {
                kind: ExprKind::MethodCall {
                    target_type: None,
                    invocation_type: Some(restricted_ty("Socket")),
                    member: "connect".to_string(),
                },
                location: loc("lib/demo.dart", 9, 5),
            })],
        };
        let entity = classify(&policy, &unit);
        assert_eq!(entity.count(FindingCategory::Call), 1);
    }

    #[test]
    fn test_export_set_does_not_leak_between_units() {
        let policy = policy();
        let oracle = InlineTypeOracle;
        let mut entity = Entity::new("demo");
        let mut classifier = RestrictedClassifier::new(&policy, &oracle, &mut entity);

        classifier.classify_unit(&Unit {
            path: "lib/a.dart".to_string(),
            line_info: true,
            nodes: vec![export("src/impl.dart", 1)],
        });
        classifier.classify_unit(&Unit {
            path: "lib/src/impl.dart".to_string(),
            line_info: true,
            nodes: vec![function(
                "open",
                Some(restricted_ty("Socket")),
                "lib/src/impl.dart",
            )],
        });

        // The export from the first unit is gone; the second unit's
        // declaration classifies as private exposure.
        assert_eq!(entity.count(FindingCategory::PrivateExposure), 1);
        assert_eq!(entity.count(FindingCategory::PublicExposure), 0);
    }

    #[test]
    fn test_scenario_import_plus_public_and_private_methods() {
        let policy = policy();
        let unit = Unit {
            path: "lib/demo.dart".to_string(),
            line_info: true,
            nodes: vec![
                import("restricted:io", 1),
                function("_hidden", Some(restricted_ty("Socket")), "lib/demo.dart"),
                function("open", Some(restricted_ty("Socket")), "lib/demo.dart"),
            ],
        };
        let entity = classify(&policy, &unit);
        assert_eq!(entity.count(FindingCategory::Import), 1);
        assert_eq!(entity.count(FindingCategory::PublicExposure), 1);
        assert_eq!(entity.count(FindingCategory::PrivateExposure), 0);
    }
}
