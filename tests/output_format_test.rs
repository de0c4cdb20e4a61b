//! Tests for the JSON output format.
//!
//! These tests verify the report structure stays stable for downstream
//! consumers: field names, category keys, and the blank-vs-absent rules
//! for optional values.

use std::collections::BTreeMap;

use surfacecheck::audit::ALL_CATEGORIES;
use surfacecheck::report::{JsonCoverage, JsonEntity, JsonReport};

fn empty_entity(name: &str) -> JsonEntity {
    let mut counts = BTreeMap::new();
    let mut findings = BTreeMap::new();
    for category in ALL_CATEGORIES {
        counts.insert(category.as_str().to_string(), 0);
        findings.insert(category.as_str().to_string(), Vec::new());
    }
    JsonEntity {
        name: name.to_string(),
        entry_class: None,
        counts,
        findings,
        popularity: None,
        score: None,
        needs_review: true,
    }
}

#[test]
fn test_json_report_field_names() {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: "packages".to_string(),
        policy: "policy.yaml".to_string(),
        packages_analyzed: 1,
        packages_skipped: 0,
        coverage: JsonCoverage {
            total: 4,
            missing: 1,
            score: Some(0.75),
            missing_docs: vec!["connect: 22:1".to_string()],
        },
        entities: vec![empty_entity("alpha")],
    };

    let value: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["path"], "packages");
    assert_eq!(value["packages_analyzed"], 1);
    assert_eq!(value["coverage"]["score"], 0.75);
    assert_eq!(value["coverage"]["missing_docs"][0], "connect: 22:1");
    assert_eq!(value["entities"][0]["name"], "alpha");
    assert_eq!(value["entities"][0]["needs_review"], true);
}

#[test]
fn test_entity_counts_keyed_by_category_name() {
    let value: serde_json::Value = serde_json::to_value(&empty_entity("alpha")).unwrap();
    for key in [
        "import",
        "export",
        "private_exposure",
        "public_exposure",
        "call",
        "instantiation",
    ] {
        assert_eq!(value["counts"][key], 0, "missing counts key {:?}", key);
    }
}

#[test]
fn test_absent_optionals_are_omitted() {
    // No public API: the score key must be absent, not null.
    let coverage = JsonCoverage {
        total: 0,
        missing: 0,
        score: None,
        missing_docs: Vec::new(),
    };
    let value: serde_json::Value = serde_json::to_value(&coverage).unwrap();
    assert!(value.get("score").is_none());

    // Unjoined metadata and a missing entry class are likewise omitted.
    let value: serde_json::Value = serde_json::to_value(&empty_entity("alpha")).unwrap();
    assert!(value.get("popularity").is_none());
    assert!(value.get("score").is_none());
    assert!(value.get("entry_class").is_none());
}
