//! Output formatting for surfacecheck results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::audit::{
    histogram, needs_review, tabulate, AuditOutcome, EntityRow, FindingCategory, ALL_CATEGORIES,
    TABLE_HEADER,
};

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON report structure.
#[derive(Serialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub policy: String,
    pub packages_analyzed: usize,
    pub packages_skipped: usize,
    pub coverage: JsonCoverage,
    pub entities: Vec<JsonEntity>,
}

/// Documentation coverage section of the JSON report.
#[derive(Serialize)]
pub struct JsonCoverage {
    pub total: u64,
    pub missing: u64,
    /// Absent when the audited surface has no public API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub missing_docs: Vec<String>,
}

/// Per-entity section of the JSON report.
#[derive(Serialize)]
pub struct JsonEntity {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_class: Option<String>,
    pub counts: BTreeMap<String, usize>,
    pub findings: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub needs_review: bool,
}

/// Write results in JSON format.
pub fn write_json(path: &str, policy_path: &str, outcome: &AuditOutcome) -> anyhow::Result<()> {
    let entities: Vec<JsonEntity> = outcome
        .registry
        .iter()
        .map(|entity| {
            let mut counts = BTreeMap::new();
            let mut findings = BTreeMap::new();
            for category in ALL_CATEGORIES {
                counts.insert(category.as_str().to_string(), entity.count(category));
                findings.insert(
                    category.as_str().to_string(),
                    entity.findings[&category]
                        .iter()
                        .map(|f| format!("{}: {}", f.location, f.description))
                        .collect(),
                );
            }
            JsonEntity {
                name: entity.name.clone(),
                entry_class: entity.entry_class.clone(),
                counts,
                findings,
                popularity: entity.metadata.as_ref().map(|m| m.popularity),
                score: entity.metadata.as_ref().map(|m| m.score),
                needs_review: needs_review(entity),
            }
        })
        .collect();

    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        policy: policy_path.to_string(),
        packages_analyzed: outcome.analyzed,
        packages_skipped: outcome.skipped,
        coverage: JsonCoverage {
            total: outcome.coverage.total,
            missing: outcome.coverage.missing,
            score: outcome.coverage.score(),
            missing_docs: outcome.missing_docs.iter().map(|m| m.to_string()).collect(),
        },
        entities,
    };

    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(
    path: &str,
    policy_path: &str,
    outcome: &AuditOutcome,
    show_missing_docs: bool,
) {
    // Header
    println!();
    print!("  ");
    print!("{}", "surfacecheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Auditing: ".dimmed());
    println!("{}", path);
    print!("  {}", "Policy:   ".dimmed());
    println!("{}", policy_path);
    print!("  {}", "Packages: ".dimmed());
    println!(
        "{} analyzed, {} skipped",
        outcome.analyzed, outcome.skipped
    );
    println!();

    write_coverage(outcome, show_missing_docs);

    if !outcome.registry.is_empty() {
        write_entity_table(outcome);
        write_call_histogram(outcome);
    }
}

fn write_coverage(outcome: &AuditOutcome, show_missing_docs: bool) {
    match outcome.coverage.score() {
        Some(score) => {
            print!("  Doc coverage: ");
            write_colored_score(score);
            println!(
                "  ({} of {} public elements missing docs)",
                outcome.coverage.missing, outcome.coverage.total
            );
        }
        None => println!("  {}", "Doc coverage: no public API".dimmed()),
    }

    if show_missing_docs && !outcome.missing_docs.is_empty() {
        println!();
        println!("  {} ({}):", "Missing docs".bold(), outcome.missing_docs.len());
        for missing in &outcome.missing_docs {
            println!("    {}", missing);
        }
    }
    println!();
}

fn write_colored_score(score: f64) {
    match score {
        s if s >= 0.9 => print!("{}", format!("{:.2}", s).green().bold()),
        s if s >= 0.7 => print!("{}", format!("{:.2}", s).green()),
        s if s >= 0.5 => print!("{}", format!("{:.2}", s).yellow()),
        s => print!("{}", format!("{:.2}", s).red()),
    }
}

fn write_entity_table(outcome: &AuditOutcome) {
    let rows = tabulate(&outcome.registry);

    let mut table: Vec<Vec<String>> =
        vec![TABLE_HEADER.iter().map(|h| h.to_string()).collect()];
    table.extend(rows.iter().map(EntityRow::cells));
    print_aligned(&table);

    let flagged: Vec<&EntityRow> = rows.iter().filter(|r| r.needs_review).collect();
    if !flagged.is_empty() {
        println!();
        println!("  {} ({}):", "Needs review".yellow().bold(), flagged.len());
        for row in flagged {
            println!("    {}", row.name.yellow());
        }
    }
    println!();
}

fn write_call_histogram(outcome: &AuditOutcome) {
    let calls = histogram(&outcome.registry, FindingCategory::Call);
    if calls.is_empty() {
        return;
    }

    println!("  {}", "Top restricted call sites:".bold());
    let mut entries: Vec<_> = calls.iter().collect();
    entries.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(b.0)));
    for (description, entry) in entries.iter().take(10) {
        let plural = if entry.entities.len() != 1 { "s" } else { "" };
        println!(
            "    {:<36} {:>3} ({} package{})",
            description,
            entry.count,
            entry.entities.len(),
            plural
        );
    }
    println!();
}

/// Print rows with each column padded to its widest cell.
fn print_aligned(table: &[Vec<String>]) {
    let columns = match table.first() {
        Some(header) => header.len(),
        None => return,
    };
    let mut widths = vec![0usize; columns];
    for row in table {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }
    for row in table {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ");
        println!("  {}", line.trim_end());
    }
}
