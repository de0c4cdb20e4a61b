//! Command-line interface for surfacecheck.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::audit::{needs_review, Runner};
use crate::metadata::MetadataIndex;
use crate::policy::{self, AuditPolicy};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default policy file names to search for.
const DEFAULT_POLICY_NAMES: &[&str] = &["surfacecheck.yaml", ".surfacecheck.yaml"];

/// Public API surface audits for resolved package dumps.
///
/// Surfacecheck audits the resolved public surface of plugin packages
/// against a policy: it measures documentation coverage of public API
/// elements and flags imports, exposures, calls, and instantiations of
/// restricted libraries.
#[derive(Parser)]
#[command(name = "surfacecheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audit packages under a directory against a policy
    #[command(visible_alias = "check")]
    Audit(AuditArgs),
    /// Create a new surfacecheck policy file
    Init(InitArgs),
}

/// Arguments for the audit command.
#[derive(Parser)]
pub struct AuditArgs {
    /// Directory holding the packages to audit
    pub path: PathBuf,

    /// Path to policy YAML file (default: auto-discover)
    #[arg(short, long)]
    pub policy: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Path to an external metadata JSON file to join into the report
    #[arg(short, long)]
    pub metadata: Option<PathBuf>,

    /// Stop after this many packages (overrides the policy's max_packages)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// List every public element missing documentation
    #[arg(long)]
    pub show_missing_docs: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "surfacecheck.yaml")]
    pub output: PathBuf,
}

/// Discover a policy file in the current directory.
fn discover_policy() -> anyhow::Result<PathBuf> {
    for name in DEFAULT_POLICY_NAMES {
        let path = PathBuf::from(name);
        if path.exists() {
            return Ok(path);
        }
    }
    anyhow::bail!(
        "no policy file found (looked for {})",
        DEFAULT_POLICY_NAMES.join(", ")
    )
}

/// Run the audit command.
pub fn run_audit(args: &AuditArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    // Discover policy if not specified
    let policy_path = match &args.policy {
        Some(p) => p.clone(),
        None => match discover_policy() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!("Run 'surfacecheck init' to create a policy file");
                return Ok(EXIT_ERROR);
            }
        },
    };

    // Parse policy
    let mut audit_policy = match AuditPolicy::parse_file(&policy_path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error parsing policy: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    if let Some(limit) = args.limit {
        audit_policy.max_packages = Some(limit);
    }

    // Validate policy
    if let Err(e) = policy::validate(&audit_policy) {
        eprintln!("Error: invalid policy: {}", e);
        return Ok(EXIT_ERROR);
    }

    // Resolve path
    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };
    if !abs_path.is_dir() {
        eprintln!("Error: {:?} is not a directory", args.path);
        return Ok(EXIT_ERROR);
    }

    // Run both audit passes
    let runner = Runner::new(&audit_policy);
    let mut outcome = runner.run(&abs_path)?;

    if outcome.analyzed == 0 {
        eprintln!("Warning: no eligible packages found");
    }

    // Join external metadata when provided
    if let Some(metadata_path) = &args.metadata {
        let index = match MetadataIndex::load(metadata_path) {
            Ok(i) => i,
            Err(e) => {
                eprintln!("Error loading metadata: {}", e);
                return Ok(EXIT_ERROR);
            }
        };
        index.attach(&mut outcome.registry, &outcome.package_paths);
    }

    // Output results
    let policy_path_str = policy_path.to_string_lossy().to_string();
    let path_str = args.path.to_string_lossy().to_string();

    match args.format.as_str() {
        "json" => report::write_json(&path_str, &policy_path_str, &outcome)?,
        _ => report::write_pretty(&path_str, &policy_path_str, &outcome, args.show_missing_docs),
    }

    // Any entity flagged for manual review fails the gate
    if outcome.registry.iter().any(needs_review) {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    let mut starter = AuditPolicy::default();
    starter.version = "1".to_string();
    starter.name = "starter policy".to_string();
    starter.description = Some("List restricted library identifiers below.".to_string());
    let content = serde_yaml::to_string(&starter)?;

    if let Err(e) = std::fs::write(&args.output, content) {
        eprintln!("Error: failed to write policy: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit {} and list the restricted libraries",
        args.output.display()
    );
    println!(
        "  2. Run: surfacecheck audit <packages-dir> --policy {}",
        args.output.display()
    );

    Ok(EXIT_SUCCESS)
}
