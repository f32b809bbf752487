//! phpfix CLI binary entry point.
//!
//! Exit codes:
//! - `0`: run completed, nothing left to change
//! - `1`: `--check` found files that would change
//! - `2`: invalid arguments
//! - `4`: one or more files could not be processed

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use phpfix::files::collect_php_files;
use phpfix::fix::{default_rules, fix_source};
use phpfix::output::{FileIssue, FileReport, RunStatus, RunSummary};
use phpfix::rules::{ReturnTypeConfig, UnionSkipPolicy};
use phpfix_lex::PhpVersion;

/// Deterministic PHP source fixer: promotes docblock @return annotations
/// to native return type declarations.
#[derive(Parser)]
#[command(name = "phpfix")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Files or directories to fix (directories are walked for .php files)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Report what would change without writing any file
    #[arg(long)]
    check: bool,

    /// Print a JSON run summary to stdout
    #[arg(long)]
    json: bool,

    /// Target PHP version, e.g. "7.4", "8.1", or "permissive"
    #[arg(long, default_value = "permissive")]
    php_version: String,

    /// Skip-list handling for union members: per-member or whole-union
    #[arg(long, default_value = "per-member")]
    union_skip_policy: String,
}

fn main() -> ExitCode {
    // Initialize tracing with RUST_LOG support
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let php_version: PhpVersion = match cli.php_version.parse() {
        Ok(v) => v,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(2);
        }
    };
    let union_skip_policy: UnionSkipPolicy = match cli.union_skip_policy.parse() {
        Ok(p) => p,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(2);
        }
    };
    let rules = default_rules(ReturnTypeConfig {
        php_version,
        union_skip_policy,
    });

    let mut reports: Vec<FileReport> = Vec::new();
    let mut errors: Vec<FileIssue> = Vec::new();

    for root in &cli.paths {
        let files = match collect_php_files(root) {
            Ok(files) => files,
            Err(e) => {
                errors.push(FileIssue {
                    path: root.display().to_string(),
                    message: e.to_string(),
                });
                continue;
            }
        };
        for (path, content) in files {
            let display_path = if root.is_dir() {
                root.join(&path).display().to_string()
            } else {
                path
            };
            match fix_source(&content, &rules) {
                Ok(outcome) => {
                    if outcome.changed {
                        if cli.check {
                            info!(path = %display_path, "would change");
                        } else if let Err(e) = fs::write(&display_path, &outcome.output) {
                            errors.push(FileIssue {
                                path: display_path.clone(),
                                message: e.to_string(),
                            });
                        } else {
                            info!(path = %display_path, "fixed");
                        }
                    } else {
                        debug!(path = %display_path, "no change");
                    }
                    reports.push(FileReport::from_outcomes(
                        display_path,
                        outcome.changed,
                        &outcome.rules,
                    ));
                }
                Err(e) => {
                    errors.push(FileIssue {
                        path: display_path,
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    let summary = RunSummary::new(cli.check, reports, errors);
    if cli.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("cannot serialize summary: {e}");
                return ExitCode::from(4);
            }
        }
    } else {
        for report in &summary.reports {
            if report.changed {
                let verb = if cli.check { "would fix" } else { "fixed" };
                println!("{}: {} ({} change(s))", verb, report.path, report.mutations);
            }
        }
        for issue in &summary.errors {
            eprintln!("error: {}: {}", issue.path, issue.message);
        }
    }

    match summary.status {
        RunStatus::Ok => ExitCode::SUCCESS,
        RunStatus::ChangesNeeded => ExitCode::from(1),
        RunStatus::Error => ExitCode::from(4),
    }
}
