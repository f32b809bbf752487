//! JSON output types for CLI responses.
//!
//! These types define the machine-readable run summary printed by
//! `phpfix --json`. The schema is deterministic: `status` first, stable
//! field order, decline counts keyed by their stable snake_case names in
//! sorted order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use phpfix_rules::RuleOutcome;

/// Current schema version for run summaries.
pub const SCHEMA_VERSION: &str = "1";

/// Overall run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Nothing to change (or all changes written).
    Ok,
    /// `--check` found files that would change.
    ChangesNeeded,
    /// One or more files could not be processed.
    Error,
}

/// Per-file report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// File path as given or relative to the scanned directory.
    pub path: String,
    /// Whether the file content changed (or would change under `--check`).
    pub changed: bool,
    /// Total mutations across rules.
    pub mutations: usize,
    /// Decline counts keyed by reason, summed across rules.
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub declines: BTreeMap<String, usize>,
}

impl FileReport {
    /// Build a report from the rule outcomes for one file.
    pub fn from_outcomes(path: impl Into<String>, changed: bool, outcomes: &[RuleOutcome]) -> Self {
        let mut mutations = 0;
        let mut declines: BTreeMap<String, usize> = BTreeMap::new();
        for outcome in outcomes {
            mutations += outcome.report.mutations;
            for decline in &outcome.report.declines {
                *declines.entry(decline.as_str().to_string()).or_insert(0) += 1;
            }
        }
        FileReport {
            path: path.into(),
            changed,
            mutations,
            declines,
        }
    }
}

/// A file that could not be processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileIssue {
    /// File path.
    pub path: String,
    /// Human-readable reason.
    pub message: String,
}

/// Whole-run summary, the `--json` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Overall status; always the first field.
    pub status: RunStatus,
    /// Schema version for forward compatibility.
    pub schema_version: String,
    /// Number of files scanned.
    pub files_scanned: usize,
    /// Number of files changed (or that would change).
    pub files_changed: usize,
    /// Per-file reports, in scan order.
    pub reports: Vec<FileReport>,
    /// Files that failed to process.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<FileIssue>,
}

impl RunSummary {
    /// Build a summary from per-file reports and issues.
    pub fn new(check: bool, reports: Vec<FileReport>, errors: Vec<FileIssue>) -> Self {
        let files_changed = reports.iter().filter(|r| r.changed).count();
        let status = if !errors.is_empty() {
            RunStatus::Error
        } else if check && files_changed > 0 {
            RunStatus::ChangesNeeded
        } else {
            RunStatus::Ok
        };
        RunSummary {
            status,
            schema_version: SCHEMA_VERSION.to_string(),
            files_scanned: reports.len(),
            files_changed,
            reports,
            errors,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use phpfix_rules::{Decline, RuleReport};

    fn outcome(mutations: usize, declines: Vec<Decline>) -> RuleOutcome {
        RuleOutcome {
            rule: "phpdoc-to-return-type".to_string(),
            report: RuleReport {
                mutations,
                declines,
            },
        }
    }

    #[test]
    fn file_report_aggregates_outcomes() {
        let outcomes = vec![outcome(
            2,
            vec![Decline::AlreadyTyped, Decline::UnsafeSyntax, Decline::AlreadyTyped],
        )];
        let report = FileReport::from_outcomes("a.php", true, &outcomes);
        assert_eq!(report.mutations, 2);
        assert_eq!(report.declines["already_typed"], 2);
        assert_eq!(report.declines["unsafe_syntax"], 1);
    }

    #[test]
    fn status_ok_when_clean() {
        let summary = RunSummary::new(false, vec![], vec![]);
        assert_eq!(summary.status, RunStatus::Ok);
    }

    #[test]
    fn status_changes_needed_only_in_check_mode() {
        let changed = FileReport::from_outcomes("a.php", true, &[outcome(1, vec![])]);
        let summary = RunSummary::new(true, vec![changed.clone()], vec![]);
        assert_eq!(summary.status, RunStatus::ChangesNeeded);
        let summary = RunSummary::new(false, vec![changed], vec![]);
        assert_eq!(summary.status, RunStatus::Ok);
    }

    #[test]
    fn status_error_wins() {
        let issue = FileIssue {
            path: "bad.php".to_string(),
            message: "unterminated string literal starting at byte 7".to_string(),
        };
        let summary = RunSummary::new(true, vec![], vec![issue]);
        assert_eq!(summary.status, RunStatus::Error);
    }

    #[test]
    fn json_shape_is_status_first() {
        let summary = RunSummary::new(false, vec![], vec![]);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.starts_with("{\"status\":\"ok\""));
        // Empty error list is omitted entirely.
        assert!(!json.contains("errors"));
    }
}
