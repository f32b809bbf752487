//! Whole-pipeline tests: file collection, fixing and the JSON summary.

use std::fs;
use std::path::PathBuf;

use phpfix::files::collect_php_files;
use phpfix::fix::{default_rules, fix_source};
use phpfix::output::{FileReport, RunStatus, RunSummary};
use phpfix::rules::{ReturnTypeConfig, RuleSet, UnionSkipPolicy};
use phpfix_lex::PhpVersion;

fn rules() -> RuleSet {
    default_rules(ReturnTypeConfig {
        php_version: PhpVersion::V8_0,
        union_skip_policy: UnionSkipPolicy::PerMember,
    })
}

fn temp_workspace(files: &[(&str, &str)]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("phpfix-pipeline-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    for (path, content) in files {
        let full = dir.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    dir
}

#[test]
fn end_to_end_over_a_workspace() {
    let dir = temp_workspace(&[
        (
            "src/a.php",
            "<?php /** @return void */ function init() {}\n",
        ),
        ("src/b.php", "<?php function plain() {}\n"),
        ("vendor/skip.php", "<?php /** @return void */ function v() {}\n"),
    ]);

    let rules = rules();
    let mut reports = Vec::new();
    for (path, content) in collect_php_files(&dir).unwrap() {
        let outcome = fix_source(&content, &rules).unwrap();
        reports.push(FileReport::from_outcomes(path, outcome.changed, &outcome.rules));
    }

    assert_eq!(reports.len(), 2, "vendor/ must be excluded");
    let summary = RunSummary::new(false, reports, vec![]);
    assert_eq!(summary.status, RunStatus::Ok);
    assert_eq!(summary.files_scanned, 2);
    assert_eq!(summary.files_changed, 1);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn check_mode_summary_signals_changes() {
    let report = {
        let outcome = fix_source(
            "<?php /** @return int|string */ function f() {}",
            &rules(),
        )
        .unwrap();
        assert_eq!(
            outcome.output,
            "<?php /** @return int|string */ function f(): int|string {}"
        );
        FileReport::from_outcomes("f.php", outcome.changed, &outcome.rules)
    };
    let summary = RunSummary::new(true, vec![report], vec![]);
    assert_eq!(summary.status, RunStatus::ChangesNeeded);
}

#[test]
fn fixing_twice_reaches_a_fixed_point() {
    let src = "<?php\n/** @return \\App\\User|null */\nfunction current_user()\n{\n    return auth()->user();\n}\n";
    let rules = rules();
    let once = fix_source(src, &rules).unwrap();
    assert!(once.changed);
    assert!(once.output.contains("function current_user(): ?\\App\\User\n"));
    let twice = fix_source(&once.output, &rules).unwrap();
    assert!(!twice.changed);
    assert_eq!(twice.output, once.output);
}

#[test]
fn summary_json_is_deterministic() {
    let outcome = fix_source("<?php /** @return void */ function f() {}", &rules()).unwrap();
    let report = FileReport::from_outcomes("f.php", outcome.changed, &outcome.rules);
    let summary = RunSummary::new(false, vec![report], vec![]);
    let a = serde_json::to_string(&summary).unwrap();
    let b = serde_json::to_string(&summary).unwrap();
    assert_eq!(a, b);
    assert!(a.starts_with("{\"status\":\"ok\""));
}
