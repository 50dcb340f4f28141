//! Integration tests for the mnemos CLI

mod support;

use predicates::prelude::*;
use support::{json, mnemos, record, setup_test_dir};
use tempfile::tempdir;

// ============================================================================
// Help and version
// ============================================================================

#[test]
fn test_help_flag() {
    mnemos()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: mnemos"))
        .stdout(predicate::str::contains("observe"))
        .stdout(predicate::str::contains("compact"));
}

#[test]
fn test_version_flag() {
    mnemos()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mnemos"));
}

// ============================================================================
// Exit codes
// ============================================================================

#[test]
fn test_unknown_format_exit_code_2() {
    mnemos()
        .args(["--format", "invalid", "status"])
        .assert()
        .code(2);
}

#[test]
fn test_missing_store_exit_code_3() {
    let dir = tempdir().unwrap();
    mnemos()
        .current_dir(dir.path())
        .arg("status")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("store not found"));
}

#[test]
fn test_invalid_namespace_exit_code_2() {
    let dir = setup_test_dir();
    mnemos()
        .current_dir(dir.path())
        .args(["--namespace", "a/b", "status"])
        .assert()
        .code(2);
}

#[test]
fn test_json_error_envelope() {
    let dir = setup_test_dir();
    let output = mnemos()
        .current_dir(dir.path())
        .args(["--format", "json", "resolve", "01ARZ3NDEKTSV4RRFFQ69G5FAV", "fix"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let envelope: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(envelope["error"]["type"], "not_found");
    assert_eq!(envelope["error"]["code"], 3);
}

// ============================================================================
// Init and store location
// ============================================================================

#[test]
fn test_init_creates_default_store() {
    let dir = tempdir().unwrap();
    mnemos()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized mnemos store"));
    assert!(dir.path().join(".mnemos/config.toml").exists());

    // idempotent
    mnemos().current_dir(dir.path()).arg("init").assert().success();
}

#[test]
fn test_store_from_env() {
    let dir = tempdir().unwrap();
    let home = dir.path().join("shared");
    mnemos()
        .current_dir(dir.path())
        .env("MNEMOS_HOME", &home)
        .args(["--namespace", "global", "init"])
        .assert()
        .success();
    mnemos()
        .current_dir(dir.path())
        .env("MNEMOS_HOME", &home)
        .args(["--namespace", "global", "observe", "shared note"])
        .assert()
        .success();
    assert!(home.join("global.jsonl").exists());
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_observe_and_search() {
    let dir = setup_test_dir();
    record(
        &dir,
        &["observe", "Cache miss on cold start", "--location", "cache/lru.rs"],
    );
    record(&dir, &["insight", "unrelated"]);

    mnemos()
        .current_dir(dir.path())
        .args(["search", "cache"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "observation Cache miss on cold start @ cache/lru.rs",
        ))
        .stdout(predicate::str::contains("unrelated").not());
}

#[test]
fn test_invalid_severity_rejected() {
    let dir = setup_test_dir();
    record(&dir, &["issue", "pool leak", "--severity", "critical"]);
    mnemos()
        .current_dir(dir.path())
        .args(["issue", "bad", "--severity", "extreme"])
        .assert()
        .code(2);
}

#[test]
fn test_issue_resolve_flow() {
    let dir = setup_test_dir();
    let issue_id = record(&dir, &["issue", "pool leak", "--location", "db/pool.rs"]);

    let status = json(&dir, &["status"]);
    assert_eq!(status["open_issues"].as_array().unwrap().len(), 1);

    mnemos()
        .current_dir(dir.path())
        .args(["resolve", &issue_id, "return connections on drop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resolved"));

    let status = json(&dir, &["status"]);
    assert!(status["open_issues"].as_array().unwrap().is_empty());

    mnemos()
        .current_dir(dir.path())
        .args(["resolve", &issue_id, "again"])
        .assert()
        .code(3);
}

// ============================================================================
// Investigations
// ============================================================================

#[test]
fn test_start_stop_investigation() {
    let dir = setup_test_dir();
    mnemos()
        .current_dir(dir.path())
        .args(["start", "T1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("started investigation T1"));

    let observation = json(&dir, &["observe", "inside T1"]);
    assert!(observation["investigation_id"].is_string());

    let status = json(&dir, &["status"]);
    assert_eq!(status["active_investigation"]["topic"], "T1");

    mnemos().current_dir(dir.path()).arg("stop").assert().success();
    mnemos().current_dir(dir.path()).arg("stop").assert().code(3);

    let investigations = json(&dir, &["investigations"]);
    assert_eq!(investigations[0]["state"], "closed");
}

// ============================================================================
// Compaction and reflection
// ============================================================================

#[test]
fn test_compact_summarizes_observations() {
    let dir = setup_test_dir();
    mnemos()
        .current_dir(dir.path())
        .args(["start", "T1"])
        .assert()
        .success();
    for i in 0..5 {
        record(&dir, &["observe", &format!("observation {i}")]);
    }
    record(&dir, &["discover", "root cause"]);

    let result = json(&dir, &["compact"]);
    assert_eq!(result["compacted"], true);
    assert_eq!(result["report"]["records_after"], 2);

    let status = json(&dir, &["status"]);
    assert_eq!(status["summaries"], 1);
    assert_eq!(status["counts"]["discovery"], 1);
}

#[test]
fn test_archive_expands_compacted_run() {
    let dir = setup_test_dir();
    let ids: Vec<String> = (0..5)
        .map(|i| record(&dir, &["observe", &format!("observation {i}")]))
        .collect();
    record(&dir, &["discover", "root cause"]);
    json(&dir, &["compact"]);

    let runs = json(&dir, &["archive"]);
    assert_eq!(runs.as_array().map(Vec::len), Some(1));
    let summary_id = runs[0]["summary_id"].as_str().unwrap().to_string();

    let run = json(&dir, &["archive", &summary_id]);
    let expanded: Vec<&str> = run["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(expanded, ids);

    mnemos()
        .current_dir(dir.path())
        .args(["archive", &ids[0]])
        .assert()
        .code(3);
}

#[test]
fn test_compact_if_needed_below_threshold() {
    let dir = setup_test_dir();
    record(&dir, &["observe", "just one"]);
    mnemos()
        .current_dir(dir.path())
        .args(["compact", "--if-needed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("compaction not needed"));
}

#[test]
fn test_reflect_insufficient_data() {
    let dir = setup_test_dir();
    record(&dir, &["observe", "only"]);
    let outcome = json(&dir, &["reflect"]);
    assert_eq!(outcome["status"], "insufficient_data");
    assert_eq!(outcome["required"], 10);
}

#[test]
fn test_reflect_records_reflection() {
    let dir = setup_test_dir();
    for i in 0..10 {
        record(&dir, &["discover", &format!("finding {i}")]);
    }
    mnemos()
        .current_dir(dir.path())
        .arg("reflect")
        .assert()
        .success()
        .stdout(predicate::str::contains("High discovery rate"));

    let status = json(&dir, &["status"]);
    assert_eq!(status["reflections"], 1);
}
