use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper function to create a temporary directory for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Helper function to create a Command with --no-color and an isolated
/// database
fn keel_cmd(db_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("keel").expect("Failed to find keel binary");
    cmd.env_remove("KEEL_WEBHOOK_URL")
        .env_remove("KEEL_TICK_DELAY")
        .env_remove("KEEL_EVENTS_FILE")
        .arg("--no-color")
        .arg("--database-file")
        .arg(db_path);
    cmd
}

#[test]
fn test_cli_create_plan() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path)
        .args(["create", "evt_1", "--thread", "th_cli"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created plan evt_1"))
        .stdout(predicate::str::contains("- Thread: th_cli"))
        .stdout(predicate::str::contains("- Stage: PHRASE (2/7)"));
}

#[test]
fn test_cli_create_defaults_thread() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path)
        .args(["create", "evt_1", "--seed", r#"{"text":"hello"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Thread: th_anon"));
}

#[test]
fn test_cli_create_duplicate_fails() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path).args(["create", "evt_1"]).assert().success();
    keel_cmd(&db_path)
        .args(["create", "evt_1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_cli_create_rejects_bad_seed() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path)
        .args(["create", "evt_1", "--seed", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn test_cli_ack_missing_plan() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path)
        .args(["ack", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    keel_cmd(&db_path)
        .arg("scope")
        .assert()
        .success()
        .stdout(predicate::str::contains("No plans found."));
}

#[test]
fn test_cli_ack_plan() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path).args(["create", "evt_1"]).assert().success();
    keel_cmd(&db_path)
        .args(["ack", "evt_1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acknowledged plan evt_1"))
        .stdout(predicate::str::contains("- receipts: acknowledged"));
}

#[test]
fn test_cli_show_missing_plan() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path)
        .args(["show", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_cli_tick_through_all_stages() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path).args(["create", "evt_1"]).assert().success();
    keel_cmd(&db_path)
        .args(["tick", "evt_1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Stage: SEAL (3/7)"))
        .stdout(predicate::str::contains("- SCP: SCP:th_anon-"));
    for _ in 0..5 {
        keel_cmd(&db_path).args(["tick", "evt_1"]).assert().success();
    }

    keel_cmd(&db_path)
        .args(["show", "evt_1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Stage: VERIFY (7/7)"))
        .stdout(predicate::str::contains("- rekor: skipped"))
        .stdout(predicate::str::contains("- sent: yes"))
        .stdout(predicate::str::contains("- cid: bafy"));
}

#[test]
fn test_cli_tick_missing_plan() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path)
        .args(["tick", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_cli_simulated_anchor() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path).args(["create", "evt_1"]).assert().success();
    for _ in 0..4 {
        keel_cmd(&db_path)
            .args(["--rekor-simulate", "tick", "evt_1"])
            .assert()
            .success();
    }

    keel_cmd(&db_path)
        .args(["show", "evt_1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(simulated)"));
}

#[test]
fn test_cli_work_once() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path).args(["create", "evt_1"]).assert().success();
    keel_cmd(&db_path)
        .args(["--tick-delay", "1h", "work", "--once"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Processed"))
        .stdout(predicate::str::contains("- evt_1"));

    // The next step is an hour away
    keel_cmd(&db_path)
        .args(["work", "--once"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing was due."));
}

#[test]
fn test_cli_work_once_boot_tick_all() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path).args(["create", "evt_1"]).assert().success();
    keel_cmd(&db_path).args(["work", "--once"]).assert().success();
    keel_cmd(&db_path)
        .args(["work", "--once", "--boot-tick-all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- evt_1"));
}

#[test]
fn test_cli_sweep() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path).args(["create", "evt_1"]).assert().success();
    keel_cmd(&db_path)
        .arg("sweep")
        .assert()
        .success()
        .stdout(predicate::str::contains("- Scanned: 1"))
        .stdout(predicate::str::contains("- Receipts: 1"));

    keel_cmd(&db_path)
        .args(["show", "evt_1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- receipts: provisional"));
}

#[test]
fn test_cli_scope() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path).args(["create", "b"]).assert().success();
    keel_cmd(&db_path).args(["create", "a"]).assert().success();
    keel_cmd(&db_path).args(["tick", "a"]).assert().success();

    keel_cmd(&db_path)
        .arg("scope")
        .assert()
        .success()
        .stdout(predicate::str::contains("- Plans: 2"))
        .stdout(predicate::str::contains("- PHRASE: 1"))
        .stdout(predicate::str::contains("- SEAL: 1"))
        .stdout(predicate::str::contains("## Unfinished"));
}

#[test]
fn test_cli_events_file() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let events_path = temp_dir.path().join("events.jsonl");

    keel_cmd(&db_path)
        .arg("--events-file")
        .arg(&events_path)
        .args(["create", "evt_1"])
        .assert()
        .success();

    let contents = std::fs::read_to_string(&events_path).expect("Failed to read events");
    assert!(contents.contains(r#""topic":"plan.created""#));
}

#[test]
fn test_cli_invalid_duration() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    keel_cmd(&db_path)
        .args(["work", "--once", "--sleep", "later"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input"));
}
