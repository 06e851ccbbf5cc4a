//! Registry commands that need no network: add, list, info, forget, purge,
//! clean, and the JSON error contract.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use predicates::prelude::*;
use tempfile::TempDir;

use crate::config_command::isolated as hive_in;

fn json(cmd: &mut assert_cmd::Command) -> serde_json::Value {
    let output = cmd.arg("--json").output().unwrap();
    serde_json::from_slice(&output.stdout).expect("stdout is one JSON document")
}

#[test]
fn test_list_empty() {
    let dir = TempDir::new().unwrap();
    hive_in(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No agents known"));
}

#[test]
fn test_list_empty_json() {
    let dir = TempDir::new().unwrap();
    let v = json(hive_in(&dir).arg("list"));
    assert_eq!(v["agents"], serde_json::json!([]));
}

#[test]
fn test_add_then_list_and_info() {
    let dir = TempDir::new().unwrap();
    hive_in(&dir)
        .args(["add", "echo", "someone/echo"])
        .assert()
        .success();

    let v = json(hive_in(&dir).arg("list"));
    let agents = v["agents"].as_array().unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0]["name"], "echo");
    assert_eq!(agents[0]["source"], "https://github.com/someone/echo.git");
    assert_eq!(agents[0]["installed"], false);

    let info = json(hive_in(&dir).args(["info", "echo"]));
    assert_eq!(info["installed"], false);
    assert_eq!(info["files"], serde_json::json!([]));

    let list = dir.path().join("home").join("etc").join("hive").join("list");
    let content = std::fs::read_to_string(list).unwrap();
    assert!(content.contains("[echo]"));
}

#[test]
fn test_add_duplicate_fails_with_code() {
    let dir = TempDir::new().unwrap();
    hive_in(&dir)
        .args(["add", "echo", "https://example.org/echo.git"])
        .assert()
        .success();
    let output = hive_in(&dir)
        .args(["add", "echo", "https://example.org/echo.git", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["error"], true);
    assert_eq!(v["code"], "already_exists");
}

#[test]
fn test_forget_unknown_agent_fails() {
    let dir = TempDir::new().unwrap();
    hive_in(&dir)
        .args(["forget", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Agent 'ghost' not found"));
}

#[test]
fn test_forget_known_agent() {
    let dir = TempDir::new().unwrap();
    hive_in(&dir)
        .args(["add", "echo", "https://example.org/echo.git"])
        .assert()
        .success();
    hive_in(&dir).args(["forget", "echo"]).assert().success();
    let v = json(hive_in(&dir).arg("list"));
    assert_eq!(v["agents"], serde_json::json!([]));
}

#[test]
fn test_invalid_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = hive_in(&dir)
        .args(["info", "../etc", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["code"], "invalid_name");
}

#[test]
fn test_update_not_installed_fails() {
    let dir = TempDir::new().unwrap();
    hive_in(&dir)
        .args(["update", "echo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not installed"));
}

#[test]
fn test_purge_without_config_files() {
    let dir = TempDir::new().unwrap();
    hive_in(&dir)
        .args(["add", "echo", "https://example.org/echo.git"])
        .assert()
        .success();
    let output = hive_in(&dir)
        .args(["purge", "echo", "--yes", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["code"], "no_config_files");
}

#[test]
fn test_stop_not_running_fails() {
    let dir = TempDir::new().unwrap();
    hive_in(&dir)
        .args(["stop", "echo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not running"));
}

#[test]
fn test_clean_without_staging_succeeds() {
    let dir = TempDir::new().unwrap();
    hive_in(&dir).arg("clean").assert().success();
}

#[test]
fn test_unlisted_sender_is_denied() {
    let dir = TempDir::new().unwrap();
    hive_in(&dir)
        // Nothing listens on port 1; feedback delivery fails quietly.
        .env("HIVE_BUS_PORT", "1")
        .args(["add", "echo", "https://example.org/echo.git"])
        .args(["--sender", "stranger@example.org", "--channel", "jabber"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("permissions"));
    assert!(!dir.path().join("home").join("etc").join("hive").join("list").exists());
}

#[test]
fn test_held_lock_makes_mutations_busy() {
    let dir = TempDir::new().unwrap();
    let var = dir.path().join("home").join("var");
    std::fs::create_dir_all(&var).unwrap();
    // The test process itself is alive, so the lock is not stale.
    std::fs::write(var.join("hive.lock"), std::process::id().to_string()).unwrap();
    let output = hive_in(&dir)
        .args(["add", "echo", "https://example.org/echo.git", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["code"], "busy");

    // Read-only commands do not take the lock.
    hive_in(&dir).arg("list").assert().success();
}
