//! `hive config show` against a temp configuration.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use predicates::prelude::*;
use tempfile::TempDir;

use crate::cli_tests::hive;

/// `hive` with its config file and home inside `dir`.
pub fn isolated(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = hive();
    cmd.env("HIVE_CONFIG", dir.path().join("config.yaml"))
        .env("HIVE_HOME", dir.path().join("home"))
        .env_remove("HIVE_VAR")
        .env_remove("HIVE_LOGS")
        .env_remove("HIVE_BUS_HOST")
        .env_remove("HIVE_BUS_PORT")
        .env_remove("HIVE_BASE_PORT");
    cmd
}

#[test]
fn test_config_show_defaults_json() {
    let dir = TempDir::new().unwrap();
    let output = isolated(&dir)
        .args(["config", "show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let home = dir.path().join("home");
    assert_eq!(v["home"], home.display().to_string());
    assert_eq!(v["var"], home.join("var").display().to_string());
    assert_eq!(v["staging"], home.join("var").join("hive").display().to_string());
    assert_eq!(v["bus"]["host"], "localhost");
    assert_eq!(v["bus"]["port"], 30000);
    assert_eq!(v["base_port"], 30000);
}

#[test]
fn test_config_file_values_and_env_overrides() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        "bus:\n  host: bus.local\n  port: 4000\nadmins:\n  - boss@example.org\n",
    )
    .unwrap();
    let output = isolated(&dir)
        .env("HIVE_BASE_PORT", "5000")
        .args(["config", "show", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["bus"]["host"], "bus.local");
    assert_eq!(v["bus"]["port"], 4000);
    assert_eq!(v["base_port"], 5000);
    assert_eq!(v["admins"][0], "boss@example.org");
}

#[test]
fn test_config_show_human() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("base_port:"))
        .stdout(predicate::str::contains("localhost:30000"));
}

#[test]
fn test_malformed_env_override_fails() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .env("HIVE_BUS_PORT", "not-a-port")
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HIVE_"));
}

#[test]
fn test_malformed_config_file_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.yaml"), "bus: [unclosed\n").unwrap();
    isolated(&dir)
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot parse"));
}
