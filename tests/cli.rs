// ABOUTME: Integration tests for the nephos CLI commands.
// ABOUTME: Validates --help output, init behavior, and config discovery errors.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn nephos_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("nephos"))
}

#[test]
fn help_shows_commands() {
    nephos_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("route"))
        .stdout(predicate::str::contains("history"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("nephos.yml");

    nephos_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .success();

    assert!(config_path.exists(), "nephos.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(
        content.contains("endpoint:"),
        "Config should have endpoint field"
    );
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("nephos.yml");

    fs::write(&config_path, "existing: config").unwrap();

    nephos_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn deploy_without_config_reports_discovery_error() {
    let temp_dir = tempfile::tempdir().unwrap();

    nephos_cmd()
        .current_dir(temp_dir.path())
        .args(["deploy", "a small vm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn deploy_rejects_malformed_parameters() {
    let temp_dir = tempfile::tempdir().unwrap();
    nephos_cmd().current_dir(temp_dir.path()).arg("init").assert().success();

    nephos_cmd()
        .current_dir(temp_dir.path())
        .args(["deploy", "a small vm", "--param", "no-equals-sign"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}
