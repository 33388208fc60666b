//! Integration tests for the `fwswitch` binary.
//!
//! Argument parsing, help output, completions, configuration commands and
//! error exit codes, all without a live controller.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::NamedTempFile;

// ── Helpers ─────────────────────────────────────────────────────────

/// `fwswitch` with a clean environment, so tests never read the user's
/// real configuration or `FWSWITCH_*` overrides.
fn fwswitch_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fwswitch");
    cmd.env_clear()
        .env("HOME", "/tmp/fwswitch-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/fwswitch-cli-test-nonexistent")
        .env("NO_COLOR", "1");
    cmd
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const VALID: &str = r#"
[controller]
url = "http://127.0.0.1:1"
username = "homebridge"
password = "hunter2"
platform = "classic"
timeout = 2

[[policies]]
name = "Block IoT"
inverted = true
"#;

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = fwswitch_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    fwswitch_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("discover")
            .and(predicate::str::contains("policies"))
            .and(predicate::str::contains("rules"))
            .and(predicate::str::contains("check")),
    );
}

#[test]
fn test_version_flag() {
    fwswitch_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fwswitch"));
}

#[test]
fn test_policies_subcommands_exist() {
    fwswitch_cmd()
        .args(["policies", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("enable"))
                .and(predicate::str::contains("disable"))
                .and(predicate::str::contains("toggle")),
        );
}

#[test]
fn test_enable_requires_an_identifier() {
    fwswitch_cmd()
        .args(["rules", "enable"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<RULE>"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    fwswitch_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    fwswitch_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    fwswitch_cmd()
        .args(["--config", "/etc/fwswitch/custom.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/etc/fwswitch/custom.toml"));
}

#[test]
fn test_config_path_honours_env() {
    fwswitch_cmd()
        .env("FWSWITCH_CONFIG", "/srv/fw.toml")
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/srv/fw.toml"));
}

#[test]
fn test_config_show_redacts_password() {
    let file = config_file(VALID);
    fwswitch_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("homebridge")
                .and(predicate::str::contains("********"))
                .and(predicate::str::contains("hunter2").not()),
        );
}

#[test]
fn test_config_show_json() {
    let file = config_file(VALID);
    let output = fwswitch_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["--output", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["policies"][0]["name"], "Block IoT");
    assert_eq!(value["policies"][0]["inverted"], true);
}

#[test]
fn test_config_validate_ok() {
    let file = config_file(VALID);
    fwswitch_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 policy"));
}

#[test]
fn test_config_validate_reports_missing_identity() {
    let file = config_file(
        r#"
        [controller]
        url = "https://10.0.0.1"
        username = "homebridge"
        password = "pw"

        [[rules]]
        inverted = true
        "#,
    );
    fwswitch_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["config", "validate"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("rules[0]"));
}

#[test]
fn test_missing_password_exits_with_auth_code() {
    let file = config_file(
        r#"
        [controller]
        url = "https://10.0.0.1"
        username = "homebridge"
        "#,
    );
    fwswitch_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["config", "validate"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("password"));
}

// ── Controller commands without a controller ────────────────────────

#[test]
fn test_rules_list_without_config() {
    fwswitch_cmd()
        .args(["rules", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("controller.url"));
}

#[test]
fn test_unreachable_controller_exits_with_connection_code() {
    let file = config_file(VALID);
    fwswitch_cmd()
        .arg("--config")
        .arg(file.path())
        .args(["--retries", "0", "policies", "list"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not connect"));
}

#[test]
fn test_invalid_output_format() {
    let output = fwswitch_cmd()
        .args(["--output", "xml", "discover"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("invalid") || text.contains("possible values"));
}
