//! Integration tests for the `planet` CLI binary.
//!
//! Argument parsing, help output, completions, config handling, and exit
//! codes. Switch-bound commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `planet` binary with env isolation.
///
/// Clears all `PLANET_*` env vars and points config and cache directories
/// at `home` so tests never touch the user's real configuration. Stdin is
/// a pipe, so prompts behave as they would in a script.
fn planet_cmd(home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("planet");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_CACHE_HOME", home.join("cache"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("PLANET_DEVICE")
        .env_remove("PLANET_ADDRESS")
        .env_remove("PLANET_USERNAME")
        .env_remove("PLANET_PASSWORD")
        .env_remove("PLANET_OUTPUT")
        .env_remove("PLANET_TIMEOUT")
        .write_stdin("");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn switch_with_handshake() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/login.cgi"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = planet_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    planet_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("PLANET")
            .and(predicate::str::contains("system"))
            .and(predicate::str::contains("ports"))
            .and(predicate::str::contains("snapshot")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    planet_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("planet"));
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    planet_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    planet_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Usage errors ────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = tempfile::tempdir().unwrap();
    let output = planet_cmd(home.path()).arg("foobar").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("foobar"), "Expected the bad subcommand echoed:\n{text}");
}

#[test]
fn test_port_zero_rejected_by_parser() {
    let home = tempfile::tempdir().unwrap();
    planet_cmd(home.path())
        .args(["-a", "127.0.0.1", "--password", "x", "ports", "set-bandwidth", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_system_update_needs_a_field() {
    let home = tempfile::tempdir().unwrap();
    planet_cmd(home.path())
        .args(["system", "update"])
        .assert()
        .code(2);
}

#[test]
fn test_no_device_selected() {
    let home = tempfile::tempdir().unwrap();
    planet_cmd(home.path())
        .args(["system", "info"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No device selected"));
}

#[test]
fn test_unknown_device() {
    let home = tempfile::tempdir().unwrap();
    planet_cmd(home.path())
        .args(["-d", "ghost", "system", "info"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_reboot_needs_confirmation_when_not_interactive() {
    let home = tempfile::tempdir().unwrap();
    planet_cmd(home.path())
        .args(["-a", "127.0.0.1:9", "--password", "x", "reboot"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("requires confirmation"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_under_config_home() {
    let home = tempfile::tempdir().unwrap();
    planet_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_add_device_then_show_hides_password() {
    let home = tempfile::tempdir().unwrap();
    planet_cmd(home.path())
        .args([
            "config",
            "add-device",
            "core",
            "--address",
            "192.168.0.100",
            "--password",
            "s3cret",
        ])
        .assert()
        .success();

    let output = planet_cmd(home.path())
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["default_device"], "core");
    assert_eq!(json["devices"][0]["address"], "192.168.0.100");
    assert_eq!(json["devices"][0]["password_source"], "config file");
    assert!(!stdout.contains("s3cret"));
}

// ── Against a switch ────────────────────────────────────────────────

#[test]
fn test_unreachable_switch_exits_7() {
    let home = tempfile::tempdir().unwrap();
    let address = format!("127.0.0.1:{}", closed_port());
    planet_cmd(home.path())
        .args(["-a", &address, "--password", "x", "--timeout", "2", "system", "info"])
        .assert()
        .code(7);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_system_info_json() {
    let server = switch_with_handshake().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/sysinfo.cgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("AA:BB:CC:DD:EE:FF$;v1.2.3$;"))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let output = planet_cmd(home.path())
        .args(["-a", &server.uri(), "--password", "admin", "-o", "json", "system", "info"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["mac"], "AA:BB:CC:DD:EE:FF");
    assert_eq!(json["fwversion"], "v1.2.3");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unacknowledged_save_exits_3() {
    let server = switch_with_handshake().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/save.cgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ERR"))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    planet_cmd(home.path())
        .args(["-a", &server.uri(), "--password", "admin", "save"])
        .assert()
        .code(3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_http_error_exits_8() {
    let server = switch_with_handshake().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/ip.cgi"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    planet_cmd(home.path())
        .args(["-a", &server.uri(), "--password", "admin", "system", "network"])
        .assert()
        .code(8);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backup_writes_archive_with_digest() {
    let server = switch_with_handshake().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/back.cgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("back=bktar"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tmp/current.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let out_dir = home.path().join("backups");
    let output = planet_cmd(home.path())
        .args(["-a", &server.uri(), "--password", "admin", "-o", "json", "backup", "--dir"])
        .arg(&out_dir)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["size"], 3);
    assert_eq!(
        json["sha256"],
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    let written = std::path::PathBuf::from(json["path"].as_str().unwrap());
    assert!(written.starts_with(&out_dir));
    assert!(
        written
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("planet_backup_")
    );
    assert_eq!(std::fs::read(&written).unwrap(), b"abc");
}
