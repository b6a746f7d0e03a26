mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use support::temp_config;

fn relay() -> Command {
    let mut cmd = Command::cargo_bin("sra-relay").expect("binary built");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn check_accepts_defaults() {
    relay()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("https://api.radarrelay.com/0x/v3"))
        .stdout(predicate::str::contains("Destination: stdout"));
}

#[test]
fn check_rejects_both_destinations() {
    relay()
        .args([
            "check",
            "--toSRA",
            "https://other.relayer/v3",
            "--toMesh",
            "ws://localhost:60557",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("to_mesh"));
}

#[test]
fn cat_exits_nonzero_on_config_error() {
    relay()
        .args(["cat", "--wsEndpoint", "https://not-a-websocket"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ws_endpoint"));
}

#[test]
fn check_reads_config_file_and_flags_override_it() {
    let file = temp_config(
        r#"
        [sink]
        to_mesh = "ws://localhost:60557"
        push_delay_ms = 1000

        [pull]
        delay_ms = 250
        "#,
    );

    relay()
        .arg("check")
        .arg("--config")
        .arg(file.path())
        .args(["--pullDelay", "500"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mesh ws://localhost:60557"))
        .stdout(predicate::str::contains("Mesh push delay: 1000ms"))
        .stdout(predicate::str::contains("Pull: 500ms delay"));
}

#[test]
fn check_reports_unreadable_config() {
    relay()
        .args(["check", "--config", "/nonexistent/sra-relay.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn unknown_backoff_is_a_usage_error() {
    relay()
        .args(["cat", "--backoff", "exponential"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'exponential'"));
}
