//! Tests for `latchkey config`.

use crate::support::*;
use std::fs;

#[test]
fn test_config_shows_defaults() {
    let t = Test::new();
    let output = t.config();
    assert_success(&output);
    assert_stdout_contains(&output, "http://localhost:8000");
    assert_stdout_contains(&output, "30");
    assert!(!t.config_file().exists(), "showing config must not write it");
}

#[test]
fn test_config_init_writes_file_once() {
    let t = Test::new();

    let output = t.config_init(false);
    assert_success(&output);
    assert_stdout_contains(&output, "wrote");
    let written = fs::read_to_string(t.config_file()).unwrap();
    assert!(written.contains("[server]"));
    assert!(written.contains("clear_after_secs = 30"));

    fs::write(t.config_file(), "[server]\nurl = \"http://vault.lan:8000\"\n").unwrap();
    let output = t.config_init(false);
    assert_success(&output);
    assert_stdout_contains(&output, "already exists");
    assert!(fs::read_to_string(t.config_file()).unwrap().contains("vault.lan"));

    assert_success(&t.config_init(true));
    assert!(!fs::read_to_string(t.config_file()).unwrap().contains("vault.lan"));
}

#[test]
fn test_server_env_and_flag_override_file() {
    let t = Test::with_server("http://from-env:8000");
    t.write_config("[server]\nurl = \"http://from-file:8000\"\n");

    assert_stdout_contains(&t.config(), "http://from-env:8000");

    let output = t
        .cmd()
        .args(["--server", "https://from-flag", "config"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "https://from-flag");
}

#[test]
fn test_invalid_config_is_reported() {
    let t = Test::new();
    t.write_config("[clipboard]\nclear_after_secs = 0\n");

    let output = t.config();
    assert_failure(&output);
    assert_stderr_contains(&output, "clipboard.clear_after_secs");
}

#[test]
fn test_non_http_server_rejected() {
    let t = Test::new();
    let output = t
        .cmd()
        .args(["--server", "ftp://vault", "config"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "unsupported scheme");
}

#[test]
fn test_oversized_clear_delay_rejected() {
    let t = Test::new();
    t.write_config("[clipboard]\nclear_after_secs = 9223372036854775807\n");

    let output = t.config();
    assert_failure(&output);
    assert_stderr_contains(&output, "must be between 1 and 3600");
}
