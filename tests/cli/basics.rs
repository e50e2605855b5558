//! Help, version, and completions.

use crate::support::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();
    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    for command in ["status", "logout", "session", "config", "completions"] {
        assert_stdout_contains(&output, command);
    }
}

#[test]
fn test_version() {
    let t = Test::new();
    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_completions_for_each_shell() {
    let t = Test::new();
    for shell in ["bash", "zsh", "fish", "powershell"] {
        let output = t.cmd().args(["completions", shell]).output().unwrap();
        assert_success(&output);
        assert_stdout_contains(&output, "latchkey");
    }
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();
    t.cmd().arg("unlock-everything").assert().failure();
}
