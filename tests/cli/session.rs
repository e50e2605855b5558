//! Tests for the interactive `latchkey session` shell, driven through a pipe.

use crate::support::server::*;
use crate::support::*;
use wiremock::MockServer;

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_list() {
    let server = vault_server().await;
    let t = Test::with_server(&server.uri());

    let output = t.session(&[MASTER_PASSWORD, "list", "quit"]);
    assert_success(&output);
    assert_stdout_contains(&output, "vault unlocked");
    assert_stdout_contains(&output, "2 records");
    assert_stdout_contains(&output, "GitHub");
    assert_stdout_contains(&output, "[Work]");
    assert_not_leaked(&output, MASTER_PASSWORD);

    // The token is durable; the master password never touches disk.
    let session = std::fs::read_to_string(t.session_file()).unwrap();
    assert!(session.contains(TOKEN));
    assert!(!session.contains(MASTER_PASSWORD));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wrong_password_shows_server_reason() {
    let server = vault_server().await;
    let t = Test::with_server(&server.uri());

    let output = t.session(&["not-the-password"]);
    assert_success(&output);
    assert_stdout_contains(&output, "Invalid master password");
    assert!(!t.session_file().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_setup_validates_then_unlocks() {
    let server = MockServer::start().await;
    mount_check(&server, false).await;
    mount_setup(&server).await;
    let t = Test::with_server(&server.uri());

    let output = t.session(&[
        "short",
        "short",
        MASTER_PASSWORD,
        "something-else",
        MASTER_PASSWORD,
        MASTER_PASSWORD,
        "quit",
    ]);
    assert_success(&output);
    assert_stderr_contains(&output, "at least 8 characters");
    assert_stderr_contains(&output, "Passwords do not match");
    assert_stdout_contains(&output, "vault unlocked");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_request_forces_login() {
    let server = MockServer::start().await;
    mount_check(&server, true).await;
    mount_login(&server).await;
    mount_revoked(&server).await;
    let t = Test::with_server(&server.uri());

    let output = t.session(&[MASTER_PASSWORD, "list"]);
    assert_success(&output);
    assert_stdout_contains(&output, "vault unlocked");
    assert_stdout_contains(&output, "Session expired");
    assert!(!t.session_file().exists(), "forced logout must clear the token");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_command_relocks() {
    let server = vault_server().await;
    let t = Test::with_server(&server.uri());

    let output = t.session(&[MASTER_PASSWORD, "logout"]);
    assert_success(&output);
    assert_stdout_contains(&output, "logged out");
    assert!(!t.session_file().exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bad_command_keeps_session() {
    let server = vault_server().await;
    let t = Test::with_server(&server.uri());

    let output = t.session(&[MASTER_PASSWORD, "frobnicate", "show", "list", "quit"]);
    assert_success(&output);
    assert_stderr_contains(&output, "unknown command");
    assert_stderr_contains(&output, "missing record id");
    assert_stdout_contains(&output, "GitHub");
}

#[test]
fn test_unreachable_server_retry_declined() {
    let t = Test::with_server("http://127.0.0.1:9");
    let output = t.session(&["n"]);
    assert_success(&output);
    assert_stderr_contains(&output, "cannot reach");
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn test_copy_writes_then_wipes_clipboard() {
    let server = vault_server().await;
    let t = Test::with_server(&server.uri());
    let log = t.home.path().join("clipboard.log");
    t.write_config(&format!(
        "[clipboard]\ncommand = [\"sh\", \"-c\", \"cat >> '{0}'; echo >> '{0}'\"]\n",
        log.display()
    ));

    let output = t.session(&[MASTER_PASSWORD, "copy 7", "quit"]);
    assert_success(&output);
    assert_stdout_contains(&output, "copied password for #7");
    assert_not_leaked(&output, PLAINTEXT);

    // One write with the secret, one wipe on exit.
    let clipboard = std::fs::read_to_string(&log).unwrap();
    assert_eq!(clipboard, format!("{PLAINTEXT}\n\n"));
}
