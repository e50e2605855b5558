//! Tests for `latchkey status`.

use crate::support::server::*;
use crate::support::*;
use wiremock::MockServer;

#[test]
fn test_status_unreachable_server() {
    let t = Test::with_server("http://127.0.0.1:9");
    let output = t.status();
    assert_failure(&output);
    assert_stderr_contains(&output, "cannot reach server");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_needs_setup() {
    let server = MockServer::start().await;
    mount_check(&server, false).await;
    let t = Test::with_server(&server.uri());

    let output = t.status();
    assert_success(&output);
    assert_stdout_contains(&output, "no master password yet");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_clears_stale_token() {
    let server = MockServer::start().await;
    mount_check(&server, true).await;
    let t = Test::with_server(&server.uri());
    t.write_stale_session("tok-old");

    let output = t.status();
    assert_success(&output);
    assert_stdout_contains(&output, "locked");
    assert_stdout_contains(&output, "stale token cleared");
    assert!(!t.session_file().exists(), "token must be removed, not kept");
}
