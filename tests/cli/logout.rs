//! Tests for `latchkey logout`.

use crate::support::*;

#[test]
fn test_logout_removes_stored_token() {
    let t = Test::new();
    t.write_stale_session("tok-old");

    let output = t.logout();
    assert_success(&output);
    assert_stdout_contains(&output, "logged out");
    assert!(!t.session_file().exists());
}

#[test]
fn test_logout_without_session() {
    let t = Test::new();
    let output = t.logout();
    assert_success(&output);
    assert_stdout_contains(&output, "no session stored");
}
