//! Session state derivation.
//!
//! The session state is never stored. It is recomputed from three facts
//! (server initialized, token present, master password present) at start
//! up and after every explicit auth transition.

use std::fmt;

/// Derived session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The server has no master password yet.
    Uninitialized,
    /// No token is held.
    LoggedOut,
    /// A token is held without its master password. The server would
    /// accept the token, but nothing can be decrypted without the
    /// password, so this must be cleared and treated as logged out.
    Inconsistent,
    /// Token and master password are both held.
    Authenticated,
}

impl SessionState {
    /// Compute the state from the server flag and local credential presence.
    pub fn derive(server_initialized: bool, has_token: bool, has_master_password: bool) -> Self {
        match (server_initialized, has_token, has_master_password) {
            (false, _, _) => SessionState::Uninitialized,
            (true, false, _) => SessionState::LoggedOut,
            (true, true, false) => SessionState::Inconsistent,
            (true, true, true) => SessionState::Authenticated,
        }
    }

    pub fn is_authenticated(self) -> bool {
        self == SessionState::Authenticated
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::LoggedOut => "logged out",
            SessionState::Inconsistent => "inconsistent",
            SessionState::Authenticated => "authenticated",
        };
        f.write_str(s)
    }
}
