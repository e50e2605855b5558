//! Credential storage.
//!
//! The [`CredentialStore`] owns two persistence scopes:
//!
//! - a **durable** scope that survives restarts and holds the session
//!   token and user id ([`FileScope`] by default), and
//! - a **volatile** scope that lives only as long as the current session
//!   process and holds the master password ([`MemoryScope`]).
//!
//! The store is the single mutation path for both. It has no network or
//! UI side effects.
//!
//! ## Adding a New Scope Backend
//!
//! 1. Implement the `Scope` trait
//! 2. Add the implementation in a new file (e.g., `keyring.rs`)
//! 3. Re-export from this module
//!
//! ## Example
//!
//! ```ignore
//! struct Keyring { /* ... */ }
//!
//! impl Scope for Keyring {
//!     fn name(&self) -> &'static str { "keyring" }
//!     fn get(&self, key: &str) -> Result<Option<String>> { /* ... */ }
//!     fn set(&self, key: &str, value: &str) -> Result<()> { /* ... */ }
//!     fn remove(&self, key: &str) -> Result<()> { /* ... */ }
//! }
//! ```

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::core::constants::{MASTER_PASSWORD_KEY, TOKEN_KEY, USER_ID_KEY};
use crate::core::types::{MasterPassword, Token, UserId};
use crate::error::Result;

mod backend;
mod fs;
mod memory;

pub use backend::{open_at, open_default};
pub use fs::FileScope;
pub use memory::MemoryScope;

/// Key-value persistence scope.
///
/// Pure data access, no policy. Implementations must fail loudly on
/// writes they cannot complete.
pub trait Scope: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the write did not land.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Token and master password read together under one lock.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub token: Option<Token>,
    pub master_password: Option<MasterPassword>,
}

impl Credentials {
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn has_master_password(&self) -> bool {
        self.master_password.is_some()
    }
}

struct Scopes {
    durable: Box<dyn Scope>,
    volatile: Box<dyn Scope>,
}

/// The client's credential store.
///
/// Both scopes sit behind one lock, so `set_credentials` and `clear` are
/// atomic with respect to every read: a reader never sees a token without
/// its paired master password written by the same call, or vice versa.
pub struct CredentialStore {
    scopes: RwLock<Scopes>,
}

impl CredentialStore {
    pub fn new(durable: Box<dyn Scope>, volatile: Box<dyn Scope>) -> Self {
        Self {
            scopes: RwLock::new(Scopes { durable, volatile }),
        }
    }

    /// A store with both scopes in memory.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryScope::new()), Box::new(MemoryScope::new()))
    }

    fn read(&self) -> RwLockReadGuard<'_, Scopes> {
        self.scopes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Scopes> {
        self.scopes.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn token(&self) -> Option<Token> {
        read_value(self.read().durable.as_ref(), TOKEN_KEY).map(|v| Token::new(v.as_str()))
    }

    pub fn user_id(&self) -> Option<UserId> {
        read_value(self.read().durable.as_ref(), USER_ID_KEY).map(|v| UserId(v.to_string()))
    }

    pub fn master_password(&self) -> Option<MasterPassword> {
        read_value(self.read().volatile.as_ref(), MASTER_PASSWORD_KEY)
            .map(|v| MasterPassword::new(v.as_str()))
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    /// Read token and master password as one consistent pair.
    pub fn snapshot(&self) -> Credentials {
        let scopes = self.read();
        Credentials {
            token: read_value(scopes.durable.as_ref(), TOKEN_KEY).map(|v| Token::new(v.as_str())),
            master_password: read_value(scopes.volatile.as_ref(), MASTER_PASSWORD_KEY)
                .map(|v| MasterPassword::new(v.as_str())),
        }
    }

    /// Write the token and user id durably and the master password volatilely.
    ///
    /// All-or-nothing: if any write fails, both scopes are cleared and the
    /// error is returned.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if either scope rejects the write.
    pub fn set_credentials(
        &self,
        token: &Token,
        user_id: &UserId,
        master_password: &MasterPassword,
    ) -> Result<()> {
        let scopes = self.write();

        let written = scopes
            .durable
            .set(TOKEN_KEY, token.as_str())
            .and_then(|_| scopes.durable.set(USER_ID_KEY, &user_id.0))
            .and_then(|_| {
                scopes
                    .volatile
                    .set(MASTER_PASSWORD_KEY, master_password.expose())
            });

        match written {
            Ok(()) => {
                info!(user_id = %user_id, "credentials stored");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "credential write failed, rolling back");
                if let Err(rollback) = clear_scopes(&scopes) {
                    warn!(
                        error = %rollback,
                        durable = scopes.durable.name(),
                        "rollback incomplete, stale credentials may remain"
                    );
                }
                Err(e)
            }
        }
    }

    /// Remove token, user id, and master password.
    ///
    /// Both scopes are attempted even if one fails; the first error wins.
    pub fn clear(&self) -> Result<()> {
        let scopes = self.write();
        let result = clear_scopes(&scopes);
        debug!(ok = result.is_ok(), "credentials cleared");
        result
    }
}

fn clear_scopes(scopes: &Scopes) -> Result<()> {
    let durable = scopes
        .durable
        .remove(TOKEN_KEY)
        .and_then(|_| scopes.durable.remove(USER_ID_KEY));
    let volatile = scopes.volatile.remove(MASTER_PASSWORD_KEY);
    durable.and(volatile)
}

/// Read one value, treating unreadable storage as absent.
fn read_value(scope: &dyn Scope, key: &str) -> Option<Zeroizing<String>> {
    match scope.get(key) {
        Ok(value) => value.map(Zeroizing::new),
        Err(e) => {
            warn!(scope = scope.name(), key, error = %e, "credential read failed, treating as absent");
            None
        }
    }
}
