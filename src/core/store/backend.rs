//! Backend selection for credential storage
//!
//! The durable scope is a file in the latchkey home directory. The volatile
//! scope is always process memory; no platform offers a session-lifetime
//! store that a terminal client could rely on, so the process itself is
//! the session.

use std::path::Path;

use tracing::info;

use super::{CredentialStore, FileScope, MemoryScope};
use crate::core::config;
use crate::core::constants::SESSION_FILE;
use crate::error::Result;

/// Open the credential store rooted at the latchkey home directory.
///
/// # Errors
///
/// Returns `ConfigError::NoHome` if no home directory can be determined.
pub fn open_default() -> Result<CredentialStore> {
    let home = config::home_dir()?;
    Ok(open_at(&home))
}

/// Open a credential store whose durable scope lives under `dir`.
pub fn open_at(dir: &Path) -> CredentialStore {
    let path = dir.join(SESSION_FILE);
    info!(path = %path.display(), "using file-backed durable scope");
    CredentialStore::new(
        Box::new(FileScope::new(path)),
        Box::new(MemoryScope::new()),
    )
}
