//! Filesystem-backed durable scope.
//!
//! Stores key-value pairs in a small TOML file (`~/.latchkey/session.toml`)
//! with owner-only permissions on Unix.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::Scope;
use crate::error::{Result, StoreError};

/// Validate file permissions (Unix only).
///
/// Returns the actual mode when it differs from the expected one.
#[cfg(unix)]
fn permission_drift(path: &Path, expected_mode: u32) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;

    let actual = fs::metadata(path).ok()?.permissions().mode() & 0o777;
    (actual != expected_mode).then_some(actual)
}

/// Write `contents` to `path`, readable by the owner only.
///
/// The mode is fixed before any byte lands, including when a leftover
/// file with wider permissions already sits at `path`.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.create(true).truncate(true).write(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(contents)?;
    file.sync_all()
}

/// Durable scope persisted to a TOML file.
pub struct FileScope {
    path: PathBuf,
}

impl FileScope {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        #[cfg(unix)]
        if let Some(mode) = permission_drift(&self.path, 0o600) {
            warn!(
                path = %self.path.display(),
                mode = format!("{:o}", mode),
                "session file has insecure permissions, expected 600"
            );
        }

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        toml::from_str(&contents)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)).into())
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let unavailable =
            |e: std::io::Error| StoreError::Unavailable(format!("{}: {}", self.path.display(), e));

        if entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path).map_err(unavailable)?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(unavailable)?;
        }

        let contents = toml::to_string(entries)
            .map_err(|e| StoreError::Unavailable(format!("serialize session: {}", e)))?;

        // Write beside the target and rename so readers never see a torn file.
        let tmp = self.path.with_extension("toml.tmp");
        write_private(&tmp, contents.as_bytes()).map_err(unavailable)?;
        fs::rename(&tmp, &self.path).map_err(unavailable)?;
        Ok(())
    }
}

impl Scope for FileScope {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // An unreadable file is replaced rather than merged.
        let mut entries = self.load().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)?;
        debug!(key, path = %self.path.display(), "durable value written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        // A corrupt file loads as empty and gets deleted here.
        let mut entries = self.load().unwrap_or_default();
        if entries.remove(key).is_some() || entries.is_empty() {
            self.persist(&entries)
        } else {
            Ok(())
        }
    }
}
