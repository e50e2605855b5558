//! Secure reveal: copy a decrypted secret to the clipboard, then wipe it.
//!
//! Each reveal asks the server for the plaintext (the request carries the
//! ambient master-password header like any other), writes it verbatim to
//! the clipboard, and spawns its own timer that overwrites the clipboard
//! with an empty string after the configured delay.
//!
//! The wipe is unconditional: it runs even if the user has copied
//! something else since. It is best-effort hygiene, not a guarantee.
//! Anything that read the clipboard in the meantime already has the
//! secret, and a process killed before the timer fires leaves it behind.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::core::clipboard::Clipboard;
use crate::core::constants::MAX_CLEAR_AFTER_SECS;
use crate::core::types::RecordId;
use crate::error::{ClipboardError, Error, Result};

/// Source of decrypted secrets.
#[async_trait]
pub trait Decrypt: Send + Sync {
    /// Fetch the plaintext of one record.
    async fn decrypt(&self, id: RecordId) -> Result<SecretString>;
}

/// A scheduled clipboard wipe belonging to one reveal.
#[derive(Debug)]
pub struct RevealHandle {
    record: RecordId,
    clear_at: Instant,
    task: JoinHandle<()>,
}

impl RevealHandle {
    pub fn record(&self) -> RecordId {
        self.record
    }

    /// Time left before the wipe.
    pub fn clears_in(&self) -> Duration {
        self.clear_at.saturating_duration_since(Instant::now())
    }

    pub fn is_pending(&self) -> bool {
        !self.task.is_finished()
    }

    /// Abort the scheduled wipe.
    pub fn cancel(self) {
        self.task.abort();
    }

    /// Wait for the wipe. Returns `false` if it was cancelled.
    pub async fn cleared(self) -> bool {
        self.task.await.is_ok()
    }
}

/// Decrypt-to-clipboard with timed invalidation.
pub struct Revealer {
    source: Arc<dyn Decrypt>,
    clipboard: Arc<dyn Clipboard>,
    clear_after: Duration,
}

impl Revealer {
    /// Build a revealer. Delays above [`MAX_CLEAR_AFTER_SECS`] are capped.
    pub fn new(source: Arc<dyn Decrypt>, clipboard: Arc<dyn Clipboard>, clear_after: Duration) -> Self {
        Self {
            source,
            clipboard,
            clear_after: clear_after.min(Duration::from_secs(MAX_CLEAR_AFTER_SECS)),
        }
    }

    pub fn clear_after(&self) -> Duration {
        self.clear_after
    }

    /// Copy the plaintext of `id` to the clipboard and schedule its wipe.
    ///
    /// Reveals are independent: each one owns its own timer, and
    /// concurrent reveals of different records do not affect each other.
    ///
    /// # Errors
    ///
    /// - `Error::Reveal` if the server could not decrypt; nothing is written.
    /// - `Error::AuthExpired` if the session was rejected; nothing is written.
    /// - `Error::Clipboard` if the clipboard refused the write.
    pub async fn reveal(&self, id: RecordId) -> Result<RevealHandle> {
        let secret = self.source.decrypt(id).await.map_err(|e| match e {
            Error::AuthExpired => Error::AuthExpired,
            other => Error::Reveal(other.to_string()),
        })?;

        let delay = self.clear_after;
        let clear_at = Instant::now()
            .checked_add(delay)
            .ok_or_else(|| Error::Reveal(format!("clear delay {delay:?} out of range")))?;

        let plaintext = Zeroizing::new(secret.expose_secret().to_owned());
        drop(secret);
        write_clipboard(Arc::clone(&self.clipboard), plaintext).await?;
        info!(record = %id, clears_in = ?delay, "secret copied to clipboard");

        let clipboard = Arc::clone(&self.clipboard);
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(clear_at).await;
            match write_clipboard(clipboard, Zeroizing::new(String::new())).await {
                Ok(()) => debug!(record = %id, "clipboard cleared"),
                Err(e) => warn!(record = %id, error = %e, "failed to clear clipboard"),
            }
        });

        Ok(RevealHandle {
            record: id,
            clear_at,
            task,
        })
    }

    /// Wipe the clipboard now for any reveals still pending.
    ///
    /// Used on exit so a pending secret does not outlive the session.
    pub fn flush(&self, handles: Vec<RevealHandle>) -> Result<()> {
        let mut pending = false;
        for handle in handles {
            if handle.is_pending() {
                pending = true;
                handle.cancel();
            }
        }
        if pending {
            self.clipboard.write("")?;
            debug!("pending reveals flushed");
        }
        Ok(())
    }
}

/// Write to the clipboard off the runtime thread; helpers may block.
async fn write_clipboard(
    clipboard: Arc<dyn Clipboard>,
    text: Zeroizing<String>,
) -> std::result::Result<(), ClipboardError> {
    tokio::task::spawn_blocking(move || clipboard.write(&text))
        .await
        .map_err(|e| ClipboardError::Unavailable(format!("clipboard task failed: {e}")))?
}
