//! Error types for latchkey.
//!
//! Connectivity and auth-expiry errors are handled structurally by the
//! session gate and the request augmenter. Validation, reveal, and
//! clipboard failures stay local to the action that triggered them and
//! are shown to the user.

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    /// The server could not be reached.
    #[error("cannot reach server: {0}")]
    Connectivity(String),

    /// The server rejected the master password.
    #[error("{0}")]
    AuthRejected(String),

    /// A previously valid session was rejected mid-flight; credentials
    /// have already been cleared.
    #[error("session expired, log in again")]
    AuthExpired,

    /// Malformed input, either caught locally or reported by the server.
    #[error("{0}")]
    Validation(String),

    /// The server does not know the requested record.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success response.
    #[error("server returned {status}: {detail}")]
    Server { status: u16, detail: String },

    /// A secret could not be revealed; nothing was written to the clipboard.
    #[error("could not reveal secret: {0}")]
    Reveal(String),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Credential storage failures.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing storage could not be written.
    #[error("credential storage unavailable: {0}")]
    Unavailable(String),

    /// Backing storage exists but cannot be parsed.
    #[error("credential storage corrupt: {0}")]
    Corrupt(String),
}

/// Configuration failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to determine home directory")]
    NoHome,

    #[error("failed to read config: {0}")]
    ReadFile(std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Clipboard failures.
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// No clipboard is reachable from this process.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    /// The clipboard helper ran but did not succeed.
    #[error("clipboard command `{command}` failed: {reason}")]
    CommandFailed { command: String, reason: String },
}

impl From<dialoguer::Error> for Error {
    fn from(e: dialoguer::Error) -> Self {
        Error::Prompt(e.to_string())
    }
}

impl Error {
    /// Whether this error means the gate must be re-entered at login.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Error::AuthExpired)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
