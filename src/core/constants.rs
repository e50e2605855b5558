//! Constants used throughout latchkey.
//!
//! Centralizes magic strings and configuration values.

/// Directory under HOME holding config and the durable session file (~/.latchkey).
pub const HOME_DIR: &str = ".latchkey";

/// Configuration file name inside the latchkey home.
pub const CONFIG_FILE: &str = "config.toml";

/// Durable session file name inside the latchkey home.
pub const SESSION_FILE: &str = "session.toml";

/// Environment variable overriding the latchkey home directory.
pub const HOME_ENV: &str = "LATCHKEY_HOME";

/// Environment variable overriding the server URL.
pub const SERVER_ENV: &str = "LATCHKEY_SERVER";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "LATCHKEY_LOG";

/// Server used when nothing is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Request timeout used when nothing is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Delay before a revealed secret is wiped from the clipboard.
pub const DEFAULT_CLEAR_AFTER_SECS: u64 = 30;

/// Longest clipboard clear delay accepted from config.
pub const MAX_CLEAR_AFTER_SECS: u64 = 3600;

/// Minimum master password length accepted at setup.
pub const MIN_MASTER_PASSWORD_LEN: usize = 8;

/// Header carrying the master password on every request.
pub const MASTER_PASSWORD_HEADER: &str = "X-Master-Password";

/// Server detail returned when setup races with another client.
pub const ALREADY_INITIALIZED_DETAIL: &str = "Master password already set";

/// Durable scope key for the session token.
pub const TOKEN_KEY: &str = "token";

/// Durable scope key for the user id.
pub const USER_ID_KEY: &str = "user_id";

/// Volatile scope key for the master password.
pub const MASTER_PASSWORD_KEY: &str = "master_password";

/// Default number of history entries requested.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Default length for generated passwords.
pub const DEFAULT_GENERATED_LEN: u32 = 16;

/// Color given to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#FF6B6B";
