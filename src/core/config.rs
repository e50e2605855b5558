//! Configuration file management.
//!
//! Handles reading, writing, and validating `~/.latchkey/config.toml`.
//! A missing file means defaults; `LATCHKEY_SERVER` overrides the server
//! URL and `LATCHKEY_HOME` relocates the whole directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Client configuration stored in `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

/// Where the password-manager server lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL, e.g. `http://localhost:8000`.
    #[serde(default = "default_url")]
    pub url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Clipboard behaviour for revealed secrets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Seconds before a copied secret is overwritten with an empty value.
    #[serde(default = "default_clear_after")]
    pub clear_after_secs: u64,
    /// Explicit copy command (program and args) reading from stdin.
    ///
    /// When absent the first available platform helper is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

fn default_url() -> String {
    constants::DEFAULT_SERVER_URL.to_string()
}

fn default_timeout() -> u64 {
    constants::DEFAULT_TIMEOUT_SECS
}

fn default_clear_after() -> u64 {
    constants::DEFAULT_CLEAR_AFTER_SECS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            clear_after_secs: default_clear_after(),
            command: None,
        }
    }
}

/// The latchkey home directory (`$LATCHKEY_HOME` or `~/.latchkey`).
pub fn home_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(constants::HOME_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
    Ok(home.join(constants::HOME_DIR))
}

impl Config {
    /// Path to the configuration file.
    pub fn config_path() -> Result<PathBuf> {
        Ok(home_dir()?.join(constants::CONFIG_FILE))
    }

    /// Load the configuration, applying environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is malformed, or
    /// `ConfigError::InvalidValue` if validation fails.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;

        if let Ok(url) = std::env::var(constants::SERVER_ENV) {
            debug!("server url overridden from environment");
            config.server.url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            debug!("no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Save the configuration to `config.toml`, creating the home directory.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or file write fails.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "saving config");

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Replace the server URL (CLI `--server`).
    pub fn with_server(mut self, url: impl Into<String>) -> Self {
        self.server.url = url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }

    pub fn clear_after(&self) -> Duration {
        Duration::from_secs(self.clipboard.clear_after_secs)
    }

    /// Validate the configuration.
    ///
    /// Checks:
    /// - Server URL parses and uses http or https
    /// - Timeout is non-zero
    /// - Clear delay is between one second and an hour
    /// - An explicit clipboard command names a program
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` on validation failure.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.server.url).map_err(|e| ConfigError::InvalidValue {
            field: "server.url",
            reason: format!("{}: {}", self.server.url, e),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "server.url",
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            }
            .into());
        }

        if self.server.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_secs",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }

        if !(1..=constants::MAX_CLEAR_AFTER_SECS).contains(&self.clipboard.clear_after_secs) {
            return Err(ConfigError::InvalidValue {
                field: "clipboard.clear_after_secs",
                reason: format!(
                    "must be between 1 and {}, got {}",
                    constants::MAX_CLEAR_AFTER_SECS,
                    self.clipboard.clear_after_secs
                ),
            }
            .into());
        }

        if let Some(command) = &self.clipboard.command {
            if command.first().map_or(true, |p| p.trim().is_empty()) {
                return Err(ConfigError::InvalidValue {
                    field: "clipboard.command",
                    reason: "must name a program".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }
}
