//! Wiring shared by every command that talks to the server.

use std::sync::Arc;

use tracing::debug;

use crate::core::api::{ApiClient, Augmenter};
use crate::core::config::{self, Config};
use crate::core::store::{self, CredentialStore};
use crate::error::Result;

/// Configuration, credential store, and API client for one invocation.
pub struct Context {
    pub config: Config,
    pub store: Arc<CredentialStore>,
    pub api: ApiClient,
}

impl Context {
    /// Load config from the latchkey home and open the default store.
    ///
    /// `server` (from `--server`) wins over config and environment.
    pub fn open(server: Option<String>) -> Result<Self> {
        let config = effective_config(server)?;
        let store = Arc::new(store::open_default()?);
        Self::with_store(config, store)
    }

    /// Build a context around an existing store.
    pub fn with_store(config: Config, store: Arc<CredentialStore>) -> Result<Self> {
        let augmenter = Arc::new(Augmenter::new(Arc::clone(&store)));
        let api = ApiClient::new(&config, augmenter)?;
        debug!(server = %api.base_url(), "context ready");
        Ok(Self { config, store, api })
    }
}

/// Config as loaded, with a `--server` override applied and re-validated.
pub fn effective_config(server: Option<String>) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(url) = server {
        config = config.with_server(url);
        config.validate()?;
    }
    debug!(home = ?config::home_dir().ok(), "configuration loaded");
    Ok(config)
}
