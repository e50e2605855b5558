//! Request augmenter.
//!
//! Two stages wrap every call made by [`ApiClient`](super::ApiClient):
//!
//! - **outbound** attaches `Authorization: Bearer <token>` and
//!   `X-Master-Password` from the credential store, each only if present;
//! - **inbound** watches for `401 Unauthorized` from any endpoint, clears
//!   the store, and raises a forced-logout signal for the session gate.
//!
//! The inbound stage runs before the caller sees the response, so a forced
//! logout always lands before the caller reacts. It never retries.

use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::core::constants::MASTER_PASSWORD_HEADER;
use crate::core::store::CredentialStore;

/// Result of the inbound stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// Hand the response to the caller unchanged.
    PassThrough,
    /// Credentials were rejected; the store has been cleared.
    ForcedLogout,
}

/// Header injection and auth-failure handling around the HTTP client.
pub struct Augmenter {
    store: Arc<CredentialStore>,
    forced_logouts: watch::Sender<u64>,
}

impl Augmenter {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        let (forced_logouts, _) = watch::channel(0);
        Self {
            store,
            forced_logouts,
        }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Subscribe to forced-logout events.
    ///
    /// The value is a counter; every change means one more forced logout.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.forced_logouts.subscribe()
    }

    /// Number of forced logouts so far.
    pub fn forced_logouts(&self) -> u64 {
        *self.forced_logouts.borrow()
    }

    /// Attach ambient credentials to an outgoing request.
    pub fn outbound(&self, request: RequestBuilder) -> RequestBuilder {
        let creds = self.store.snapshot();
        let mut request = request;
        if let Some(token) = &creds.token {
            request = request.bearer_auth(token.as_str());
        }
        if let Some(password) = &creds.master_password {
            request = request.header(MASTER_PASSWORD_HEADER, password.expose());
        }
        debug!(
            token = creds.has_token(),
            master_password = creds.has_master_password(),
            "credentials attached"
        );
        request
    }

    /// Inspect a response status before the caller sees it.
    pub fn inbound(&self, status: StatusCode) -> Inbound {
        if status != StatusCode::UNAUTHORIZED {
            return Inbound::PassThrough;
        }

        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear credentials after rejection");
        }
        self.forced_logouts.send_modify(|count| *count += 1);
        warn!("server rejected credentials, session cleared");
        Inbound::ForcedLogout
    }
}
