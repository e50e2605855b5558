//! HTTP client for the password-manager server.
//!
//! Every request goes through the [`Augmenter`]: outbound for ambient
//! credentials, inbound for forced logout on `401`. Server failures are
//! mapped onto the crate error taxonomy with the server's `detail`
//! message preserved verbatim.

pub mod middleware;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::config::Config;
use crate::core::constants::ALREADY_INITIALIZED_DETAIL;
use crate::core::reveal::Decrypt;
use crate::core::types::{CategoryId, MasterPassword, RecordId};
use crate::error::{Error, Result};

pub use middleware::{Augmenter, Inbound};
pub use models::{
    ActivityLog, AuthResponse, Category, CategoryUpdate, Health, Message, NewCategory,
    NewPassword, PasswordEntry, PasswordFilter, PasswordUpdate, SetupStatus,
};

use models::{GenerateRequest, LoginRequest, PlaintextPassword, SetupRequest};

/// How a `401` should be reported to the caller.
#[derive(Debug, Clone, Copy)]
enum OnUnauthorized {
    /// Credential exchange (setup, login): the password was wrong.
    Reject,
    /// Any other call: the session is no longer valid.
    Expire,
}

/// Outcome of `POST /auth/setup`.
#[derive(Debug)]
pub enum SetupOutcome {
    Created(AuthResponse),
    /// Another client finished setup first.
    AlreadyInitialized,
}

/// Client for the server's REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    augmenter: Arc<Augmenter>,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connectivity` if the HTTP client cannot be built.
    pub fn new(config: &Config, augmenter: Arc<Augmenter>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::Connectivity(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.server.url.trim_end_matches('/').to_string(),
            augmenter,
        })
    }

    pub fn augmenter(&self) -> &Arc<Augmenter> {
        &self.augmenter
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        on_unauthorized: OnUnauthorized,
    ) -> Result<T> {
        let response = self
            .augmenter
            .outbound(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!(status = %status, url = %response.url().path(), "response received");

        let inbound = self.augmenter.inbound(status);

        if status.is_success() {
            return response.json::<T>().await.map_err(|e| Error::Server {
                status: status.as_u16(),
                detail: format!("malformed response: {e}"),
            });
        }

        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(status, &body);

        if inbound == Inbound::ForcedLogout {
            return Err(match on_unauthorized {
                OnUnauthorized::Reject => Error::AuthRejected(detail),
                OnUnauthorized::Expire => Error::AuthExpired,
            });
        }

        Err(match status {
            StatusCode::NOT_FOUND => Error::NotFound(detail),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::Validation(detail),
            _ => Error::Server {
                status: status.as_u16(),
                detail,
            },
        })
    }

    // Authentication

    /// `GET /auth/check`
    pub async fn check_initialized(&self) -> Result<SetupStatus> {
        self.send(self.http.get(self.url("/auth/check")), OnUnauthorized::Expire)
            .await
    }

    /// `POST /auth/setup`
    ///
    /// "Master password already set" is reported as
    /// [`SetupOutcome::AlreadyInitialized`], not as an error.
    pub async fn setup(&self, master_password: &MasterPassword) -> Result<SetupOutcome> {
        let body = SetupRequest {
            master_password: master_password.expose(),
            biometric_enabled: false,
        };
        let request = self.http.post(self.url("/auth/setup")).json(&body);
        match self.send(request, OnUnauthorized::Reject).await {
            Ok(auth) => Ok(SetupOutcome::Created(auth)),
            Err(Error::Validation(detail)) if detail == ALREADY_INITIALIZED_DETAIL => {
                Ok(SetupOutcome::AlreadyInitialized)
            }
            Err(e) => Err(e),
        }
    }

    /// `POST /auth/login`
    pub async fn login(&self, master_password: &MasterPassword) -> Result<AuthResponse> {
        let body = LoginRequest {
            master_password: master_password.expose(),
        };
        let request = self.http.post(self.url("/auth/login")).json(&body);
        self.send(request, OnUnauthorized::Reject).await
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<Health> {
        self.send(self.http.get(self.url("/health")), OnUnauthorized::Expire)
            .await
    }

    // Password records

    pub async fn list_passwords(&self, filter: &PasswordFilter) -> Result<Vec<PasswordEntry>> {
        let request = self.http.get(self.url("/passwords")).query(filter);
        self.send(request, OnUnauthorized::Expire).await
    }

    pub async fn get_password(&self, id: RecordId) -> Result<PasswordEntry> {
        let request = self.http.get(self.url(&format!("/passwords/{id}")));
        self.send(request, OnUnauthorized::Expire).await
    }

    pub async fn create_password(&self, new: &NewPassword) -> Result<PasswordEntry> {
        let request = self.http.post(self.url("/passwords")).json(new);
        self.send(request, OnUnauthorized::Expire).await
    }

    pub async fn update_password(
        &self,
        id: RecordId,
        update: &PasswordUpdate,
    ) -> Result<PasswordEntry> {
        let request = self.http.put(self.url(&format!("/passwords/{id}"))).json(update);
        self.send(request, OnUnauthorized::Expire).await
    }

    pub async fn delete_password(&self, id: RecordId) -> Result<Message> {
        let request = self.http.delete(self.url(&format!("/passwords/{id}")));
        self.send(request, OnUnauthorized::Expire).await
    }

    /// `POST /passwords/generate`
    pub async fn generate_password(&self, length: u32, include_symbols: bool) -> Result<SecretString> {
        let body = GenerateRequest {
            length,
            include_symbols,
        };
        let request = self.http.post(self.url("/passwords/generate")).json(&body);
        let generated: PlaintextPassword = self.send(request, OnUnauthorized::Expire).await?;
        Ok(generated.password)
    }

    /// `POST /passwords/{id}/decrypt`
    pub async fn decrypt_password(&self, id: RecordId) -> Result<SecretString> {
        let request = self.http.post(self.url(&format!("/passwords/{id}/decrypt")));
        let plain: PlaintextPassword = self.send(request, OnUnauthorized::Expire).await?;
        Ok(plain.password)
    }

    // Categories

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.send(self.http.get(self.url("/categories")), OnUnauthorized::Expire)
            .await
    }

    pub async fn create_category(&self, new: &NewCategory) -> Result<Category> {
        let request = self.http.post(self.url("/categories")).json(new);
        self.send(request, OnUnauthorized::Expire).await
    }

    pub async fn update_category(&self, id: CategoryId, update: &CategoryUpdate) -> Result<Category> {
        let request = self.http.put(self.url(&format!("/categories/{id}"))).json(update);
        self.send(request, OnUnauthorized::Expire).await
    }

    pub async fn delete_category(&self, id: CategoryId) -> Result<Message> {
        let request = self.http.delete(self.url(&format!("/categories/{id}")));
        self.send(request, OnUnauthorized::Expire).await
    }

    // History

    pub async fn history(&self, limit: u32) -> Result<Vec<ActivityLog>> {
        let request = self.http.get(self.url("/history")).query(&[("limit", limit)]);
        self.send(request, OnUnauthorized::Expire).await
    }
}

#[async_trait]
impl Decrypt for ApiClient {
    async fn decrypt(&self, id: RecordId) -> Result<SecretString> {
        self.decrypt_password(id).await
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_builder() {
        // A header value the transport cannot carry, e.g. a control
        // character in the master password.
        Error::Validation(format!("request could not be built: {e}"))
    } else {
        Error::Connectivity(e.to_string())
    }
}

/// Extract the server's `detail`, falling back to the body or status text.
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(serde_json::Value::Array(items)) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if !msgs.is_empty() {
                    return msgs.join("; ");
                }
            }
            _ => {}
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}
