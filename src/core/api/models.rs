//! Wire types for the password-manager server.
//!
//! Request types that carry secrets serialize them through
//! [`expose_secret`] so the plaintext exists only inside the request body.

use chrono::NaiveDateTime;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::types::{CategoryId, RecordId, Token};

/// `GET /auth/check`
#[derive(Debug, Clone, Deserialize)]
pub struct SetupStatus {
    pub setup_complete: bool,
    #[serde(default)]
    pub biometric_enabled: bool,
}

/// `POST /auth/setup` and `POST /auth/login` success body.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user_id: u64,
    pub token: Token,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize)]
pub(crate) struct SetupRequest<'a> {
    pub master_password: &'a str,
    pub biometric_enabled: bool,
}

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub master_password: &'a str,
}

/// `GET /health`
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub status: String,
}

/// Plain `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message: String,
}

/// A record category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl CategoryUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.icon.is_none()
    }
}

/// A stored credential as listed by the server. Never holds plaintext.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PasswordEntry {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub category: Option<Category>,
}

/// `POST /passwords`
#[derive(Debug, Serialize)]
pub struct NewPassword {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

/// `PUT /passwords/{id}`; absent fields are left unchanged by the server.
#[derive(Debug, Default, Serialize)]
pub struct PasswordUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "expose_optional_secret"
    )]
    pub password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

impl PasswordUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.website.is_none()
            && self.notes.is_none()
            && self.category_id.is_none()
    }
}

/// Query for `GET /passwords`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PasswordFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

#[derive(Serialize)]
pub(crate) struct GenerateRequest {
    pub length: u32,
    pub include_symbols: bool,
}

/// `{ "password": ... }` body of decrypt and generate.
#[derive(Deserialize)]
pub(crate) struct PlaintextPassword {
    #[serde(deserialize_with = "secret_string")]
    pub password: SecretString,
}

/// One entry of the server's activity timeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActivityLog {
    pub id: u64,
    pub action: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "timestamp::lenient")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub password_id: Option<RecordId>,
}

fn expose_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn expose_optional_secret<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

fn secret_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer};

    /// Accept RFC 3339 or the naive ISO form the server emits; anything
    /// unparseable becomes `None` rather than failing the whole listing.
    pub fn lenient<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.naive_utc())
                .or_else(|_| NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f"))
                .ok()
        }))
    }
}
