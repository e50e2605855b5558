//! Session gate.
//!
//! Decides whether the vault is locked or unlocked. The gate never stores
//! a session state of its own; it asks the server whether a master
//! password exists, reads the credential store, and runs the result
//! through [`SessionState::derive`].
//!
//! Every transition bumps an epoch. Setup and login capture the epoch
//! before awaiting the server and drop their result, without writing any
//! credentials, if a logout or refresh happened in the meantime.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::core::api::{ApiClient, AuthResponse, SetupOutcome};
use crate::core::constants::MIN_MASTER_PASSWORD_LEN;
use crate::core::session::SessionState;
use crate::core::store::CredentialStore;
use crate::core::types::{MasterPassword, UserId};
use crate::error::{Error, Result};

/// Reason shown after the server rejected the session mid-flight.
pub const SESSION_EXPIRED: &str = "Session expired, please log in again";

/// What the user should be looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    CheckingStatus,
    NeedsSetup,
    NeedsLogin { reason: Option<String> },
    Unlocked,
    ConnectionError { message: String },
}

impl GateState {
    fn login() -> Self {
        GateState::NeedsLogin { reason: None }
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, GateState::Unlocked)
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::CheckingStatus => f.write_str("checking server status"),
            GateState::NeedsSetup => f.write_str("setup required"),
            GateState::NeedsLogin { reason: None } => f.write_str("locked"),
            GateState::NeedsLogin { reason: Some(r) } => write!(f, "locked ({r})"),
            GateState::Unlocked => f.write_str("unlocked"),
            GateState::ConnectionError { message } => write!(f, "unreachable ({message})"),
        }
    }
}

struct Inner {
    state: GateState,
    epoch: u64,
}

/// The lock/unlock state machine.
pub struct Gate {
    api: ApiClient,
    inner: Mutex<Inner>,
    forced_logouts: Mutex<watch::Receiver<u64>>,
}

impl Gate {
    pub fn new(api: ApiClient) -> Self {
        let forced_logouts = Mutex::new(api.augmenter().subscribe());
        Self {
            api,
            inner: Mutex::new(Inner {
                state: GateState::CheckingStatus,
                epoch: 0,
            }),
            forced_logouts,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn store(&self) -> &Arc<CredentialStore> {
        self.api.augmenter().store()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> GateState {
        self.lock().state.clone()
    }

    /// Current epoch; changes on every transition.
    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    fn transition(inner: &mut Inner, next: GateState) -> GateState {
        inner.epoch += 1;
        if inner.state != next {
            info!(from = %inner.state, to = %next, "gate transition");
        }
        inner.state = next.clone();
        next
    }

    /// Mark pending forced-logout signals as seen.
    fn acknowledge_forced_logouts(&self) -> bool {
        let mut rx = self
            .forced_logouts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match rx.has_changed() {
            Ok(true) => {
                rx.borrow_and_update();
                true
            }
            _ => false,
        }
    }

    /// Map the server flag and local credentials to a gate state.
    ///
    /// A token without its master password is cleared here, so the store
    /// never keeps a half session past an evaluation.
    fn evaluate(&self, server_initialized: bool) -> GateState {
        let creds = self.store().snapshot();
        let session = SessionState::derive(
            server_initialized,
            creds.has_token(),
            creds.has_master_password(),
        );
        debug!(session = %session, "session derived");

        match session {
            SessionState::Uninitialized => GateState::NeedsSetup,
            SessionState::LoggedOut => GateState::login(),
            SessionState::Inconsistent => {
                warn!("token held without master password, clearing session");
                if let Err(e) = self.store().clear() {
                    warn!(error = %e, "failed to clear inconsistent session");
                }
                GateState::login()
            }
            SessionState::Authenticated => GateState::Unlocked,
        }
    }

    /// Run the gate algorithm from the top.
    ///
    /// Transport failures land in [`GateState::ConnectionError`]; calling
    /// `refresh` again is the retry.
    pub async fn refresh(&self) -> GateState {
        let epoch = {
            let mut inner = self.lock();
            Self::transition(&mut inner, GateState::CheckingStatus);
            inner.epoch
        };
        self.acknowledge_forced_logouts();

        let status = self.api.check_initialized().await;

        let mut inner = self.lock();
        if inner.epoch != epoch {
            debug!("refresh result superseded");
            return inner.state.clone();
        }
        let next = match status {
            Ok(status) => self.evaluate(status.setup_complete),
            Err(Error::AuthExpired) => GateState::NeedsLogin {
                reason: Some(SESSION_EXPIRED.to_string()),
            },
            Err(Error::Connectivity(message)) => GateState::ConnectionError { message },
            Err(e) => GateState::ConnectionError {
                message: e.to_string(),
            },
        };
        Self::transition(&mut inner, next)
    }

    /// Create the master password on an uninitialized server.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` if the password is too short or does not
    ///   match its confirmation; the server is not contacted.
    /// - Any server or transport error; the gate state is unchanged.
    /// - `Error::Store` if the credentials could not be written.
    pub async fn setup(
        &self,
        password: MasterPassword,
        confirmation: MasterPassword,
    ) -> Result<GateState> {
        validate_new_password(&password, &confirmation)?;
        drop(confirmation);

        let epoch = self.epoch();
        let outcome = self.api.setup(&password).await?;

        let mut inner = self.lock();
        if inner.epoch != epoch {
            debug!("setup result discarded, gate moved on");
            return Ok(inner.state.clone());
        }
        match outcome {
            SetupOutcome::Created(auth) => self.unlock(&mut inner, &auth, &password),
            SetupOutcome::AlreadyInitialized => {
                info!("server was initialized by another client");
                let next = self.evaluate(true);
                Ok(Self::transition(&mut inner, next))
            }
        }
    }

    /// Exchange the master password for a session token.
    ///
    /// A rejected password is not an error: the gate stays locked with the
    /// server's reason and the password is dropped.
    ///
    /// # Errors
    ///
    /// Transport, server, and store failures; the gate state is unchanged.
    pub async fn login(&self, password: MasterPassword) -> Result<GateState> {
        if password.is_empty() {
            return Err(Error::Validation("Master password is required".to_string()));
        }

        let epoch = self.epoch();
        let result = self.api.login(&password).await;

        let mut inner = self.lock();
        if inner.epoch != epoch {
            debug!("login result discarded, gate moved on");
            return Ok(inner.state.clone());
        }
        match result {
            Ok(auth) => self.unlock(&mut inner, &auth, &password),
            Err(Error::AuthRejected(detail)) => {
                self.acknowledge_forced_logouts();
                Ok(Self::transition(
                    &mut inner,
                    GateState::NeedsLogin {
                        reason: Some(detail),
                    },
                ))
            }
            Err(e) => Err(e),
        }
    }

    fn unlock(
        &self,
        inner: &mut Inner,
        auth: &AuthResponse,
        password: &MasterPassword,
    ) -> Result<GateState> {
        let user_id = UserId(auth.user_id.to_string());
        if let Err(e) = self.store().set_credentials(&auth.token, &user_id, password) {
            Self::transition(inner, GateState::login());
            return Err(e);
        }
        Ok(Self::transition(inner, GateState::Unlocked))
    }

    /// Clear all credentials locally. No server call is made.
    ///
    /// The gate is locked even if the store reports a failure.
    pub fn logout(&self) -> Result<()> {
        let mut inner = self.lock();
        let cleared = self.store().clear();
        Self::transition(&mut inner, GateState::login());
        info!("logged out");
        cleared
    }

    /// Apply any forced logout raised by the request augmenter.
    pub fn sync(&self) -> GateState {
        let mut inner = self.lock();
        if self.acknowledge_forced_logouts() {
            return Self::transition(
                &mut inner,
                GateState::NeedsLogin {
                    reason: Some(SESSION_EXPIRED.to_string()),
                },
            );
        }
        inner.state.clone()
    }
}

/// Client-side checks before a setup request is sent.
pub fn validate_new_password(password: &MasterPassword, confirmation: &MasterPassword) -> Result<()> {
    if password.len() < MIN_MASTER_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "Master password must be at least {MIN_MASTER_PASSWORD_LEN} characters"
        )));
    }
    if password.expose() != confirmation.expose() {
        return Err(Error::Validation("Passwords do not match".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::Augmenter;
    use crate::core::config::Config;
    use crate::core::constants::TOKEN_KEY;
    use crate::core::store::{MemoryScope, Scope};
    use crate::core::types::Token;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gate_for(uri: &str) -> Gate {
        let config = Config::default().with_server(uri);
        let augmenter = Arc::new(Augmenter::new(Arc::new(CredentialStore::in_memory())));
        Gate::new(ApiClient::new(&config, augmenter).unwrap())
    }

    async fn mock_check(server: &MockServer, setup_complete: bool) {
        Mock::given(method("GET"))
            .and(path("/auth/check"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"setup_complete": setup_complete, "biometric_enabled": false}),
            ))
            .mount(server)
            .await;
    }

    fn auth_body(token: &str) -> serde_json::Value {
        json!({"user_id": 1, "token": token, "message": "ok"})
    }

    #[test]
    fn test_validate_new_password() {
        let short = MasterPassword::new("short");
        assert!(matches!(
            validate_new_password(&short, &short),
            Err(Error::Validation(m)) if m.contains("at least 8")
        ));
        assert!(matches!(
            validate_new_password(&"password123".into(), &"password124".into()),
            Err(Error::Validation(m)) if m == "Passwords do not match"
        ));
        assert!(validate_new_password(&"12345678".into(), &"12345678".into()).is_ok());
    }

    #[tokio::test]
    async fn test_uninitialized_server_needs_setup_regardless_of_store() {
        let server = MockServer::start().await;
        mock_check(&server, false).await;
        let gate = gate_for(&server.uri());
        gate.store()
            .set_credentials(&Token::new("t"), &UserId("1".into()), &"password123".into())
            .unwrap();

        assert_eq!(gate.refresh().await, GateState::NeedsSetup);
    }

    #[tokio::test]
    async fn test_token_without_password_is_cleared() {
        let server = MockServer::start().await;
        mock_check(&server, true).await;

        // A token left over from an earlier process; the volatile scope is new.
        let durable = MemoryScope::new();
        durable.set(TOKEN_KEY, "tok-old").unwrap();
        let store = Arc::new(CredentialStore::new(
            Box::new(durable),
            Box::new(MemoryScope::new()),
        ));
        let config = Config::default().with_server(&server.uri());
        let gate = Gate::new(ApiClient::new(&config, Arc::new(Augmenter::new(store.clone()))).unwrap());

        assert_eq!(gate.refresh().await, GateState::login());
        assert!(!store.has_token(), "token must be cleared, not just routed to login");
    }

    #[tokio::test]
    async fn test_losing_either_credential_relocks() {
        let server = MockServer::start().await;
        mock_check(&server, true).await;
        let gate = gate_for(&server.uri());
        let set = |g: &Gate| {
            g.store()
                .set_credentials(&Token::new("t"), &UserId("1".into()), &"password123".into())
                .unwrap()
        };

        set(&gate);
        assert_eq!(gate.refresh().await, GateState::Unlocked);

        gate.store().clear().unwrap();
        assert_eq!(gate.refresh().await, GateState::login());
        set(&gate);
        assert_eq!(gate.refresh().await, GateState::Unlocked);
    }

    #[tokio::test]
    async fn test_connection_error_then_retry() {
        let gate = gate_for("http://127.0.0.1:9");
        assert!(matches!(
            gate.refresh().await,
            GateState::ConnectionError { .. }
        ));
    }

    #[tokio::test]
    async fn test_setup_unlocks_and_stores_both() {
        let server = MockServer::start().await;
        mock_check(&server, false).await;
        Mock::given(method("POST"))
            .and(path("/auth/setup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-setup")))
            .mount(&server)
            .await;
        let gate = gate_for(&server.uri());
        assert_eq!(gate.refresh().await, GateState::NeedsSetup);

        let state = gate
            .setup("password123".into(), "password123".into())
            .await
            .unwrap();
        assert_eq!(state, GateState::Unlocked);
        let creds = gate.store().snapshot();
        assert_eq!(creds.token, Some(Token::new("tok-setup")));
        assert_eq!(creds.master_password.unwrap().expose(), "password123");
    }

    #[tokio::test]
    async fn test_setup_validation_skips_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/setup"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("t")))
            .expect(0)
            .mount(&server)
            .await;
        let gate = gate_for(&server.uri());

        let err = gate.setup("short".into(), "short".into()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_setup_race_lands_on_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/setup"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"detail": "Master password already set"})),
            )
            .mount(&server)
            .await;
        let gate = gate_for(&server.uri());

        let state = gate
            .setup("password123".into(), "password123".into())
            .await
            .unwrap();
        assert_eq!(state, GateState::login());
        assert!(!gate.store().has_token());
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid master password"})),
            )
            .mount(&server)
            .await;
        let gate = gate_for(&server.uri());

        let state = gate.login("wrong-password".into()).await.unwrap();
        assert_eq!(
            state,
            GateState::NeedsLogin {
                reason: Some("Invalid master password".into())
            }
        );
        assert!(gate.store().master_password().is_none());
        // The rejection is not replayed as an expired session.
        assert_eq!(gate.sync(), state);
    }

    #[tokio::test]
    async fn test_logout_during_login_discards_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(auth_body("late-token"))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        let gate = Arc::new(gate_for(&server.uri()));

        let pending = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.login("password123".into()).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        gate.logout().unwrap();

        let state = pending.await.unwrap().unwrap();
        assert_eq!(state, GateState::login());
        assert!(!gate.store().has_token(), "late login must not write credentials");
    }

    #[tokio::test]
    async fn test_forced_logout_observed_by_sync() {
        let server = MockServer::start().await;
        mock_check(&server, true).await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/passwords"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token"})))
            .mount(&server)
            .await;
        let gate = gate_for(&server.uri());

        assert_eq!(gate.login("password123".into()).await.unwrap(), GateState::Unlocked);
        assert_eq!(gate.refresh().await, GateState::Unlocked);

        let err = gate
            .api()
            .list_passwords(&Default::default())
            .await
            .unwrap_err();
        assert!(err.is_auth_expired());

        assert_eq!(
            gate.sync(),
            GateState::NeedsLogin {
                reason: Some(SESSION_EXPIRED.into())
            }
        );
        assert_eq!(gate.refresh().await, GateState::login());
    }
}
