//! Stub password-manager server built on wiremock.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{auth_body, records_body, MASTER_PASSWORD, PLAINTEXT, TOKEN};

/// `GET /auth/check`
pub async fn mount_check(server: &MockServer, setup_complete: bool) {
    Mock::given(method("GET"))
        .and(path("/auth/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"setup_complete": setup_complete, "biometric_enabled": false}),
        ))
        .mount(server)
        .await;
}

/// `POST /auth/login`, accepting only [`MASTER_PASSWORD`].
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(wiremock::matchers::body_json(
            json!({"master_password": MASTER_PASSWORD}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body()))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid master password"})),
        )
        .with_priority(2)
        .mount(server)
        .await;
}

/// `POST /auth/setup`
pub async fn mount_setup(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/setup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body()))
        .mount(server)
        .await;
}

/// Record listing and decrypt, both requiring the ambient headers.
pub async fn mount_records(server: &MockServer) {
    let bearer = format!("Bearer {TOKEN}");
    Mock::given(method("GET"))
        .and(path("/passwords"))
        .and(header("authorization", bearer.as_str()))
        .and(header("x-master-password", MASTER_PASSWORD))
        .respond_with(ResponseTemplate::new(200).set_body_json(records_body()))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/passwords/7/decrypt"))
        .and(header("authorization", bearer.as_str()))
        .and(header("x-master-password", MASTER_PASSWORD))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"password": PLAINTEXT})))
        .mount(server)
        .await;
}

/// Every record call rejected, as after a server-side token revocation.
pub async fn mount_revoked(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/passwords"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token"})))
        .mount(server)
        .await;
}

/// An initialized server with a working vault.
pub async fn vault_server() -> MockServer {
    let server = MockServer::start().await;
    mount_check(&server, true).await;
    mount_login(&server).await;
    mount_records(&server).await;
    server
}
