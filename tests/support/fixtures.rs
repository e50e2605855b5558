//! Test fixtures and constants.

use serde_json::{json, Value};

/// A master password that passes client validation.
pub const MASTER_PASSWORD: &str = "correct-horse-battery";

/// Token the stub server hands out.
pub const TOKEN: &str = "tok-integration";

/// Plaintext returned by the stub decrypt endpoint.
pub const PLAINTEXT: &str = "s3cr3t-plaintext";

/// Login / setup success body.
pub fn auth_body() -> Value {
    json!({"user_id": 1, "token": TOKEN, "message": "Login successful"})
}

/// Two records as the server lists them.
pub fn records_body() -> Value {
    json!([
        {
            "id": 7, "title": "GitHub", "username": "octo",
            "website": "https://github.com", "category_id": 1,
            "created_at": "2024-05-01T10:20:30.123456",
            "category": {"id": 1, "name": "Work", "color": "#45B7D1", "is_default": true}
        },
        {"id": 8, "title": "Mail", "email": "me@example.com"}
    ])
}
