//! # WebAuthn API Types
//!
//! Request bodies for the API endpoints. Field names are camelCase on the wire.
//!
//! Every field has a default, and [`parse_body`] falls back to the default
//! value when the body is missing or is not JSON. A request with no usable
//! `userId` therefore reaches the handler and gets the same
//! `404 {"error": "user not found!"}` as one naming an unknown user.

use crate::error::{AppError, AppResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Request to create a user
///
/// ## Example JSON
/// ```json
/// { "username": "alice", "password": "x" }
/// ```
///
/// Neither field is validated. No `Debug` derive: the password must not
/// end up in logs.
#[derive(Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Request for a registration or login challenge
///
/// ## Example JSON
/// ```json
/// { "userId": "user_550e8400e29b41d4a716446655440000" }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Kept as raw JSON so a number or null is "unknown user", not a parse error
    #[serde(default)]
    pub user_id: Value,
}

impl ChallengeRequest {
    pub fn user_id(&self) -> AppResult<&str> {
        user_id_str(&self.user_id)
    }
}

/// Request to verify a registration or login response
///
/// `cred` is the credential produced by `navigator.credentials.create()` or
/// `navigator.credentials.get()`, passed through untouched to the relying
/// party for parsing and validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub user_id: Value,
    #[serde(default)]
    pub cred: Value,
}

impl VerifyRequest {
    pub fn user_id(&self) -> AppResult<&str> {
        user_id_str(&self.user_id)
    }
}

fn user_id_str(value: &Value) -> AppResult<&str> {
    value.as_str().ok_or(AppError::UserNotFound)
}

/// Decode a JSON request body, falling back to `T::default()`
pub fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> T {
    if body.is_empty() {
        return T::default();
    }

    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!("Ignoring unparsable request body: {}", e);
        T::default()
    })
}
