//! # Error Handling
//!
//! Application errors and their mapping to HTTP responses.
//!
//! Every error body has the same shape: `{ "error": "<message>" }`.
//! A failed ceremony verification is *not* an error; handlers answer it
//! with `200 OK` and `{ "error": "could not verify" }` directly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-wide error type
///
/// `#[from]` lets `?` convert library errors into the matching variant.
#[derive(Error, Debug)]
pub enum AppError {
    /// The `userId` in the request does not name a known user (404)
    #[error("user not found!")]
    UserNotFound,

    /// The client sent something the relying party cannot parse (400)
    ///
    /// Typical cause: a `cred` that is not a WebAuthn credential response.
    #[error("{0}")]
    BadRequest(String),

    /// The WebAuthn library failed while building options (500)
    #[error("WebAuthn error: {0}")]
    WebAuthn(#[from] webauthn_rs::prelude::WebauthnError),

    /// JSON serialization/deserialization of ceremony state failed (500)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything else that should not happen (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::UserNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::WebAuthn(e) => {
                // Internal details stay in the log
                tracing::error!("WebAuthn error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Serialization error".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

/// `Result` alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn user_not_found_is_404_with_fixed_message() {
        let (status, body) = render(AppError::UserNotFound).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "user not found!" }));
    }

    #[tokio::test]
    async fn bad_request_exposes_its_message() {
        let (status, body) = render(AppError::BadRequest("malformed credential".into())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "malformed credential");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) = render(AppError::Internal("lock poisoned at 0x1".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
