//! # User Handlers
//!
//! Account creation. Mounted for every HTTP method on `/register`.

use crate::error::AppResult;
use crate::state::AppState;
use crate::store::models::User;
use crate::webauthn::types::{parse_body, RegisterRequest};
use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};

/// Create a user
///
/// ## Route
/// ANY /register
///
/// ## Request
/// ```json
/// { "username": "alice", "password": "x" }
/// ```
///
/// ## Response
/// ```json
/// { "id": "user_550e8400e29b41d4a716446655440000" }
/// ```
///
/// Nothing is validated and usernames are not unique: every call creates a
/// new user. The password is kept as-is and never checked.
pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let req: RegisterRequest = parse_body(&body);

    let user = User::new(req.username, req.password);
    let id = user.id.clone();
    tracing::info!(user_id = %id, username = %user.username, "User created");

    state.users.put(user).await?;

    Ok(Json(json!({ "id": id })))
}
