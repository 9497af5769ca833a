use crate::error::AppResult;
use crate::state::AppState;
use crate::webauthn::relying_party::Verification;
use crate::webauthn::types::*;
use crate::webauthn::{authentication, registration};
use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};

/// Body returned when the relying party refuses a response. Sent with 200 OK.
fn could_not_verify() -> Json<Value> {
    Json(json!({ "error": "could not verify" }))
}

// Registration endpoints

pub async fn register_challenge(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let req: ChallengeRequest = parse_body(&body);

    let options = registration::start_registration(&state, req.user_id()?).await?;

    Ok(Json(json!({ "options": options })))
}

pub async fn register_verify(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let req: VerifyRequest = parse_body(&body);

    match registration::finish_registration(&state, req.user_id()?, &req.cred).await? {
        Verification::Verified(()) => Ok(Json(json!({ "verified": true }))),
        Verification::Rejected(_) => Ok(could_not_verify()),
    }
}

// Login endpoints

pub async fn login_challenge(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let req: ChallengeRequest = parse_body(&body);

    let options = authentication::start_authentication(&state, req.user_id()?).await?;

    Ok(Json(json!({ "options": options })))
}

pub async fn login_verify(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let req: VerifyRequest = parse_body(&body);

    // No session is created; the response is the whole effect of a login
    match authentication::finish_authentication(&state, req.user_id()?, &req.cred).await? {
        Verification::Verified(user_id) => Ok(Json(json!({
            "success": true,
            "userId": user_id
        }))),
        Verification::Rejected(_) => Ok(could_not_verify()),
    }
}
