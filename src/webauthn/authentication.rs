use crate::error::AppResult;
use crate::state::AppState;
use crate::store::models::{CeremonyKind, PendingChallenge};
use crate::webauthn::relying_party::Verification;
use crate::webauthn::take_pending;
use serde_json::Value;

pub async fn start_authentication(state: &AppState, user_id: &str) -> AppResult<Value> {
    let user = state.find_user(user_id).await?;

    let issued = state.relying_party.authentication_options(&user)?;

    state
        .challenges
        .put(PendingChallenge::new(
            user.id.clone(),
            CeremonyKind::Authentication,
            issued.challenge,
            issued.state,
            state.challenge_ttl,
        ))
        .await?;

    tracing::debug!(
        user_id = %user.id,
        has_passkey = user.has_passkey(),
        "Issued authentication challenge"
    );

    Ok(issued.options)
}

/// Verify a login response. On success returns the user id; no session is
/// created, only the stored passkey's counter is refreshed.
pub async fn finish_authentication(
    state: &AppState,
    user_id: &str,
    cred: &Value,
) -> AppResult<Verification<String>> {
    let user = state.find_user(user_id).await?;

    let Some(pending) = take_pending(state, &user.id, CeremonyKind::Authentication).await? else {
        return Ok(Verification::Rejected(
            "no live authentication challenge".to_string(),
        ));
    };

    let outcome = state
        .relying_party
        .verify_authentication(&pending, cred, user.passkey.as_ref())?;

    match outcome {
        Verification::Verified(assertion) => {
            let touched = state
                .users
                .touch_passkey(
                    &user.id,
                    &assertion.credential_id,
                    assertion.counter,
                    assertion.updated_passkey,
                )
                .await?;
            if !touched {
                tracing::debug!(
                    user_id = %user.id,
                    "Passkey replaced during login; counter not stored"
                );
            }
            tracing::info!(user_id = %user.id, counter = assertion.counter, "User logged in");
            Ok(Verification::Verified(user.id))
        }
        Verification::Rejected(reason) => {
            tracing::info!(user_id = %user.id, %reason, "Login rejected");
            Ok(Verification::Rejected(reason))
        }
    }
}
