//! # Passkey Registration Logic
//!
//! Registration is a two-step process: start and finish.
//!
//! ## Registration Flow
//! 1. **Start**: ask the relying party for creation options, remember the challenge
//! 2. **Finish**: consume the remembered challenge, verify the response,
//!    attach the resulting passkey to the user
//!
//! A finished registration replaces any passkey the user already had.

use crate::error::AppResult;
use crate::state::AppState;
use crate::store::models::{CeremonyKind, PendingChallenge};
use crate::webauthn::relying_party::Verification;
use crate::webauthn::take_pending;
use serde_json::Value;

/// Start the passkey registration process
///
/// ## Returns
/// The options payload for `navigator.credentials.create()`, containing the
/// challenge, RP information and the user entity.
///
/// ## Errors
/// - UserNotFound: `user_id` is unknown
/// - WebAuthn/Serialization: option generation failed
pub async fn start_registration(state: &AppState, user_id: &str) -> AppResult<Value> {
    let user = state.find_user(user_id).await?;

    let issued = state.relying_party.registration_options(&user)?;

    // Overwrites whatever challenge the user had outstanding
    state
        .challenges
        .put(PendingChallenge::new(
            user.id.clone(),
            CeremonyKind::Registration,
            issued.challenge,
            issued.state,
            state.challenge_ttl,
        ))
        .await?;

    tracing::debug!(user_id = %user.id, "Issued registration challenge");

    Ok(issued.options)
}

/// Finish the passkey registration process
///
/// ## What gets verified?
/// Delegated to the relying party: challenge, origin, RP ID, attestation
/// format and credential structure.
///
/// ## Returns
/// - `Verified(())`: a passkey is now stored on the user
/// - `Rejected(reason)`: no live registration challenge, or the relying
///   party refused the response
///
/// ## Errors
/// - UserNotFound: `user_id` is unknown
/// - BadRequest: `cred` is not a registration response at all
pub async fn finish_registration(
    state: &AppState,
    user_id: &str,
    cred: &Value,
) -> AppResult<Verification<()>> {
    let user = state.find_user(user_id).await?;

    let Some(pending) = take_pending(state, &user.id, CeremonyKind::Registration).await? else {
        return Ok(Verification::Rejected(
            "no live registration challenge".to_string(),
        ));
    };

    match state.relying_party.verify_registration(&pending, cred)? {
        Verification::Verified(passkey) => {
            let credential_id = passkey.credential_id.clone();
            state.users.set_passkey(&user.id, passkey).await?;
            tracing::info!(user_id = %user.id, %credential_id, "Passkey registered");
            Ok(Verification::Verified(()))
        }
        Verification::Rejected(reason) => {
            tracing::info!(user_id = %user.id, %reason, "Registration rejected");
            Ok(Verification::Rejected(reason))
        }
    }
}
