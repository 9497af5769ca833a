//! # WebAuthn Module
//!
//! Passkey ceremonies, with the cryptography delegated to `webauthn-rs`.
//!
//! ## Submodules
//! - `types`: request bodies for the API
//! - `relying_party`: the `RelyingParty` seam and its `webauthn-rs` implementation
//! - `registration`: creating a passkey
//! - `authentication`: logging in with a passkey
//!
//! ## WebAuthn Flow Overview
//!
//! ### Registration
//! 1. `/register-challenge` → `registration::start_registration()` stores the challenge
//! 2. The browser runs `navigator.credentials.create()` with the options
//! 3. `/register-verify` → `registration::finish_registration()` consumes the
//!    challenge and attaches the verified passkey to the user
//!
//! ### Authentication
//! 1. `/login-challenge` → `authentication::start_authentication()`
//! 2. The browser runs `navigator.credentials.get()`
//! 3. `/login-verify` → `authentication::finish_authentication()` checks the
//!    assertion against the stored passkey
//!
//! Challenges are single-use: a verify call consumes the slot whether or not
//! the response checks out.

pub mod authentication;
pub mod registration;
pub mod relying_party;
pub mod types;

#[cfg(test)]
pub mod fake;

use crate::error::AppResult;
use crate::state::AppState;
use crate::store::models::{CeremonyKind, PendingChallenge};

/// Consume the user's live challenge if it was issued for `kind`
async fn take_pending(
    state: &AppState,
    user_id: &str,
    kind: CeremonyKind,
) -> AppResult<Option<PendingChallenge>> {
    match state.challenges.take(user_id).await? {
        Some(pending) if pending.kind == kind => Ok(Some(pending)),
        Some(pending) => {
            tracing::debug!(
                user_id,
                expected = %kind,
                found = %pending.kind,
                "Challenge issued for another ceremony"
            );
            Ok(None)
        }
        None => Ok(None),
    }
}
