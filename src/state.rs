//! # Application State
//!
//! Shared resources handed to every request handler through Axum's `State`
//! extractor: the two stores and the relying party.
//!
//! ## The State Pattern
//! Everything is behind an `Arc<dyn ...>`, so cloning the state for each
//! request only copies pointers, and tests can swap in their own
//! implementations of any of the three seams.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::store::challenges::{ChallengeStore, MemoryChallengeStore};
use crate::store::models::User;
use crate::store::users::{MemoryUserStore, UserStore};
use crate::webauthn::relying_party::{RelyingParty, WebauthnRelyingParty};
use anyhow::Result;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Registered users, keyed by id
    pub users: Arc<dyn UserStore>,

    /// Live challenge per user
    pub challenges: Arc<dyn ChallengeStore>,

    /// Ceremony option generation and verification
    pub relying_party: Arc<dyn RelyingParty>,

    /// Lifetime given to every newly issued challenge
    pub challenge_ttl: chrono::Duration,
}

impl AppState {
    /// Initialize application state with in-memory stores and a
    /// `webauthn-rs` relying party
    ///
    /// # Errors
    /// Returns an error if the WebAuthn configuration is invalid (e.g., malformed
    /// origin URL) or the challenge TTL is out of range.
    pub fn new(config: &Config) -> Result<Self> {
        let relying_party = WebauthnRelyingParty::new(config)?;

        Ok(Self::from_parts(
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryChallengeStore::new()),
            Arc::new(relying_party),
            chrono::Duration::from_std(config.challenge_ttl)?,
        ))
    }

    pub fn from_parts(
        users: Arc<dyn UserStore>,
        challenges: Arc<dyn ChallengeStore>,
        relying_party: Arc<dyn RelyingParty>,
        challenge_ttl: chrono::Duration,
    ) -> Self {
        Self {
            users,
            challenges,
            relying_party,
            challenge_ttl,
        }
    }

    /// Look up a user, mapping absence to `AppError::UserNotFound`
    pub async fn find_user(&self, user_id: &str) -> AppResult<User> {
        self.users
            .get(user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }
}
