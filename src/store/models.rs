//! # Store Models
//!
//! Records kept by the in-memory stores. Nothing here is persisted; every
//! record disappears when the process exits.
//!
//! ## Key Concepts
//! - **User**: an account created by `/register`, optionally holding one passkey
//! - **StoredPasskey**: the credential returned by a successful registration ceremony
//! - **PendingChallenge**: the single live challenge slot for a user

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use uuid::Uuid;

/// User account information
///
/// ## Identifiers
/// Each user gets two identifiers derived from one random v4 UUID:
/// - `id`: the opaque string handed to clients (`user_<hex>`)
/// - `handle`: the UUID itself, used as the WebAuthn user handle
///
/// Both are random, so concurrent registrations cannot collide the way
/// timestamp-derived ids can.
#[derive(Clone)]
pub struct User {
    /// Opaque identifier returned by `/register`
    /// Example: "user_550e8400e29b41d4a716446655440000"
    pub id: String,

    /// WebAuthn user handle
    pub handle: Uuid,

    /// Username as submitted (not validated, not unique)
    pub username: String,

    /// Placeholder password, stored as submitted
    ///
    /// This server never checks it. It is kept only so the record mirrors
    /// what the client sent, and is redacted from `Debug` output.
    pub password: String,

    /// Passkey attached by the last successful registration, if any
    pub passkey: Option<StoredPasskey>,

    /// When the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a freshly generated identifier
    pub fn new(username: String, password: String) -> Self {
        let handle = Uuid::new_v4();

        Self {
            id: format!("user_{}", handle.simple()),
            handle,
            username,
            password,
            passkey: None,
            created_at: Utc::now(),
        }
    }

    /// Whether a passkey has been registered for this user
    pub fn has_passkey(&self) -> bool {
        self.passkey.is_some()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("handle", &self.handle)
            .field("username", &self.username)
            .field(
                "password",
                &if self.password.is_empty() { "<empty>" } else { "<redacted>" },
            )
            .field("passkey", &self.passkey)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Passkey credential attached to a user
///
/// `data` is the credential exactly as the relying party serialized it.
/// The store treats it as opaque bytes; only the relying party reads it back.
#[derive(Clone)]
pub struct StoredPasskey {
    /// Credential id reported by the authenticator (base64url)
    pub credential_id: String,

    /// Serialized credential (public key and metadata)
    pub data: Vec<u8>,

    /// Signature counter from the last successful ceremony
    pub counter: u32,

    /// When the credential was registered
    pub created_at: DateTime<Utc>,

    /// When the credential was last used to log in
    pub last_used_at: Option<DateTime<Utc>>,
}

impl StoredPasskey {
    pub fn new(credential_id: String, data: Vec<u8>) -> Self {
        Self {
            credential_id,
            data,
            counter: 0,
            created_at: Utc::now(),
            last_used_at: None,
        }
    }
}

impl fmt::Debug for StoredPasskey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredPasskey")
            .field("credential_id", &self.credential_id)
            .field("data_len", &self.data.len())
            .field("counter", &self.counter)
            .field("created_at", &self.created_at)
            .field("last_used_at", &self.last_used_at)
            .finish()
    }
}

/// Which ceremony a challenge was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeremonyKind {
    Registration,
    Authentication,
}

impl fmt::Display for CeremonyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CeremonyKind::Registration => f.write_str("registration"),
            CeremonyKind::Authentication => f.write_str("authentication"),
        }
    }
}

/// A challenge waiting to be answered
///
/// ## Lifecycle
/// 1. A challenge endpoint stores it, replacing any earlier slot for the user
/// 2. The matching verify endpoint takes it out of the store (single use)
/// 3. If nobody answers before `expires_at`, it is treated as absent and
///    eventually purged by the background cleanup task
#[derive(Clone)]
pub struct PendingChallenge {
    /// User the challenge was issued to
    pub user_id: String,

    /// Ceremony the challenge belongs to
    pub kind: CeremonyKind,

    /// Challenge value as sent to the client (base64url)
    pub challenge: String,

    /// Serialized ceremony state needed to verify the response
    pub state: Vec<u8>,

    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PendingChallenge {
    pub fn new(
        user_id: String,
        kind: CeremonyKind,
        challenge: String,
        state: Vec<u8>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id,
            kind,
            challenge,
            state,
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for PendingChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingChallenge")
            .field("user_id", &self.user_id)
            .field("kind", &self.kind)
            .field("challenge", &self.challenge)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
