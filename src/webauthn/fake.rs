//! Deterministic `RelyingParty` for tests.
//!
//! Challenges are `reg-<n>` / `auth-<n>`. A credential is `{"id", "challenge"}`
//! (see [`credential`]) and verifies when its challenge equals the pending one.

use crate::error::{AppError, AppResult};
use crate::store::models::{PendingChallenge, StoredPasskey, User};
use crate::webauthn::relying_party::{Assertion, IssuedChallenge, RelyingParty, Verification};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct FakeRelyingParty {
    issued: AtomicU64,
}

impl FakeRelyingParty {
    fn next_challenge(&self, prefix: &str) -> String {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{prefix}-{n}")
    }
}

/// Credential as the fake expects it
pub fn credential(id: &str, challenge: &str) -> Value {
    json!({ "id": id, "challenge": challenge })
}

fn parse(cred: &Value) -> AppResult<(&str, &str)> {
    let id = cred.get("id").and_then(Value::as_str);
    let challenge = cred.get("challenge").and_then(Value::as_str);

    id.zip(challenge)
        .ok_or_else(|| AppError::BadRequest("malformed credential".to_string()))
}

impl RelyingParty for FakeRelyingParty {
    fn registration_options(&self, user: &User) -> AppResult<IssuedChallenge> {
        let challenge = self.next_challenge("reg");

        Ok(IssuedChallenge {
            options: json!({
                "challenge": challenge,
                "rp": { "id": "localhost", "name": "passkey application" },
                "user": { "id": user.handle.to_string(), "name": user.username },
            }),
            state: challenge.as_bytes().to_vec(),
            challenge,
        })
    }

    fn verify_registration(
        &self,
        pending: &PendingChallenge,
        cred: &Value,
    ) -> AppResult<Verification<StoredPasskey>> {
        let (id, challenge) = parse(cred)?;

        if challenge != pending.challenge {
            return Ok(Verification::Rejected("challenge mismatch".to_string()));
        }

        Ok(Verification::Verified(StoredPasskey::new(
            id.to_string(),
            id.as_bytes().to_vec(),
        )))
    }

    fn authentication_options(&self, user: &User) -> AppResult<IssuedChallenge> {
        let challenge = self.next_challenge("auth");
        let allow: Vec<Value> = user
            .passkey
            .iter()
            .map(|pk| json!({ "id": pk.credential_id, "type": "public-key" }))
            .collect();

        Ok(IssuedChallenge {
            options: json!({
                "challenge": challenge,
                "rpId": "localhost",
                "allowCredentials": allow,
            }),
            state: challenge.as_bytes().to_vec(),
            challenge,
        })
    }

    fn verify_authentication(
        &self,
        pending: &PendingChallenge,
        cred: &Value,
        passkey: Option<&StoredPasskey>,
    ) -> AppResult<Verification<Assertion>> {
        let (id, challenge) = parse(cred)?;

        let Some(passkey) = passkey else {
            return Ok(Verification::Rejected("no passkey registered".to_string()));
        };
        if id != passkey.credential_id {
            return Ok(Verification::Rejected("unknown credential".to_string()));
        }
        if challenge != pending.challenge {
            return Ok(Verification::Rejected("challenge mismatch".to_string()));
        }

        Ok(Verification::Verified(Assertion {
            credential_id: passkey.credential_id.clone(),
            counter: passkey.counter + 1,
            updated_passkey: None,
        }))
    }
}
