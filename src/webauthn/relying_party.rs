//! # Relying Party
//!
//! The ceremony capability the rest of the server talks to. Four operations:
//! build registration options, verify a registration response, build
//! authentication options, verify an authentication response.
//!
//! All cryptographic work (challenge generation, attestation parsing,
//! signature checks, origin/RP ID binding) happens inside `webauthn-rs`.
//! This module only moves data in and out of it.
//!
//! ## Verification Outcomes
//! - `Ok(Verification::Verified(..))`: the response checks out
//! - `Ok(Verification::Rejected(reason))`: well-formed but not acceptable
//!   (wrong challenge, bad signature, unknown credential, ...)
//! - `Err(..)`: the credential could not even be parsed, or an internal fault

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::store::models::{PendingChallenge, StoredPasskey, User};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use webauthn_rs::prelude::*;

/// Options produced by a challenge-issuing call
pub struct IssuedChallenge {
    /// Payload handed to the browser as `options`
    pub options: Value,

    /// The challenge inside `options` (base64url)
    pub challenge: String,

    /// Serialized ceremony state, needed again at verification time
    pub state: Vec<u8>,
}

#[derive(Debug)]
pub enum Verification<T> {
    Verified(T),
    Rejected(String),
}

/// Result of a successful login ceremony
#[derive(Debug)]
pub struct Assertion {
    /// Credential the assertion was checked against
    pub credential_id: String,

    /// Signature counter reported by the authenticator
    pub counter: u32,

    /// Re-serialized credential, when the ceremony changed it
    pub updated_passkey: Option<Vec<u8>>,
}

pub trait RelyingParty: Send + Sync + 'static {
    fn registration_options(&self, user: &User) -> AppResult<IssuedChallenge>;

    fn verify_registration(
        &self,
        pending: &PendingChallenge,
        cred: &Value,
    ) -> AppResult<Verification<StoredPasskey>>;

    fn authentication_options(&self, user: &User) -> AppResult<IssuedChallenge>;

    fn verify_authentication(
        &self,
        pending: &PendingChallenge,
        cred: &Value,
        passkey: Option<&StoredPasskey>,
    ) -> AppResult<Verification<Assertion>>;
}

/// Ceremony state as kept in a `PendingChallenge`
///
/// Needs the `danger-allow-state-serialisation` feature of `webauthn-rs`.
#[derive(Serialize, Deserialize)]
enum CeremonyState {
    Registration(PasskeyRegistration),
    Authentication(PasskeyAuthentication),
    Discoverable(DiscoverableAuthentication),
}

/// `RelyingParty` backed by `webauthn_rs::Webauthn`
pub struct WebauthnRelyingParty {
    webauthn: Webauthn,
}

impl WebauthnRelyingParty {
    /// Build the WebAuthn instance for the configured RP ID, origin and name
    ///
    /// # Errors
    /// Returns an error if the origin is not a valid URL or does not match the RP ID.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let rp_origin = Url::parse(&config.rp_origin)?;
        let webauthn = WebauthnBuilder::new(&config.rp_id, &rp_origin)?
            .rp_name(&config.rp_name)
            .build()?;

        Ok(Self { webauthn })
    }

    /// The browser gets the flat `PublicKeyCredential*OptionsJSON` object, so
    /// the `publicKey` wrapper (and `mediation`) of the library's response is dropped.
    fn issue<R: Serialize>(response: &R, state: CeremonyState) -> AppResult<IssuedChallenge> {
        let options = match serde_json::to_value(response)? {
            Value::Object(mut fields) => fields.remove("publicKey"),
            _ => None,
        }
        .ok_or_else(|| AppError::Internal("options carry no publicKey".to_string()))?;
        let challenge = options
            .get("challenge")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| AppError::Internal("options carry no challenge".to_string()))?;
        let state = serde_json::to_vec(&state)?;

        Ok(IssuedChallenge {
            options,
            challenge,
            state,
        })
    }
}

impl RelyingParty for WebauthnRelyingParty {
    fn registration_options(&self, user: &User) -> AppResult<IssuedChallenge> {
        // Don't let the same authenticator register twice
        let exclude = user
            .passkey
            .as_ref()
            .map(|stored| decode_passkey(stored).map(|pk| vec![pk.cred_id().clone()]))
            .transpose()?;

        let (ccr, reg_state) = self.webauthn.start_passkey_registration(
            user.handle,
            &user.username,
            &user.username,
            exclude,
        )?;

        Self::issue(&ccr, CeremonyState::Registration(reg_state))
    }

    fn verify_registration(
        &self,
        pending: &PendingChallenge,
        cred: &Value,
    ) -> AppResult<Verification<StoredPasskey>> {
        let response: RegisterPublicKeyCredential = parse_credential(cred)?;

        let CeremonyState::Registration(reg_state) = decode_state(&pending.state)? else {
            return Ok(Verification::Rejected(
                "challenge was not issued for registration".to_string(),
            ));
        };

        match self
            .webauthn
            .finish_passkey_registration(&response, &reg_state)
        {
            Ok(passkey) => {
                let data = serde_json::to_vec(&passkey)?;
                Ok(Verification::Verified(StoredPasskey::new(
                    response.id.clone(),
                    data,
                )))
            }
            Err(e) => Ok(Verification::Rejected(e.to_string())),
        }
    }

    fn authentication_options(&self, user: &User) -> AppResult<IssuedChallenge> {
        match &user.passkey {
            Some(stored) => {
                let passkey = decode_passkey(stored)?;
                let (rcr, auth_state) = self.webauthn.start_passkey_authentication(&[passkey])?;
                Self::issue(&rcr, CeremonyState::Authentication(auth_state))
            }
            // Nothing to put in allowCredentials; let the authenticator pick
            None => {
                let (rcr, auth_state) = self.webauthn.start_discoverable_authentication()?;
                Self::issue(&rcr, CeremonyState::Discoverable(auth_state))
            }
        }
    }

    fn verify_authentication(
        &self,
        pending: &PendingChallenge,
        cred: &Value,
        passkey: Option<&StoredPasskey>,
    ) -> AppResult<Verification<Assertion>> {
        let response: PublicKeyCredential = parse_credential(cred)?;

        let Some(stored) = passkey else {
            return Ok(Verification::Rejected("no passkey registered".to_string()));
        };
        let mut passkey = decode_passkey(stored)?;

        let result = match decode_state(&pending.state)? {
            CeremonyState::Authentication(auth_state) => self
                .webauthn
                .finish_passkey_authentication(&response, &auth_state),
            CeremonyState::Discoverable(auth_state) => {
                self.webauthn.finish_discoverable_authentication(
                    &response,
                    auth_state,
                    &[DiscoverableKey::from(&passkey)],
                )
            }
            CeremonyState::Registration(_) => {
                return Ok(Verification::Rejected(
                    "challenge was not issued for authentication".to_string(),
                ));
            }
        };

        match result {
            Ok(auth_result) => {
                let updated_passkey = match passkey.update_credential(&auth_result) {
                    Some(true) => Some(serde_json::to_vec(&passkey)?),
                    _ => None,
                };

                Ok(Verification::Verified(Assertion {
                    credential_id: stored.credential_id.clone(),
                    counter: auth_result.counter(),
                    updated_passkey,
                }))
            }
            Err(e) => Ok(Verification::Rejected(e.to_string())),
        }
    }
}

fn parse_credential<T: DeserializeOwned>(cred: &Value) -> AppResult<T> {
    serde_json::from_value(cred.clone()).map_err(|e| {
        tracing::debug!("Credential did not parse: {}", e);
        AppError::BadRequest("malformed credential".to_string())
    })
}

fn decode_state(state: &[u8]) -> AppResult<CeremonyState> {
    Ok(serde_json::from_slice(state)?)
}

fn decode_passkey(stored: &StoredPasskey) -> AppResult<Passkey> {
    Ok(serde_json::from_slice(&stored.data)?)
}
