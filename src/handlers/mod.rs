//! # HTTP Request Handlers
//!
//! ## Submodules
//! - `health`: health check endpoint
//! - `users`: account creation (`/register`)
//! - `auth`: challenge and verify endpoints for registration and login
//!
//! ## Handler Pattern
//! Handlers take the raw body and decode it leniently (see
//! `webauthn::types::parse_body`), call into `webauthn::registration` or
//! `webauthn::authentication`, and turn the outcome into JSON.
//!
//! | Outcome | Status | Body |
//! |---|---|---|
//! | unknown user | 404 | `{"error": "user not found!"}` |
//! | verification refused | 200 | `{"error": "could not verify"}` |
//! | malformed credential | 400 | `{"error": "malformed credential"}` |

pub mod auth;
pub mod health;
pub mod users;
