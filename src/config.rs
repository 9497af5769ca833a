//! # Configuration Management
//!
//! Configuration comes from the environment (and an optional `.env` file).
//!
//! ## Environment Variables
//! - `HOST`: Server bind address (default: 127.0.0.1)
//! - `PORT`: Server port (default: 5555)
//! - `RP_ID`: WebAuthn Relying Party ID (default: localhost)
//! - `RP_ORIGIN`: WebAuthn Relying Party Origin (default: http://localhost:5555)
//! - `RP_NAME`: Human-readable name shown during passkey creation
//! - `STATIC_DIR`: Directory served for every non-API path (default: ./public)
//! - `CHALLENGE_TTL_SECS`: Lifetime of an issued challenge (default: 300)
//! - `CHALLENGE_CLEANUP_SECS`: Interval of the expired-challenge sweep (default: 600)

use anyhow::{anyhow, Context, Result};
use std::env;
use std::time::Duration;

/// Application configuration
///
/// ## WebAuthn Terminology
/// - **RP ID**: the domain credentials are scoped to ("localhost" in development)
/// - **RP Origin**: the full URL the browser reports ("http://localhost:5555")
///
/// The RP ID and origin must agree with where the page is actually served,
/// otherwise every ceremony fails verification.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub rp_id: String,
    pub rp_origin: String,
    pub rp_name: String,
    pub static_dir: String,

    /// How long a challenge stays answerable
    pub challenge_ttl: Duration,

    /// How often expired challenges are swept from memory
    pub challenge_cleanup_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// ## Example .env file
    /// ```text
    /// HOST=127.0.0.1
    /// PORT=5555
    /// RP_ID=localhost
    /// RP_ORIGIN=http://localhost:5555
    /// RP_NAME=passkey application
    /// STATIC_DIR=./public
    /// CHALLENGE_TTL_SECS=300
    /// ```
    ///
    /// # Errors
    /// Returns an error if a numeric variable does not parse or a duration is zero.
    pub fn from_env() -> Result<Self> {
        // Missing .env is fine
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),

            port: env::var("PORT")
                .unwrap_or_else(|_| "5555".to_string())
                .parse()
                .context("PORT must be a valid port number")?,

            rp_id: env::var("RP_ID").unwrap_or_else(|_| "localhost".to_string()),

            rp_origin: env::var("RP_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5555".to_string()),

            rp_name: env::var("RP_NAME").unwrap_or_else(|_| "passkey application".to_string()),

            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "./public".to_string()),

            challenge_ttl: seconds_from_env("CHALLENGE_TTL_SECS", 300)?,

            challenge_cleanup_interval: seconds_from_env("CHALLENGE_CLEANUP_SECS", 600)?,
        })
    }

    /// Socket address for `tokio::net::TcpListener::bind()`, e.g. "127.0.0.1:5555"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn seconds_from_env(key: &str, default: u64) -> Result<Duration> {
    let secs = match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds"))?,
        Err(_) => default,
    };

    if secs == 0 {
        return Err(anyhow!("{key} must be greater than zero"));
    }

    Ok(Duration::from_secs(secs))
}
