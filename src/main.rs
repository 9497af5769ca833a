//! # Passkey Relying-Party Server
//!
//! A small WebAuthn relying party: users register with a username, attach a
//! passkey, and log in by signing a server-issued challenge. Users and
//! challenges live in memory only.
//!
//! ## Key Concepts
//! - **WebAuthn**: Web Authentication API for passwordless authentication
//! - **Passkeys**: public-key credentials bound to a user and a relying party
//! - **Ceremony**: options → browser crypto operation → server verification

mod config; // Environment-driven settings
mod error; // AppError and its HTTP mapping
mod handlers; // HTTP request handlers
mod router; // Route table and middleware
mod state; // Shared application state
mod store; // In-memory user and challenge stores
mod webauthn; // Ceremony flows and the relying party

use crate::config::Config;
use crate::state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,passkey_rp_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded: {:?}", config);

    let app_state = AppState::new(&config)?;
    tracing::info!("Application state initialized");

    // Expired challenges are never returned by the store, but they would
    // otherwise sit in memory until the user asks for a new one
    let challenges = app_state.challenges.clone();
    let cleanup_every = config.challenge_cleanup_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_every);
        loop {
            interval.tick().await;
            match challenges.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "Purged expired challenges"),
                Err(e) => tracing::error!("Challenge cleanup failed: {:?}", e),
            }
        }
    });

    let app = router::build_router(app_state, &config.static_dir);

    let bind_addr = config.bind_address();
    tracing::info!("Server is running at {}", config.rp_origin);
    tracing::info!("Listening on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
