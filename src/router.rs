use crate::handlers::auth::*;
use crate::handlers::health::health_check;
use crate::handlers::users::register;
use crate::state::AppState;
use axum::{
    routing::{any, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the application router
///
/// Everything that is not an API route falls through to the static
/// directory (the browser half of the demo lives there).
pub fn build_router(state: AppState, static_dir: &str) -> Router {
    // Permissive CORS: the demo page may be served from another origin during development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/register", any(register))
        .route("/register-challenge", post(register_challenge))
        .route("/register-verify", post(register_verify))
        .route("/login-challenge", post(login_challenge))
        .route("/login-verify", post(login_verify))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
