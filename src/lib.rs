//! Wonder key service.
//!
//! Issues opaque single-use access keys tied to a subscription plan, stores
//! them so the plaintext is never recoverable, and lets callers verify or
//! permanently redeem a key exactly once — including under concurrent
//! redemption attempts, where the store's compare-and-set guarantees a single
//! winner.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Storage**: embedded SQLite via sqlx (WAL, single-writer CAS)
//! - **Key security**: Argon2id verification hash + truncated SHA-256 lookup
//!   token; plaintext is returned once at issuance and never persisted

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::services::entitlement::EntitlementNotifier;
use crate::services::record_preparer::HashingParams;
use crate::store::KeyStore;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: KeyStore,
    pub hashing: HashingParams,
    /// SHA-256 digest of the issuer token; the token itself is not kept.
    pub api_token_hash: String,
    pub notifier: Option<EntitlementNotifier>,
}

/// Build the HTTP router.
///
/// `verify` and `redeem` are public (throttling belongs to the deployment's
/// edge, not this core); `generate` and `revoke` sit behind the issuer-token
/// middleware.
pub fn router(state: AppState) -> Router {
    // Issuer-only routes
    let issuer_routes = Router::new()
        .route("/api/v1/keys/generate", post(handlers::keys::generate_keys))
        .route("/api/v1/keys/revoke", post(handlers::keys::revoke_key))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        // Public routes
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/keys/verify", post(handlers::keys::verify_key))
        .route("/api/v1/keys/redeem", post(handlers::keys::redeem_key))
        .merge(issuer_routes)
        // Request tracing for observability
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
