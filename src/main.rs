//! Wonder Key Service - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Open the SQLite pool and run migrations
//! 3. Build the router (public verify/redeem, issuer-gated generate/revoke)
//! 4. Start serving on the configured port

use tracing_subscriber::EnvFilter;

use wonder_key_service::config::Config;
use wonder_key_service::middleware::auth;
use wonder_key_service::services::entitlement::EntitlementNotifier;
use wonder_key_service::services::record_preparer::HashingParams;
use wonder_key_service::store::KeyStore;
use wonder_key_service::{AppState, db, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Open the store
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let notifier = EntitlementNotifier::from_config(&config)?;
    if notifier.is_some() {
        tracing::info!("Entitlement delivery enabled");
    }

    let state = AppState {
        store: KeyStore::new(pool),
        hashing: HashingParams::from_config(&config),
        api_token_hash: auth::token_digest(&config.api_token),
        notifier,
    };

    let app = router(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Serve requests concurrently with tokio
    axum::serve(listener, app).await?;

    Ok(())
}
