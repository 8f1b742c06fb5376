//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `API_TOKEN` (required): issuer token gating generate/revoke
/// - `DATABASE_URL` (optional): SQLite location, defaults to `sqlite://data/keys.db`
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `ARGON2_MEMORY_KIB` / `ARGON2_ITERATIONS` / `ARGON2_PARALLELISM` (optional):
///   cost factors for the verification hash
/// - `ENTITLEMENT_URL` / `ENTITLEMENT_SECRET` (optional): webhook notified on
///   successful redemptions
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_token: String,

    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    /// Argon2id memory cost in KiB. The default matches the 19 MiB profile.
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Optional endpoint notified when a key is redeemed (best-effort).
    #[serde(default)]
    pub entitlement_url: Option<String>,

    /// HMAC secret for signing entitlement payloads.
    #[serde(default)]
    pub entitlement_secret: Option<String>,
}

fn default_database_url() -> String {
    "sqlite://data/keys.db".to_string()
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_argon2_memory_kib() -> u32 {
    19 * 1024
}

fn default_argon2_iterations() -> u32 {
    2
}

fn default_argon2_parallelism() -> u32 {
    1
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., API_TOKEN)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Parse environment variables into Config struct
        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }
}
