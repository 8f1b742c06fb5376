//! Issuer token authentication middleware.
//!
//! `generate` and `revoke` are restricted to trusted issuers. The issuer
//! presents the shared token in the `x-api-token` header; only its SHA-256
//! digest is kept in memory and compared, so neither logs nor state dumps
//! expose the token itself.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::AppState;
use crate::error::AppError;

/// SHA-256 hex digest of a token, as held in [`AppState`].
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Reject requests whose `x-api-token` header does not match the configured
/// issuer token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get("x-api-token")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    // Fixed-length digest comparison instead of raw string comparison
    if token_digest(token) != state.api_token_hash {
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
