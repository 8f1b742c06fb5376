//! Error types and HTTP error response handling.
//!
//! Only genuine faults live here. Expected business outcomes (`not_found`,
//! `redeemed`, `revoked`, `invalid`, `conflict`) are ordinary result values
//! carried by [`crate::services::verification::VerifyOutcome`] and the redeem
//! path, never errors — they are frequent and must not ride on exceptional
//! control flow.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Validation faults**: malformed plan/count/key/redeemer, rejected
///   before the store is touched
/// - **Authentication**: missing or wrong issuer token
/// - **Store faults**: sqlx errors, lookup-token collisions
/// - **Hashing faults**: Argon2 failures (corrupt stored hash, bad params)
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., I/O error, lock timeout).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Issuer token is missing or does not match.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid issuer token")]
    Unauthorized,

    /// Two records would share a lookup token. Inserts fail rather than
    /// overwrite; the issuance pipeline regenerates and retries.
    ///
    /// Returns HTTP 500 if it survives the bounded retries.
    #[error("Lookup token collision")]
    LookupCollision,

    /// Password-hashing failure (invalid cost parameters or a stored hash
    /// that does not parse as a PHC string).
    #[error("Hashing error: {0}")]
    Hashing(String),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String names the violated constraint.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Store and hashing faults are logged server-side and surfaced as a generic
/// 500 so internals never leak to callers.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(ref err) => {
                tracing::error!("Store fault: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::LookupCollision => {
                tracing::error!("Lookup token collision survived regeneration retries");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Hashing(ref err) => {
                tracing::error!("Hashing fault: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
