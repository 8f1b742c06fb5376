//! Request and response bodies for the key endpoints.
//!
//! Business outcomes travel in 200 responses with a `reason` field; only
//! validation faults, auth failures and store faults become error statuses.

use serde::{Deserialize, Serialize};

use crate::models::key_record::Plan;

/// Request to issue a batch of keys.
///
/// # JSON Example
///
/// ```json
/// { "plan": "PREMIUM", "count": 3 }
/// ```
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub plan: Plan,

    /// Number of keys to issue, 1..=100. Defaults to 1.
    #[serde(default = "default_count")]
    pub count: u16,
}

fn default_count() -> u16 {
    1
}

/// Response to a generate request.
///
/// The plaintext keys appear here once and are never retrievable again.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub keys: Vec<String>,
}

/// Request to verify a key without consuming it.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub key: String,
}

/// Verification result.
///
/// ```json
/// { "valid": true, "plan": "PREMIUM" }
/// { "valid": false, "reason": "redeemed" }
/// ```
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// Request to redeem a key for a specific redeemer.
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub key: String,

    /// Who is redeeming. `userId` is accepted for compatibility with the
    /// original API.
    #[serde(alias = "userId")]
    pub redeemer_id: String,
}

/// Redemption result.
///
/// ```json
/// { "success": true, "plan": "VIP" }
/// { "success": false, "reason": "conflict" }
/// ```
#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// Administrative request to revoke a key by its lookup token.
#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    pub lookup_id: String,
}

/// Revocation result. `success: false` means the record was absent or
/// already terminal.
#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub success: bool,
}
