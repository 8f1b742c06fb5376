//! Key management HTTP handlers.
//!
//! - `POST /api/v1/keys/generate` — issue a key batch (issuer token required)
//! - `POST /api/v1/keys/verify` — check a key without consuming it
//! - `POST /api/v1/keys/redeem` — consume a key exactly once
//! - `POST /api/v1/keys/revoke` — administratively disable a key (issuer token)

use axum::{Json, extract::State};

use crate::AppState;
use crate::error::AppError;
use crate::models::requests::{
    GenerateRequest, GenerateResponse, RedeemRequest, RedeemResponse, RevokeRequest,
    RevokeResponse, VerifyRequest, VerifyResponse,
};
use crate::services::redemption::{self, RedeemOutcome};
use crate::services::verification::{self, VerifyOutcome};
use crate::services::issuance;

/// Keys shorter than this cannot be real issued keys; rejected before any
/// store access.
const MIN_KEY_LEN: usize = 8;

const MIN_REDEEMER_LEN: usize = 3;

fn validate_key(key: &str) -> Result<(), AppError> {
    if key.len() < MIN_KEY_LEN {
        return Err(AppError::InvalidRequest(format!(
            "key must be at least {MIN_KEY_LEN} characters"
        )));
    }
    Ok(())
}

/// Issue a batch of keys.
///
/// # Response (200)
///
/// ```json
/// { "keys": ["WONDER-PREMIUM-AB12CD-EF34GH", "..."] }
/// ```
///
/// The plaintext keys are returned exactly once; only their hashes and
/// lookup tokens are stored.
pub async fn generate_keys(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    // Count bounds are enforced by the factory before any hashing happens
    let keys = issuance::issue_keys(&state.store, state.hashing, request.plan, request.count).await?;

    Ok(Json(GenerateResponse { keys }))
}

/// Verify a key without consuming it.
///
/// # Response (200)
///
/// ```json
/// { "valid": true, "plan": "PREMIUM" }
/// { "valid": false, "reason": "not_found" }
/// ```
///
/// Verification never mutates state; an unused key stays unused.
pub async fn verify_key(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AppError> {
    validate_key(&request.key)?;

    let outcome = verification::verify_key(&state.store, &request.key).await?;

    Ok(Json(match outcome {
        VerifyOutcome::Valid { plan, .. } => VerifyResponse {
            valid: true,
            plan: Some(plan),
            reason: None,
        },
        other => VerifyResponse {
            valid: false,
            plan: None,
            reason: other.reason(),
        },
    }))
}

/// Redeem a key for a redeemer, exactly once.
///
/// # Response (200)
///
/// ```json
/// { "success": true, "plan": "VIP" }
/// { "success": false, "reason": "conflict" }
/// ```
///
/// A configured entitlement endpoint is notified off the request path; its
/// failure never affects the response or the stored redemption.
pub async fn redeem_key(
    State(state): State<AppState>,
    Json(request): Json<RedeemRequest>,
) -> Result<Json<RedeemResponse>, AppError> {
    validate_key(&request.key)?;
    if request.redeemer_id.len() < MIN_REDEEMER_LEN {
        return Err(AppError::InvalidRequest(format!(
            "redeemer_id must be at least {MIN_REDEEMER_LEN} characters"
        )));
    }

    match redemption::verify_and_redeem(&state.store, &request.key, &request.redeemer_id).await? {
        RedeemOutcome::Redeemed { plan, lookup_id } => {
            if let Some(notifier) = state.notifier.clone() {
                let redeemer_id = request.redeemer_id.clone();
                // Best-effort: the redemption is already durable
                tokio::spawn(async move {
                    notifier.notify_redemption(plan, lookup_id, redeemer_id).await;
                });
            }

            Ok(Json(RedeemResponse {
                success: true,
                plan: Some(plan),
                reason: None,
            }))
        }
        RedeemOutcome::Rejected(reason) => Ok(Json(RedeemResponse {
            success: false,
            plan: None,
            reason: Some(reason),
        })),
    }
}

/// Administratively revoke a key by its lookup token.
///
/// # Response (200)
///
/// ```json
/// { "success": true }
/// ```
///
/// `success: false` means the record was absent or already terminal
/// (redeemed keys stay redeemed).
pub async fn revoke_key(
    State(state): State<AppState>,
    Json(request): Json<RevokeRequest>,
) -> Result<Json<RevokeResponse>, AppError> {
    if request.lookup_id.is_empty() {
        return Err(AppError::InvalidRequest(
            "lookup_id must not be empty".to_string(),
        ));
    }

    let success = state.store.revoke(&request.lookup_id).await?;
    if success {
        tracing::info!(lookup_id = %request.lookup_id, "key revoked");
    }

    Ok(Json(RevokeResponse { success }))
}
