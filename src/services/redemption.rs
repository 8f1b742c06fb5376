//! One-time key redemption.
//!
//! Redemption is the single `unused → redeemed` compare-and-set. Between a
//! caller's verify and its redeem another caller may consume the key; the
//! store's CAS closes that window, so N racing redeemers produce exactly one
//! success and N-1 conflicts.

use crate::error::AppError;
use crate::models::key_record::{KeyStatus, Plan};
use crate::services::verification::{self, VerifyOutcome};
use crate::store::{KeyStore, TransitionMetadata};

/// Outcome of a redemption attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// The key was consumed by this caller.
    Redeemed { plan: Plan, lookup_id: String },
    /// The key could not be consumed; the reason string matches the verify
    /// vocabulary, plus `"conflict"` when a concurrent redemption won.
    Rejected(&'static str),
}

/// Attempt the one-time transition for an already-verified key.
///
/// Returns `false` when the record is no longer `unused` — i.e. a concurrent
/// redemption (or a revoke) got there first.
pub async fn redeem_key(
    store: &KeyStore,
    lookup_id: &str,
    redeemer_id: &str,
) -> Result<bool, AppError> {
    store
        .compare_and_set_status(
            lookup_id,
            KeyStatus::Unused,
            KeyStatus::Redeemed,
            TransitionMetadata::redemption(redeemer_id),
        )
        .await
}

/// Verify a plaintext key and, if valid, redeem it.
///
/// Losing the verify-to-redeem race is reported as `"conflict"` for the
/// caller to decide whether to retry; it is never retried here.
pub async fn verify_and_redeem(
    store: &KeyStore,
    plaintext: &str,
    redeemer_id: &str,
) -> Result<RedeemOutcome, AppError> {
    match verification::verify_key(store, plaintext).await? {
        VerifyOutcome::Valid { plan, lookup_id } => {
            if redeem_key(store, &lookup_id, redeemer_id).await? {
                tracing::info!(
                    plan = plan.as_str(),
                    lookup_id = %lookup_id,
                    redeemer_id = %redeemer_id,
                    "key redeemed"
                );
                Ok(RedeemOutcome::Redeemed { plan, lookup_id })
            } else {
                Ok(RedeemOutcome::Rejected("conflict"))
            }
        }
        other => Ok(RedeemOutcome::Rejected(other.reason().unwrap_or("invalid"))),
    }
}
