//! Key verification.
//!
//! Resolves a plaintext key to its record and authenticates possession
//! without ever re-deriving or storing plaintext. Verification is strictly
//! read-only.

use crate::error::AppError;
use crate::models::key_record::{KeyStatus, Plan};
use crate::services::record_preparer;
use crate::store::KeyStore;

/// Outcome of verifying a plaintext key.
///
/// Only a hash match against an `unused` record is `Valid`. Everything else
/// is an expected business outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The key exists, is unused, and the plaintext matches the stored hash.
    /// `lookup_id` is handed back for a subsequent redemption.
    Valid { plan: Plan, lookup_id: String },
    /// No record carries this key's lookup token.
    NotFound,
    /// The key was already consumed.
    Redeemed,
    /// The key was administratively disabled.
    Revoked,
    /// A record exists under this lookup token but the hash does not match.
    Invalid,
}

impl VerifyOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerifyOutcome::Valid { .. })
    }

    /// The `reason` string reported to callers; `None` for `Valid`.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            VerifyOutcome::Valid { .. } => None,
            VerifyOutcome::NotFound => Some("not_found"),
            VerifyOutcome::Redeemed => Some(KeyStatus::Redeemed.as_str()),
            VerifyOutcome::Revoked => Some(KeyStatus::Revoked.as_str()),
            VerifyOutcome::Invalid => Some("invalid"),
        }
    }
}

/// Verify a plaintext key.
///
/// 1. Derive the lookup token with the same digest used at preparation time.
/// 2. Fetch the record; absent → `NotFound`.
/// 3. A non-`unused` record reports its status without running Argon2 — a
///    consumed key cannot become usable again, so demanding proof would only
///    burn CPU.
/// 4. Check the plaintext against the stored hash; mismatch → `Invalid`.
pub async fn verify_key(store: &KeyStore, plaintext: &str) -> Result<VerifyOutcome, AppError> {
    let lookup_id = record_preparer::lookup_id(plaintext);

    let Some(record) = store.find_by_lookup_id(&lookup_id).await? else {
        return Ok(VerifyOutcome::NotFound);
    };

    match record.status {
        KeyStatus::Redeemed => return Ok(VerifyOutcome::Redeemed),
        KeyStatus::Revoked => return Ok(VerifyOutcome::Revoked),
        KeyStatus::Unused => {}
    }

    if record_preparer::check_hash(record.hash, plaintext.to_string()).await? {
        Ok(VerifyOutcome::Valid {
            plan: record.plan,
            lookup_id,
        })
    } else {
        Ok(VerifyOutcome::Invalid)
    }
}
