//! Key issuance pipeline: factory → preparer → store.
//!
//! The plaintext keys are returned to the caller exactly once; only the
//! prepared records (hash + lookup token) reach storage.

use crate::error::AppError;
use crate::models::key_record::Plan;
use crate::services::{key_factory, record_preparer};
use crate::services::record_preparer::HashingParams;
use crate::store::KeyStore;

/// How many times a batch is regenerated when its insert hits a lookup-token
/// collision before the fault is surfaced.
const MAX_INSERT_ATTEMPTS: u32 = 3;

/// Issue a batch of keys for a plan.
///
/// A collision between a fresh lookup token and a stored one is astronomically
/// unlikely (the factory emits 60 bits of entropy per key) but not assumed
/// away: the insert fails atomically and the whole batch is regenerated, up
/// to [`MAX_INSERT_ATTEMPTS`] times.
pub async fn issue_keys(
    store: &KeyStore,
    params: HashingParams,
    plan: Plan,
    count: u16,
) -> Result<Vec<String>, AppError> {
    for attempt in 1..=MAX_INSERT_ATTEMPTS {
        let keys = key_factory::generate_keys(plan, count)?;
        let records = record_preparer::prepare_records(params, plan, keys.clone()).await?;

        match store.insert(&records).await {
            Ok(()) => {
                tracing::info!(plan = plan.as_str(), count, "issued key batch");
                return Ok(keys);
            }
            Err(AppError::LookupCollision) if attempt < MAX_INSERT_ATTEMPTS => {
                tracing::warn!(attempt, "lookup token collision on insert, regenerating batch");
            }
            Err(err) => return Err(err),
        }
    }

    Err(AppError::LookupCollision)
}
