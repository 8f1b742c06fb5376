//! Durable key store over SQLite.
//!
//! The store is the only shared mutable state in the system. Its concurrency
//! primitive is `compare_and_set_status`: a single conditional `UPDATE` whose
//! `rows_affected` count tells the caller whether the transition applied.
//! SQLite serializes writers, so two concurrent compare-and-sets on the same
//! `lookup_id` cannot interleave — exactly one observes the expected status.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::key_record::{KeyRecord, KeyStatus, NewKeyRecord};

/// Metadata written together with a successful status transition.
#[derive(Debug, Clone, Default)]
pub struct TransitionMetadata {
    pub redeemed_at: Option<DateTime<Utc>>,
    pub redeemed_by: Option<String>,
}

impl TransitionMetadata {
    /// Metadata for a redemption: stamps the redeemer and the current time.
    pub fn redemption(redeemer_id: &str) -> Self {
        Self {
            redeemed_at: Some(Utc::now()),
            redeemed_by: Some(redeemer_id.to_string()),
        }
    }
}

/// Handle to the durable key store.
#[derive(Debug, Clone)]
pub struct KeyStore {
    pool: DbPool,
}

impl KeyStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for health probes.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Insert a batch of prepared records, all-or-nothing.
    ///
    /// Every record starts `unused`. The UNIQUE index on `lookup_id` makes a
    /// lookup-token collision fail the whole transaction with
    /// [`AppError::LookupCollision`] instead of shadowing an existing key;
    /// the issuance pipeline reacts by regenerating the batch.
    pub async fn insert(&self, records: &[NewKeyRecord]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO key_records (id, plan, status, created_at, redeemed_at, redeemed_by, hash, lookup_id)
                VALUES (?, ?, 'unused', ?, NULL, NULL, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(record.plan)
            .bind(record.created_at)
            .bind(&record.hash)
            .bind(&record.lookup_id)
            .execute(&mut *tx)
            .await
            .map_err(|err| match &err {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    AppError::LookupCollision
                }
                _ => AppError::Database(err),
            })?;
        }

        // Commit all records atomically; a failure above leaves nothing behind
        tx.commit().await?;

        Ok(())
    }

    /// Read-only lookup by lookup token.
    pub async fn find_by_lookup_id(&self, lookup_id: &str) -> Result<Option<KeyRecord>, AppError> {
        let record = sqlx::query_as::<_, KeyRecord>(
            r#"
            SELECT id, plan, status, created_at, redeemed_at, redeemed_by, hash, lookup_id
            FROM key_records
            WHERE lookup_id = ?
            "#,
        )
        .bind(lookup_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Atomically transition a record's status, only if it currently equals
    /// `expected`.
    ///
    /// Returns `true` if the transition applied. Returns `false` without side
    /// effects when the precondition fails — the record is absent or another
    /// caller already moved it. One statement, judged by `rows_affected`, so
    /// the read-check-write cannot interleave with a concurrent transition on
    /// the same record.
    pub async fn compare_and_set_status(
        &self,
        lookup_id: &str,
        expected: KeyStatus,
        new: KeyStatus,
        metadata: TransitionMetadata,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE key_records
            SET status = ?,
                redeemed_at = COALESCE(?, redeemed_at),
                redeemed_by = COALESCE(?, redeemed_by)
            WHERE lookup_id = ? AND status = ?
            "#,
        )
        .bind(new)
        .bind(metadata.redeemed_at)
        .bind(metadata.redeemed_by)
        .bind(lookup_id)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Administratively revoke a key.
    ///
    /// Only `unused` records move; `redeemed` and `revoked` are terminal, so
    /// revoking them returns `false`.
    pub async fn revoke(&self, lookup_id: &str) -> Result<bool, AppError> {
        self.compare_and_set_status(
            lookup_id,
            KeyStatus::Unused,
            KeyStatus::Revoked,
            TransitionMetadata::default(),
        )
        .await
    }
}
