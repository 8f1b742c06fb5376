//! Key record model — the sole persistent entity.
//!
//! A record never holds the plaintext key. It carries two derived values:
//!
//! - `lookup_id`: a fast truncated SHA-256 digest used purely as an index
//! - `hash`: an Argon2id PHC string proving possession of the plaintext
//!
//! Splitting the cheap index from the expensive proof keeps verification at
//! one O(1) lookup plus a single slow hash check, while a stolen table still
//! resists offline brute force.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription plan a key belongs to.
///
/// Stored and serialized in its uppercase wire form (`BASICO`, `PREMIUM`,
/// `VIP`) and embedded verbatim in the plaintext key string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Plan {
    Basico,
    Premium,
    Vip,
}

impl Plan {
    /// Uppercase wire/segment form, as embedded in key strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Basico => "BASICO",
            Plan::Premium => "PREMIUM",
            Plan::Vip => "VIP",
        }
    }
}

/// Lifecycle status of a key.
///
/// Transitions are one-way: `unused → redeemed` or `unused → revoked`.
/// `redeemed` and `revoked` are terminal; no operation leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum KeyStatus {
    Unused,
    Redeemed,
    Revoked,
}

impl KeyStatus {
    /// Lowercase form used as the `reason` value in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStatus::Unused => "unused",
            KeyStatus::Redeemed => "redeemed",
            KeyStatus::Revoked => "revoked",
        }
    }
}

/// A stored key record.
///
/// # Database Table
///
/// Maps to the `key_records` table. Rows are never deleted; redeemed and
/// revoked records are retained for audit.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeyRecord {
    /// Unique identifier, assigned at insert, immutable
    pub id: Uuid,

    /// Plan this key grants, immutable
    pub plan: Plan,

    /// Current lifecycle status
    pub status: KeyStatus,

    /// When the record was inserted
    pub created_at: DateTime<Utc>,

    /// Set exactly once, on redemption
    pub redeemed_at: Option<DateTime<Utc>>,

    /// Identifier of the redeemer; set exactly once, on redemption
    pub redeemed_by: Option<String>,

    /// Argon2id PHC string over the plaintext key
    ///
    /// Slow and memory-hard; the only proof of possession the system keeps.
    pub hash: String,

    /// Truncated SHA-256 hex digest of the plaintext (32 chars)
    ///
    /// Index only — holding a lookup_id proves nothing.
    pub lookup_id: String,
}

/// A prepared record ready for insertion, produced by the record preparer.
///
/// Only the preparer constructs these, so a malformed record is
/// unrepresentable by the time the store sees it.
#[derive(Debug, Clone)]
pub struct NewKeyRecord {
    pub plan: Plan,
    pub hash: String,
    pub lookup_id: String,
    pub created_at: DateTime<Utc>,
}
