//! Conversion of plaintext keys into persistable records.
//!
//! Two one-way functions per key:
//!
//! - **lookup digest**: SHA-256, hex, truncated to 32 characters. Cheap and
//!   deterministic; lets verification find the candidate record in one
//!   indexed read instead of running the slow hash against every row.
//! - **verification hash**: Argon2id as a PHC string with tunable cost
//!   factors. The only proof of possession; expensive by design so a stolen
//!   table resists offline brute force.
//!
//! Argon2 work runs on the blocking pool — a 19 MiB hash on the async
//! executor would stall unrelated requests.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::error::AppError;
use crate::models::key_record::{NewKeyRecord, Plan};

/// Fixed length of the lookup token (hex characters).
pub const LOOKUP_ID_LEN: usize = 32;

/// Argon2id cost factors, loaded from config.
#[derive(Debug, Clone, Copy)]
pub struct HashingParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl HashingParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            memory_kib: config.argon2_memory_kib,
            iterations: config.argon2_iterations,
            parallelism: config.argon2_parallelism,
        }
    }

    fn hasher(&self) -> Result<Argon2<'static>, AppError> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|err| AppError::Hashing(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Derive the lookup token for a plaintext key.
///
/// Index use only — a lookup token is not proof of possession.
pub fn lookup_id(plaintext: &str) -> String {
    let digest = Sha256::digest(plaintext.as_bytes());
    let mut token = hex::encode(digest);
    token.truncate(LOOKUP_ID_LEN);
    token
}

/// Prepare persistable records for a batch of plaintext keys.
///
/// Each record gets a fresh random salt, so identical plaintexts would still
/// produce distinct hashes. The plaintext itself never leaves this function
/// toward storage.
pub async fn prepare_records(
    params: HashingParams,
    plan: Plan,
    keys: Vec<String>,
) -> Result<Vec<NewKeyRecord>, AppError> {
    tokio::task::spawn_blocking(move || {
        let hasher = params.hasher()?;
        keys.iter()
            .map(|key| {
                let salt = SaltString::generate(&mut OsRng);
                let hash = hasher
                    .hash_password(key.as_bytes(), &salt)
                    .map_err(|err| AppError::Hashing(err.to_string()))?
                    .to_string();
                Ok(NewKeyRecord {
                    plan,
                    hash,
                    lookup_id: lookup_id(key),
                    created_at: Utc::now(),
                })
            })
            .collect()
    })
    .await
    .map_err(|err| AppError::Hashing(format!("hashing task failed: {err}")))?
}

/// Check a plaintext key against a stored PHC hash.
///
/// Cost factors are read from the PHC string itself, so hashes created under
/// older parameters keep verifying after a config change.
pub async fn check_hash(stored_hash: String, plaintext: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        let parsed =
            PasswordHash::new(&stored_hash).map_err(|err| AppError::Hashing(err.to_string()))?;
        Ok(Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|err| AppError::Hashing(format!("hashing task failed: {err}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> HashingParams {
        HashingParams {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn lookup_id_is_deterministic_and_fixed_length() {
        let a = lookup_id("WONDER-VIP-ABCDEF-GHJKLM");
        let b = lookup_id("WONDER-VIP-ABCDEF-GHJKLM");
        assert_eq!(a, b);
        assert_eq!(a.len(), LOOKUP_ID_LEN);
        assert_ne!(a, lookup_id("WONDER-VIP-ABCDEF-GHJKLN"));
    }

    #[tokio::test]
    async fn prepared_records_carry_phc_hashes() {
        let keys = vec!["WONDER-PREMIUM-AAAAAA-BBBBBB".to_string()];
        let records = prepare_records(fast_params(), Plan::Premium, keys.clone())
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].hash.starts_with("$argon2id$"));
        assert_eq!(records[0].lookup_id, lookup_id(&keys[0]));
        // The plaintext must not appear anywhere in the record
        assert!(!records[0].hash.contains(&keys[0]));
    }

    #[tokio::test]
    async fn check_hash_accepts_matching_plaintext_only() {
        let key = "WONDER-BASICO-CCCCCC-DDDDDD".to_string();
        let records = prepare_records(fast_params(), Plan::Basico, vec![key.clone()])
            .await
            .unwrap();
        let hash = records[0].hash.clone();

        assert!(check_hash(hash.clone(), key).await.unwrap());
        assert!(
            !check_hash(hash, "WONDER-BASICO-CCCCCC-DDDDDE".to_string())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn identical_plaintexts_get_distinct_salts() {
        let key = "WONDER-VIP-EEEEEE-FFFFFF".to_string();
        let records = prepare_records(fast_params(), Plan::Vip, vec![key.clone(), key])
            .await
            .unwrap();
        assert_ne!(records[0].hash, records[1].hash);
        assert_eq!(records[0].lookup_id, records[1].lookup_id);
    }
}
