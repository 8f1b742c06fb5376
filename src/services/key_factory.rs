//! Plaintext key generation.
//!
//! Keys have the form `WONDER-<PLAN>-<SEGMENT>-<SEGMENT>` with six-character
//! segments drawn from a 32-character alphabet that drops visually ambiguous
//! characters (`0/O`, `1/I`), so keys survive being read over voice chat or
//! retyped from a screenshot.
//!
//! The factory guarantees format, not global uniqueness: twelve random
//! characters give 2^60 combinations, but the issuance pipeline still checks
//! for lookup collisions at insert time instead of assuming them away.

use rand::Rng;

use crate::error::AppError;
use crate::models::key_record::Plan;

/// Product prefix embedded in every key.
const PREFIX: &str = "WONDER";

/// Alphabet without `0/O` and `1/I`.
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const SEGMENT_LEN: usize = 6;

/// Largest batch a single generate call may issue.
pub const MAX_BATCH: u16 = 100;

/// Generate `count` plaintext keys for a plan, `1 <= count <= 100`.
///
/// Uses `rand::rng()`, a ChaCha-based CSPRNG, so key segments are suitable
/// as security-sensitive tokens.
///
/// # Errors
///
/// Returns a validation fault if `count` is out of range.
pub fn generate_keys(plan: Plan, count: u16) -> Result<Vec<String>, AppError> {
    if count < 1 || count > MAX_BATCH {
        return Err(AppError::InvalidRequest(format!(
            "count must be between 1 and {MAX_BATCH}"
        )));
    }

    let mut rng = rand::rng();
    Ok((0..count).map(|_| make_key(plan, &mut rng)).collect())
}

fn make_key(plan: Plan, rng: &mut impl Rng) -> String {
    format!(
        "{PREFIX}-{}-{}-{}",
        plan.as_str(),
        segment(rng),
        segment(rng)
    )
}

fn segment(rng: &mut impl Rng) -> String {
    (0..SEGMENT_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}
