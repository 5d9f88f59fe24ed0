//! Join code generation.
//!
//! Codes are uniform over `JOIN_CODE_MIN..=JOIN_CODE_MAX` (six digits, no
//! leading zero). Uniqueness is per store: allocation re-rolls until the
//! store reports the code free.

use rand::Rng;
use secretdraw_types::{DrawError, DrawStore, JoinCode, Result, constants};

/// Re-rolls before allocation gives up. With 900 000 codes this only
/// trips on a nearly full store or a broken RNG.
const MAX_ALLOCATION_ATTEMPTS: usize = 32;

/// A random six-digit code.
pub fn generate_join_code<R: Rng + ?Sized>(rng: &mut R) -> Result<JoinCode> {
    let value = rng.gen_range(constants::JOIN_CODE_MIN..=constants::JOIN_CODE_MAX);
    JoinCode::from_number(value)
        .ok_or_else(|| DrawError::Internal(format!("join code {value} out of range")))
}

/// A code no group in `store` currently uses.
///
/// # Errors
/// `Internal` after `MAX_ALLOCATION_ATTEMPTS` collisions; storage errors
/// are passed through.
pub fn allocate_join_code<S: DrawStore + ?Sized, R: Rng + ?Sized>(
    store: &S,
    rng: &mut R,
) -> Result<JoinCode> {
    for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
        let code = generate_join_code(rng)?;
        if store.find_group_by_code(&code)?.is_none() {
            return Ok(code);
        }
        tracing::debug!(code = %code, attempt, "Join code collision");
    }
    tracing::error!(
        attempts = MAX_ALLOCATION_ATTEMPTS,
        "Join code allocation exhausted"
    );
    Err(DrawError::Internal(format!(
        "no free join code after {MAX_ALLOCATION_ATTEMPTS} attempts"
    )))
}
