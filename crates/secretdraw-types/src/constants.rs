//! System-wide constants for the SecretDraw engine.

/// Default retry ceiling for the rejection-sampling matcher.
pub const DEFAULT_MAX_DRAW_ATTEMPTS: usize = 1000;

/// Smallest participating roster that admits a derangement.
pub const MIN_PARTICIPANTS: usize = 2;

/// Maximum number of members (participants + spectators) per group.
pub const DEFAULT_MAX_PARTICIPANTS: usize = 500;

/// Number of decimal digits in a join code.
pub const JOIN_CODE_DIGITS: usize = 6;

/// Smallest join code value (no leading zero).
pub const JOIN_CODE_MIN: u32 = 100_000;

/// Largest join code value.
pub const JOIN_CODE_MAX: u32 = 999_999;

/// Domain separator mixed into assignment fingerprints.
pub const FINGERPRINT_DOMAIN: &[u8] = b"secretdraw:assignment:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "SecretDraw";
