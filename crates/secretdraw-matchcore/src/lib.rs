//! # secretdraw-matchcore
//!
//! **Pure constrained-derangement engine for SecretDraw.**
//!
//! MatchCore is the compute plane -- it takes a roster snapshot and produces
//! an assignment in which every participating member gives to exactly one
//! other participating member. It has:
//!
//! - **Zero side effects**: no storage, no phase changes, no retries of I/O
//! - **Unbiased sampling**: Fisher–Yates permutations, rejection-tested
//! - **Bounded work**: a fixed retry ceiling, plus a preflight that rejects
//!   rosters where some member has no admissible partner at all
//! - **Non-deterministic output**: any admissible derangement is a valid
//!   answer; inject an RNG for reproducible runs

pub mod feasibility;
pub mod matcher;
pub mod verify;

pub use feasibility::{CandidateReport, candidate_report, preflight};
pub use matcher::{DrawResult, RejectionTally, active_subset, compute_matching, compute_matching_with_rng};
pub use verify::{assignment_fingerprint, fingerprint_hex, verify_assignment};
