//! Error types for the SecretDraw engine.
//!
//! All errors use the `DRAW_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Roster errors
//! - 2xx: Matching errors
//! - 3xx: Group phase errors
//! - 4xx: Reveal errors
//! - 5xx: Authorization errors
//! - 6xx: Storage errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{GroupId, PhaseStamp, UserId};

/// Central error enum for all SecretDraw operations.
#[derive(Debug, Error)]
pub enum DrawError {
    // =================================================================
    // Roster Errors (1xx)
    // =================================================================
    /// Too few participating members to draw.
    #[error("DRAW_ERR_100: Invalid roster: {participating} participating, need at least {required}")]
    InvalidRoster { participating: usize, required: usize },

    /// The user is not a member of the group.
    #[error("DRAW_ERR_101: Participant not found: {0}")]
    ParticipantNotFound(UserId),

    /// The join code does not belong to this group or is malformed.
    #[error("DRAW_ERR_102: Invalid join code: {input}")]
    InvalidJoinCode { input: String },

    /// The group already holds the maximum number of members.
    #[error("DRAW_ERR_103: Roster full: {max} members")]
    RosterFull { max: usize },

    // =================================================================
    // Matching Errors (2xx)
    // =================================================================
    /// No admissible derangement found within the retry ceiling.
    #[error("DRAW_ERR_200: Infeasible constraints: no valid draw for {participants} participants after {attempts} attempts")]
    InfeasibleConstraints { attempts: usize, participants: usize },

    /// An assignment failed structural or constraint verification.
    #[error("DRAW_ERR_201: Invalid assignment: {reason}")]
    InvalidAssignment { reason: String },

    // =================================================================
    // Group Phase Errors (3xx)
    // =================================================================
    /// The group moved to another phase or cycle under the caller.
    #[error("DRAW_ERR_300: Stale group phase: expected {expected}, got {actual}")]
    StaleGroupPhase {
        expected: PhaseStamp,
        actual: PhaseStamp,
    },

    /// A conditional write lost against a concurrent writer.
    #[error("DRAW_ERR_301: Version conflict: expected v{expected}, found v{actual}")]
    VersionConflict { expected: u64, actual: u64 },

    /// The group does not exist.
    #[error("DRAW_ERR_302: Group not found: {0}")]
    GroupNotFound(GroupId),

    // =================================================================
    // Reveal Errors (4xx)
    // =================================================================
    /// The participant has no usable recipient recorded.
    #[error("DRAW_ERR_400: Missing assignment for participant {0}")]
    MissingAssignment(UserId),

    /// Spectators have nothing to reveal.
    #[error("DRAW_ERR_401: Participant {0} is not part of the draw")]
    NotParticipating(UserId),

    /// The requested action is not valid in the current reveal step.
    #[error("DRAW_ERR_402: Invalid transition: cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    /// The kiosk device was confirmed for someone other than the next giver.
    #[error("DRAW_ERR_403: Handoff mismatch: device is for {expected}, confirmed {confirmed}")]
    HandoffMismatch { expected: UserId, confirmed: UserId },

    // =================================================================
    // Authorization Errors (5xx)
    // =================================================================
    /// The actor lacks the host/admin role required for this operation.
    #[error("DRAW_ERR_500: Unauthorized: {actor} is not a host or admin")]
    Unauthorized { actor: UserId },

    // =================================================================
    // Storage Errors (6xx)
    // =================================================================
    /// The storage collaborator failed; passed through unchanged.
    #[error("DRAW_ERR_600: Persistence failure: {reason}")]
    PersistenceFailure { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Invalid configuration values or unparsable config document.
    #[error("DRAW_ERR_900: Configuration error: {0}")]
    Configuration(String),

    /// Unrecoverable internal error.
    #[error("DRAW_ERR_901: Internal error: {0}")]
    Internal(String),
}

impl DrawError {
    /// Whether the actor can resolve the error by adjusting input,
    /// re-syncing, or retrying.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidRoster { .. }
                | Self::InvalidJoinCode { .. }
                | Self::InfeasibleConstraints { .. }
                | Self::StaleGroupPhase { .. }
                | Self::VersionConflict { .. }
                | Self::InvalidTransition { .. }
                | Self::HandoffMismatch { .. }
                | Self::PersistenceFailure { .. }
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, DrawError>;

impl From<serde_json::Error> for DrawError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}
