//! Group lifecycle types.
//!
//! A group alternates between two phases:
//! **OPEN → LOCKED → (reset) → OPEN**
//!
//! During OPEN, members join and the host edits constraints.
//! During LOCKED, the assignment exists, constraints are frozen, and members
//! reveal their recipient. Every lock and every reset bumps the group
//! `version`, so a [`PhaseStamp`] names exactly one draw cycle.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DrawError, GroupId, JoinCode, Result, UserId};

/// The two phases of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupPhase {
    /// Roster and constraints editable; no assignment.
    Open,
    /// Assignment persisted; reveals allowed; constraints frozen.
    Locked,
}

impl fmt::Display for GroupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Locked => write!(f, "LOCKED"),
        }
    }
}

/// Phase plus version: identifies one draw cycle of one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseStamp {
    pub phase: GroupPhase,
    pub version: u64,
}

impl fmt::Display for PhaseStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@v{}", self.phase, self.version)
    }
}

/// A gift-exchange group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    /// The member who created the group; always privileged.
    pub host: UserId,
    pub code: JoinCode,
    pub phase: GroupPhase,
    /// Optimistic concurrency token. Bumped on every phase transition.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub locked_at: Option<DateTime<Utc>>,
}

impl Group {
    #[must_use]
    pub fn new(host: UserId, code: JoinCode) -> Self {
        Self {
            id: GroupId::new(),
            host,
            code,
            phase: GroupPhase::Open,
            version: 0,
            created_at: Utc::now(),
            locked_at: None,
        }
    }

    #[must_use]
    pub fn stamp(&self) -> PhaseStamp {
        PhaseStamp {
            phase: self.phase,
            version: self.version,
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.phase == GroupPhase::Locked
    }

    /// Fails with `StaleGroupPhase` unless the group is in `expected`.
    pub fn ensure_phase(&self, expected: GroupPhase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(DrawError::StaleGroupPhase {
                expected: PhaseStamp {
                    phase: expected,
                    version: self.version,
                },
                actual: self.stamp(),
            })
        }
    }

    /// Fails with `StaleGroupPhase` unless the group is still in the cycle
    /// named by `expected`.
    pub fn ensure_stamp(&self, expected: PhaseStamp) -> Result<()> {
        if self.stamp() == expected {
            Ok(())
        } else {
            Err(DrawError::StaleGroupPhase {
                expected,
                actual: self.stamp(),
            })
        }
    }

    /// Fails with `VersionConflict` unless the group is still at `expected`.
    pub fn ensure_version(&self, expected: u64) -> Result<()> {
        if self.version == expected {
            Ok(())
        } else {
            Err(DrawError::VersionConflict {
                expected,
                actual: self.version,
            })
        }
    }

    /// Move into LOCKED. Callers check the phase first.
    pub fn mark_locked(&mut self, at: DateTime<Utc>) {
        self.phase = GroupPhase::Locked;
        self.version += 1;
        self.locked_at = Some(at);
    }

    /// Move back into OPEN.
    pub fn mark_open(&mut self) {
        self.phase = GroupPhase::Open;
        self.version += 1;
        self.locked_at = None;
    }
}

// ---------------------------------------------------------------------------
// Actor / Role
// ---------------------------------------------------------------------------

/// Role of the acting user inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Host,
    Admin,
    Member,
}

/// The user performing an operation, as vouched for by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub fn host(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Host,
        }
    }

    #[must_use]
    pub fn member(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Member,
        }
    }

    #[must_use]
    pub fn is_privileged(&self) -> bool {
        matches!(self.role, Role::Host | Role::Admin)
    }

    /// Fails with `Unauthorized` unless the actor is host or admin.
    pub fn require_privileged(&self) -> Result<()> {
        if self.is_privileged() {
            Ok(())
        } else {
            Err(DrawError::Unauthorized {
                actor: self.user_id,
            })
        }
    }
}
