//! Participant and the admissibility predicate.
//!
//! Every rule that decides whether a giver may draw a given recipient lives
//! here, in [`inadmissibility`]. Both the matcher and the lobby's constraint
//! review call it, so the two can never disagree.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ParticipationId, UserId};

/// One member of a group together with their draw constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Membership record id; matcher output is keyed by it.
    pub participation_id: ParticipationId,
    pub user_id: UserId,
    /// Members sharing a non-empty tag never draw each other (e.g. couples).
    pub exclusion_group: Option<String>,
    /// If set on either side, both sides must carry the same pool.
    pub strict_pool: Option<String>,
    /// Users this participant must not draw.
    pub exclusions: BTreeSet<UserId>,
    /// Spectators (`false`) stay in the group but are left out of the draw.
    pub participates: bool,
    /// Join order within the group.
    pub sequence: u64,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    /// A fresh participating member with no constraints.
    #[must_use]
    pub fn new(user_id: UserId, sequence: u64) -> Self {
        Self {
            participation_id: ParticipationId::new(),
            user_id,
            exclusion_group: None,
            strict_pool: None,
            exclusions: BTreeSet::new(),
            participates: true,
            sequence,
            joined_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_spectator(&self) -> bool {
        !self.participates
    }

    /// Exclusion-group tag, with the empty string treated as unset.
    #[must_use]
    pub fn exclusion_tag(&self) -> Option<&str> {
        non_empty(self.exclusion_group.as_deref())
    }

    /// Strict-pool tag, with the empty string treated as unset.
    #[must_use]
    pub fn pool_tag(&self) -> Option<&str> {
        non_empty(self.strict_pool.as_deref())
    }

    /// Whether this participant may draw `candidate`.
    #[must_use]
    pub fn can_draw(&self, candidate: &Participant) -> bool {
        is_admissible(self, candidate)
    }
}

fn non_empty(tag: Option<&str>) -> Option<&str> {
    tag.filter(|t| !t.is_empty())
}

/// Why a (giver, candidate) pair is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Inadmissible {
    /// Giver and candidate are the same user.
    SelfMatch,
    /// Both carry the same non-empty exclusion-group tag.
    SameExclusionGroup,
    /// At least one side has a strict pool and the pools differ.
    StrictPoolMismatch,
    /// The candidate is in the giver's exclusion set.
    SpecificExclusion,
}

impl std::fmt::Display for Inadmissible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfMatch => write!(f, "SELF_MATCH"),
            Self::SameExclusionGroup => write!(f, "SAME_EXCLUSION_GROUP"),
            Self::StrictPoolMismatch => write!(f, "STRICT_POOL_MISMATCH"),
            Self::SpecificExclusion => write!(f, "SPECIFIC_EXCLUSION"),
        }
    }
}

/// First rule that forbids `giver` from drawing `candidate`, if any.
#[must_use]
pub fn inadmissibility(giver: &Participant, candidate: &Participant) -> Option<Inadmissible> {
    if giver.user_id == candidate.user_id {
        return Some(Inadmissible::SelfMatch);
    }
    if let Some(tag) = giver.exclusion_tag() {
        if candidate.exclusion_tag() == Some(tag) {
            return Some(Inadmissible::SameExclusionGroup);
        }
    }
    let (giver_pool, candidate_pool) = (giver.pool_tag(), candidate.pool_tag());
    if (giver_pool.is_some() || candidate_pool.is_some()) && giver_pool != candidate_pool {
        return Some(Inadmissible::StrictPoolMismatch);
    }
    if giver.exclusions.contains(&candidate.user_id) {
        return Some(Inadmissible::SpecificExclusion);
    }
    None
}

/// `true` iff `giver` may be assigned `candidate` as recipient.
#[must_use]
pub fn is_admissible(giver: &Participant, candidate: &Participant) -> bool {
    inadmissibility(giver, candidate).is_none()
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Participant {
    /// Participant whose user id is derived from a single byte, so tests can
    /// refer to "A", "B", ... by a stable id.
    pub fn named(tag: u8) -> Self {
        Self::new(UserId::from_bytes([tag; 16]), u64::from(tag))
    }

    pub fn with_exclusion_group(mut self, group: &str) -> Self {
        self.exclusion_group = Some(group.to_string());
        self
    }

    pub fn with_strict_pool(mut self, pool: &str) -> Self {
        self.strict_pool = Some(pool.to_string());
        self
    }

    pub fn excluding(mut self, other: UserId) -> Self {
        self.exclusions.insert(other);
        self
    }

    pub fn spectator(mut self) -> Self {
        self.participates = false;
        self
    }
}
