//! Host-only constraint edits and early feedback.
//!
//! Constraints can only change while the group is OPEN. Once LOCKED the
//! assignment was computed against them, so edits are refused with
//! `StaleGroupPhase` until the host resets the draw.
//!
//! Every edit returns a [`ConstraintReview`] built from the same
//! admissibility predicate the matcher uses, so a host learns that a member
//! has been boxed in before the draw fails.

use secretdraw_matchcore::{CandidateReport, active_subset, candidate_report};
use secretdraw_types::{
    Actor, DrawError, DrawStore, GroupId, GroupPhase, Participant, Result, UserId, constants,
};

/// A partial edit of one member's constraints. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintPatch {
    /// `Some(None)` clears the tag.
    pub exclusion_group: Option<Option<String>>,
    /// `Some(None)` clears the tag.
    pub strict_pool: Option<Option<String>>,
    pub participates: Option<bool>,
    pub add_exclusions: Vec<UserId>,
    pub remove_exclusions: Vec<UserId>,
}

impl ConstraintPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exclusion group. An empty tag clears it.
    #[must_use]
    pub fn exclusion_group(mut self, tag: impl Into<String>) -> Self {
        self.exclusion_group = Some(non_empty(tag.into()));
        self
    }

    #[must_use]
    pub fn clear_exclusion_group(mut self) -> Self {
        self.exclusion_group = Some(None);
        self
    }

    /// Set the strict pool. An empty tag clears it.
    #[must_use]
    pub fn strict_pool(mut self, tag: impl Into<String>) -> Self {
        self.strict_pool = Some(non_empty(tag.into()));
        self
    }

    #[must_use]
    pub fn clear_strict_pool(mut self) -> Self {
        self.strict_pool = Some(None);
        self
    }

    /// `false` turns the member into a spectator.
    #[must_use]
    pub fn participates(mut self, value: bool) -> Self {
        self.participates = Some(value);
        self
    }

    #[must_use]
    pub fn exclude(mut self, user_id: UserId) -> Self {
        self.add_exclusions.push(user_id);
        self
    }

    #[must_use]
    pub fn unexclude(mut self, user_id: UserId) -> Self {
        self.remove_exclusions.push(user_id);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply_to(&self, member: &mut Participant) {
        if let Some(tag) = &self.exclusion_group {
            member.exclusion_group.clone_from(tag);
        }
        if let Some(tag) = &self.strict_pool {
            member.strict_pool.clone_from(tag);
        }
        if let Some(value) = self.participates {
            member.participates = value;
        }
        for id in &self.remove_exclusions {
            member.exclusions.remove(id);
        }
        // Self-exclusion is implicit.
        member.exclusions.extend(
            self.add_exclusions
                .iter()
                .copied()
                .filter(|id| *id != member.user_id),
        );
    }
}

fn non_empty(tag: String) -> Option<String> {
    (!tag.is_empty()).then_some(tag)
}

/// How drawable a roster is under its current constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintReview {
    pub participating: usize,
    /// Participating members with no admissible recipient or no admissible
    /// giver.
    pub dead_ends: Vec<CandidateReport>,
}

impl ConstraintReview {
    /// No obstacle the lobby can detect. The matcher may still exhaust its
    /// retry ceiling on a tight roster.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.participating >= constants::MIN_PARTICIPANTS && self.dead_ends.is_empty()
    }
}

/// Review a roster snapshot.
#[must_use]
pub fn review_constraints(roster: &[Participant]) -> ConstraintReview {
    let pool = active_subset(roster);
    let dead_ends = candidate_report(&pool)
        .into_iter()
        .filter(CandidateReport::is_dead_end)
        .collect();
    ConstraintReview {
        participating: pool.len(),
        dead_ends,
    }
}

/// Apply `patch` to `target`'s constraints and review the resulting roster.
///
/// # Errors
/// - `Unauthorized` unless `actor` is a host or admin
/// - `StaleGroupPhase` once the group is LOCKED
/// - `ParticipantNotFound` if `target` or an added exclusion is not a member
pub fn apply_constraints<S: DrawStore + ?Sized>(
    store: &mut S,
    group_id: GroupId,
    actor: &Actor,
    target: UserId,
    patch: &ConstraintPatch,
) -> Result<ConstraintReview> {
    actor.require_privileged()?;

    let group = store.fetch_group(group_id)?;
    group.ensure_phase(GroupPhase::Open)?;

    let mut roster = store.fetch_roster(group_id)?;
    if let Some(unknown) = patch
        .add_exclusions
        .iter()
        .find(|id| !roster.iter().any(|p| p.user_id == **id))
    {
        return Err(DrawError::ParticipantNotFound(*unknown));
    }
    let member = roster
        .iter_mut()
        .find(|p| p.user_id == target)
        .ok_or(DrawError::ParticipantNotFound(target))?;

    patch.apply_to(member);
    store.upsert_participant(group_id, member.clone())?;

    let review = review_constraints(&roster);
    if review.is_drawable() {
        tracing::info!(
            group = %group_id,
            host = %actor.user_id,
            target = %target,
            participating = review.participating,
            "Constraints updated"
        );
    } else {
        tracing::warn!(
            group = %group_id,
            host = %actor.user_id,
            target = %target,
            participating = review.participating,
            dead_ends = review.dead_ends.len(),
            "Constraints updated: roster not drawable"
        );
    }
    Ok(review)
}
