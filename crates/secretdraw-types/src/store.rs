//! Storage collaborator contract.
//!
//! The engine never talks to a database directly. Everything it reads or
//! writes goes through [`DrawStore`], and every write an implementation
//! performs is announced as a [`ChangeNotice`] so subscribers (kiosk
//! sessions, lobby views) can re-derive their state from what is persisted.
//!
//! Reads take `&self`, writes take `&mut self`. The provided
//! [`DrawStore::lock_with_assignment`] and [`DrawStore::reset_group`] are
//! check-then-write sequences that roll back on a failed write; they are
//! race-free for any implementation whose `&mut self` is exclusive (such as
//! an in-process store). Implementations backed by a shared database must
//! override both with a single conditional write keyed on the group version.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    Assignment, DisplayMetadata, DrawError, Group, GroupId, GroupPhase, JoinCode, Participant,
    Result, RevealState, UserId,
};

/// Row-change notification emitted by a store after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeNotice {
    /// Phase or version of the group changed.
    GroupChanged(GroupId),
    /// A member joined or their constraints changed.
    RosterChanged(GroupId),
    /// The assignment was written or cleared.
    AssignmentChanged(GroupId),
    /// One member's reveal state was written.
    RevealStateChanged { group_id: GroupId, user_id: UserId },
}

impl ChangeNotice {
    #[must_use]
    pub fn group_id(&self) -> GroupId {
        match self {
            Self::GroupChanged(id) | Self::RosterChanged(id) | Self::AssignmentChanged(id) => *id,
            Self::RevealStateChanged { group_id, .. } => *group_id,
        }
    }
}

/// Persistent store consumed by the lobby and the reveal sequencer.
///
/// Failures are reported as [`DrawError::PersistenceFailure`] and passed
/// through the engine unchanged.
///
/// # Failure atomicity
///
/// [`add_member`](Self::add_member),
/// [`lock_with_assignment`](Self::lock_with_assignment) and
/// [`reset_group`](Self::reset_group) are all-or-nothing. When one of them
/// returns an error, the roster, display metadata, phase, assignment and
/// reveal states read back as they were before the call; only the group
/// version may have advanced. The provided bodies meet this with
/// compensating writes. If a compensating write fails too, the error says
/// so and the group needs a manual reset.
pub trait DrawStore {
    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    fn fetch_group(&self, group_id: GroupId) -> Result<Group>;

    fn find_group_by_code(&self, code: &JoinCode) -> Result<Option<Group>>;

    /// All members, participating or not, in join order.
    fn fetch_roster(&self, group_id: GroupId) -> Result<Vec<Participant>>;

    fn fetch_assignment(&self, group_id: GroupId) -> Result<Option<Assignment>>;

    /// Recorded reveal states. Members without an entry are `Pending`.
    fn fetch_reveal_states(&self, group_id: GroupId) -> Result<HashMap<UserId, RevealState>>;

    fn fetch_display_metadata(&self, group_id: GroupId, user_id: UserId)
    -> Result<DisplayMetadata>;

    // -----------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------

    fn insert_group(&mut self, group: Group) -> Result<()>;

    /// Insert a member, or replace the member with the same user id.
    fn upsert_participant(&mut self, group_id: GroupId, participant: Participant) -> Result<()>;

    fn set_display_metadata(
        &mut self,
        group_id: GroupId,
        user_id: UserId,
        metadata: DisplayMetadata,
    ) -> Result<()>;

    /// Removing metadata that does not exist is a no-op.
    fn remove_display_metadata(&mut self, group_id: GroupId, user_id: UserId) -> Result<()>;

    /// Replace the whole assignment in one write.
    fn persist_assignment(&mut self, group_id: GroupId, assignment: &Assignment) -> Result<()>;

    fn clear_assignment(&mut self, group_id: GroupId) -> Result<()>;

    /// Move the group to `phase`, bumping its version. Returns the new row.
    fn set_group_phase(&mut self, group_id: GroupId, phase: GroupPhase) -> Result<Group>;

    /// Idempotent: writing the current state again is a no-op.
    fn set_reveal_state(
        &mut self,
        group_id: GroupId,
        user_id: UserId,
        state: RevealState,
    ) -> Result<()>;

    // -----------------------------------------------------------------
    // All-or-nothing transitions
    // -----------------------------------------------------------------

    /// Add a new member together with their display metadata.
    fn add_member(
        &mut self,
        group_id: GroupId,
        participant: Participant,
        metadata: DisplayMetadata,
    ) -> Result<()> {
        let user_id = participant.user_id;
        self.set_display_metadata(group_id, user_id, metadata)?;
        match self.upsert_participant(group_id, participant) {
            Ok(()) => Ok(()),
            Err(err) => Err(compensate(err, self.remove_display_metadata(group_id, user_id))),
        }
    }

    /// OPEN → LOCKED together with the assignment, only if the group is
    /// still at `expected_version`. Every giver starts `Pending`.
    ///
    /// `Pending` rows written before a failure are left in place; they match
    /// what an OPEN group already reports.
    fn lock_with_assignment(
        &mut self,
        group_id: GroupId,
        expected_version: u64,
        assignment: &Assignment,
    ) -> Result<Group> {
        let group = self.fetch_group(group_id)?;
        group.ensure_version(expected_version)?;
        group.ensure_phase(GroupPhase::Open)?;

        self.persist_assignment(group_id, assignment)?;
        match finish_lock(self, group_id, assignment) {
            Ok(locked) => Ok(locked),
            Err(err) => Err(compensate(err, self.clear_assignment(group_id))),
        }
    }

    /// LOCKED → OPEN: clear the assignment and return every member to
    /// `Pending`, only if the group is still at `expected_version`.
    ///
    /// A failure after the phase write restores the assignment and every
    /// `Revealed` state, then re-locks the group at a new version, so reveal
    /// flows of the old cycle still see a stale stamp and re-sync.
    fn reset_group(&mut self, group_id: GroupId, expected_version: u64) -> Result<Group> {
        let group = self.fetch_group(group_id)?;
        group.ensure_version(expected_version)?;
        group.ensure_phase(GroupPhase::Locked)?;

        let assignment = self.fetch_assignment(group_id)?;
        let states = self.fetch_reveal_states(group_id)?;

        let reopened = self.set_group_phase(group_id, GroupPhase::Open)?;
        match finish_reset(self, group_id) {
            Ok(()) => Ok(reopened),
            Err(err) => Err(compensate(
                err,
                restore_lock(self, group_id, assignment.as_ref(), &states),
            )),
        }
    }
}

fn finish_lock<S: DrawStore + ?Sized>(
    store: &mut S,
    group_id: GroupId,
    assignment: &Assignment,
) -> Result<Group> {
    for giver in assignment.givers() {
        store.set_reveal_state(group_id, giver, RevealState::Pending)?;
    }
    store.set_group_phase(group_id, GroupPhase::Locked)
}

fn finish_reset<S: DrawStore + ?Sized>(store: &mut S, group_id: GroupId) -> Result<()> {
    store.clear_assignment(group_id)?;
    for member in store.fetch_roster(group_id)? {
        store.set_reveal_state(group_id, member.user_id, RevealState::Pending)?;
    }
    Ok(())
}

fn restore_lock<S: DrawStore + ?Sized>(
    store: &mut S,
    group_id: GroupId,
    assignment: Option<&Assignment>,
    states: &HashMap<UserId, RevealState>,
) -> Result<()> {
    if let Some(assignment) = assignment {
        store.persist_assignment(group_id, assignment)?;
    }
    for (user_id, state) in states {
        store.set_reveal_state(group_id, *user_id, *state)?;
    }
    store.set_group_phase(group_id, GroupPhase::Locked)?;
    Ok(())
}

/// The original error if compensation succeeded, otherwise both.
fn compensate(err: DrawError, rollback: Result<()>) -> DrawError {
    match rollback {
        Ok(()) => err,
        Err(rollback_err) => DrawError::PersistenceFailure {
            reason: format!("{err}; rollback failed: {rollback_err}"),
        },
    }
}
