//! In-process [`DrawStore`] implementation.
//!
//! Holds every table in `HashMap`s and records a [`ChangeNotice`] for each
//! write, so callers can play the role of a realtime subscriber by draining
//! [`MemoryStore::drain_notices`]. The all-or-nothing transitions are
//! overridden to pass the failure hook once and then touch every table
//! together, so they never need the provided rollback path.
//!
//! A one-shot write failure can be armed with
//! [`MemoryStore::fail_next_write`] to exercise error propagation.

use std::collections::{HashMap, VecDeque};

use secretdraw_types::{
    Assignment, ChangeNotice, DisplayMetadata, DrawError, DrawStore, Group, GroupId, GroupPhase,
    JoinCode, Participant, Result, RevealState, UserId,
};

/// `HashMap`-backed store for tests, demos, and single-process hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    groups: HashMap<GroupId, Group>,
    rosters: HashMap<GroupId, Vec<Participant>>,
    assignments: HashMap<GroupId, Assignment>,
    reveal_states: HashMap<GroupId, HashMap<UserId, RevealState>>,
    metadata: HashMap<(GroupId, UserId), DisplayMetadata>,
    /// Notices not yet delivered (front = oldest).
    notices: VecDeque<ChangeNotice>,
    /// Armed failure for the next write, if any.
    write_failure: Option<String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending change notice, oldest first.
    pub fn drain_notices(&mut self) -> Vec<ChangeNotice> {
        self.notices.drain(..).collect()
    }

    /// Make the next write fail with `PersistenceFailure`.
    pub fn fail_next_write(&mut self, reason: impl Into<String>) {
        self.write_failure = Some(reason.into());
    }

    fn begin_write(&mut self) -> Result<()> {
        match self.write_failure.take() {
            Some(reason) => Err(DrawError::PersistenceFailure { reason }),
            None => Ok(()),
        }
    }

    fn group_mut(&mut self, group_id: GroupId) -> Result<&mut Group> {
        self.groups
            .get_mut(&group_id)
            .ok_or(DrawError::GroupNotFound(group_id))
    }

    fn apply_phase(&mut self, group_id: GroupId, phase: GroupPhase) -> Result<Group> {
        let group = self.group_mut(group_id)?;
        match phase {
            GroupPhase::Locked => group.mark_locked(chrono::Utc::now()),
            GroupPhase::Open => group.mark_open(),
        }
        let updated = group.clone();
        self.notices.push_back(ChangeNotice::GroupChanged(group_id));
        Ok(updated)
    }

    fn record_reveal_state(&mut self, group_id: GroupId, user_id: UserId, state: RevealState) {
        let previous = self
            .reveal_states
            .entry(group_id)
            .or_default()
            .insert(user_id, state);
        if previous != Some(state) {
            self.notices
                .push_back(ChangeNotice::RevealStateChanged { group_id, user_id });
        }
    }

    fn require_group(&self, group_id: GroupId) -> Result<()> {
        if self.groups.contains_key(&group_id) {
            Ok(())
        } else {
            Err(DrawError::GroupNotFound(group_id))
        }
    }
}

impl DrawStore for MemoryStore {
    fn fetch_group(&self, group_id: GroupId) -> Result<Group> {
        self.groups
            .get(&group_id)
            .cloned()
            .ok_or(DrawError::GroupNotFound(group_id))
    }

    fn find_group_by_code(&self, code: &JoinCode) -> Result<Option<Group>> {
        Ok(self.groups.values().find(|g| &g.code == code).cloned())
    }

    fn fetch_roster(&self, group_id: GroupId) -> Result<Vec<Participant>> {
        self.require_group(group_id)?;
        let mut roster = self.rosters.get(&group_id).cloned().unwrap_or_default();
        roster.sort_by_key(|p| p.sequence);
        Ok(roster)
    }

    fn fetch_assignment(&self, group_id: GroupId) -> Result<Option<Assignment>> {
        self.require_group(group_id)?;
        Ok(self.assignments.get(&group_id).cloned())
    }

    fn fetch_reveal_states(&self, group_id: GroupId) -> Result<HashMap<UserId, RevealState>> {
        self.require_group(group_id)?;
        Ok(self.reveal_states.get(&group_id).cloned().unwrap_or_default())
    }

    fn fetch_display_metadata(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<DisplayMetadata> {
        self.metadata
            .get(&(group_id, user_id))
            .cloned()
            .ok_or(DrawError::ParticipantNotFound(user_id))
    }

    fn insert_group(&mut self, group: Group) -> Result<()> {
        self.begin_write()?;
        let group_id = group.id;
        self.groups.insert(group_id, group);
        self.notices.push_back(ChangeNotice::GroupChanged(group_id));
        Ok(())
    }

    fn upsert_participant(&mut self, group_id: GroupId, participant: Participant) -> Result<()> {
        self.require_group(group_id)?;
        self.begin_write()?;
        let roster = self.rosters.entry(group_id).or_default();
        match roster.iter_mut().find(|p| p.user_id == participant.user_id) {
            Some(existing) => *existing = participant,
            None => roster.push(participant),
        }
        self.notices.push_back(ChangeNotice::RosterChanged(group_id));
        Ok(())
    }

    fn set_display_metadata(
        &mut self,
        group_id: GroupId,
        user_id: UserId,
        metadata: DisplayMetadata,
    ) -> Result<()> {
        self.require_group(group_id)?;
        self.begin_write()?;
        self.metadata.insert((group_id, user_id), metadata);
        self.notices.push_back(ChangeNotice::RosterChanged(group_id));
        Ok(())
    }

    fn persist_assignment(&mut self, group_id: GroupId, assignment: &Assignment) -> Result<()> {
        self.require_group(group_id)?;
        self.begin_write()?;
        self.assignments.insert(group_id, assignment.clone());
        self.notices
            .push_back(ChangeNotice::AssignmentChanged(group_id));
        Ok(())
    }

    fn clear_assignment(&mut self, group_id: GroupId) -> Result<()> {
        self.require_group(group_id)?;
        self.begin_write()?;
        self.assignments.remove(&group_id);
        self.notices
            .push_back(ChangeNotice::AssignmentChanged(group_id));
        Ok(())
    }

    fn set_group_phase(&mut self, group_id: GroupId, phase: GroupPhase) -> Result<Group> {
        self.require_group(group_id)?;
        self.begin_write()?;
        self.apply_phase(group_id, phase)
    }

    fn set_reveal_state(
        &mut self,
        group_id: GroupId,
        user_id: UserId,
        state: RevealState,
    ) -> Result<()> {
        self.require_group(group_id)?;
        self.begin_write()?;
        self.record_reveal_state(group_id, user_id, state);
        Ok(())
    }

    fn remove_display_metadata(&mut self, group_id: GroupId, user_id: UserId) -> Result<()> {
        self.require_group(group_id)?;
        self.begin_write()?;
        if self.metadata.remove(&(group_id, user_id)).is_some() {
            self.notices.push_back(ChangeNotice::RosterChanged(group_id));
        }
        Ok(())
    }

    fn add_member(
        &mut self,
        group_id: GroupId,
        participant: Participant,
        metadata: DisplayMetadata,
    ) -> Result<()> {
        self.require_group(group_id)?;
        self.begin_write()?;
        self.metadata
            .insert((group_id, participant.user_id), metadata);
        let roster = self.rosters.entry(group_id).or_default();
        match roster.iter_mut().find(|p| p.user_id == participant.user_id) {
            Some(existing) => *existing = participant,
            None => roster.push(participant),
        }
        self.notices.push_back(ChangeNotice::RosterChanged(group_id));
        Ok(())
    }

    fn lock_with_assignment(
        &mut self,
        group_id: GroupId,
        expected_version: u64,
        assignment: &Assignment,
    ) -> Result<Group> {
        let group = self.fetch_group(group_id)?;
        group.ensure_version(expected_version)?;
        group.ensure_phase(GroupPhase::Open)?;
        self.begin_write()?;

        self.assignments.insert(group_id, assignment.clone());
        self.notices
            .push_back(ChangeNotice::AssignmentChanged(group_id));
        for giver in assignment.givers() {
            self.record_reveal_state(group_id, giver, RevealState::Pending);
        }
        self.apply_phase(group_id, GroupPhase::Locked)
    }

    fn reset_group(&mut self, group_id: GroupId, expected_version: u64) -> Result<Group> {
        let group = self.fetch_group(group_id)?;
        group.ensure_version(expected_version)?;
        group.ensure_phase(GroupPhase::Locked)?;
        self.begin_write()?;

        self.assignments.remove(&group_id);
        self.notices
            .push_back(ChangeNotice::AssignmentChanged(group_id));
        let members: Vec<UserId> = self
            .rosters
            .get(&group_id)
            .map(|roster| roster.iter().map(|p| p.user_id).collect())
            .unwrap_or_default();
        for user_id in members {
            self.record_reveal_state(group_id, user_id, RevealState::Pending);
        }
        self.apply_phase(group_id, GroupPhase::Open)
    }
}
