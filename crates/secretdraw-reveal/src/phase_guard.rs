//! Phase guard for reveal flows.
//!
//! A reveal flow captures the group's [`PhaseStamp`] when it starts and
//! re-checks it against the stored group before every write. A reset moves
//! the group to OPEN and bumps its version; a reset followed by a new draw
//! leaves it LOCKED again but at a later version. Either way the captured
//! stamp no longer matches and the flow is refused with `StaleGroupPhase`.

use secretdraw_types::{DrawStore, Group, GroupId, GroupPhase, PhaseStamp, Result};

/// Remembers which draw cycle a flow belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseGuard {
    stamp: PhaseStamp,
}

impl PhaseGuard {
    #[must_use]
    pub fn new(stamp: PhaseStamp) -> Self {
        Self { stamp }
    }

    /// Capture the current cycle of a locked group.
    pub fn for_locked(group: &Group) -> Result<Self> {
        group.ensure_phase(GroupPhase::Locked)?;
        Ok(Self::new(group.stamp()))
    }

    #[must_use]
    pub fn stamp(&self) -> PhaseStamp {
        self.stamp
    }

    /// `Ok(())` while `group` is still in the captured cycle.
    pub fn check(&self, group: &Group) -> Result<()> {
        group.ensure_stamp(self.stamp).inspect_err(|_| {
            tracing::warn!(
                group = %group.id,
                expected = %self.stamp,
                actual = %group.stamp(),
                "Stale group phase: flow belongs to an earlier draw cycle"
            );
        })
    }

    /// Re-read the group and check it.
    pub fn refresh<S: DrawStore + ?Sized>(&self, store: &S, group_id: GroupId) -> Result<Group> {
        let group = store.fetch_group(group_id)?;
        self.check(&group)?;
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use secretdraw_types::*;

    use super::*;

    fn locked_group() -> Group {
        let mut g = Group::new(UserId::new(), JoinCode::from_number(500_005).unwrap());
        g.mark_locked(Utc::now());
        g
    }

    #[test]
    fn open_group_cannot_be_guarded() {
        let g = Group::new(UserId::new(), JoinCode::from_number(500_005).unwrap());
        let err = PhaseGuard::for_locked(&g).unwrap_err();
        assert!(matches!(err, DrawError::StaleGroupPhase { .. }));
    }

    #[test]
    fn same_cycle_passes() {
        let g = locked_group();
        let guard = PhaseGuard::for_locked(&g).unwrap();
        assert!(guard.check(&g).is_ok());
        assert_eq!(guard.stamp(), g.stamp());
    }

    #[test]
    fn reset_is_detected() {
        let mut g = locked_group();
        let guard = PhaseGuard::for_locked(&g).unwrap();
        g.mark_open();
        let err = guard.check(&g).unwrap_err();
        assert!(matches!(
            err,
            DrawError::StaleGroupPhase { expected, actual }
                if expected.phase == GroupPhase::Locked && actual.phase == GroupPhase::Open
        ));
    }

    #[test]
    fn reset_and_relock_is_detected() {
        let mut g = locked_group();
        let guard = PhaseGuard::for_locked(&g).unwrap();
        g.mark_open();
        g.mark_locked(Utc::now());
        assert!(guard.check(&g).is_err());
    }
}
