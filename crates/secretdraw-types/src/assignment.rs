//! Assignment model: the accepted giver → recipient mapping of one draw.

use serde::{Deserialize, Serialize};

use crate::{ParticipationId, UserId};

/// One giver's line in an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentEntry {
    /// Membership record of the giver; the recipient is written onto it.
    pub participation_id: ParticipationId,
    pub giver: UserId,
    pub recipient: UserId,
}

/// Giver → recipient mapping over the participating subset of a roster.
///
/// Entries follow the roster order of the givers. An assignment produced by
/// the matcher covers every participating member exactly once as giver and
/// exactly once as recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub entries: Vec<AssignmentEntry>,
}

impl Assignment {
    #[must_use]
    pub fn new(entries: Vec<AssignmentEntry>) -> Self {
        Self { entries }
    }

    /// Recipient drawn by `giver`, if the giver is part of this assignment.
    #[must_use]
    pub fn recipient_of(&self, giver: UserId) -> Option<UserId> {
        self.entries
            .iter()
            .find(|e| e.giver == giver)
            .map(|e| e.recipient)
    }

    /// Entry keyed by membership record.
    #[must_use]
    pub fn entry_for(&self, participation_id: ParticipationId) -> Option<&AssignmentEntry> {
        self.entries
            .iter()
            .find(|e| e.participation_id == participation_id)
    }

    pub fn givers(&self) -> impl Iterator<Item = UserId> + '_ {
        self.entries.iter().map(|e| e.giver)
    }

    pub fn recipients(&self) -> impl Iterator<Item = UserId> + '_ {
        self.entries.iter().map(|e| e.recipient)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(giver: u8, recipient: u8) -> AssignmentEntry {
        AssignmentEntry {
            participation_id: ParticipationId::new(),
            giver: UserId::from_bytes([giver; 16]),
            recipient: UserId::from_bytes([recipient; 16]),
        }
    }

    #[test]
    fn lookup_by_giver_and_record() {
        let first = entry(1, 2);
        let assignment = Assignment::new(vec![first, entry(2, 1)]);

        assert_eq!(
            assignment.recipient_of(UserId::from_bytes([1; 16])),
            Some(UserId::from_bytes([2; 16]))
        );
        assert_eq!(
            assignment.entry_for(first.participation_id).map(|e| e.recipient),
            Some(first.recipient)
        );
        assert!(assignment.recipient_of(UserId::from_bytes([9; 16])).is_none());
        assert_eq!(assignment.len(), 2);
    }

    #[test]
    fn empty_by_default() {
        let assignment = Assignment::default();
        assert!(assignment.is_empty());
        assert_eq!(assignment.givers().count(), 0);
    }
}
