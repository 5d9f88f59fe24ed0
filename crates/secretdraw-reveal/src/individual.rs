//! Individual mode: one participant viewing their own recipient.
//!
//! ```text
//! NotLoaded --load_my_reveal--> Loaded(pending) --commit_my_reveal--> Revealed
//!                     \
//!                      `--> AlreadyRevealed (redirect to the locked view)
//! ```
//!
//! The card is only handed out by [`commit_my_reveal`], after `Revealed` has
//! been written. A reload after that point lands in `AlreadyRevealed`.

use secretdraw_types::{
    DrawStore, GroupId, PhaseStamp, RecipientCard, Result, RevealState, UserId,
};

use crate::PhaseGuard;
use crate::lookup::{find_member, recipient_card};

/// A loaded, not yet committed reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealTicket {
    pub group_id: GroupId,
    pub user_id: UserId,
    /// Cycle the ticket was issued in.
    pub stamp: PhaseStamp,
    card: RecipientCard,
}

/// Outcome of [`load_my_reveal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MyReveal {
    /// Recipient resolved; the reveal action may be offered.
    Pending(RevealTicket),
    /// Already revealed in this cycle; no reveal action.
    AlreadyRevealed { stamp: PhaseStamp },
}

/// Resolve the caller's recipient for the current cycle.
///
/// Fails with `StaleGroupPhase` unless the group is LOCKED,
/// `NotParticipating` for spectators and `MissingAssignment` when no valid
/// recipient is recorded.
pub fn load_my_reveal<S: DrawStore + ?Sized>(
    store: &S,
    group_id: GroupId,
    user_id: UserId,
) -> Result<MyReveal> {
    let group = store.fetch_group(group_id)?;
    let guard = PhaseGuard::for_locked(&group)?;

    let roster = store.fetch_roster(group_id)?;
    let me = find_member(&roster, user_id)?;
    let card = recipient_card(store, group_id, &roster, me)?;

    let state = store
        .fetch_reveal_states(group_id)?
        .get(&user_id)
        .copied()
        .unwrap_or_default();

    tracing::debug!(group = %group_id, user = %user_id, state = %state, "Reveal loaded");

    Ok(match state {
        RevealState::Revealed => MyReveal::AlreadyRevealed {
            stamp: guard.stamp(),
        },
        RevealState::Pending => MyReveal::Pending(RevealTicket {
            group_id,
            user_id,
            stamp: guard.stamp(),
            card,
        }),
    })
}

/// Durably mark the ticket's holder `Revealed`, then return the card.
///
/// Safe to retry: committing the same ticket again rewrites `Revealed` (a
/// no-op) and returns the same card. Fails with `StaleGroupPhase` if the
/// group was reset since the ticket was issued.
pub fn commit_my_reveal<S: DrawStore + ?Sized>(
    store: &mut S,
    ticket: &RevealTicket,
) -> Result<RecipientCard> {
    PhaseGuard::new(ticket.stamp).refresh(store, ticket.group_id)?;

    store.set_reveal_state(ticket.group_id, ticket.user_id, RevealState::Revealed)?;

    tracing::info!(
        group = %ticket.group_id,
        user = %ticket.user_id,
        stamp = %ticket.stamp,
        "Reveal committed"
    );

    Ok(ticket.card.clone())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use secretdraw_types::*;

    use super::*;
    use crate::MemoryStore;

    /// Three members drawing in a ring: 1 → 2 → 3 → 1, plus one spectator.
    fn locked_ring() -> (MemoryStore, GroupId, Vec<Participant>) {
        let mut store = MemoryStore::new();
        let roster = vec![
            Participant::named(1),
            Participant::named(2),
            Participant::named(3),
            Participant::named(4).spectator(),
        ];
        let group = Group::new(roster[0].user_id, JoinCode::from_number(424_242).unwrap());
        let group_id = group.id;
        store.insert_group(group.clone()).unwrap();
        for p in &roster {
            store.upsert_participant(group_id, p.clone()).unwrap();
            store
                .set_display_metadata(
                    group_id,
                    p.user_id,
                    DisplayMetadata::new(format!("P{}", p.sequence)).with_wishlist("books"),
                )
                .unwrap();
        }
        let entries = (0..3)
            .map(|i| AssignmentEntry {
                participation_id: roster[i].participation_id,
                giver: roster[i].user_id,
                recipient: roster[(i + 1) % 3].user_id,
            })
            .collect();
        store
            .lock_with_assignment(group_id, group.version, &Assignment::new(entries))
            .unwrap();
        (store, group_id, roster)
    }

    fn ticket(reveal: MyReveal) -> RevealTicket {
        match reveal {
            MyReveal::Pending(ticket) => ticket,
            other => panic!("expected pending reveal, got {other:?}"),
        }
    }

    #[test]
    fn load_then_commit() {
        let (mut store, group_id, roster) = locked_ring();
        let t = ticket(load_my_reveal(&store, group_id, roster[0].user_id).unwrap());
        assert_eq!(t.stamp.phase, GroupPhase::Locked);

        let card = commit_my_reveal(&mut store, &t).unwrap();
        assert_eq!(card.recipient, roster[1].user_id);
        assert_eq!(card.display_name, "P2");
        assert_eq!(card.wishlist.as_deref(), Some("books"));

        let states = store.fetch_reveal_states(group_id).unwrap();
        assert_eq!(states.get(&roster[0].user_id), Some(&RevealState::Revealed));
        assert_eq!(states.get(&roster[1].user_id), Some(&RevealState::Pending));
    }

    #[test]
    fn double_commit_is_idempotent() {
        let (mut store, group_id, roster) = locked_ring();
        let t = ticket(load_my_reveal(&store, group_id, roster[1].user_id).unwrap());
        let first = commit_my_reveal(&mut store, &t).unwrap();
        let second = commit_my_reveal(&mut store, &t).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            store.fetch_reveal_states(group_id).unwrap().get(&roster[1].user_id),
            Some(&RevealState::Revealed)
        );
    }

    #[test]
    fn reload_after_commit_redirects() {
        let (mut store, group_id, roster) = locked_ring();
        let t = ticket(load_my_reveal(&store, group_id, roster[2].user_id).unwrap());
        commit_my_reveal(&mut store, &t).unwrap();
        let again = load_my_reveal(&store, group_id, roster[2].user_id).unwrap();
        assert_eq!(again, MyReveal::AlreadyRevealed { stamp: t.stamp });
    }

    #[test]
    fn open_group_has_nothing_to_load() {
        let mut store = MemoryStore::new();
        let group = Group::new(UserId::new(), JoinCode::from_number(100_001).unwrap());
        store.insert_group(group.clone()).unwrap();
        let err = load_my_reveal(&store, group.id, group.host).unwrap_err();
        assert!(matches!(err, DrawError::StaleGroupPhase { .. }));
    }

    #[test]
    fn commit_after_reset_is_stale() {
        let (mut store, group_id, roster) = locked_ring();
        let t = ticket(load_my_reveal(&store, group_id, roster[0].user_id).unwrap());

        let version = store.fetch_group(group_id).unwrap().version;
        store.reset_group(group_id, version).unwrap();

        let err = commit_my_reveal(&mut store, &t).unwrap_err();
        assert!(matches!(err, DrawError::StaleGroupPhase { .. }));
        assert_eq!(
            store.fetch_reveal_states(group_id).unwrap().get(&roster[0].user_id),
            Some(&RevealState::Pending)
        );
    }

    #[test]
    fn commit_after_relock_is_stale() {
        let (mut store, group_id, roster) = locked_ring();
        let t = ticket(load_my_reveal(&store, group_id, roster[0].user_id).unwrap());

        let mut group = store.fetch_group(group_id).unwrap();
        group.mark_open();
        group.mark_locked(Utc::now());
        store.insert_group(group).unwrap();

        assert!(matches!(
            commit_my_reveal(&mut store, &t),
            Err(DrawError::StaleGroupPhase { .. })
        ));
    }

    #[test]
    fn spectator_is_not_participating() {
        let (store, group_id, roster) = locked_ring();
        let err = load_my_reveal(&store, group_id, roster[3].user_id).unwrap_err();
        assert!(matches!(err, DrawError::NotParticipating(_)));
    }

    #[test]
    fn unknown_user_is_not_found() {
        let (store, group_id, _) = locked_ring();
        let err = load_my_reveal(&store, group_id, UserId::new()).unwrap_err();
        assert!(matches!(err, DrawError::ParticipantNotFound(_)));
    }

    #[test]
    fn persistence_failure_propagates() {
        let (mut store, group_id, roster) = locked_ring();
        let t = ticket(load_my_reveal(&store, group_id, roster[0].user_id).unwrap());
        store.fail_next_write("timeout");
        let err = commit_my_reveal(&mut store, &t).unwrap_err();
        assert!(matches!(err, DrawError::PersistenceFailure { ref reason } if reason == "timeout"));
        // Caller-level retry is safe.
        assert!(commit_my_reveal(&mut store, &t).is_ok());
    }
}
