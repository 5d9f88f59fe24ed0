//! Kiosk mode: a host cycles every pending giver through one shared device.
//!
//! ```text
//! PassTo(p) --confirm_handoff(p)--> ReadyToPeek(p) --peek--> Peeked(p, hidden)
//!     ^                                                        |   ^ show/hide
//!     |                                                        v   |
//!     `-------------- commit (write Revealed, reload) ---------'
//!
//! empty queue => AllDone        phase stamp changed => Terminated
//! ```
//!
//! The session never walks an in-memory queue. After every commit, and on
//! every storage notice, it rebuilds the queue from persisted reveal states,
//! so a member who reveals on their own device mid-cycle simply drops out.
//! Peek and commit also re-read the holder's own state, so a notice that
//! never arrived cannot show or count a card already revealed elsewhere.
//! Commit is the only write.

use secretdraw_types::{
    Actor, ChangeNotice, DrawError, DrawStore, GroupId, ParticipationId, RecipientCard, Result,
    RevealState, UserId,
};

use crate::PhaseGuard;
use crate::lookup::{find_member, recipient_card};

/// One pending giver waiting for the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub participation_id: ParticipationId,
    pub user_id: UserId,
    pub display_name: String,
}

/// Where the session currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KioskStep {
    /// Hand the device to this participant.
    PassTo(QueueEntry),
    /// Handoff confirmed; the participant may peek.
    ReadyToPeek(QueueEntry),
    /// Card loaded. `visible` is only a display toggle.
    Peeked {
        entry: QueueEntry,
        card: RecipientCard,
        visible: bool,
    },
    /// Nobody left to reveal.
    AllDone,
    /// The group was reset (or reset and re-drawn) under the session.
    Terminated,
}

impl KioskStep {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::PassTo(_) => "PASS_TO",
            Self::ReadyToPeek(_) => "READY_TO_PEEK",
            Self::Peeked { .. } => "PEEKED",
            Self::AllDone => "ALL_DONE",
            Self::Terminated => "TERMINATED",
        }
    }

    /// The participant the step is about, if any.
    #[must_use]
    pub fn entry(&self) -> Option<&QueueEntry> {
        match self {
            Self::PassTo(entry) | Self::ReadyToPeek(entry) | Self::Peeked { entry, .. } => {
                Some(entry)
            }
            Self::AllDone | Self::Terminated => None,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::AllDone | Self::Terminated)
    }
}

/// Operator input to [`KioskSession::advance_kiosk_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KioskAction {
    /// "I am X": the named participant now holds the device.
    ConfirmHandoff(UserId),
    Peek,
    Show,
    Hide,
    Commit,
}

/// Active participants still `Pending`, in join order.
///
/// Fails with `StaleGroupPhase` unless the group is LOCKED.
pub fn load_kiosk_queue<S: DrawStore + ?Sized>(
    store: &S,
    group_id: GroupId,
) -> Result<Vec<QueueEntry>> {
    let group = store.fetch_group(group_id)?;
    PhaseGuard::for_locked(&group)?;
    build_queue(store, group_id)
}

fn build_queue<S: DrawStore + ?Sized>(store: &S, group_id: GroupId) -> Result<Vec<QueueEntry>> {
    let roster = store.fetch_roster(group_id)?;
    let states = store.fetch_reveal_states(group_id)?;

    let mut queue = Vec::new();
    for member in roster.iter().filter(|p| p.participates) {
        if states.get(&member.user_id).copied().unwrap_or_default() == RevealState::Revealed {
            continue;
        }
        let metadata = store.fetch_display_metadata(group_id, member.user_id)?;
        queue.push(QueueEntry {
            participation_id: member.participation_id,
            user_id: member.user_id,
            display_name: metadata.display_name,
        });
    }

    tracing::debug!(group = %group_id, pending = queue.len(), "Kiosk queue loaded");
    Ok(queue)
}

/// One host-driven pass over the pending queue.
#[derive(Debug, Clone)]
pub struct KioskSession {
    group_id: GroupId,
    guard: PhaseGuard,
    operator: UserId,
    step: KioskStep,
    committed: usize,
}

impl KioskSession {
    /// Open a session. Only hosts and admins may; the check runs before the
    /// group is even read.
    pub fn start<S: DrawStore + ?Sized>(
        store: &S,
        group_id: GroupId,
        actor: &Actor,
    ) -> Result<Self> {
        actor.require_privileged()?;

        let group = store.fetch_group(group_id)?;
        let guard = PhaseGuard::for_locked(&group)?;
        let queue = build_queue(store, group_id)?;

        tracing::info!(
            group = %group_id,
            operator = %actor.user_id,
            stamp = %guard.stamp(),
            pending = queue.len(),
            "Kiosk session started"
        );

        Ok(Self {
            group_id,
            guard,
            operator: actor.user_id,
            step: head_of(queue),
            committed: 0,
        })
    }

    #[must_use]
    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    #[must_use]
    pub fn operator(&self) -> UserId {
        self.operator
    }

    #[must_use]
    pub fn step(&self) -> &KioskStep {
        &self.step
    }

    /// Participant currently holding (or about to receive) the device.
    #[must_use]
    pub fn current(&self) -> Option<&QueueEntry> {
        self.step.entry()
    }

    /// Reveals committed through this session.
    #[must_use]
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Apply one operator action.
    pub fn advance_kiosk_step<S: DrawStore + ?Sized>(
        &mut self,
        store: &mut S,
        action: KioskAction,
    ) -> Result<&KioskStep> {
        match action {
            KioskAction::ConfirmHandoff(user_id) => self.confirm_handoff(user_id),
            KioskAction::Peek => self.peek(&*store),
            KioskAction::Show => self.set_visible(true, "show"),
            KioskAction::Hide => self.set_visible(false, "hide"),
            KioskAction::Commit => self.commit_kiosk_reveal(store),
        }
    }

    /// `PassTo(p) → ReadyToPeek(p)`. `user_id` must be `p`.
    pub fn confirm_handoff(&mut self, user_id: UserId) -> Result<&KioskStep> {
        let entry = match &self.step {
            KioskStep::PassTo(entry) => entry.clone(),
            other => return Err(invalid(other, "confirm_handoff")),
        };
        if entry.user_id != user_id {
            tracing::warn!(
                group = %self.group_id,
                expected = %entry.user_id,
                confirmed = %user_id,
                "Kiosk handoff confirmed by the wrong participant"
            );
            return Err(DrawError::HandoffMismatch {
                expected: entry.user_id,
                confirmed: user_id,
            });
        }
        self.step = KioskStep::ReadyToPeek(entry);
        Ok(&self.step)
    }

    /// `ReadyToPeek(p) → Peeked(p)` with the card hidden.
    pub fn peek<S: DrawStore + ?Sized>(&mut self, store: &S) -> Result<&KioskStep> {
        let entry = match &self.step {
            KioskStep::ReadyToPeek(entry) => entry.clone(),
            other => return Err(invalid(other, "peek")),
        };
        self.verify_cycle(store)?;
        if self.revealed_elsewhere(store, entry.user_id, "peek")? {
            return self.reload(store);
        }

        let roster = store.fetch_roster(self.group_id)?;
        let member = find_member(&roster, entry.user_id)?;
        let card = recipient_card(store, self.group_id, &roster, member)?;

        self.step = KioskStep::Peeked {
            entry,
            card,
            visible: false,
        };
        Ok(&self.step)
    }

    pub fn show(&mut self) -> Result<&KioskStep> {
        self.set_visible(true, "show")
    }

    pub fn hide(&mut self) -> Result<&KioskStep> {
        self.set_visible(false, "hide")
    }

    fn set_visible(&mut self, value: bool, action: &'static str) -> Result<&KioskStep> {
        match &mut self.step {
            KioskStep::Peeked { visible, .. } => *visible = value,
            other => return Err(invalid(other, action)),
        }
        Ok(&self.step)
    }

    /// `Peeked(p) →` write `Revealed` for `p`, then rebuild the queue.
    pub fn commit_kiosk_reveal<S: DrawStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<&KioskStep> {
        let user_id = match &self.step {
            KioskStep::Peeked { entry, .. } => entry.user_id,
            other => return Err(invalid(other, "commit")),
        };
        self.verify_cycle(store)?;
        if self.revealed_elsewhere(&*store, user_id, "commit")? {
            return self.reload(&*store);
        }

        store.set_reveal_state(self.group_id, user_id, RevealState::Revealed)?;
        self.committed += 1;

        tracing::info!(
            group = %self.group_id,
            operator = %self.operator,
            user = %user_id,
            stamp = %self.guard.stamp(),
            "Kiosk reveal committed"
        );

        self.reload(&*store)
    }

    /// Rebuild the queue and restart from its head.
    pub fn reload<S: DrawStore + ?Sized>(&mut self, store: &S) -> Result<&KioskStep> {
        if self.step == KioskStep::Terminated {
            return Ok(&self.step);
        }
        self.verify_cycle(store)?;
        self.step = head_of(build_queue(store, self.group_id)?);
        Ok(&self.step)
    }

    /// React to a storage notice by re-deriving the step from persisted state.
    ///
    /// A handed-off participant keeps the device while still pending. A
    /// peeked card is left alone apart from the phase check.
    pub fn handle_notice<S: DrawStore + ?Sized>(
        &mut self,
        store: &S,
        notice: &ChangeNotice,
    ) -> Result<&KioskStep> {
        if notice.group_id() != self.group_id || self.step == KioskStep::Terminated {
            return Ok(&self.step);
        }
        self.verify_cycle(store)?;

        let holder = match &self.step {
            KioskStep::Peeked { .. } => return Ok(&self.step),
            KioskStep::ReadyToPeek(entry) => Some(entry.user_id),
            _ => None,
        };

        let queue = build_queue(store, self.group_id)?;
        self.step = match holder.and_then(|id| queue.iter().find(|e| e.user_id == id)) {
            Some(entry) => KioskStep::ReadyToPeek(entry.clone()),
            None => head_of(queue),
        };
        Ok(&self.step)
    }

    /// `true` if `user_id` is already `Revealed` in storage, e.g. through
    /// their own device, regardless of which notices were delivered.
    fn revealed_elsewhere<S: DrawStore + ?Sized>(
        &self,
        store: &S,
        user_id: UserId,
        action: &'static str,
    ) -> Result<bool> {
        let state = store
            .fetch_reveal_states(self.group_id)?
            .get(&user_id)
            .copied()
            .unwrap_or_default();
        if state == RevealState::Revealed {
            tracing::info!(
                group = %self.group_id,
                user = %user_id,
                action,
                "Kiosk holder already revealed; skipping"
            );
        }
        Ok(state == RevealState::Revealed)
    }

    /// Terminate the session if the group left the cycle it started in.
    fn verify_cycle<S: DrawStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        if self.step == KioskStep::Terminated {
            return Err(invalid(&self.step, "verify"));
        }
        self.guard
            .refresh(store, self.group_id)
            .map(|_| ())
            .inspect_err(|e| {
                if matches!(e, DrawError::StaleGroupPhase { .. }) {
                    self.step = KioskStep::Terminated;
                    tracing::warn!(
                        group = %self.group_id,
                        committed = self.committed,
                        "Kiosk session terminated: group changed phase"
                    );
                }
            })
    }
}

fn head_of(queue: Vec<QueueEntry>) -> KioskStep {
    queue
        .into_iter()
        .next()
        .map_or(KioskStep::AllDone, KioskStep::PassTo)
}

fn invalid(step: &KioskStep, action: &'static str) -> DrawError {
    DrawError::InvalidTransition {
        state: step.label(),
        action,
    }
}
