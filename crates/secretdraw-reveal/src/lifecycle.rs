//! Draw lifecycle: start (OPEN → LOCKED) and reset (LOCKED → OPEN).
//!
//! Starting a draw:
//! 1. Authorize the actor (host/admin)
//! 2. Read the group; it must be OPEN
//! 3. Snapshot the roster and run MatchCore
//! 4. Verify the assignment against the snapshot
//! 5. Lock + persist in one conditional write keyed on the version read in 2
//!
//! Two hosts pressing "start" at once both reach step 5 with the same
//! version; the second conditional write fails with `VersionConflict` and
//! its assignment is discarded.

use chrono::{DateTime, Utc};
use rand::Rng;
use secretdraw_matchcore::{compute_matching_with_rng, verify_assignment};
use secretdraw_types::{Actor, DrawConfig, DrawStore, GroupId, GroupPhase, PhaseStamp, Result};

/// Summary of a locked draw. Does not reveal who drew whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawReceipt {
    pub group_id: GroupId,
    /// Cycle the new assignment belongs to.
    pub stamp: PhaseStamp,
    pub participants: usize,
    pub attempts: usize,
    /// Hex SHA-256 of the persisted assignment.
    pub fingerprint: String,
    pub locked_at: DateTime<Utc>,
}

/// Run the draw for an OPEN group and lock it, using the thread-local RNG.
pub fn start_draw<S: DrawStore + ?Sized>(
    store: &mut S,
    group_id: GroupId,
    actor: &Actor,
    config: &DrawConfig,
) -> Result<DrawReceipt> {
    start_draw_with_rng(store, group_id, actor, config, &mut rand::thread_rng())
}

/// Run the draw for an OPEN group and lock it.
pub fn start_draw_with_rng<S: DrawStore + ?Sized, R: Rng + ?Sized>(
    store: &mut S,
    group_id: GroupId,
    actor: &Actor,
    config: &DrawConfig,
    rng: &mut R,
) -> Result<DrawReceipt> {
    actor.require_privileged()?;

    let group = store.fetch_group(group_id)?;
    group.ensure_phase(GroupPhase::Open)?;

    let roster = store.fetch_roster(group_id)?;
    let draw = compute_matching_with_rng(&roster, config, rng)?;
    verify_assignment(&roster, &draw.assignment)?;

    let locked = store.lock_with_assignment(group_id, group.version, &draw.assignment)?;
    let fingerprint = hex::encode(draw.fingerprint);

    tracing::info!(
        group = %group_id,
        host = %actor.user_id,
        stamp = %locked.stamp(),
        participants = draw.assignment.len(),
        attempts = draw.attempts,
        fingerprint = %fingerprint,
        "Group locked with new assignment"
    );

    Ok(DrawReceipt {
        group_id,
        stamp: locked.stamp(),
        participants: draw.assignment.len(),
        attempts: draw.attempts,
        fingerprint,
        locked_at: locked.locked_at.unwrap_or_else(Utc::now),
    })
}

/// Clear the assignment and every reveal state, returning the group to
/// OPEN. A new draw must be started to produce a fresh assignment.
pub fn reset_draw<S: DrawStore + ?Sized>(
    store: &mut S,
    group_id: GroupId,
    actor: &Actor,
) -> Result<PhaseStamp> {
    actor.require_privileged()?;

    let group = store.fetch_group(group_id)?;
    let reopened = store.reset_group(group_id, group.version)?;

    tracing::info!(
        group = %group_id,
        host = %actor.user_id,
        previous = %group.stamp(),
        stamp = %reopened.stamp(),
        "Group reset: assignment cleared"
    );

    Ok(reopened.stamp())
}
