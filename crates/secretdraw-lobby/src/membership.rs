//! Group creation and membership.
//!
//! A group is created OPEN with a fresh join code and its host as the first
//! member. Others join by typing the code while the group is still OPEN.
//! Joining is idempotent: a member who joins again gets their existing
//! membership back.

use rand::Rng;
use secretdraw_types::{
    DisplayMetadata, DrawError, DrawStore, Group, GroupId, GroupPhase, JoinCode, LobbyConfig,
    Participant, Result, UserId,
};

use crate::join_code::allocate_join_code;

/// A user's membership in a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub group: Group,
    pub participant: Participant,
    /// `false` when the user was already a member.
    pub newly_joined: bool,
}

/// Create an OPEN group hosted by `host`, who joins it immediately.
pub fn create_group<S: DrawStore + ?Sized, R: Rng + ?Sized>(
    store: &mut S,
    host: UserId,
    metadata: DisplayMetadata,
    rng: &mut R,
) -> Result<Membership> {
    let code = allocate_join_code(store, rng)?;
    let group = Group::new(host, code);
    store.insert_group(group.clone())?;

    let participant = Participant::new(host, 1);
    store.add_member(group.id, participant.clone(), metadata)?;

    tracing::info!(group = %group.id, host = %host, code = %group.code, "Group created");

    Ok(Membership {
        group,
        participant,
        newly_joined: true,
    })
}

/// Join the group behind `code_input`.
///
/// # Errors
/// - `InvalidJoinCode` if the input is not six digits or names no group
/// - `StaleGroupPhase` if the draw has already started
/// - `RosterFull` at `config.max_participants` members
pub fn join_group<S: DrawStore + ?Sized>(
    store: &mut S,
    config: &LobbyConfig,
    code_input: &str,
    user_id: UserId,
    metadata: DisplayMetadata,
) -> Result<Membership> {
    let invalid = || DrawError::InvalidJoinCode {
        input: code_input.trim().to_string(),
    };
    let code = JoinCode::parse(code_input).ok_or_else(invalid)?;
    let group = store.find_group_by_code(&code)?.ok_or_else(invalid)?;
    group.ensure_phase(GroupPhase::Open)?;

    let roster = store.fetch_roster(group.id)?;
    if let Some(existing) = roster.iter().find(|p| p.user_id == user_id) {
        tracing::debug!(group = %group.id, user = %user_id, "Already a member");
        return Ok(Membership {
            group,
            participant: existing.clone(),
            newly_joined: false,
        });
    }

    if roster.len() >= config.max_participants {
        return Err(DrawError::RosterFull {
            max: config.max_participants,
        });
    }

    let sequence = roster.iter().map(|p| p.sequence).max().unwrap_or(0) + 1;
    let participant = Participant::new(user_id, sequence);
    store.add_member(group.id, participant.clone(), metadata)?;

    tracing::info!(
        group = %group.id,
        user = %user_id,
        members = roster.len() + 1,
        "Member joined"
    );

    Ok(Membership {
        group,
        participant,
        newly_joined: true,
    })
}

/// Replace a member's own wishlist. Allowed in either phase.
pub fn update_wishlist<S: DrawStore + ?Sized>(
    store: &mut S,
    group_id: GroupId,
    user_id: UserId,
    wishlist: Option<String>,
) -> Result<DisplayMetadata> {
    let roster = store.fetch_roster(group_id)?;
    if !roster.iter().any(|p| p.user_id == user_id) {
        return Err(DrawError::ParticipantNotFound(user_id));
    }

    let mut metadata = store.fetch_display_metadata(group_id, user_id)?;
    metadata.wishlist = wishlist.filter(|w| !w.trim().is_empty());
    store.set_display_metadata(group_id, user_id, metadata.clone())?;
    Ok(metadata)
}
