//! Recipient lookup shared by individual and kiosk mode.

use secretdraw_types::{
    DrawError, DrawStore, GroupId, Participant, RecipientCard, Result, UserId,
};

/// The roster entry of `user_id`.
pub fn find_member(roster: &[Participant], user_id: UserId) -> Result<&Participant> {
    roster
        .iter()
        .find(|p| p.user_id == user_id)
        .ok_or(DrawError::ParticipantNotFound(user_id))
}

/// Resolve the recipient card of `giver`.
///
/// Any gap between the giver and a displayable recipient (no assignment,
/// no entry for the giver, a recipient that is the giver or not a
/// participating member) is reported as `MissingAssignment`.
pub fn recipient_card<S: DrawStore + ?Sized>(
    store: &S,
    group_id: GroupId,
    roster: &[Participant],
    giver: &Participant,
) -> Result<RecipientCard> {
    if !giver.participates {
        return Err(DrawError::NotParticipating(giver.user_id));
    }

    let missing = || DrawError::MissingAssignment(giver.user_id);

    let assignment = store.fetch_assignment(group_id)?.ok_or_else(missing)?;
    let recipient = assignment.recipient_of(giver.user_id).ok_or_else(missing)?;

    let valid = recipient != giver.user_id
        && roster
            .iter()
            .any(|p| p.user_id == recipient && p.participates);
    if !valid {
        tracing::warn!(
            group = %group_id,
            giver = %giver.user_id,
            recipient = %recipient,
            "Malformed assignment entry"
        );
        return Err(missing());
    }

    let metadata = store.fetch_display_metadata(group_id, recipient)?;
    Ok(RecipientCard::new(recipient, metadata))
}
