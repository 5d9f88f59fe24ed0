//! Assignment verification and fingerprinting.
//!
//! `verify_assignment` re-checks an assignment against the roster it was
//! drawn from: it must cover the participating subset exactly, be a
//! bijection, and respect every constraint. `start_draw` runs it on every
//! assignment before the assignment is persisted.
//!
//! The fingerprint is a SHA-256 over the entries in order; it lets logs
//! and receipts refer to one assignment without printing who drew whom.

use std::collections::{HashMap, HashSet};

use secretdraw_types::{
    Assignment, DrawError, Participant, Result, UserId, constants, inadmissibility,
};
use sha2::{Digest, Sha256};

use crate::matcher::active_subset;

/// Check that `assignment` is an admissible derangement of the
/// participating members of `roster`.
pub fn verify_assignment(roster: &[Participant], assignment: &Assignment) -> Result<()> {
    let pool = active_subset(roster);
    let by_user: HashMap<UserId, &Participant> = pool.iter().map(|p| (p.user_id, *p)).collect();

    if assignment.len() != pool.len() {
        return Err(invalid(format!(
            "{} entries for {} participating members",
            assignment.len(),
            pool.len()
        )));
    }

    let mut givers = HashSet::with_capacity(pool.len());
    let mut recipients = HashSet::with_capacity(pool.len());

    for entry in &assignment.entries {
        let giver = by_user
            .get(&entry.giver)
            .ok_or_else(|| invalid(format!("giver {} is not participating", entry.giver)))?;
        if giver.participation_id != entry.participation_id {
            return Err(invalid(format!(
                "giver {} recorded under {}, expected {}",
                entry.giver, entry.participation_id, giver.participation_id
            )));
        }
        let recipient = by_user.get(&entry.recipient).ok_or_else(|| {
            invalid(format!("recipient {} is not participating", entry.recipient))
        })?;
        if !givers.insert(entry.giver) {
            return Err(invalid(format!("giver {} appears twice", entry.giver)));
        }
        if !recipients.insert(entry.recipient) {
            return Err(invalid(format!(
                "recipient {} appears twice",
                entry.recipient
            )));
        }
        if let Some(rule) = inadmissibility(giver, recipient) {
            return Err(invalid(format!(
                "{} -> {} violates {rule}",
                entry.giver, entry.recipient
            )));
        }
    }

    Ok(())
}

fn invalid(reason: String) -> DrawError {
    DrawError::InvalidAssignment { reason }
}

/// SHA-256 over the assignment entries, in order.
#[must_use]
pub fn assignment_fingerprint(assignment: &Assignment) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(constants::FINGERPRINT_DOMAIN);
    hasher.update((assignment.len() as u64).to_le_bytes());

    for entry in &assignment.entries {
        hasher.update(entry.participation_id.0.as_bytes());
        hasher.update(entry.giver.0.as_bytes());
        hasher.update(entry.recipient.0.as_bytes());
    }

    let result = hasher.finalize();
    let mut fingerprint = [0u8; 32];
    fingerprint.copy_from_slice(&result);
    fingerprint
}

/// Hex form of [`assignment_fingerprint`].
#[must_use]
pub fn fingerprint_hex(assignment: &Assignment) -> String {
    hex::encode(assignment_fingerprint(assignment))
}
