//! Rejection-sampling derangement matcher.
//!
//! The core matching function: takes a roster snapshot and produces a
//! `DrawResult`. No side effects, no storage writes, no phase changes.
//!
//! ```text
//! compute_matching(&[Participant], &DrawConfig) -> Result<DrawResult>
//! ```
//!
//! ## Sampling
//!
//! Each attempt draws a uniformly random permutation of the participating
//! pool with a Fisher–Yates shuffle and accepts it only if every position
//! passes [`secretdraw_types::is_admissible`]. Attempts are independent; the first passing
//! permutation wins. Any admissible derangement is an equally valid answer,
//! so two calls on the same roster may return different assignments.

use rand::{Rng, seq::SliceRandom};
use secretdraw_types::{
    Assignment, AssignmentEntry, DrawConfig, DrawError, Inadmissible, Participant, Result,
    constants, inadmissibility,
};

use crate::{feasibility::preflight, verify::assignment_fingerprint};

/// Output of one successful draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawResult {
    pub assignment: Assignment,
    /// Permutations sampled, including the accepted one.
    pub attempts: usize,
    /// SHA-256 over the assignment entries, for audit logs.
    pub fingerprint: [u8; 32],
    /// Why the `attempts - 1` earlier permutations were rejected.
    pub rejections: RejectionTally,
}

/// Rejected permutations, keyed by the first rule each one broke.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RejectionTally {
    pub self_match: usize,
    pub same_exclusion_group: usize,
    pub strict_pool_mismatch: usize,
    pub specific_exclusion: usize,
}

impl RejectionTally {
    fn record(&mut self, reason: Inadmissible) {
        match reason {
            Inadmissible::SelfMatch => self.self_match += 1,
            Inadmissible::SameExclusionGroup => self.same_exclusion_group += 1,
            Inadmissible::StrictPoolMismatch => self.strict_pool_mismatch += 1,
            Inadmissible::SpecificExclusion => self.specific_exclusion += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.self_match
            + self.same_exclusion_group
            + self.strict_pool_mismatch
            + self.specific_exclusion
    }

    fn log(&self, outcome: &str) {
        tracing::debug!(
            outcome,
            rejected = self.total(),
            self_match = self.self_match,
            same_exclusion_group = self.same_exclusion_group,
            strict_pool_mismatch = self.strict_pool_mismatch,
            specific_exclusion = self.specific_exclusion,
            "Rejected permutations"
        );
    }
}

/// Participating members of a roster, in roster order. Spectators are
/// left out.
#[must_use]
pub fn active_subset(roster: &[Participant]) -> Vec<&Participant> {
    roster.iter().filter(|p| p.participates).collect()
}

/// Draw an assignment using the thread-local RNG.
pub fn compute_matching(roster: &[Participant], config: &DrawConfig) -> Result<DrawResult> {
    compute_matching_with_rng(roster, config, &mut rand::thread_rng())
}

/// Draw an assignment using the supplied RNG.
///
/// ## Algorithm
///
/// 1. Keep only participating members (roster order)
/// 2. Reject pools smaller than the configured minimum (`InvalidRoster`)
/// 3. Preflight: fail fast if any member has no admissible partner
/// 4. Up to `max_attempts` times: shuffle, test every position, accept or retry
/// 5. Ceiling reached → `InfeasibleConstraints`
///
/// The roster is only borrowed; nothing is written on failure.
pub fn compute_matching_with_rng<R: Rng + ?Sized>(
    roster: &[Participant],
    config: &DrawConfig,
    rng: &mut R,
) -> Result<DrawResult> {
    config.validate()?;

    let pool = active_subset(roster);
    let required = config.min_participants.max(constants::MIN_PARTICIPANTS);
    if pool.len() < required {
        tracing::warn!(
            participating = pool.len(),
            required,
            "Draw rejected: roster too small"
        );
        return Err(DrawError::InvalidRoster {
            participating: pool.len(),
            required,
        });
    }

    preflight(&pool)?;

    // A Fisher–Yates shuffle of any arrangement is uniform, so `order` is
    // reused across attempts.
    let mut order: Vec<usize> = (0..pool.len()).collect();
    let mut rejections = RejectionTally::default();
    for attempt in 1..=config.max_attempts {
        order.shuffle(rng);

        let broken = pool
            .iter()
            .zip(&order)
            .find_map(|(giver, &j)| inadmissibility(giver, pool[j]));
        if let Some(reason) = broken {
            rejections.record(reason);
            continue;
        }
        rejections.log("accepted");

        let assignment = Assignment::new(
            pool.iter()
                .zip(&order)
                .map(|(giver, &j)| AssignmentEntry {
                    participation_id: giver.participation_id,
                    giver: giver.user_id,
                    recipient: pool[j].user_id,
                })
                .collect(),
        );
        let fingerprint = assignment_fingerprint(&assignment);

        tracing::info!(
            participants = pool.len(),
            spectators = roster.len() - pool.len(),
            attempts = attempt,
            fingerprint = %hex::encode(fingerprint),
            "Draw complete"
        );

        return Ok(DrawResult {
            assignment,
            attempts: attempt,
            fingerprint,
            rejections,
        });
    }

    rejections.log("exhausted");
    tracing::warn!(
        participants = pool.len(),
        attempts = config.max_attempts,
        "Draw failed: retry ceiling reached without an admissible permutation"
    );
    Err(DrawError::InfeasibleConstraints {
        attempts: config.max_attempts,
        participants: pool.len(),
    })
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use secretdraw_types::*;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn fewer_than_two_is_invalid_roster() {
        let roster = [Participant::named(1)];
        let err = compute_matching_with_rng(&roster, &DrawConfig::default(), &mut rng())
            .unwrap_err();
        assert!(matches!(
            err,
            DrawError::InvalidRoster {
                participating: 1,
                required: 2
            }
        ));
    }

    #[test]
    fn spectators_do_not_count() {
        let roster = [
            Participant::named(1),
            Participant::named(2).spectator(),
            Participant::named(3).spectator(),
        ];
        let err = compute_matching_with_rng(&roster, &DrawConfig::default(), &mut rng())
            .unwrap_err();
        assert!(matches!(err, DrawError::InvalidRoster { .. }));
    }

    #[test]
    fn pair_swaps() {
        let a = Participant::named(1);
        let b = Participant::named(2);
        let roster = [a.clone(), b.clone()];
        let result =
            compute_matching_with_rng(&roster, &DrawConfig::default(), &mut rng()).unwrap();

        assert_eq!(result.assignment.recipient_of(a.user_id), Some(b.user_id));
        assert_eq!(result.assignment.recipient_of(b.user_id), Some(a.user_id));
        // One in two permutations of two elements is the swap.
        assert!(result.attempts <= 64, "attempts = {}", result.attempts);
    }

    #[test]
    fn output_is_keyed_by_participation_record() {
        let roster = [Participant::named(1), Participant::named(2), Participant::named(3)];
        let result =
            compute_matching_with_rng(&roster, &DrawConfig::default(), &mut rng()).unwrap();
        for p in &roster {
            let entry = result.assignment.entry_for(p.participation_id).unwrap();
            assert_eq!(entry.giver, p.user_id);
        }
    }

    #[test]
    fn spectators_are_left_out_of_assignment() {
        let spectator = Participant::named(9).spectator();
        let roster = [
            Participant::named(1),
            spectator.clone(),
            Participant::named(2),
            Participant::named(3),
        ];
        let result =
            compute_matching_with_rng(&roster, &DrawConfig::default(), &mut rng()).unwrap();
        assert_eq!(result.assignment.len(), 3);
        assert!(result.assignment.recipient_of(spectator.user_id).is_none());
        assert!(result.assignment.recipients().all(|r| r != spectator.user_id));
    }

    #[test]
    fn ceiling_reached_reports_infeasible() {
        // Passes preflight, yet 1 and 2 may only draw 3: no derangement.
        let c = Participant::named(3);
        let a = Participant::named(1).excluding(UserId::from_bytes([2; 16]));
        let b = Participant::named(2).excluding(a.user_id);
        let roster = [a, b, c];
        let config = DrawConfig {
            max_attempts: 50,
            ..DrawConfig::default()
        };
        let err = compute_matching_with_rng(&roster, &config, &mut rng()).unwrap_err();
        assert!(matches!(
            err,
            DrawError::InfeasibleConstraints {
                attempts: 50,
                participants: 3
            }
        ));
    }

    #[test]
    fn invalid_config_rejected_before_sampling() {
        let roster = [Participant::named(1), Participant::named(2)];
        let config = DrawConfig {
            max_attempts: 0,
            ..DrawConfig::default()
        };
        let err = compute_matching_with_rng(&roster, &config, &mut rng()).unwrap_err();
        assert!(matches!(err, DrawError::Configuration(_)));
    }

    #[test]
    fn rejections_account_for_every_failed_attempt() {
        let roster = [
            Participant::named(1).with_exclusion_group("ab"),
            Participant::named(2).with_exclusion_group("ab"),
            Participant::named(3).with_exclusion_group("cd"),
            Participant::named(4).with_exclusion_group("cd"),
        ];
        let mut same_group = 0;
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = compute_matching_with_rng(&roster, &DrawConfig::default(), &mut rng)
                .unwrap();
            assert_eq!(result.rejections.total(), result.attempts - 1);
            assert_eq!(result.rejections.strict_pool_mismatch, 0);
            same_group += result.rejections.same_exclusion_group;
        }
        assert!(same_group > 0);
    }

    #[test]
    fn fingerprint_matches_assignment() {
        let roster = [Participant::named(1), Participant::named(2), Participant::named(3)];
        let result =
            compute_matching_with_rng(&roster, &DrawConfig::default(), &mut rng()).unwrap();
        assert_eq!(result.fingerprint, assignment_fingerprint(&result.assignment));
    }
}
