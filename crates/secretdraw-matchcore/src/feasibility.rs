//! Cheap necessary conditions for a draw to exist.
//!
//! If some member cannot give to anyone, or cannot be received by anyone,
//! no permutation will ever pass. Detecting that up front turns a
//! guaranteed ceiling-exhausting run into an immediate error, and gives the
//! lobby a per-member view of how tight the constraints are.
//!
//! Passing the preflight does not prove feasibility; the retry ceiling in
//! the matcher remains the termination guarantee.

use secretdraw_types::{DrawError, Participant, Result, UserId, is_admissible};

/// Admissible partner counts for one participating member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateReport {
    pub user_id: UserId,
    /// How many members this one may draw.
    pub can_give_to: usize,
    /// How many members may draw this one.
    pub can_receive_from: usize,
}

impl CandidateReport {
    /// No draw can include this member as both giver and recipient.
    #[must_use]
    pub fn is_dead_end(&self) -> bool {
        self.can_give_to == 0 || self.can_receive_from == 0
    }
}

/// Per-member admissible partner counts over a participating pool.
#[must_use]
pub fn candidate_report(pool: &[&Participant]) -> Vec<CandidateReport> {
    pool.iter()
        .map(|member| CandidateReport {
            user_id: member.user_id,
            can_give_to: pool.iter().filter(|c| is_admissible(member, c)).count(),
            can_receive_from: pool.iter().filter(|g| is_admissible(g, member)).count(),
        })
        .collect()
}

/// Fail fast with `InfeasibleConstraints` (zero attempts) when some member
/// has no admissible partner in one direction.
pub fn preflight(pool: &[&Participant]) -> Result<()> {
    if let Some(dead_end) = candidate_report(pool).iter().find(|r| r.is_dead_end()) {
        tracing::warn!(
            user = %dead_end.user_id,
            can_give_to = dead_end.can_give_to,
            can_receive_from = dead_end.can_receive_from,
            "Draw preflight failed: member has no admissible partner"
        );
        return Err(DrawError::InfeasibleConstraints {
            attempts: 0,
            participants: pool.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconstrained_pool_counts() {
        let roster = [
            Participant::named(1),
            Participant::named(2),
            Participant::named(3),
        ];
        let pool: Vec<&Participant> = roster.iter().collect();
        let report = candidate_report(&pool);
        assert_eq!(report.len(), 3);
        for r in &report {
            assert_eq!(r.can_give_to, 2);
            assert_eq!(r.can_receive_from, 2);
            assert!(!r.is_dead_end());
        }
        assert!(preflight(&pool).is_ok());
    }

    #[test]
    fn lonely_strict_pool_fails_preflight() {
        let roster = [
            Participant::named(1).with_strict_pool("Kids"),
            Participant::named(2),
            Participant::named(3),
        ];
        let pool: Vec<&Participant> = roster.iter().collect();
        let report = candidate_report(&pool);
        assert!(report[0].is_dead_end());

        let err = preflight(&pool).unwrap_err();
        assert!(matches!(
            err,
            DrawError::InfeasibleConstraints {
                attempts: 0,
                participants: 3
            }
        ));
    }

    #[test]
    fn nobody_may_draw_target() {
        let c = Participant::named(3);
        let roster = [
            Participant::named(1).excluding(c.user_id),
            Participant::named(2).excluding(c.user_id),
            c,
        ];
        let pool: Vec<&Participant> = roster.iter().collect();
        let report = candidate_report(&pool);
        assert_eq!(report[2].can_receive_from, 0);
        assert!(preflight(&pool).is_err());
    }
}
