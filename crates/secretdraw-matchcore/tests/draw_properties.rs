//! Integration test: properties every accepted draw must satisfy.
//!
//! The matcher is non-deterministic by contract, so these tests never pin
//! an exact output. They run the engine many times and check that each
//! result is one of the admissible derangements.

use std::collections::HashSet;

use rand::{SeedableRng, rngs::StdRng};
use secretdraw_matchcore::{compute_matching, compute_matching_with_rng, verify_assignment};
use secretdraw_types::*;

const RUNS: u64 = 200;

fn family() -> Vec<Participant> {
    vec![
        Participant::named(b'A').with_exclusion_group("Couple"),
        Participant::named(b'B').with_exclusion_group("Couple"),
        Participant::named(b'C'),
        Participant::named(b'D'),
    ]
}

fn assert_admissible_derangement(roster: &[Participant], assignment: &Assignment) {
    let active: Vec<&Participant> = roster.iter().filter(|p| p.participates).collect();

    // No fixed points.
    for entry in &assignment.entries {
        assert_ne!(entry.giver, entry.recipient, "self-assignment");
    }

    // Bijection over the participating subset.
    let givers: HashSet<UserId> = assignment.givers().collect();
    let recipients: HashSet<UserId> = assignment.recipients().collect();
    let expected: HashSet<UserId> = active.iter().map(|p| p.user_id).collect();
    assert_eq!(givers, expected);
    assert_eq!(recipients, expected);
    assert_eq!(assignment.len(), expected.len());

    // Every pair admissible at match time.
    for entry in &assignment.entries {
        let giver = active.iter().find(|p| p.user_id == entry.giver).unwrap();
        let recipient = active.iter().find(|p| p.user_id == entry.recipient).unwrap();
        assert!(is_admissible(giver, recipient));
    }

    verify_assignment(roster, assignment).unwrap();
}

#[test]
fn unconstrained_rosters_always_derange() {
    let config = DrawConfig::default();
    for size in 2..=12u8 {
        let roster: Vec<Participant> = (1..=size).map(Participant::named).collect();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = compute_matching_with_rng(&roster, &config, &mut rng)
                .unwrap_or_else(|e| panic!("size {size} seed {seed}: {e}"));
            assert!(result.attempts <= config.max_attempts);
            assert_admissible_derangement(&roster, &result.assignment);
        }
    }
}

#[test]
fn pair_succeeds_within_few_attempts() {
    let roster = vec![Participant::named(1), Participant::named(2)];
    for seed in 0..RUNS {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = compute_matching_with_rng(&roster, &DrawConfig::default(), &mut rng).unwrap();
        assert!(result.attempts <= 64, "seed {seed}: {} attempts", result.attempts);
        assert_admissible_derangement(&roster, &result.assignment);
    }
}

#[test]
fn couple_never_draws_each_other() {
    let roster = family();
    let a = roster[0].user_id;
    let b = roster[1].user_id;

    for seed in 0..RUNS {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = compute_matching_with_rng(&roster, &DrawConfig::default(), &mut rng).unwrap();
        assert_ne!(result.assignment.recipient_of(a), Some(b), "seed {seed}");
        assert_ne!(result.assignment.recipient_of(b), Some(a), "seed {seed}");
        assert_admissible_derangement(&roster, &result.assignment);
    }
}

#[test]
fn mixed_constraints_hold_with_thread_rng() {
    let kid_c = Participant::named(3).with_strict_pool("Kids");
    let roster = vec![
        Participant::named(1).with_strict_pool("Kids"),
        Participant::named(2).with_strict_pool("Kids"),
        kid_c.clone(),
        Participant::named(4).with_exclusion_group("Smith"),
        Participant::named(5).with_exclusion_group("Smith"),
        Participant::named(6).excluding(UserId::from_bytes([4; 16])),
        Participant::named(7),
        Participant::named(8).spectator(),
    ];

    // Only 4 of the 5040 permutations of seven pass, so lift the ceiling.
    let config = DrawConfig {
        max_attempts: 50_000,
        ..DrawConfig::default()
    };
    for _ in 0..50 {
        let result = compute_matching(&roster, &config).unwrap();
        assert_admissible_derangement(&roster, &result.assignment);
        // Pools stay closed in both directions.
        let kid_recipient = result.assignment.recipient_of(kid_c.user_id).unwrap();
        assert!(kid_recipient == roster[0].user_id || kid_recipient == roster[1].user_id);
    }
}

#[test]
fn strict_pool_pair_with_exclusion_is_infeasible() {
    let b = Participant::named(2).with_strict_pool("Kids");
    let a = Participant::named(1)
        .with_strict_pool("Kids")
        .excluding(b.user_id);
    let roster = vec![a, b, Participant::named(3), Participant::named(4)];
    let config = DrawConfig {
        max_attempts: 500,
        ..DrawConfig::default()
    };

    let err = compute_matching(&roster, &config).unwrap_err();
    match err {
        DrawError::InfeasibleConstraints { attempts, .. } => {
            assert!(attempts <= config.max_attempts);
        }
        other => panic!("expected InfeasibleConstraints, got {other:?}"),
    }
}

#[test]
fn repeated_calls_may_differ() {
    let roster: Vec<Participant> = (1..=6).map(Participant::named).collect();
    let distinct: HashSet<Vec<UserId>> = (0..50)
        .map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let result =
                compute_matching_with_rng(&roster, &DrawConfig::default(), &mut rng).unwrap();
            assert_admissible_derangement(&roster, &result.assignment);
            result.assignment.recipients().collect()
        })
        .collect();
    // 265 derangements of six; fifty draws landing on one would be absurd.
    assert!(distinct.len() > 1);
}

#[test]
fn roster_is_not_mutated() {
    let roster = family();
    let before = roster.clone();
    let _ = compute_matching(&roster, &DrawConfig::default()).unwrap();
    assert_eq!(roster, before);
}
