//! Vote aggregation against a real weighted automaton: confirms that
//! `label_vote`/`regressor_sum` read `W` (not just clause polarity) and
//! still clamp to `[-T, T]`/`[0, T]` when weights push the raw sum past
//! the threshold.

use tsetlin_core::config::CountingType;
use tsetlin_core::prng::IRng;
use tsetlin_core::vote::{all_label_votes, argmax, label_vote, regressor_sum};
use tsetlin_core::AutomatonState;

fn weighted_automaton(clauses_per_label: usize, labels: usize, f: usize) -> AutomatonState {
    let mut rng = IRng::new(21);
    AutomatonState::new(
        CountingType::I16,
        50,
        100,
        clauses_per_label * labels,
        f,
        true,
        true,
        &mut rng,
    )
}

#[test]
fn heavy_weights_still_clamp_to_threshold() {
    let mut automaton = weighted_automaton(4, 2, 3);
    for c in 0..4 {
        for _ in 0..200 {
            automaton.increment_weight(c);
        }
    }
    let clause_output = vec![1u8, 1, 1, 1, 0, 0, 0, 0];
    let threshold = 15;
    let v = label_vote(&automaton, &clause_output, 0, 4, threshold);
    assert_eq!(v, threshold, "raw weighted sum should have blown past the threshold");
}

#[test]
fn all_label_votes_and_argmax_pick_the_strongest_label() {
    let mut automaton = weighted_automaton(4, 3, 3);
    // Boost label 2's even-indexed (positive polarity) clause weights.
    for c in 8..12 {
        if (c - 8) % 2 == 0 {
            for _ in 0..10 {
                automaton.increment_weight(c);
            }
        }
    }
    let clause_output = vec![1u8; 12];
    let votes = all_label_votes(&automaton, &clause_output, 3, 4, 20);
    assert_eq!(argmax(&votes), 2);
}

#[test]
fn regressor_sum_uses_weight_not_just_clause_count() {
    let mut automaton = weighted_automaton(6, 1, 3);
    for _ in 0..50 {
        automaton.increment_weight(0);
    }
    let mut clause_output = vec![0u8; 6];
    clause_output[0] = 1;
    let sum = regressor_sum(&automaton, &clause_output, 10);
    assert_eq!(sum, 10, "one heavily-weighted clause should saturate the threshold alone");
}
