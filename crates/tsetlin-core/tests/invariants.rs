//! Exercises `AutomatonState::check_invariants` across a handful of
//! widths and shapes, and after a run of real training through the
//! `Classifier` façade — not just on a freshly constructed state.

use tsetlin_core::config::{Config, ConfigOptions, CountingType};
use tsetlin_core::prng::IRng;
use tsetlin_core::{AutomatonState, Classifier};

fn base_config() -> ConfigOptions {
    ConfigOptions {
        clauses_per_output: Some(12),
        number_of_states: Some(50),
        threshold: Some(8),
        specificity: Some(3.0),
        random_state: Some(42),
        ..Default::default()
    }
}

#[test]
fn freshly_constructed_state_satisfies_invariants_for_every_width() {
    for (ct, states) in [
        (CountingType::I8, 50i64),
        (CountingType::I16, 20_000i64),
        (CountingType::I32, 2_000_000i64),
    ] {
        let mut rng = IRng::new(7);
        let automaton = AutomatonState::new(ct, states, 16, 8, 6, true, true, &mut rng);
        assert!(automaton.check_invariants());
    }
}

#[test]
fn invariants_hold_after_a_full_training_run() {
    let cfg = Config::build(base_config()).unwrap();
    let mut clf = Classifier::new(cfg);

    let mut rng = IRng::new(9);
    let mut x_seq = Vec::new();
    let mut y_seq = Vec::new();
    for _ in 0..120 {
        let a = rng.next(0, 1);
        let b = rng.next(0, 1);
        x_seq.push(vec![a as u8, b as u8, (a ^ b) as u8, 0u8]);
        y_seq.push((a ^ b) as usize);
    }
    clf.fit(&x_seq, &y_seq, 5).unwrap();

    assert!(clf.is_initialized());
}
