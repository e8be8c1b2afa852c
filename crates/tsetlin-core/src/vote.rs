//! Vote aggregation: clamped weighted sums of clause outputs, per label
//! for the classifier or globally for the regressor.

use crate::automaton::AutomatonState;

/// Vote for a single label: clamp(Σ even-indexed w·o − Σ odd-indexed w·o, −T, +T).
/// The accumulator is `i64` regardless of the counter/weight storage width,
/// per §4.6, to avoid overflow.
pub fn label_vote(
    automaton: &AutomatonState,
    clause_output: &[u8],
    label: usize,
    clauses_per_label: usize,
    threshold: i64,
) -> i64 {
    let lo = label * clauses_per_label;
    let hi = lo + clauses_per_label;
    let mut sum: i64 = 0;
    for c in lo..hi {
        if clause_output[c] == 0 {
            continue;
        }
        let w = automaton.weight_of(c);
        if c % 2 == 0 {
            sum += w;
        } else {
            sum -= w;
        }
    }
    sum.clamp(-threshold, threshold)
}

/// Full vote vector across all labels; `predict_raw`'s payload.
pub fn all_label_votes(
    automaton: &AutomatonState,
    clause_output: &[u8],
    number_of_labels: usize,
    clauses_per_label: usize,
    threshold: i64,
) -> Vec<i64> {
    (0..number_of_labels)
        .map(|label| label_vote(automaton, clause_output, label, clauses_per_label, threshold))
        .collect()
}

pub fn argmax(votes: &[i64]) -> usize {
    votes
        .iter()
        .enumerate()
        .max_by_key(|&(_, &v)| v)
        .map(|(i, _)| i)
        .expect("votes must be non-empty")
}

/// Regressor output: clamp(Σ w·o, 0, +T).
pub fn regressor_sum(automaton: &AutomatonState, clause_output: &[u8], threshold: i64) -> i64 {
    let mut sum: i64 = 0;
    for (c, &o) in clause_output.iter().enumerate() {
        if o != 0 {
            sum += automaton.weight_of(c);
        }
    }
    sum.clamp(0, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CountingType;
    use crate::prng::IRng;

    fn automaton(c: usize, f: usize) -> AutomatonState {
        let mut rng = IRng::new(1);
        AutomatonState::new(CountingType::I16, 50, 16, c, f, true, false, &mut rng)
    }

    #[test]
    fn positive_and_negative_polarity_cancel() {
        let a = automaton(10, 4);
        // clauses 0..10 for label 0: outputs all 1, 5 even (positive), 5 odd (negative)
        let clause_output = vec![1u8; 10];
        let v = label_vote(&a, &clause_output, 0, 10, 8);
        assert_eq!(v, 0);
    }

    #[test]
    fn vote_saturates_at_threshold() {
        let a = automaton(10, 4);
        let mut clause_output = vec![0u8; 10];
        for c in (0..10).step_by(2) {
            clause_output[c] = 1; // all positive-polarity clauses fire
        }
        let v = label_vote(&a, &clause_output, 0, 10, 3);
        assert_eq!(v, 3, "must clamp to threshold even though raw sum is 5");
    }

    #[test]
    fn regressor_sum_clamps_to_0_and_threshold() {
        let a = automaton(6, 4);
        let all_on = vec![1u8; 6];
        assert_eq!(regressor_sum(&a, &all_on, 4), 4);
        let all_off = vec![0u8; 6];
        assert_eq!(regressor_sum(&a, &all_off, 4), 0);
    }

    #[test]
    fn argmax_picks_largest_vote() {
        let votes = vec![-3i64, 7, 2, 7];
        assert_eq!(argmax(&votes), 1);
    }
}
