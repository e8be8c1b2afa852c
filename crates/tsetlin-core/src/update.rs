//! Automata update kernel (§4.9): B1/B2/B3 feedback blocks applied per
//! clause, plus weight adjustment in weighted mode. `train_classifier_epoch`
//! and `train_regressor_epoch` in `estimator` drive this per example; this
//! module only knows how to apply one already-sampled feedback decision to
//! one clause.

use rayon::prelude::*;

use crate::automaton::{AutomatonState, CounterElem, CounterStorage};
use crate::coin_tosser::ByteCoinTosser;
use crate::feedback::{FEEDBACK_NONE, FEEDBACK_TYPE_I, FEEDBACK_TYPE_II};
use crate::prng::IRng;

/// Apply one clause's feedback (`FEEDBACK_NONE`/`FEEDBACK_TYPE_I`/
/// `FEEDBACK_TYPE_II`) against its current output, mutating `automaton`
/// in place through its safe per-cell accessors. This is the sequential
/// reference path; see `update_clauses_parallel` for the data-parallel one.
pub fn update_clause(
    automaton: &mut AutomatonState,
    tosser: &mut ByteCoinTosser,
    rng: &mut IRng,
    x: &[u8],
    clause: usize,
    clause_output: u8,
    feedback_code: i8,
    boost_tpf: bool,
) {
    if feedback_code == FEEDBACK_NONE {
        return;
    }
    let direct_row = 2 * clause;
    let negated_row = direct_row + 1;
    let output_is_one = clause_output != 0;

    match (feedback_code, output_is_one) {
        (FEEDBACK_TYPE_I, false) => {
            let coin_direct = tosser.tosses1(rng).to_vec();
            let coin_negated = tosser.tosses2(rng).to_vec();
            for f in 0..coin_direct.len() {
                if coin_direct[f] != 0 {
                    automaton.decrement(direct_row, f);
                }
                if coin_negated[f] != 0 {
                    automaton.decrement(negated_row, f);
                }
            }
        }
        (FEEDBACK_TYPE_I, true) => {
            let coin_pos = tosser.tosses1(rng).to_vec();
            let coin_neg = tosser.tosses2(rng).to_vec();
            for (f, &xf) in x.iter().enumerate() {
                if xf != 0 {
                    if boost_tpf || coin_pos[f] == 0 {
                        automaton.increment(direct_row, f);
                    }
                    if coin_neg[f] != 0 {
                        automaton.decrement(negated_row, f);
                    }
                } else {
                    if boost_tpf || coin_neg[f] == 0 {
                        automaton.increment(negated_row, f);
                    }
                    if coin_pos[f] != 0 {
                        automaton.decrement(direct_row, f);
                    }
                }
            }
            automaton.increment_weight(clause);
        }
        (FEEDBACK_TYPE_II, true) => {
            for (f, &xf) in x.iter().enumerate() {
                if xf == 0 && automaton.get(direct_row, f) < 0 {
                    automaton.increment(direct_row, f);
                }
                if xf == 1 && automaton.get(negated_row, f) < 0 {
                    automaton.increment(negated_row, f);
                }
            }
            automaton.decrement_weight(clause);
        }
        (FEEDBACK_TYPE_II, false) => {
            // No-op: Type-II feedback against an already-excluding clause
            // output of 0 has nothing to reinforce.
        }
        _ => {}
    }
}

/// Sequential update of every clause's feedback for one training example.
pub fn update_clauses_sequential(
    automaton: &mut AutomatonState,
    tosser: &mut ByteCoinTosser,
    rng: &mut IRng,
    x: &[u8],
    clause_output: &[u8],
    feedback: &[i8],
    boost_tpf: bool,
) {
    let c = automaton.number_of_clauses();
    for clause in 0..c {
        update_clause(automaton, tosser, rng, x, clause, clause_output[clause], feedback[clause], boost_tpf);
    }
}

/// Raw per-clause update against two directly-addressed counter rows, used
/// by the parallel path where clauses are split into disjoint chunks of the
/// matrix's backing buffer rather than routed through `AutomatonState`'s
/// `&mut self` accessors (which can't be called concurrently).
#[allow(clippy::too_many_arguments)]
fn update_clause_raw<T: CounterElem>(
    direct: &mut [T],
    negated: &mut [T],
    direct_polarity: &mut [u64],
    negated_polarity: &mut [u64],
    weight: Option<&mut i64>,
    number_of_states: i64,
    max_weight: i64,
    tosser: &mut ByteCoinTosser,
    rng: &mut IRng,
    x: &[u8],
    clause_output: u8,
    feedback_code: i8,
    boost_tpf: bool,
) {
    if feedback_code == FEEDBACK_NONE {
        return;
    }
    let hi = number_of_states - 1;
    let lo = -number_of_states;

    let bump = |cell: &mut T, polarity_row: &mut [u64], f: usize, delta: i64| {
        let old = cell.to_i64();
        let new = old + delta;
        if delta > 0 {
            if old >= hi {
                return;
            }
        } else if old <= lo {
            return;
        }
        *cell = T::from_i64(new);
        if old < 0 && new >= 0 {
            polarity_row[f / 64] |= 1u64 << (f % 64);
        } else if old >= 0 && new < 0 {
            polarity_row[f / 64] &= !(1u64 << (f % 64));
        }
    };

    let output_is_one = clause_output != 0;
    match (feedback_code, output_is_one) {
        (FEEDBACK_TYPE_I, false) => {
            let coin_direct = tosser.tosses1(rng).to_vec();
            let coin_negated = tosser.tosses2(rng).to_vec();
            for f in 0..coin_direct.len() {
                if coin_direct[f] != 0 {
                    bump(&mut direct[f], &mut *direct_polarity, f, -1);
                }
                if coin_negated[f] != 0 {
                    bump(&mut negated[f], &mut *negated_polarity, f, -1);
                }
            }
        }
        (FEEDBACK_TYPE_I, true) => {
            let coin_pos = tosser.tosses1(rng).to_vec();
            let coin_neg = tosser.tosses2(rng).to_vec();
            for (f, &xf) in x.iter().enumerate() {
                if xf != 0 {
                    if boost_tpf || coin_pos[f] == 0 {
                        bump(&mut direct[f], &mut *direct_polarity, f, 1);
                    }
                    if coin_neg[f] != 0 {
                        bump(&mut negated[f], &mut *negated_polarity, f, -1);
                    }
                } else {
                    if boost_tpf || coin_neg[f] == 0 {
                        bump(&mut negated[f], &mut *negated_polarity, f, 1);
                    }
                    if coin_pos[f] != 0 {
                        bump(&mut direct[f], &mut *direct_polarity, f, -1);
                    }
                }
            }
            if let Some(w) = weight {
                if *w + 1 < max_weight {
                    *w += 1;
                }
            }
        }
        (FEEDBACK_TYPE_II, true) => {
            for (f, &xf) in x.iter().enumerate() {
                if xf == 0 && direct[f].to_i64() < 0 {
                    bump(&mut direct[f], &mut *direct_polarity, f, 1);
                }
                if xf == 1 && negated[f].to_i64() < 0 {
                    bump(&mut negated[f], &mut *negated_polarity, f, 1);
                }
            }
            if let Some(w) = weight {
                if *w > 0 {
                    *w -= 1;
                }
            }
        }
        (FEEDBACK_TYPE_II, false) => {}
        _ => {}
    }
}

struct Layout {
    row_stride: usize,
    cols: usize,
    p_row_stride: usize,
    number_of_states: i64,
    max_weight: i64,
}

fn generic_par_update<T: CounterElem>(
    matrix_data: &mut [T],
    polarity_data: &mut [u64],
    weights: Option<&mut [i64]>,
    layout: &Layout,
    x: &[u8],
    clause_output: &[u8],
    feedback: &[i8],
    boost_tpf: bool,
    specificity: f64,
    base_rng: &IRng,
    estimator_seed: u32,
) {
    let counter_chunk = 2 * layout.row_stride;
    let polarity_chunk = 2 * layout.p_row_stride;
    let cols = layout.cols;

    let run = |clause: usize,
               c_chunk: &mut [T],
               p_chunk: &mut [u64],
               weight_slot: Option<&mut i64>| {
        if feedback[clause] == FEEDBACK_NONE {
            return;
        }
        let mut rng = base_rng.fork(estimator_seed, clause);
        let mut tosser = ByteCoinTosser::new(cols, specificity);
        let (direct, negated) = c_chunk.split_at_mut(layout.row_stride);
        let (direct_p, negated_p) = p_chunk.split_at_mut(layout.p_row_stride);
        update_clause_raw(
            &mut direct[..cols],
            &mut negated[..cols],
            direct_p,
            negated_p,
            weight_slot,
            layout.number_of_states,
            layout.max_weight,
            &mut tosser,
            &mut rng,
            x,
            clause_output[clause],
            feedback[clause],
            boost_tpf,
        );
    };

    match weights {
        Some(w) => {
            matrix_data
                .par_chunks_mut(counter_chunk)
                .zip(polarity_data.par_chunks_mut(polarity_chunk))
                .zip(w.par_chunks_mut(1))
                .enumerate()
                .for_each(|(clause, ((c_chunk, p_chunk), w_chunk))| {
                    run(clause, c_chunk, p_chunk, Some(&mut w_chunk[0]));
                });
        }
        None => {
            matrix_data
                .par_chunks_mut(counter_chunk)
                .zip(polarity_data.par_chunks_mut(polarity_chunk))
                .enumerate()
                .for_each(|(clause, (c_chunk, p_chunk))| {
                    run(clause, c_chunk, p_chunk, None);
                });
        }
    }
}

/// Data-parallel update of every clause's feedback for one training
/// example. Requires polarity tracking to be enabled on `automaton` (every
/// estimator façade enables it); if it is not, this falls back to the
/// sequential path, since clause-disjoint chunking of the counter matrix
/// alone cannot keep `P` in sync without it (Design Note: PRNG
/// reproducibility under parallelism, option (b)).
#[allow(clippy::too_many_arguments)]
pub fn update_clauses_parallel(
    automaton: &mut AutomatonState,
    x: &[u8],
    clause_output: &[u8],
    feedback: &[i8],
    boost_tpf: bool,
    specificity: f64,
    base_rng: &IRng,
    estimator_seed: u32,
) {
    let cols = automaton.number_of_features();
    let number_of_states = automaton.number_of_states();
    let max_weight = automaton.max_weight();

    let has_polarity = automaton.polarity().is_some();
    if !has_polarity {
        let mut rng = base_rng.clone();
        let mut tosser = ByteCoinTosser::new(cols, specificity);
        update_clauses_sequential(automaton, &mut tosser, &mut rng, x, clause_output, feedback, boost_tpf);
        return;
    }

    let (counters, polarity, weights) = automaton.split_mut();
    let polarity = polarity.expect("checked above");
    let p_row_stride = polarity.row_stride_blocks();
    let p_data = polarity.data_mut();
    let weights = weights.map(|w| w.as_mut_slice());

    macro_rules! dispatch {
        ($m:expr) => {{
            let row_stride = $m.row_stride();
            let data = $m.data_mut();
            let layout = Layout {
                row_stride,
                cols,
                p_row_stride,
                number_of_states,
                max_weight,
            };
            generic_par_update(data, p_data, weights, &layout, x, clause_output, feedback, boost_tpf, specificity, base_rng, estimator_seed);
        }};
    }

    match counters {
        CounterStorage::I8(m) => dispatch!(m),
        CounterStorage::I16(m) => dispatch!(m),
        CounterStorage::I32(m) => dispatch!(m),
    }
}
