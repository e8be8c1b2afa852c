//! Clause-output kernels: evaluate clauses `[lo, hi)` against a feature
//! vector and write 0/1 into `clause_output`. Two axes of variation per
//! §4.5: byte-wise vs. bit-packed input/state, and training (no pruning)
//! vs. inference (prune all-excluded clauses).

use rayon::prelude::*;

use crate::automaton::AutomatonState;
use crate::containers::BitMatrix;

/// Byte-wise clause evaluation against a 0/1 feature vector. `tile_size`
/// only shapes the inner loop's unroll granularity (a literal-check budget
/// per early-exit test); it never changes the result.
fn clause_is_true_byte(automaton: &AutomatonState, x: &[u8], clause: usize, tile_size: usize) -> bool {
    let direct_row = 2 * clause;
    let negated_row = 2 * clause + 1;
    let f = automaton.number_of_features();

    if f < tile_size {
        for feat in 0..f {
            let include_direct = automaton.get(direct_row, feat) >= 0;
            let include_negated = automaton.get(negated_row, feat) >= 0;
            let x_set = x[feat] != 0;
            if (include_direct && !x_set) || (include_negated && x_set) {
                return false;
            }
        }
        return true;
    }

    let mut feat = 0;
    while feat < f {
        let end = (feat + tile_size).min(f);
        let mut tile_fail = false;
        for i in feat..end {
            let include_direct = automaton.get(direct_row, i) >= 0;
            let include_negated = automaton.get(negated_row, i) >= 0;
            let x_set = x[i] != 0;
            if (include_direct && !x_set) || (include_negated && x_set) {
                tile_fail = true;
            }
        }
        if tile_fail {
            return false;
        }
        feat = end;
    }
    true
}

fn clause_all_excluded(automaton: &AutomatonState, clause: usize) -> bool {
    let direct_row = 2 * clause;
    let negated_row = 2 * clause + 1;
    (0..automaton.number_of_features()).all(|feat| {
        automaton.get(direct_row, feat) < 0 && automaton.get(negated_row, feat) < 0
    })
}

/// Training-path kernel: straightforward conjunction, no pruning.
pub fn calculate_clause_output(
    automaton: &AutomatonState,
    x: &[u8],
    clause_output: &mut [u8],
    lo: usize,
    hi: usize,
    tile_size: usize,
) {
    for c in lo..hi {
        clause_output[c] = clause_is_true_byte(automaton, x, c, tile_size) as u8;
    }
}

/// Inference-path kernel: same conjunction, but an all-excluded clause
/// (every literal, direct and negated, in the exclude state) is forced to
/// output 0 rather than the tautological 1 it would otherwise produce.
pub fn calculate_clause_output_with_pruning(
    automaton: &AutomatonState,
    x: &[u8],
    clause_output: &mut [u8],
    lo: usize,
    hi: usize,
    tile_size: usize,
) {
    for c in lo..hi {
        if clause_all_excluded(automaton, c) {
            clause_output[c] = 0;
        } else {
            clause_output[c] = clause_is_true_byte(automaton, x, c, tile_size) as u8;
        }
    }
}

/// Parallel wrapper over the clause dimension, grounded in the teacher's
/// `output.par_iter_mut()` pattern (`kernels/cpu.rs`). Each worker owns a
/// disjoint slice of `clause_output`; `automaton` and `x` are read-only.
pub fn calculate_clause_output_parallel(
    automaton: &AutomatonState,
    x: &[u8],
    clause_output: &mut [u8],
    tile_size: usize,
    pruning: bool,
) {
    clause_output.par_iter_mut().enumerate().for_each(|(c, out)| {
        *out = if pruning && clause_all_excluded(automaton, c) {
            0
        } else {
            clause_is_true_byte(automaton, x, c, tile_size) as u8
        };
    });
}

/// Bitwise clause evaluation: a block is a conjunction failure iff
/// `(P_direct & ~X) | (P_negated & X) != 0`. The row-padding invariant
/// (bits beyond `F` are always 0 in both `P` and `X`) is what makes the
/// whole-row zero check correct for the pruning variant.
pub fn calculate_clause_output_bitwise(
    polarity: &BitMatrix,
    x_blocks: &[u64],
    clause_output: &mut [u8],
    lo: usize,
    hi: usize,
    pruning: bool,
) {
    for c in lo..hi {
        let direct_row = 2 * c;
        let negated_row = 2 * c + 1;
        let p_direct = polarity.row_data(direct_row);
        let p_negated = polarity.row_data(negated_row);

        if pruning && polarity.row_is_all_zero(direct_row) && polarity.row_is_all_zero(negated_row) {
            clause_output[c] = 0;
            continue;
        }

        let mut fail = false;
        for b in 0..p_direct.len() {
            let block_fail = (p_direct[b] & !x_blocks[b]) | (p_negated[b] & x_blocks[b]);
            if block_fail != 0 {
                fail = true;
                break;
            }
        }
        clause_output[c] = (!fail) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CountingType;
    use crate::containers::pack_bytes;
    use crate::prng::IRng;

    fn make_automaton(c: usize, f: usize, seed: u32) -> AutomatonState {
        let mut rng = IRng::new(seed);
        AutomatonState::new(CountingType::I16, 50, 16, c, f, true, false, &mut rng)
    }

    #[test]
    fn bytewise_and_bitwise_agree_when_no_all_excluded_clause() {
        let c = 8;
        let f = 37;
        // Force a state with no all-excluded clauses: include at least one
        // literal per clause by incrementing a representative counter.
        let mut automaton = make_automaton(c, f, 9);
        for clause in 0..c {
            automaton.increment(2 * clause, 0);
        }
        let x: Vec<u8> = (0..f).map(|i| (i % 3 == 0) as u8).collect();
        let x_bits = pack_bytes(&x);

        let mut byte_out = vec![0u8; c];
        calculate_clause_output(&automaton, &x, &mut byte_out, 0, c, 16);

        let mut bit_out = vec![0u8; c];
        calculate_clause_output_bitwise(
            automaton.polarity().unwrap(),
            x_bits.blocks(),
            &mut bit_out,
            0,
            c,
            false,
        );

        assert_eq!(byte_out, bit_out);
    }

    #[test]
    fn pruning_forces_all_excluded_clause_to_zero() {
        let c = 4;
        let f = 10;
        let mut automaton = make_automaton(c, f, 1);
        // Drive clause 0 fully excluded.
        for feat in 0..f {
            for _ in 0..200 {
                automaton.decrement(0, feat);
                automaton.decrement(1, feat);
            }
        }
        let x = vec![0u8; f];

        let mut no_prune = vec![0u8; c];
        calculate_clause_output(&automaton, &x, &mut no_prune, 0, c, 16);
        assert_eq!(no_prune[0], 1, "untrained clause is tautologically true without pruning");

        let mut pruned = vec![0u8; c];
        calculate_clause_output_with_pruning(&automaton, &x, &mut pruned, 0, c, 16);
        assert_eq!(pruned[0], 0);
    }

    #[test]
    fn parallel_matches_sequential() {
        let c = 16;
        let f = 20;
        let automaton = make_automaton(c, f, 5);
        let x: Vec<u8> = (0..f).map(|i| (i % 2) as u8).collect();

        let mut seq = vec![0u8; c];
        calculate_clause_output(&automaton, &x, &mut seq, 0, c, 16);

        let mut par = vec![0u8; c];
        calculate_clause_output_parallel(&automaton, &x, &mut par, 16, false);

        assert_eq!(seq, par);
    }
}
