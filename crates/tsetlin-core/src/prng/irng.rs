use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};

/// Uniform `u32` generator. Independently seedable and reseedable; not
/// shared across estimator instances or across worker threads.
#[derive(Clone, Debug)]
pub struct IRng(ChaCha8Rng);

impl IRng {
    pub fn new(seed: u32) -> Self {
        IRng(ChaCha8Rng::seed_from_u64(seed as u64))
    }

    pub fn reseed(&mut self, seed: u32) {
        self.0 = ChaCha8Rng::seed_from_u64(seed as u64);
    }

    pub fn u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    /// Uniform integer in the closed range `[lo, hi]`.
    pub fn next(&mut self, lo: u32, hi: u32) -> u32 {
        debug_assert!(lo <= hi);
        let span = (hi - lo) as u64 + 1;
        lo + (self.0.next_u32() as u64 % span) as u32
    }

    /// Fork a deterministic sub-generator for clause index `clause_idx`,
    /// used by the parallel update kernel so worker threads never share a
    /// PRNG (Design Note: option (b), "strongly preferred").
    pub fn fork(&self, estimator_seed: u32, clause_idx: usize) -> IRng {
        let mixed = (estimator_seed as u64) ^ ((clause_idx as u64).wrapping_mul(0x9E3779B97F4A7C15));
        IRng(ChaCha8Rng::seed_from_u64(mixed))
    }

    pub(crate) fn inner(&self) -> &ChaCha8Rng {
        &self.0
    }

    pub(crate) fn from_inner(inner: ChaCha8Rng) -> Self {
        IRng(inner)
    }
}

/// Fisher-Yates permutation of `0..n`, used to draw a reproducible epoch
/// order from the estimator's auxiliary IRNG.
pub fn permutation(rng: &mut IRng, n: usize) -> Vec<usize> {
    let mut v: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.next(0, i as u32) as usize;
        v.swap(i, j);
    }
    v
}
