use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};

/// Uniform `f32` generator in `[0, 1)`. Independently seedable from [`IRng`](super::IRng).
#[derive(Clone, Debug)]
pub struct FRng(ChaCha8Rng);

impl FRng {
    pub fn new(seed: u32) -> Self {
        FRng(ChaCha8Rng::seed_from_u64(seed as u64))
    }

    pub fn reseed(&mut self, seed: u32) {
        self.0 = ChaCha8Rng::seed_from_u64(seed as u64);
    }

    /// Draw a uniform real in `[0, 1)` from the top 24 bits of a `u32`, the
    /// usual single-precision construction that keeps every output exactly
    /// representable as an `f32`.
    pub fn f32(&mut self) -> f32 {
        let bits = self.0.next_u32() >> 8; // 24 significant bits
        (bits as f32) / (1u32 << 24) as f32
    }

    pub(crate) fn inner(&self) -> &ChaCha8Rng {
        &self.0
    }

    pub(crate) fn from_inner(inner: ChaCha8Rng) -> Self {
        FRng(inner)
    }
}
