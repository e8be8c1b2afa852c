//! Bernoulli(1/s) draws over a feature-width window, cheap enough to call
//! millions of times per training epoch. Two interchangeable variants per
//! §4.3: an exact byte-per-coin cache that eliminates the rounding bias of
//! `round(F/s)`, and a bit-packed legacy cache that trades exactness for
//! lower per-draw cost.

use crate::containers::{blocks_for, BitVector};
use crate::prng::IRng;

/// Exact byte-per-coin Bernoulli(1/s) cache. Owns two independent caches
/// (`tosses1`/`tosses2`) so B2's two independent coin streams per feature
/// don't have to share state.
pub struct ByteCoinTosser {
    f: usize,
    h_floor: u32,
    h_th: u32,
    cache1: Vec<u8>,
    cache2: Vec<u8>,
}

impl ByteCoinTosser {
    pub fn new(f: usize, s: f64) -> Self {
        let mut t = ByteCoinTosser {
            f,
            h_floor: 0,
            h_th: 0,
            cache1: vec![0u8; f],
            cache2: vec![0u8; f],
        };
        t.set_specificity(s);
        t
    }

    pub fn set_specificity(&mut self, s: f64) {
        let expected = self.f as f64 / s;
        self.h_floor = expected.floor() as u32;
        let frac = expected - expected.floor();
        // Threshold in u32 space: P(next() < h_th) == frac.
        self.h_th = (frac * (u32::MAX as f64 + 1.0)) as u32;
    }

    /// De-biased hit count for one cache fill: `floor(F/s)` plus one more
    /// hit with probability equal to the fractional part of `F/s`.
    pub fn estimate_hits(&self, rng: &mut IRng) -> usize {
        let extra = if rng.u32() < self.h_th { 1 } else { 0 };
        (self.h_floor + extra) as usize
    }

    fn fill(cache: &mut [u8], hits: usize, rng: &mut IRng) {
        for b in cache.iter_mut() {
            *b = 0;
        }
        let n = cache.len();
        if n == 0 {
            return;
        }
        let mut placed = 0;
        while placed < hits {
            let idx = rng.next(0, n as u32 - 1) as usize;
            if cache[idx] == 0 {
                cache[idx] = 1;
                placed += 1;
            }
        }
    }

    pub fn tosses1(&mut self, rng: &mut IRng) -> &[u8] {
        let hits = self.estimate_hits(rng);
        Self::fill(&mut self.cache1, hits, rng);
        &self.cache1
    }

    pub fn tosses2(&mut self, rng: &mut IRng) -> &[u8] {
        let hits = self.estimate_hits(rng);
        Self::fill(&mut self.cache2, hits, rng);
        &self.cache2
    }
}

/// Bit-packed legacy Bernoulli(1/s) cache. Lower per-draw cost than the
/// byte variant at the price of `round(size/s)` rounding bias.
pub struct BitCoinTosser {
    f: usize,
    size: usize,
    cache: BitVector,
}

const EXTRA_MARGIN: usize = 64;

impl BitCoinTosser {
    pub fn new(f: usize) -> Self {
        let size = f + EXTRA_MARGIN;
        BitCoinTosser {
            f,
            size,
            cache: BitVector::zeroed(size),
        }
    }

    pub fn populate(&mut self, s: f64, rng: &mut IRng) {
        self.cache.clear_all();
        let target = ((self.size as f64) / s).round() as usize;
        let target = target.min(self.size);
        let mut placed = 0;
        while placed < target {
            let idx = rng.next(0, self.size as u32 - 1) as usize;
            if !self.cache.test(idx) {
                self.cache.set(idx);
                placed += 1;
            }
        }
    }

    /// Swap two random bits, then return a block-aligned window covering
    /// the feature width. Omitting the swap changes PRNG consumption and
    /// breaks bit-exact reproducibility with stored state (Design Note ii).
    pub fn tosses(&mut self, rng: &mut IRng) -> &[u64] {
        let i = rng.next(0, self.size as u32 - 1) as usize;
        let j = rng.next(0, self.size as u32 - 1) as usize;
        if i != j {
            let bi = self.cache.test(i);
            let bj = self.cache.test(j);
            if bi {
                self.cache.set(j);
            } else {
                self.cache.clear(j);
            }
            if bj {
                self.cache.set(i);
            } else {
                self.cache.clear(i);
            }
        }
        let window_blocks = blocks_for(self.f).max(1);
        &self.cache.blocks()[..window_blocks]
    }
}
