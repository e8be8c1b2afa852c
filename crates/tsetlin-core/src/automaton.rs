//! Per-clause x per-literal automaton counter matrix `M`, its polarity
//! bitmap cache `P`, and the optional per-clause weight vector `W`.

use serde::{Deserialize, Serialize};

use crate::config::CountingType;
use crate::containers::{BitMatrix, NumericMatrix};
use crate::prng::IRng;

/// Tagged-width storage for `M`. A systems-language stand-in for the
/// distilled spec's runtime-polymorphic counting type: the hot kernels
/// dispatch once at entry and stay monomorphic inside the match arm.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CounterStorage {
    I8(NumericMatrix<i8>),
    I16(NumericMatrix<i16>),
    I32(NumericMatrix<i32>),
}

impl CounterStorage {
    fn zeroed(ty: CountingType, rows: usize, cols: usize) -> Self {
        match ty {
            CountingType::I8 => CounterStorage::I8(NumericMatrix::zeroed(rows, cols)),
            CountingType::I16 => CounterStorage::I16(NumericMatrix::zeroed(rows, cols)),
            CountingType::I32 => CounterStorage::I32(NumericMatrix::zeroed(rows, cols)),
            CountingType::Auto => unreachable!("CountingType must be resolved before storage allocation"),
        }
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> i64 {
        match self {
            CounterStorage::I8(m) => m.get(r, c) as i64,
            CounterStorage::I16(m) => m.get(r, c) as i64,
            CounterStorage::I32(m) => m.get(r, c) as i64,
        }
    }

    #[inline]
    fn set(&mut self, r: usize, c: usize, v: i64) {
        match self {
            CounterStorage::I8(m) => m.set(r, c, v as i8),
            CounterStorage::I16(m) => m.set(r, c, v as i16),
            CounterStorage::I32(m) => m.set(r, c, v as i32),
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            CounterStorage::I8(m) => m.rows(),
            CounterStorage::I16(m) => m.rows(),
            CounterStorage::I32(m) => m.rows(),
        }
    }

    pub fn cols(&self) -> usize {
        match self {
            CounterStorage::I8(m) => m.cols(),
            CounterStorage::I16(m) => m.cols(),
            CounterStorage::I32(m) => m.cols(),
        }
    }
}

/// Lets the parallel update kernel work generically over the three
/// counter widths instead of triplicating its logic per arm.
pub trait CounterElem: Copy + Default + PartialEq + Send + Sync + 'static {
    fn to_i64(self) -> i64;
    fn from_i64(v: i64) -> Self;
}

impl CounterElem for i8 {
    fn to_i64(self) -> i64 {
        self as i64
    }
    fn from_i64(v: i64) -> Self {
        v as i8
    }
}

impl CounterElem for i16 {
    fn to_i64(self) -> i64 {
        self as i64
    }
    fn from_i64(v: i64) -> Self {
        v as i16
    }
}

impl CounterElem for i32 {
    fn to_i64(self) -> i64 {
        self as i64
    }
    fn from_i64(v: i64) -> Self {
        v as i32
    }
}

impl PartialEq for CounterStorage {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CounterStorage::I8(a), CounterStorage::I8(b)) => a == b,
            (CounterStorage::I16(a), CounterStorage::I16(b)) => a == b,
            (CounterStorage::I32(a), CounterStorage::I32(b)) => a == b,
            _ => false,
        }
    }
}

/// Owns `M`, optionally `P`, and optionally `W`. The only mutators that
/// touch `M` also keep `P` in sync, so the two are never independently
/// observable out of step with each other.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AutomatonState {
    counters: CounterStorage,
    polarity: Option<BitMatrix>,
    weights: Option<Vec<i64>>,
    number_of_states: i64,
    max_weight: i64,
}

impl AutomatonState {
    /// `c_total` is the number of physical clauses (so `M` has `2 * c_total`
    /// rows); `f` is the feature count. Counters are drawn from `{-1, 0}`
    /// uniformly, putting every literal at the include/exclude boundary.
    pub fn new(
        counting_type: CountingType,
        number_of_states: i64,
        max_weight: i64,
        c_total: usize,
        f: usize,
        track_polarity: bool,
        weighted: bool,
        rng: &mut IRng,
    ) -> Self {
        let resolved = counting_type.resolve(number_of_states);
        let rows = 2 * c_total;
        let mut counters = CounterStorage::zeroed(resolved, rows, f);
        let mut polarity = if track_polarity {
            Some(BitMatrix::zeroed(rows, f))
        } else {
            None
        };

        for r in 0..rows {
            for c in 0..f {
                let v = if rng.next(0, 1) == 0 { -1 } else { 0 };
                counters.set(r, c, v);
                if let Some(p) = polarity.as_mut() {
                    if v >= 0 {
                        p.set(r, c);
                    }
                }
            }
        }

        let weights = if weighted { Some(vec![0i64; c_total]) } else { None };

        AutomatonState {
            counters,
            polarity,
            weights,
            number_of_states,
            max_weight,
        }
    }

    /// Rebuild from previously captured parts, e.g. by `EngineState::restore`.
    /// Trusts the caller that `counters`/`polarity`/`weights` shapes already
    /// agree with each other; `check_invariants` can confirm that.
    pub fn from_parts(
        counters: CounterStorage,
        polarity: Option<BitMatrix>,
        weights: Option<Vec<i64>>,
        number_of_states: i64,
        max_weight: i64,
    ) -> Self {
        AutomatonState {
            counters,
            polarity,
            weights,
            number_of_states,
            max_weight,
        }
    }

    pub fn counters(&self) -> &CounterStorage {
        &self.counters
    }

    pub fn counters_mut(&mut self) -> &mut CounterStorage {
        &mut self.counters
    }

    pub fn polarity(&self) -> Option<&BitMatrix> {
        self.polarity.as_ref()
    }

    pub fn polarity_mut(&mut self) -> Option<&mut BitMatrix> {
        self.polarity.as_mut()
    }

    pub fn weight_of(&self, clause: usize) -> i64 {
        match &self.weights {
            Some(w) => w[clause] + 1,
            None => 1,
        }
    }

    pub fn weights_stored(&self) -> Option<&[i64]> {
        self.weights.as_deref()
    }

    pub fn weights_mut(&mut self) -> Option<&mut Vec<i64>> {
        self.weights.as_mut()
    }

    pub fn number_of_states(&self) -> i64 {
        self.number_of_states
    }

    pub fn max_weight(&self) -> i64 {
        self.max_weight
    }

    /// Borrow `M`, `P`, and `W` simultaneously. A plain `&mut self` method
    /// chain (`counters_mut()` then `polarity_mut()`) can't do this: each
    /// call re-borrows the whole `&mut self`, so the first borrow would
    /// still be live when the second one starts. Splitting all three
    /// fields in one function body sidesteps that.
    pub fn split_mut(&mut self) -> (&mut CounterStorage, Option<&mut BitMatrix>, Option<&mut Vec<i64>>) {
        (&mut self.counters, self.polarity.as_mut(), self.weights.as_mut())
    }

    pub fn number_of_clauses(&self) -> usize {
        self.counters.rows() / 2
    }

    pub fn number_of_features(&self) -> usize {
        self.counters.cols()
    }

    #[inline]
    pub fn get(&self, r: usize, f: usize) -> i64 {
        self.counters.get(r, f)
    }

    /// Increment `M[r,f]` toward include, clamped at `number_of_states - 1`.
    /// Flips `P[r,f]` on the boundary crossing.
    #[inline]
    pub fn increment(&mut self, r: usize, f: usize) {
        let old = self.counters.get(r, f);
        let hi = self.number_of_states - 1;
        if old >= hi {
            return;
        }
        let new = old + 1;
        self.counters.set(r, f, new);
        if old < 0 && new >= 0 {
            if let Some(p) = self.polarity.as_mut() {
                p.set(r, f);
            }
        }
    }

    /// Decrement `M[r,f]` toward exclude, clamped at `-number_of_states`.
    /// Flips `P[r,f]` on the boundary crossing.
    #[inline]
    pub fn decrement(&mut self, r: usize, f: usize) {
        let old = self.counters.get(r, f);
        let lo = -self.number_of_states;
        if old <= lo {
            return;
        }
        let new = old - 1;
        self.counters.set(r, f, new);
        if old >= 0 && new < 0 {
            if let Some(p) = self.polarity.as_mut() {
                p.clear(r, f);
            }
        }
    }

    pub fn increment_weight(&mut self, clause: usize) {
        if let Some(w) = self.weights.as_mut() {
            if w[clause] + 1 < self.max_weight {
                w[clause] += 1;
            }
        }
    }

    pub fn decrement_weight(&mut self, clause: usize) {
        if let Some(w) = self.weights.as_mut() {
            if w[clause] > 0 {
                w[clause] -= 1;
            }
        }
    }

    /// Invariant check used by property tests: every counter in range,
    /// `P` matches sign of `M`, every weight in range.
    pub fn check_invariants(&self) -> bool {
        let rows = self.counters.rows();
        let cols = self.counters.cols();
        for r in 0..rows {
            for c in 0..cols {
                let v = self.counters.get(r, c);
                if v < -self.number_of_states || v > self.number_of_states - 1 {
                    return false;
                }
                if let Some(p) = &self.polarity {
                    if p.test(r, c) != (v >= 0) {
                        return false;
                    }
                }
            }
        }
        if let Some(w) = &self.weights {
            for &wc in w {
                if wc < 0 || wc > self.max_weight - 1 {
                    return false;
                }
            }
        }
        true
    }
}
