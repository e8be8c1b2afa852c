//! `EngineState`: a serde-exchangeable snapshot of one estimator's mutable
//! state (counters, polarity, weights, both PRNG streams) plus its frozen
//! configuration. `tsetlin-cli` is the only thing that turns this into
//! bytes on disk; this module only guarantees `capture`/`restore` round-trip
//! bit-for-bit.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::automaton::{AutomatonState, CounterStorage};
use crate::config::Config;
use crate::containers::BitMatrix;
use crate::prng::{FRng, IRng};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineState {
    pub config: Config,
    pub counters: CounterStorage,
    pub polarity: Option<BitMatrix>,
    /// Logical weights (`stored_weight + 1`) for human-readable JSON;
    /// converted back to the stored offset form on restore.
    pub weights: Option<Vec<i32>>,
    pub irng_state: ChaCha8Rng,
    pub frng_state: ChaCha8Rng,
}

impl EngineState {
    pub fn capture(config: &Config, automaton: &AutomatonState, irng: &IRng, frng: &FRng) -> Self {
        let weights = automaton
            .weights_stored()
            .map(|w| w.iter().map(|&stored| (stored + 1) as i32).collect());
        EngineState {
            config: config.clone(),
            counters: automaton.counters().clone(),
            polarity: automaton.polarity().cloned(),
            weights,
            irng_state: irng.inner().clone(),
            frng_state: frng.inner().clone(),
        }
    }

    pub fn restore(self) -> (Config, AutomatonState, IRng, FRng) {
        let weights_stored = self
            .weights
            .map(|w| w.into_iter().map(|logical| (logical - 1) as i64).collect());
        let automaton = AutomatonState::from_parts(
            self.counters,
            self.polarity,
            weights_stored,
            self.config.number_of_states,
            self.config.max_weight,
        );
        let irng = IRng::from_inner(self.irng_state);
        let frng = FRng::from_inner(self.frng_state);
        (self.config, automaton, irng, frng)
    }
}
