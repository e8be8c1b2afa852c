//! Training and inference engine for Tsetlin Machine classifiers and
//! regressors: automaton state, clause-output kernels, vote aggregation,
//! feedback sampling, and the automata update kernel, plus the
//! `Classifier`/`Regressor` façades that assemble them.

pub mod automaton;
pub mod clause_output;
pub mod coin_tosser;
pub mod config;
pub mod containers;
pub mod csr;
pub mod error;
pub mod estimator;
pub mod feedback;
pub mod prng;
pub mod state;
pub mod update;
pub mod vote;

pub use automaton::{AutomatonState, CounterStorage};
pub use config::{Config, ConfigOptions, CountingType, NJobs, TileSize};
pub use error::{Result, TsetlinError};
pub use estimator::{Classifier, Regressor};
pub use feedback::LossKernel;
pub use state::EngineState;
