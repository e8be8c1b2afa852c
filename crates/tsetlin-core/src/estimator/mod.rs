//! Estimator façades: `Classifier` and `Regressor` assemble the kernels
//! below them into `fit`/`partial_fit`/`predict`/`predict_raw`/`evaluate`
//! (§4.10). Both share the same permutation-ordered-epoch training loop
//! and per-example scratch reuse; they differ only in vote aggregation and
//! feedback sampling.

mod classifier;
mod regressor;

pub use classifier::Classifier;
pub use regressor::Regressor;
