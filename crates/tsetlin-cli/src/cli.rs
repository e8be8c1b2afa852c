use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "tsetlin", author, version, about = "Tsetlin Machine training and inference CLI", long_about = None)]
pub struct Cli {
    /// Enable debug-level logging regardless of RUST_LOG.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train an estimator from scratch and persist its state.
    Fit(FitArgs),

    /// Predict labels/values for a dataset using a saved state.
    Predict(PredictArgs),

    /// Score a saved estimator's accuracy (classifier) or mean absolute error (regressor).
    Evaluate(EvaluateArgs),

    /// Generate a Noisy-XOR dataset CSV.
    GenNoisyXor(GenNoisyXorArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EstimatorKind {
    Classifier,
    Regressor,
}

#[derive(clap::Args)]
pub struct FitArgs {
    /// JSON configuration document (see `ConfigOptions`).
    #[arg(long)]
    pub config: PathBuf,

    /// Training data CSV: 0/1 feature columns followed by a label column.
    #[arg(long)]
    pub data: PathBuf,

    #[arg(long, default_value = "classifier")]
    pub estimator: EstimatorKind,

    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Where to persist the trained estimator's state as JSON.
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(clap::Args)]
pub struct PredictArgs {
    #[arg(long)]
    pub state: PathBuf,

    /// Feature-only CSV (no label column).
    #[arg(long)]
    pub data: PathBuf,
}

#[derive(clap::Args)]
pub struct EvaluateArgs {
    #[arg(long)]
    pub state: PathBuf,

    #[arg(long)]
    pub data: PathBuf,
}

#[derive(clap::Args)]
pub struct GenNoisyXorArgs {
    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = 5000)]
    pub n: usize,

    #[arg(long, default_value_t = 12)]
    pub num_features: usize,

    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    #[arg(long, default_value_t = 1)]
    pub seed: u32,
}
