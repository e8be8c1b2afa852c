use thiserror::Error;

/// Wraps `tsetlin_core::TsetlinError` with the I/O and parsing failures
/// that only exist at the CLI boundary; the core taxonomy is never
/// re-interpreted, only carried through via `#[from]`.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] tsetlin_core::TsetlinError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("BadJson: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
