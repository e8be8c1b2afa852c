use thiserror::Error;

/// Narrow error taxonomy for the engine. Every fallible entry point returns
/// one of these instead of panicking; update kernels and PRNG draws never
/// produce one at all.
#[derive(Debug, Error)]
pub enum TsetlinError {
    /// The external configuration document could not be parsed.
    #[error("BadJson: {0}")]
    BadJson(String),

    /// `y` is empty, not zero-based, not contiguous, or has only one class.
    #[error("BadLabels: {0}")]
    BadLabels(String),

    /// A configuration value is out of its allowed range.
    #[error("ValueError: {0}")]
    ValueError(String),
}

pub type Result<T> = std::result::Result<T, TsetlinError>;
