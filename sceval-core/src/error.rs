//! Structured error types for the sceval crates.

use thiserror::Error;

/// Unified error type for all sceval operations.
#[derive(Debug, Error)]
pub enum SceError {
    /// I/O error (writing a rendered figure, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input (bad shapes, out-of-range parameters)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Corruption method name other than `Uniform` or `Binomial`
    #[error("unsupported corruption method {method:?}: method can be one of \"Uniform\" or \"Binomial\"")]
    UnsupportedMethod { method: String },

    /// Chart rendering failure
    #[error("plot error: {0}")]
    Plot(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the sceval crates.
pub type Result<T> = std::result::Result<T, SceError>;
