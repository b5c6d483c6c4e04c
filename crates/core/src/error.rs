//! Error types for geokrig

use thiserror::Error;

/// Main error type for geokrig operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed point records or non-finite coordinates
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// A single-lag statistic was requested for a window with no point pairs
    #[error("Empty lag: no point pairs fall inside the lag window")]
    EmptyLag,

    /// The kriging covariance matrix cannot be inverted
    #[error("Singular matrix: {size}x{size} kriging system is not invertible")]
    SingularMatrix { size: usize },

    /// A computed covariance entry is NaN or infinite
    #[error("Non-finite value in {what} at ({row}, {col})")]
    NonFinite {
        what: &'static str,
        row: usize,
        col: usize,
    },

    #[error("Insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`] with a displayable value.
    pub fn invalid_parameter(
        name: &'static str,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for geokrig operations
pub type Result<T> = std::result::Result<T, Error>;
