//! Error types for input signal construction.

use mn_core::CoreError;
use thiserror::Error;

/// Result type for signal operations.
pub type SignalResult<T> = Result<T, SignalError>;

/// Errors raised while building an input signal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SignalError {
    /// Invalid argument provided to a signal constructor.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Waveform parameter out of its usable range.
    #[error("Invalid waveform parameter {what}: {value}")]
    InvalidParam { what: &'static str, value: f64 },

    /// Random distribution could not be constructed.
    #[error("Invalid distribution: {what}")]
    Distribution { what: String },
}

impl From<CoreError> for SignalError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NonFinite { what, value } => SignalError::InvalidParam { what, value },
            CoreError::ExpOverflow { what, arg } => SignalError::InvalidParam { what, value: arg },
            CoreError::InvalidArg { what } | CoreError::Invariant { what } => {
                SignalError::InvalidArg { what }
            }
        }
    }
}
