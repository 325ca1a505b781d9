//! Error types for device evaluation.

use mn_core::error::CoreError;
use thiserror::Error;

/// Errors that can occur while evaluating a device model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Non-finite value in {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Exponential overflow in {what}: exp({arg})")]
    ExpOverflow { what: &'static str, arg: f64 },

    #[error("Invalid parameter: {what}")]
    InvalidParam { what: &'static str },

    #[error("Unknown device: {name}")]
    UnknownDevice { name: String },
}

pub type DeviceResult<T> = Result<T, DeviceError>;

impl From<CoreError> for DeviceError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { what, value } => DeviceError::NonFinite { what, value },
            CoreError::ExpOverflow { what, arg } => DeviceError::ExpOverflow { what, arg },
            CoreError::InvalidArg { what } => DeviceError::InvalidParam { what },
            CoreError::Invariant { what } => DeviceError::NonPhysical { what },
        }
    }
}
