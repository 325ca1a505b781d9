//! Error types for simulation operations.

use mn_devices::DeviceError;
use thiserror::Error;

/// Errors encountered while integrating a vector field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Dimension mismatch in {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Unknown integration method: {name}")]
    UnknownMethod { name: String },

    #[error("Non-finite state after step {step} (t = {t}): {state:?}")]
    NonFinite { step: usize, t: f64, state: Vec<f64> },

    #[error("Step {step} failed at t = {t} from state {state:?}: {source}")]
    StepFailed {
        step: usize,
        t: f64,
        state: Vec<f64>,
        #[source]
        source: Box<SimError>,
    },

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// Innermost cause, looking through step failures.
    pub fn root(&self) -> &SimError {
        match self {
            SimError::StepFailed { source, .. } => source.root(),
            other => other,
        }
    }
}
