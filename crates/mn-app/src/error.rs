//! Error types for the mn-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// gives the CLI a single error surface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Failed to read scenario file: {path}")]
    ScenarioFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scenario validation failed: {0}")]
    Validation(String),

    #[error("Model compilation failed: {0}")]
    Compile(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for mn-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<mn_project::ProjectError> for AppError {
    fn from(err: mn_project::ProjectError) -> Self {
        match err {
            mn_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Scenario(other.to_string()),
        }
    }
}

impl From<mn_devices::DeviceError> for AppError {
    fn from(err: mn_devices::DeviceError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<mn_signals::SignalError> for AppError {
    fn from(err: mn_signals::SignalError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<mn_sim::SimError> for AppError {
    fn from(err: mn_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}

impl From<mn_results::ResultsError> for AppError {
    fn from(err: mn_results::ResultsError) -> Self {
        match err {
            mn_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}
