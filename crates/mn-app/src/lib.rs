//! Shared application service layer for memneuron.
//!
//! Centralizes the workflow behind the CLI: loading scenarios, compiling
//! them into a neuron circuit plus drive signal, running and caching
//! simulations, and querying stored runs.

pub mod compile;
pub mod error;
pub mod progress;
pub mod query;
pub mod run_service;
pub mod scenario_service;

// Re-export key types for convenience
pub use compile::{CompiledScenario, compile_scenario};
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage, SimulationProgress};
pub use query::{RunSummary, Variable, extract_series, get_run_summary, to_csv};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, SimulationOutput, ensure_run,
    ensure_run_with_progress, list_runs, load_run, simulate,
};
pub use scenario_service::{ScenarioSummary, load_scenario, save_scenario, summarize};
