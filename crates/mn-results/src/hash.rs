//! Content-based hashing for run IDs.

use sha2::{Digest, Sha256};
use mn_project::Scenario;

use crate::ResultsResult;

/// SHA-256 over the scenario's canonical JSON and the solver version.
///
/// Any change to circuit, devices, drive, seed or solver settings yields a
/// new id, so cached runs are only reused for identical inputs.
pub fn compute_run_id(scenario: &Scenario, solver_version: &str) -> ResultsResult<String> {
    let mut hasher = Sha256::new();

    let scenario_json = serde_json::to_string(scenario)?;
    hasher.update(scenario_json.as_bytes());
    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}
