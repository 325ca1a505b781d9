//! Scenario loading, saving and introspection.

use std::path::Path;

use mn_devices::Memristor;
use mn_project::{ProjectError, Scenario};

use crate::error::{AppError, AppResult};

/// One-screen description of a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioSummary {
    pub name: String,
    pub description: Option<String>,
    pub diode: String,
    pub memristor: String,
    pub signal: &'static str,
    pub method: String,
    pub dt_s: f64,
    pub t_end_s: f64,
    pub total_steps: usize,
    pub max_points: usize,
    pub seed: Option<u64>,
}

/// Load, migrate and validate a scenario (`.json` or YAML).
pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    match mn_project::load_scenario(path) {
        Ok(scenario) => Ok(scenario),
        Err(ProjectError::Io(source)) => Err(AppError::ScenarioFileRead {
            path: path.to_path_buf(),
            source,
        }),
        Err(other) => Err(other.into()),
    }
}

/// Save a scenario as YAML, or JSON for a `.json` path.
pub fn save_scenario(path: &Path, scenario: &Scenario) -> AppResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => mn_project::save_json(path, scenario)?,
        _ => mn_project::save_yaml(path, scenario)?,
    }
    Ok(())
}

pub fn summarize(scenario: &Scenario) -> AppResult<ScenarioSummary> {
    Ok(ScenarioSummary {
        name: scenario.name.clone(),
        description: scenario.description.clone(),
        diode: scenario.diode.label(),
        memristor: scenario.memristor.name().to_string(),
        signal: scenario.signal.kind(),
        method: scenario.solver.method.to_string(),
        dt_s: scenario.solver.dt_s,
        t_end_s: scenario.solver.t_end_s,
        total_steps: scenario.solver.total_steps()?,
        max_points: scenario.solver.max_points,
        seed: scenario.seed,
    })
}
