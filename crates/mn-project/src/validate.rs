//! Scenario validation logic.

use crate::schema::{CircuitDef, DiodeDef, InitialStateDef, Scenario, SolverDef};

/// Longest run accepted, in steps. The dense trajectory holds two f64 per step.
pub const MAX_STEPS: usize = 20_000_000;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Missing field: {field} ({reason})")]
    MissingField { field: String, reason: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }

    if scenario.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".to_string(),
            value: format!("{:?}", scenario.name),
            reason: "must not be empty".to_string(),
        });
    }

    validate_circuit(&scenario.circuit)?;
    validate_diode(&scenario.diode)?;

    scenario
        .memristor
        .validate()
        .map_err(|e| ValidationError::InvalidValue {
            field: "memristor".to_string(),
            value: format!("{:?}", scenario.memristor),
            reason: e.to_string(),
        })?;

    scenario
        .signal
        .validate()
        .map_err(|e| ValidationError::InvalidValue {
            field: format!("signal ({})", scenario.signal.kind()),
            value: format!("{:?}", scenario.signal),
            reason: e.to_string(),
        })?;

    if scenario.signal.is_random() && scenario.seed.is_none() {
        return Err(ValidationError::MissingField {
            field: "seed".to_string(),
            reason: format!("{} signal needs a seed", scenario.signal.kind()),
        });
    }

    validate_initial_state(&scenario.initial_state)?;
    validate_solver(&scenario.solver)?;

    Ok(())
}

fn validate_circuit(circuit: &CircuitDef) -> Result<(), ValidationError> {
    if !(circuit.capacitance_f.is_finite() && circuit.capacitance_f > 0.0) {
        return Err(invalid(
            "circuit.capacitance_f",
            circuit.capacitance_f,
            "must be positive",
        ));
    }
    if !circuit.u1_v.is_finite() {
        return Err(invalid("circuit.u1_v", circuit.u1_v, "must be finite"));
    }
    if !circuit.u2_v.is_finite() {
        return Err(invalid("circuit.u2_v", circuit.u2_v, "must be finite"));
    }
    Ok(())
}

fn validate_diode(diode: &DiodeDef) -> Result<(), ValidationError> {
    match diode {
        DiodeDef::Preset(_) => Ok(()),
        DiodeDef::Custom(params) => {
            params
                .validate()
                .map_err(|e| ValidationError::InvalidValue {
                    field: "diode.custom".to_string(),
                    value: format!("{params:?}"),
                    reason: e.to_string(),
                })
        }
    }
}

fn validate_initial_state(state: &InitialStateDef) -> Result<(), ValidationError> {
    if !state.vc.is_finite() {
        return Err(invalid("initial_state.vc", state.vc, "must be finite"));
    }
    if !state.xsv.is_finite() {
        return Err(invalid("initial_state.xsv", state.xsv, "must be finite"));
    }
    Ok(())
}

fn validate_solver(solver: &SolverDef) -> Result<(), ValidationError> {
    if !(solver.dt_s.is_finite() && solver.dt_s > 0.0) {
        return Err(invalid("solver.dt_s", solver.dt_s, "must be positive"));
    }
    if !(solver.t_end_s.is_finite() && solver.t_end_s > solver.dt_s) {
        return Err(invalid(
            "solver.t_end_s",
            solver.t_end_s,
            "must exceed dt_s so the grid has at least two points",
        ));
    }
    if solver.max_points == 0 {
        return Err(ValidationError::InvalidValue {
            field: "solver.max_points".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    let steps = solver
        .total_steps()
        .map_err(|e| invalid("solver.t_end_s", solver.t_end_s, &e.to_string()))?;
    if steps > MAX_STEPS {
        return Err(ValidationError::Unsupported {
            feature: format!("{steps} steps"),
            reason: format!("runs are limited to {MAX_STEPS} steps"),
        });
    }
    Ok(())
}

fn invalid(field: &str, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mn_signals::Waveform;

    fn scenario() -> Scenario {
        Scenario {
            version: crate::LATEST_VERSION,
            name: "unit".to_string(),
            description: None,
            circuit: CircuitDef::default(),
            diode: DiodeDef::default(),
            memristor: Default::default(),
            signal: Waveform::Constant { value: 35e-6 },
            initial_state: InitialStateDef::default(),
            solver: SolverDef {
                method: Default::default(),
                dt_s: 5e-8,
                t_end_s: 1e-4,
                max_points: 10_000,
            },
            seed: None,
        }
    }

    #[test]
    fn default_scenario_is_valid() {
        validate_scenario(&scenario()).unwrap();
    }

    #[test]
    fn future_version_rejected() {
        let mut s = scenario();
        s.version = crate::LATEST_VERSION + 1;
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn random_signal_needs_seed() {
        let mut s = scenario();
        s.signal = Waveform::Random {
            mean: 250e-6,
            std: 50e-6,
        };
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::MissingField { .. })
        ));
        s.seed = Some(7);
        validate_scenario(&s).unwrap();
    }

    #[test]
    fn single_point_grid_rejected() {
        let mut s = scenario();
        s.solver.t_end_s = s.solver.dt_s;
        let err = validate_scenario(&s).unwrap_err();
        assert!(err.to_string().contains("solver.t_end_s"));
    }

    #[test]
    fn negative_capacitance_rejected() {
        let mut s = scenario();
        s.circuit.capacitance_f = -1e-9;
        assert!(validate_scenario(&s).is_err());
    }

    #[test]
    fn oversized_run_rejected() {
        let mut s = scenario();
        s.solver.t_end_s = 10.0;
        assert!(matches!(
            validate_scenario(&s),
            Err(ValidationError::Unsupported { .. })
        ));
    }

    #[test]
    fn step_count_follows_simulation_grid() {
        let mut s = scenario();
        s.solver.t_end_s = 0.05;
        let grid = mn_sim::TimeGrid::arange(0.0, s.solver.t_end_s, s.solver.dt_s).unwrap();
        assert_eq!(s.solver.total_steps().unwrap(), grid.steps());
        assert_eq!(s.solver.total_steps().unwrap(), 999_999);
    }

    #[test]
    fn unbuildable_grid_rejected_before_step_limit() {
        let mut s = scenario();
        s.solver.dt_s = 1e-9;
        s.solver.t_end_s = 1e4;
        let err = validate_scenario(&s).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }), "{err}");
        assert!(err.to_string().contains("grid too large"));
    }

    #[test]
    fn bad_custom_diode_rejected() {
        let mut s = scenario();
        let mut params = mn_devices::DiodePreset::Bd5.params();
        params.vp = -0.1;
        s.diode = DiodeDef::Custom(params);
        let err = validate_scenario(&s).unwrap_err();
        assert!(err.to_string().contains("diode.custom"));
    }
}
