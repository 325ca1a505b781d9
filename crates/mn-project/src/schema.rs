//! Scenario file schema.

use serde::{Deserialize, Serialize};

use mn_devices::{DiodePreset, MemristorModel, TunnelDiodeParams};
use mn_signals::Waveform;
use mn_sim::{IntegratorType, SimError, TimeGrid};

/// One simulation scenario: circuit, devices, drive and solver settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub circuit: CircuitDef,
    /// Written as a one-key map: `{ preset: GI403 }` or `{ custom: {..} }`.
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub diode: DiodeDef,
    #[serde(default)]
    pub memristor: MemristorModel,
    pub signal: Waveform,
    #[serde(default)]
    pub initial_state: InitialStateDef,
    pub solver: SolverDef,
    /// Seed for random waveforms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Passive circuit values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitDef {
    pub capacitance_f: f64,
    /// Memristor bias offset
    pub u1_v: f64,
    /// Diode bias offset
    pub u2_v: f64,
}

impl Default for CircuitDef {
    fn default() -> Self {
        Self {
            capacitance_f: 22e-9,
            u1_v: 0.0,
            u2_v: -0.04,
        }
    }
}

/// Tunnel diode selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiodeDef {
    Preset(DiodePreset),
    Custom(TunnelDiodeParams),
}

impl Default for DiodeDef {
    fn default() -> Self {
        DiodeDef::Preset(DiodePreset::default())
    }
}

impl DiodeDef {
    pub fn params(&self) -> TunnelDiodeParams {
        match self {
            DiodeDef::Preset(p) => p.params(),
            DiodeDef::Custom(params) => *params,
        }
    }

    pub fn label(&self) -> String {
        match self {
            DiodeDef::Preset(p) => p.name().to_string(),
            DiodeDef::Custom(_) => "custom".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialStateDef {
    pub vc: f64,
    pub xsv: f64,
}

impl Default for InitialStateDef {
    fn default() -> Self {
        Self { vc: 0.2, xsv: 0.2 }
    }
}

fn default_max_points() -> usize {
    10_000
}

/// Fixed-step solver settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverDef {
    #[serde(default)]
    pub method: IntegratorType,
    pub dt_s: f64,
    pub t_end_s: f64,
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

impl SolverDef {
    /// Number of steps on the `[0, t_end)` grid the simulator will build.
    pub fn total_steps(&self) -> Result<usize, SimError> {
        Ok(TimeGrid::arange_len(0.0, self.t_end_s, self.dt_s)? - 1)
    }
}
