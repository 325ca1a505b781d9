//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

/// Metadata stored next to every run's timeseries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_name: String,
    /// RFC 3339 creation time.
    pub timestamp: String,
    pub solver_version: String,
    pub method: String,
    pub dt_s: f64,
    pub t_end_s: f64,
    pub total_steps: usize,
    /// Every `decimation`-th grid point was recorded.
    pub decimation: usize,
    pub points: usize,
    /// Recorded samples with XSV outside `[0, 1]`.
    #[serde(default)]
    pub xsv_excursions: usize,
}

/// One recorded sample: time, capacitor voltage, memristor state, input current.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesRecord {
    pub t: f64,
    pub v: f64,
    pub x: f64,
    pub i: f64,
}

impl TimeseriesRecord {
    pub fn xsv_in_range(&self) -> bool {
        (0.0..=1.0).contains(&self.x)
    }
}
