//! Zero-order-hold replay of pre-drawn samples.
//!
//! Random waveforms are drawn once onto a uniform sample grid. Between
//! samples the last value is held, so a stepper probing intermediate stage
//! times sees the sample of the interval it is in.

use serde::{Deserialize, Serialize};

use crate::error::{SignalError, SignalResult};

/// Relative slack when mapping a time onto a sample index, so grid times
/// computed as `t0 + i*dt` land on sample `i` despite rounding.
const INDEX_SLACK: f64 = 1e-9;

/// Uniform sample grid: `len` samples starting at `t0`, spaced `dt` apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleGrid {
    pub t0: f64,
    pub dt: f64,
    pub len: usize,
}

impl SampleGrid {
    pub fn new(t0: f64, dt: f64, len: usize) -> SignalResult<Self> {
        if !t0.is_finite() {
            return Err(SignalError::InvalidParam {
                what: "sample grid t0",
                value: t0,
            });
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SignalError::InvalidParam {
                what: "sample grid dt",
                value: dt,
            });
        }
        if len == 0 {
            return Err(SignalError::InvalidArg {
                what: "sample grid must hold at least one sample",
            });
        }
        Ok(Self { t0, dt, len })
    }

    /// Grid covering `[t0, t_end]` at `rate` samples per second.
    pub fn covering(t0: f64, t_end: f64, rate: f64) -> SignalResult<Self> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(SignalError::InvalidParam {
                what: "sample rate",
                value: rate,
            });
        }
        let span = t_end - t0;
        if !(span.is_finite() && span >= 0.0) {
            return Err(SignalError::InvalidParam {
                what: "sample span",
                value: span,
            });
        }
        let len = (span * rate + INDEX_SLACK).floor() as usize + 1;
        Self::new(t0, 1.0 / rate, len)
    }

    /// Index of the sample held at time `t`, clamped to the grid.
    pub fn index_at(&self, t: f64) -> usize {
        let pos = (t - self.t0) / self.dt;
        if !(pos > 0.0) {
            return 0;
        }
        let idx = (pos + INDEX_SLACK).floor() as usize;
        idx.min(self.len - 1)
    }

    /// Time of sample `i`.
    pub fn time(&self, i: usize) -> f64 {
        self.t0 + i as f64 * self.dt
    }
}

/// Held sample sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledSignal {
    grid: SampleGrid,
    values: Vec<f64>,
}

impl SampledSignal {
    pub fn new(grid: SampleGrid, values: Vec<f64>) -> SignalResult<Self> {
        if values.len() != grid.len {
            return Err(SignalError::InvalidArg {
                what: "sample count does not match grid length",
            });
        }
        if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(SignalError::InvalidParam {
                what: "sample value",
                value: bad,
            });
        }
        Ok(Self { grid, values })
    }

    pub fn grid(&self) -> &SampleGrid {
        &self.grid
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Held value at time `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        self.values[self.grid.index_at(t)]
    }
}
