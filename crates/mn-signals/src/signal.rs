//! Input current sources seen by the circuit model.

use rand::Rng;

use crate::error::{SignalError, SignalResult};
use crate::noise::{normal_samples, pink_samples};
use crate::sampled::{SampleGrid, SampledSignal};
use crate::waveform::Waveform;

/// Time-to-current function driving the circuit.
pub trait InputSignal: Send + Sync {
    /// Injected current (A) at time `t` (s).
    fn current(&self, t: f64) -> f64;
}

impl<F> InputSignal for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn current(&self, t: f64) -> f64 {
        self(t)
    }
}

/// A deterministic waveform with a closed form at every instant.
///
/// The waveform is only reachable through [`Analytic::new`], which refuses
/// random waveforms, so evaluation always has a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Analytic(Waveform);

impl Analytic {
    /// Wrap a deterministic waveform.
    pub fn new(waveform: Waveform) -> SignalResult<Self> {
        if waveform.is_random() {
            return Err(SignalError::InvalidArg {
                what: "random waveforms must be sampled before evaluation",
            });
        }
        Ok(Self(waveform))
    }

    pub fn waveform(&self) -> &Waveform {
        &self.0
    }
}

impl InputSignal for Analytic {
    fn current(&self, t: f64) -> f64 {
        // Unreachable fallback; NaN trips the solver's finiteness check.
        self.0.evaluate(t).unwrap_or(f64::NAN)
    }
}

/// A ready-to-evaluate input signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Closed-form waveform.
    Analytic(Analytic),
    /// Pre-drawn samples replayed with a zero-order hold.
    Sampled(SampledSignal),
}

impl InputSignal for Signal {
    fn current(&self, t: f64) -> f64 {
        match self {
            Signal::Analytic(a) => a.current(t),
            Signal::Sampled(s) => s.value_at(t),
        }
    }
}

impl InputSignal for SampledSignal {
    fn current(&self, t: f64) -> f64 {
        self.value_at(t)
    }
}

/// Turn a waveform description into an evaluable signal.
///
/// `sim_grid` is the simulation time grid. Normal noise draws one sample per
/// grid point; pink noise draws at its own `frequency` across the same span.
/// Deterministic waveforms ignore both the grid and `rng`.
pub fn build_signal<R: Rng + ?Sized>(
    waveform: &Waveform,
    sim_grid: SampleGrid,
    rng: &mut R,
) -> SignalResult<Signal> {
    waveform.validate()?;
    match *waveform {
        Waveform::Random { mean, std } => {
            let values = normal_samples(mean, std, sim_grid.len, rng)?;
            Ok(Signal::Sampled(SampledSignal::new(sim_grid, values)?))
        }
        Waveform::PinkNoise {
            baseline,
            amplitude,
            frequency,
        } => {
            let t_end = sim_grid.time(sim_grid.len - 1);
            let grid = SampleGrid::covering(sim_grid.t0, t_end, frequency)?;
            let values = pink_samples(baseline, amplitude, grid.len, rng);
            Ok(Signal::Sampled(SampledSignal::new(grid, values)?))
        }
        _ => Ok(Signal::Analytic(Analytic::new(waveform.clone())?)),
    }
}
