//! Input current waveforms.
//!
//! Every waveform maps time (s) to an injected current (A). Deterministic
//! waveforms are evaluated analytically; random waveforms are drawn once onto
//! a sample grid by [`crate::build_signal`] and replayed with a zero-order hold.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use mn_core::ensure_finite;

use crate::error::{SignalError, SignalResult};

fn default_level() -> f64 {
    25e-6
}

fn default_slope() -> f64 {
    280e-5
}

fn default_cliff_hold() -> f64 {
    0.0018
}

fn default_cliff_ramp_end() -> f64 {
    0.0095
}

fn default_ladder_width() -> f64 {
    0.008
}

fn default_ladder_second_start() -> f64 {
    0.01
}

fn default_ladder_ramp_origin() -> f64 {
    0.0018
}

/// Waveform kind and parameters, as written in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Waveform {
    /// Constant current.
    Constant { value: f64 },

    /// Single step from `before` to `after` at `step_time`.
    Step {
        before: f64,
        after: f64,
        step_time: f64,
    },

    /// Finite pulse train on top of a baseline.
    Pulse {
        baseline: f64,
        amplitude: f64,
        /// Start of the first pulse (s)
        start: f64,
        /// High time of each pulse (s)
        width: f64,
        /// Number of pulses
        count: u32,
        /// Pulse repetition period (s)
        period: f64,
    },

    /// `offset + amplitude * sin(2*pi*frequency*t + phase)`.
    Sine {
        offset: f64,
        amplitude: f64,
        frequency: f64,
        #[serde(default)]
        phase: f64,
    },

    /// Plateau at `level` followed by a linear ramp, then zero.
    Cliff {
        #[serde(default)]
        offset: f64,
        #[serde(default = "default_level")]
        level: f64,
        /// End of the plateau (s)
        #[serde(default = "default_cliff_hold")]
        hold_until: f64,
        /// End of the ramp (s)
        #[serde(default = "default_cliff_ramp_end")]
        ramp_until: f64,
        /// Ramp slope (A/s)
        #[serde(default = "default_slope")]
        slope: f64,
    },

    /// Plateau window followed by a second, ramped window.
    Ladder {
        #[serde(default)]
        offset: f64,
        #[serde(default = "default_level")]
        level: f64,
        /// Width of each window (s)
        #[serde(default = "default_ladder_width")]
        width: f64,
        /// Start of the ramped window (s)
        #[serde(default = "default_ladder_second_start")]
        second_start: f64,
        /// Time at which the ramp would cross `level` (s)
        #[serde(default = "default_ladder_ramp_origin")]
        ramp_origin: f64,
        /// Ramp slope (A/s)
        #[serde(default = "default_slope")]
        slope: f64,
    },

    /// Independent normal samples, one per simulation grid point.
    Random { mean: f64, std: f64 },

    /// Voss-McCartney pink noise sampled at `frequency`.
    PinkNoise {
        baseline: f64,
        amplitude: f64,
        /// Sample rate of the noise source (Hz)
        frequency: f64,
    },
}

impl Waveform {
    /// Stable name of the waveform kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Waveform::Constant { .. } => "Constant",
            Waveform::Step { .. } => "Step",
            Waveform::Pulse { .. } => "Pulse",
            Waveform::Sine { .. } => "Sine",
            Waveform::Cliff { .. } => "Cliff",
            Waveform::Ladder { .. } => "Ladder",
            Waveform::Random { .. } => "Random",
            Waveform::PinkNoise { .. } => "PinkNoise",
        }
    }

    /// Whether samples depend on a random number generator.
    pub fn is_random(&self) -> bool {
        matches!(self, Waveform::Random { .. } | Waveform::PinkNoise { .. })
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> SignalResult<()> {
        match *self {
            Waveform::Constant { value } => {
                ensure_finite(value, "constant value")?;
            }
            Waveform::Step {
                before,
                after,
                step_time,
            } => {
                ensure_finite(before, "step before")?;
                ensure_finite(after, "step after")?;
                ensure_finite(step_time, "step time")?;
            }
            Waveform::Pulse {
                baseline,
                amplitude,
                start,
                width,
                count: _,
                period,
            } => {
                ensure_finite(baseline, "pulse baseline")?;
                ensure_finite(amplitude, "pulse amplitude")?;
                ensure_finite(start, "pulse start")?;
                require_non_negative(width, "pulse width")?;
                require_positive(period, "pulse period")?;
            }
            Waveform::Sine {
                offset,
                amplitude,
                frequency,
                phase,
            } => {
                ensure_finite(offset, "sine offset")?;
                ensure_finite(amplitude, "sine amplitude")?;
                ensure_finite(frequency, "sine frequency")?;
                ensure_finite(phase, "sine phase")?;
            }
            Waveform::Cliff {
                offset,
                level,
                hold_until,
                ramp_until,
                slope,
            } => {
                ensure_finite(offset, "cliff offset")?;
                ensure_finite(level, "cliff level")?;
                require_non_negative(hold_until, "cliff hold_until")?;
                ensure_finite(slope, "cliff slope")?;
                if !(ramp_until >= hold_until) {
                    return Err(SignalError::InvalidParam {
                        what: "cliff ramp_until",
                        value: ramp_until,
                    });
                }
            }
            Waveform::Ladder {
                offset,
                level,
                width,
                second_start,
                ramp_origin,
                slope,
            } => {
                ensure_finite(offset, "ladder offset")?;
                ensure_finite(level, "ladder level")?;
                require_non_negative(width, "ladder width")?;
                require_non_negative(second_start, "ladder second_start")?;
                ensure_finite(ramp_origin, "ladder ramp_origin")?;
                ensure_finite(slope, "ladder slope")?;
            }
            Waveform::Random { mean, std } => {
                ensure_finite(mean, "random mean")?;
                require_non_negative(std, "random std")?;
            }
            Waveform::PinkNoise {
                baseline,
                amplitude,
                frequency,
            } => {
                ensure_finite(baseline, "pink baseline")?;
                ensure_finite(amplitude, "pink amplitude")?;
                require_positive(frequency, "pink frequency")?;
            }
        }
        Ok(())
    }

    /// Evaluate a deterministic waveform at `t`.
    ///
    /// Returns `None` for random waveforms, which have no closed form.
    pub fn evaluate(&self, t: f64) -> Option<f64> {
        let value = match *self {
            Waveform::Constant { value } => value,
            Waveform::Step {
                before,
                after,
                step_time,
            } => {
                if t < step_time {
                    before
                } else {
                    after
                }
            }
            Waveform::Pulse {
                baseline,
                amplitude,
                start,
                width,
                count,
                period,
            } => pulse(t, baseline, amplitude, start, width, count, period),
            Waveform::Sine {
                offset,
                amplitude,
                frequency,
                phase,
            } => offset + amplitude * (2.0 * PI * frequency * t + phase).sin(),
            Waveform::Cliff {
                offset,
                level,
                hold_until,
                ramp_until,
                slope,
            } => {
                let base = if (0.0..=hold_until).contains(&t) {
                    level
                } else if t > hold_until && t <= ramp_until {
                    (t - hold_until) * slope + level
                } else {
                    0.0
                };
                base + offset
            }
            Waveform::Ladder {
                offset,
                level,
                width,
                second_start,
                ramp_origin,
                slope,
            } => {
                // The ramped window overrides the plateau where they overlap.
                let base = if (second_start..=second_start + width).contains(&t) {
                    (t - ramp_origin) * slope + level
                } else if (0.0..=width).contains(&t) {
                    level
                } else {
                    0.0
                };
                base + offset
            }
            Waveform::Random { .. } | Waveform::PinkNoise { .. } => return None,
        };
        Some(value)
    }
}

fn pulse(
    t: f64,
    baseline: f64,
    amplitude: f64,
    start: f64,
    width: f64,
    count: u32,
    period: f64,
) -> f64 {
    if t < start {
        return baseline;
    }
    let local = t - start;
    let index = (local / period).floor();
    if index >= f64::from(count) {
        return baseline;
    }
    if local - index * period < width {
        baseline + amplitude
    } else {
        baseline
    }
}

fn require_positive(value: f64, what: &'static str) -> SignalResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SignalError::InvalidParam { what, value })
    }
}

fn require_non_negative(value: f64, what: &'static str) -> SignalResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SignalError::InvalidParam { what, value })
    }
}
