//! Uniform time grids.

use mn_core::{Tolerances, nearly_equal};

use crate::error::{SimError, SimResult};

/// Slack on the point count so `stop` landing exactly on a multiple of `h`
/// stays excluded despite representation error in `(stop - start) / h`.
const COUNT_SLACK: f64 = 1e-9;

/// Ordered, uniformly spaced time points (at least two).
#[derive(Clone, Debug, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
    h: f64,
}

impl TimeGrid {
    /// Points `start + i*h` for every `i` with `start + i*h < stop`.
    pub fn arange(start: f64, stop: f64, h: f64) -> SimResult<Self> {
        Self::uniform(start, h, Self::arange_len(start, stop, h)?)
    }

    /// Point count [`TimeGrid::arange`] would produce, without allocating.
    pub fn arange_len(start: f64, stop: f64, h: f64) -> SimResult<usize> {
        if !start.is_finite() || !stop.is_finite() {
            return Err(SimError::InvalidArg {
                what: "grid bounds must be finite",
            });
        }
        check_step(h)?;
        let count = ((stop - start) / h - COUNT_SLACK).ceil();
        if !(count >= 2.0) {
            return Err(SimError::InvalidArg {
                what: "grid needs at least two points",
            });
        }
        if count > u32::MAX as f64 {
            return Err(SimError::InvalidArg {
                what: "grid too large",
            });
        }
        Ok(count as usize)
    }

    /// `n` points `start + i*h`.
    pub fn uniform(start: f64, h: f64, n: usize) -> SimResult<Self> {
        if !start.is_finite() {
            return Err(SimError::InvalidArg {
                what: "grid bounds must be finite",
            });
        }
        check_step(h)?;
        if n < 2 {
            return Err(SimError::InvalidArg {
                what: "grid needs at least two points",
            });
        }
        let times = (0..n).map(|i| start + i as f64 * h).collect();
        Ok(Self { times, h })
    }

    /// Grid from explicit points, which must be uniformly spaced.
    ///
    /// The step is taken from the first two points.
    pub fn from_points(times: Vec<f64>) -> SimResult<Self> {
        if times.len() < 2 {
            return Err(SimError::InvalidArg {
                what: "grid needs at least two points",
            });
        }
        if times.iter().any(|t| !t.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "grid points must be finite",
            });
        }
        let h = times[1] - times[0];
        if !(h > 0.0) {
            return Err(SimError::InvalidArg {
                what: "grid must be strictly increasing",
            });
        }
        let tol = Tolerances {
            abs: 1e-12 * h,
            rel: 1e-9,
        };
        let uniform = times
            .windows(2)
            .all(|w| nearly_equal(w[1] - w[0], h, tol));
        if !uniform {
            return Err(SimError::InvalidArg {
                what: "grid must be uniformly spaced",
            });
        }
        Ok(Self { times, h })
    }

    /// Number of steps between the first and last point.
    pub fn steps(&self) -> usize {
        self.times.len() - 1
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// A constructed grid is never empty.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Fixed step `t1 - t0`.
    pub fn step(&self) -> f64 {
        self.h
    }

    pub fn time(&self, i: usize) -> f64 {
        self.times[i]
    }

    pub fn start(&self) -> f64 {
        self.times[0]
    }

    pub fn end(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }
}

fn check_step(h: f64) -> SimResult<()> {
    if h.is_finite() && h > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidArg {
            what: "grid step must be positive",
        })
    }
}
