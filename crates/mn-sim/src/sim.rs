//! Integrator driver and trajectory recording.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

use crate::error::{SimError, SimResult};
use crate::grid::TimeGrid;
use crate::integrator::IntegratorType;
use crate::model::VectorField;

/// Number of progress callbacks over a full run (plus the final one).
const PROGRESS_UPDATES: usize = 100;

/// Dense state history: column `i` is the state at `times[i]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    times: Vec<f64>,
    states: DMatrix<f64>,
}

impl Trajectory {
    /// State dimension (rows).
    pub fn dim(&self) -> usize {
        self.states.nrows()
    }

    /// Number of recorded points (columns).
    pub fn len(&self) -> usize {
        self.states.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.states.ncols() == 0
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &DMatrix<f64> {
        &self.states
    }

    /// State at point `i`.
    pub fn state(&self, i: usize) -> DVector<f64> {
        self.states.column(i).into_owned()
    }

    pub fn last_state(&self) -> DVector<f64> {
        self.state(self.len() - 1)
    }

    /// Values of state component `row` over time.
    pub fn component(&self, row: usize) -> Vec<f64> {
        self.states.row(row).iter().copied().collect()
    }

    /// Keep every `factor`-th point, starting with the first.
    pub fn decimate(&self, factor: usize) -> Trajectory {
        if factor <= 1 {
            return self.clone();
        }
        let keep: Vec<usize> = (0..self.len()).step_by(factor).collect();
        let states = self.states.select_columns(keep.iter());
        let times = keep.iter().map(|&i| self.times[i]).collect();
        Trajectory { times, states }
    }
}

/// Progress snapshot emitted while stepping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimProgress {
    /// Steps completed so far.
    pub step: usize,
    pub total_steps: usize,
    /// Time reached (s)
    pub sim_time: f64,
    /// Final grid time (s)
    pub t_end: f64,
    pub fraction_complete: f64,
}

/// Integrate `field` over `grid` from `y0` with a fixed-step method.
///
/// Column 0 of the result is `y0`; column `i + 1` is one step from column `i`.
pub fn solve_ode<F: VectorField>(
    field: &F,
    y0: &DVector<f64>,
    grid: &TimeGrid,
    method: IntegratorType,
    ctx: &F::Context,
) -> SimResult<Trajectory> {
    solve_ode_with_progress(field, y0, grid, method, ctx, None)
}

/// [`solve_ode`] with a progress callback invoked about every 1% of steps.
pub fn solve_ode_with_progress<F: VectorField>(
    field: &F,
    y0: &DVector<f64>,
    grid: &TimeGrid,
    method: IntegratorType,
    ctx: &F::Context,
    mut progress: Option<&mut dyn FnMut(SimProgress)>,
) -> SimResult<Trajectory> {
    let dim = field.dim();
    if y0.len() != dim {
        return Err(SimError::DimensionMismatch {
            what: "initial state",
            expected: dim,
            found: y0.len(),
        });
    }
    if y0.iter().any(|v| !v.is_finite()) {
        return Err(SimError::InvalidArg {
            what: "initial state must be finite",
        });
    }
    let probe = field.rhs(y0, grid.start(), ctx)?;
    if probe.len() != dim {
        return Err(SimError::DimensionMismatch {
            what: "vector field output",
            expected: dim,
            found: probe.len(),
        });
    }

    let step = method.resolve::<F>();
    let n = grid.len();
    let h = grid.step();
    let total_steps = grid.steps();
    let t_end = grid.end();
    let cadence = (total_steps / PROGRESS_UPDATES).max(1);

    debug!(%method, points = n, h, dim, "starting integration");

    let mut states = DMatrix::<f64>::zeros(dim, n);
    states.set_column(0, y0);
    let mut y = y0.clone();

    for i in 0..total_steps {
        let t = grid.time(i);
        let next = match step(field, &y, t, h, ctx) {
            Ok(next) => next,
            Err(source) => {
                warn!(step = i, t, error = %source, "step failed");
                return Err(SimError::StepFailed {
                    step: i,
                    t,
                    state: y.iter().copied().collect(),
                    source: Box::new(source),
                });
            }
        };
        if next.iter().any(|v| !v.is_finite()) {
            warn!(step = i, t, "non-finite state");
            return Err(SimError::NonFinite {
                step: i,
                t,
                state: next.iter().copied().collect(),
            });
        }
        states.set_column(i + 1, &next);
        y = next;

        let done = i + 1;
        if done % cadence == 0 || done == total_steps {
            if let Some(cb) = progress.as_deref_mut() {
                cb(SimProgress {
                    step: done,
                    total_steps,
                    sim_time: grid.time(done),
                    t_end,
                    fraction_complete: done as f64 / total_steps as f64,
                });
            }
        }
    }

    debug!(steps = total_steps, "integration finished");

    Ok(Trajectory {
        times: grid.times().to_vec(),
        states,
    })
}

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Fixed time step (seconds)
    pub dt: f64,
    /// Start time (seconds)
    pub t0: f64,
    /// Final simulation time, exclusive (seconds)
    pub t_end: f64,
    /// Upper bound on recorded points (decimation)
    pub max_points: usize,
    /// Integrator type (default: RK4)
    pub integrator: IntegratorType,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 5e-8,
            t0: 0.0,
            t_end: 50e-3,
            max_points: 10_000,
            integrator: IntegratorType::default(),
        }
    }
}

impl SimOptions {
    pub fn grid(&self) -> SimResult<TimeGrid> {
        TimeGrid::arange(self.t0, self.t_end, self.dt)
    }

    /// Steps on [`SimOptions::grid`].
    pub fn total_steps(&self) -> SimResult<usize> {
        Ok(TimeGrid::arange_len(self.t0, self.t_end, self.dt)? - 1)
    }

    /// Keep-every factor bringing `total_steps` under `max_points`.
    pub fn decimation_factor(&self, total_steps: usize) -> usize {
        if self.max_points == 0 || total_steps <= self.max_points {
            1
        } else {
            (total_steps / self.max_points).max(1)
        }
    }
}

/// Build the grid from `opts`, integrate, and decimate the result.
pub fn run_sim<F: VectorField>(
    field: &F,
    y0: &DVector<f64>,
    opts: &SimOptions,
    ctx: &F::Context,
    progress: Option<&mut dyn FnMut(SimProgress)>,
) -> SimResult<Trajectory> {
    if opts.max_points == 0 {
        return Err(SimError::InvalidArg {
            what: "max_points must be positive",
        });
    }
    let grid = opts.grid()?;
    let trajectory = solve_ode_with_progress(field, y0, &grid, opts.integrator, ctx, progress)?;
    Ok(trajectory.decimate(opts.decimation_factor(grid.steps())))
}
