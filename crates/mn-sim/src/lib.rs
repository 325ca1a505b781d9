//! Fixed-step integration of memristive neuron circuits.
//!
//! Provides:
//! - `VectorField` trait with a per-field evaluation context
//! - Explicit steppers: Euler, Heun, RK4 and an eight-stage scheme
//! - Uniform time grids and a dense-trajectory driver
//! - The two-state neuron circuit model

pub mod error;
pub mod grid;
pub mod integrator;
pub mod model;
pub mod neuron;
pub mod sim;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use grid::TimeGrid;
pub use integrator::{ForwardEuler, Heun, Integrator, IntegratorType, RK4, RK8, StepFn};
pub use model::VectorField;
pub use neuron::{NeuronCircuit, VC, XSV};
pub use sim::{
    SimOptions, SimProgress, Trajectory, run_sim, solve_ode, solve_ode_with_progress,
};
