//! VectorField trait for the systems the steppers integrate.

use nalgebra::DVector;

use crate::error::SimResult;

/// Right-hand side `dy/dt = f(y, t, ctx)` of an explicit ODE.
///
/// `Context` carries whatever external input the field needs at evaluation
/// time (for the neuron circuit, the injected current). Steppers pass it
/// through unchanged so they stay generic over the field.
pub trait VectorField {
    type Context: ?Sized;

    /// State dimension.
    fn dim(&self) -> usize;

    /// Evaluate the derivative at `(y, t)`.
    fn rhs(&self, y: &DVector<f64>, t: f64, ctx: &Self::Context) -> SimResult<DVector<f64>>;
}
