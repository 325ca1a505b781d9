//! Fixed-step explicit Runge-Kutta steppers.

use std::fmt;
use std::str::FromStr;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::model::VectorField;

/// Single-step function signature shared by every method.
pub type StepFn<F> = fn(
    &F,
    &DVector<f64>,
    f64,
    f64,
    &<F as VectorField>::Context,
) -> SimResult<DVector<f64>>;

/// Explicit single-step method: `y_next = step(field, y, t, h, ctx)`.
pub trait Integrator {
    /// Number of field evaluations per step.
    const STAGES: usize;

    /// Advance `y` from `t` to `t + h`.
    fn step<F: VectorField>(
        field: &F,
        y: &DVector<f64>,
        t: f64,
        h: f64,
        ctx: &F::Context,
    ) -> SimResult<DVector<f64>>;
}

/// Forward Euler (explicit, 1st order).
#[derive(Clone, Debug)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    const STAGES: usize = 1;

    fn step<F: VectorField>(
        field: &F,
        y: &DVector<f64>,
        t: f64,
        h: f64,
        ctx: &F::Context,
    ) -> SimResult<DVector<f64>> {
        let k1 = field.rhs(y, t, ctx)?;
        Ok(y + h * k1)
    }
}

/// Heun's method (explicit trapezoid, 2nd order).
#[derive(Clone, Debug)]
pub struct Heun;

impl Integrator for Heun {
    const STAGES: usize = 2;

    fn step<F: VectorField>(
        field: &F,
        y: &DVector<f64>,
        t: f64,
        h: f64,
        ctx: &F::Context,
    ) -> SimResult<DVector<f64>> {
        let k1 = field.rhs(y, t, ctx)?;
        let k2 = field.rhs(&(y + h * &k1), t + h, ctx)?;
        Ok(y + h / 2.0 * (k1 + k2))
    }
}

/// Classical RK4 (Runge-Kutta 4th order).
#[derive(Clone, Debug)]
pub struct RK4;

impl Integrator for RK4 {
    const STAGES: usize = 4;

    fn step<F: VectorField>(
        field: &F,
        y: &DVector<f64>,
        t: f64,
        h: f64,
        ctx: &F::Context,
    ) -> SimResult<DVector<f64>> {
        let k1 = field.rhs(y, t, ctx)?;
        let k2 = field.rhs(&(y + (0.5 * h) * &k1), t + 0.5 * h, ctx)?;
        let k3 = field.rhs(&(y + (0.5 * h) * &k2), t + 0.5 * h, ctx)?;
        let k4 = field.rhs(&(y + h * &k3), t + h, ctx)?;

        // x_new = x + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        let k_sum = (k1 + 2.0 * k2) + (2.0 * k3 + k4);
        Ok(y + (h / 6.0) * k_sum)
    }
}

/// Eight-stage scheme labeled order 8.
///
/// Stages 7 and 8 are evaluated, so a failure there aborts the step, but
/// they do not enter the final combination. The coefficients are kept
/// exactly as published for this model. Despite the label the combination is
/// only first-order accurate (local error grows as `h^2`).
#[derive(Clone, Debug)]
pub struct RK8;

impl Integrator for RK8 {
    const STAGES: usize = 8;

    fn step<F: VectorField>(
        field: &F,
        y: &DVector<f64>,
        t: f64,
        h: f64,
        ctx: &F::Context,
    ) -> SimResult<DVector<f64>> {
        let k1 = field.rhs(y, t, ctx)?;
        let k2 = field.rhs(&(y + h / 4.0 * &k1), t + h / 4.0, ctx)?;
        let k3 = field.rhs(&(y + h / 8.0 * (&k1 + &k2)), t + h / 4.0, ctx)?;
        let k4 = field.rhs(&(y + h / 2.0 * (-&k2 + 2.0 * &k3)), t + h / 2.0, ctx)?;
        let k5 = field.rhs(
            &(y + h / 6.0 * (3.0 * &k1 + 9.0 * &k4)),
            t + 3.0 * h / 4.0,
            ctx,
        )?;
        let k6 = field.rhs(
            &(y + h / 6.0 * (-3.0 * &k1 + 2.0 * &k2 + 4.0 * &k3 + 4.0 * &k4)),
            t + h,
            ctx,
        )?;
        let _k7 = field.rhs(
            &(y + h / 48.0
                * (7.0 * &k1 + 24.0 * &k2 + 6.0 * &k3 - 8.0 * &k4 + 3.0 * &k5)),
            t + h,
            ctx,
        )?;
        let _k8 = field.rhs(
            &(y + h / 48.0
                * (-7.0 * &k1 + 6.0 * &k2 + 8.0 * &k3 + 3.0 * &k4 - 4.0 * &k5)),
            t + h,
            ctx,
        )?;
        Ok(y + h / 90.0 * (7.0 * &k1 + 32.0 * &k3 + 12.0 * &k4 + 32.0 * &k5 + 7.0 * &k6))
    }
}

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegratorType {
    /// Forward Euler (1 rhs call per step).
    RK1,
    /// Heun (2 rhs calls per step).
    RK2,
    /// Classical 4th-order Runge-Kutta (default, 4 rhs calls per step).
    #[default]
    RK4,
    /// Eight-stage scheme labeled order 8 (8 rhs calls per step).
    RK8,
}

impl IntegratorType {
    pub const ALL: [IntegratorType; 4] = [
        IntegratorType::RK1,
        IntegratorType::RK2,
        IntegratorType::RK4,
        IntegratorType::RK8,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IntegratorType::RK1 => "RK1",
            IntegratorType::RK2 => "RK2",
            IntegratorType::RK4 => "RK4",
            IntegratorType::RK8 => "RK8",
        }
    }

    /// Field evaluations per step.
    pub fn stages(&self) -> usize {
        match self {
            IntegratorType::RK1 => ForwardEuler::STAGES,
            IntegratorType::RK2 => Heun::STAGES,
            IntegratorType::RK4 => RK4::STAGES,
            IntegratorType::RK8 => RK8::STAGES,
        }
    }

    /// Resolve to a step function for field type `F`.
    pub fn resolve<F: VectorField>(self) -> StepFn<F> {
        match self {
            IntegratorType::RK1 => ForwardEuler::step::<F>,
            IntegratorType::RK2 => Heun::step::<F>,
            IntegratorType::RK4 => RK4::step::<F>,
            IntegratorType::RK8 => RK8::step::<F>,
        }
    }
}

impl fmt::Display for IntegratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IntegratorType {
    type Err = SimError;

    /// Accepts `RK1`/`RK2`/`RK4`/`RK8` in any case, or the bare order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        IntegratorType::ALL
            .into_iter()
            .find(|m| {
                m.name().eq_ignore_ascii_case(trimmed) || m.name()[2..] == *trimmed
            })
            .ok_or_else(|| SimError::UnknownMethod {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// dy/dt = c
    struct ConstantField(DVector<f64>);

    impl VectorField for ConstantField {
        type Context = ();

        fn dim(&self) -> usize {
            self.0.len()
        }

        fn rhs(&self, _y: &DVector<f64>, _t: f64, _ctx: &()) -> SimResult<DVector<f64>> {
            Ok(self.0.clone())
        }
    }

    /// dy/dt = a*y + b*t + c, component-wise
    struct AffineField {
        a: f64,
        b: f64,
        c: f64,
    }

    impl VectorField for AffineField {
        type Context = ();

        fn dim(&self) -> usize {
            1
        }

        fn rhs(&self, y: &DVector<f64>, t: f64, _ctx: &()) -> SimResult<DVector<f64>> {
            Ok(y.map(|v| self.a * v + self.b * t + self.c))
        }
    }

    /// dy/dt = y, failing on the n-th evaluation.
    struct FailsOnCall {
        fail_on: usize,
        calls: Cell<usize>,
    }

    impl FailsOnCall {
        fn new(fail_on: usize) -> Self {
            Self {
                fail_on,
                calls: Cell::new(0),
            }
        }
    }

    impl VectorField for FailsOnCall {
        type Context = ();

        fn dim(&self) -> usize {
            1
        }

        fn rhs(&self, y: &DVector<f64>, _t: f64, _ctx: &()) -> SimResult<DVector<f64>> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if call == self.fail_on {
                Err(SimError::InvalidArg { what: "stage failure" })
            } else {
                Ok(y.clone())
            }
        }
    }

    #[test]
    fn euler_constant_field_is_exact() {
        let field = ConstantField(DVector::from_vec(vec![2.0, -3.0]));
        let y = DVector::from_vec(vec![1.0, 1.0]);
        let next = ForwardEuler::step(&field, &y, 0.0, 0.5, &()).unwrap();
        assert_eq!(next, DVector::from_vec(vec![1.0 + 0.5 * 2.0, 1.0 + 0.5 * -3.0]));
    }

    #[test]
    fn heun_time_affine_field_is_exact() {
        // y' = 3t + 1 has y(t) = 1.5 t^2 + t + y0, which Heun integrates exactly.
        let field = AffineField {
            a: 0.0,
            b: 3.0,
            c: 1.0,
        };
        let (t, h) = (0.5, 0.25);
        let y = DVector::from_element(1, 2.0);
        let next = Heun::step(&field, &y, t, h, &()).unwrap();
        let exact = |s: f64| 1.5 * s * s + s;
        let expected = 2.0 + exact(t + h) - exact(t);
        assert!((next[0] - expected).abs() < 1e-15);
    }

    #[test]
    fn rk4_matches_exponential_to_fifth_order() {
        let field = AffineField {
            a: -1.0,
            b: 0.0,
            c: 0.0,
        };
        let y = DVector::from_element(1, 1.0);
        let h = 0.1;
        let next = RK4::step(&field, &y, 0.0, h, &()).unwrap();
        // Taylor series of exp(-h) through h^4
        let taylor = 1.0 - h + h * h / 2.0 - h.powi(3) / 6.0 + h.powi(4) / 24.0;
        assert!((next[0] - taylor).abs() < 1e-15);
    }

    #[test]
    fn rk8_single_step_matches_hand_expansion() {
        // For y' = -y every stage is a polynomial in h; the combination
        // reduces to the stability polynomial of the scheme.
        let field = AffineField {
            a: -1.0,
            b: 0.0,
            c: 0.0,
        };
        let y = DVector::from_element(1, 1.0);
        let h: f64 = 0.01;
        let next = RK8::step(&field, &y, 0.0, h, &()).unwrap();

        let k1 = -1.0;
        let k2 = -(1.0 + h / 4.0 * k1);
        let k3 = -(1.0 + h / 8.0 * (k1 + k2));
        let k4 = -(1.0 + h / 2.0 * (-k2 + 2.0 * k3));
        let k5 = -(1.0 + h / 6.0 * (3.0 * k1 + 9.0 * k4));
        let k6 = -(1.0 + h / 6.0 * (-3.0 * k1 + 2.0 * k2 + 4.0 * k3 + 4.0 * k4));
        let expected = 1.0 + h / 90.0 * (7.0 * k1 + 32.0 * k3 + 12.0 * k4 + 32.0 * k5 + 7.0 * k6);
        assert!((next[0] - expected).abs() < 1e-15);
    }

    #[test]
    fn rk8_local_error_is_second_order_in_h() {
        let field = AffineField {
            a: -1.0,
            b: 0.0,
            c: 0.0,
        };
        let y = DVector::from_element(1, 1.0);
        let local_error = |h: f64| {
            let next = RK8::step(&field, &y, 0.0, h, &()).unwrap();
            (next[0] - (-h).exp()).abs()
        };
        let ratio = local_error(1e-2) / local_error(1e-3);
        assert!((90.0..110.0).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn rk8_evaluates_unused_stages() {
        for failing_call in [7, 8] {
            let field = FailsOnCall::new(failing_call);
            let y = DVector::from_element(1, 1.0);
            assert!(RK8::step(&field, &y, 0.0, 1e-3, &()).is_err());
            assert_eq!(field.calls.get(), failing_call);
        }
        let field = FailsOnCall::new(9);
        let y = DVector::from_element(1, 1.0);
        assert!(RK8::step(&field, &y, 0.0, 1e-3, &()).is_ok());
        assert_eq!(field.calls.get(), 8);
    }

    #[test]
    fn resolve_matches_direct_call() {
        let field = AffineField {
            a: -2.0,
            b: 1.0,
            c: 0.5,
        };
        let y = DVector::from_element(1, 0.3);
        for method in IntegratorType::ALL {
            let step = method.resolve::<AffineField>();
            let via_ptr = step(&field, &y, 0.1, 1e-3, &()).unwrap();
            let direct = match method {
                IntegratorType::RK1 => ForwardEuler::step(&field, &y, 0.1, 1e-3, &()),
                IntegratorType::RK2 => Heun::step(&field, &y, 0.1, 1e-3, &()),
                IntegratorType::RK4 => RK4::step(&field, &y, 0.1, 1e-3, &()),
                IntegratorType::RK8 => RK8::step(&field, &y, 0.1, 1e-3, &()),
            }
            .unwrap();
            assert_eq!(via_ptr, direct, "{method}");
        }
    }

    #[test]
    fn method_tags_parse() {
        assert_eq!("RK8".parse::<IntegratorType>().unwrap(), IntegratorType::RK8);
        assert_eq!("rk2".parse::<IntegratorType>().unwrap(), IntegratorType::RK2);
        assert_eq!("1".parse::<IntegratorType>().unwrap(), IntegratorType::RK1);
        let err = "RK3".parse::<IntegratorType>().unwrap_err();
        assert_eq!(
            err,
            SimError::UnknownMethod {
                name: "RK3".to_string()
            }
        );
    }

    #[test]
    fn unknown_method_fails_deserialization() {
        assert!(serde_yaml::from_str::<IntegratorType>("RK5").is_err());
        assert_eq!(
            serde_yaml::from_str::<IntegratorType>("RK4").unwrap(),
            IntegratorType::RK4
        );
    }

    #[test]
    fn stage_counts() {
        let stages: Vec<usize> = IntegratorType::ALL.iter().map(|m| m.stages()).collect();
        assert_eq!(stages, [1, 2, 4, 8]);
    }
}
