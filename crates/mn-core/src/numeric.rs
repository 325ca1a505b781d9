use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// `exp(arg)` that reports overflow instead of returning `inf`.
///
/// Underflow to zero is a valid result and passes through unchanged.
pub fn checked_exp(arg: Real, what: &'static str) -> Result<Real, CoreError> {
    if arg.is_nan() {
        return Err(CoreError::NonFinite { what, value: arg });
    }
    let v = arg.exp();
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::ExpOverflow { what, arg })
    }
}
