//! Common utilities for device calculations.

use crate::error::{DeviceError, DeviceResult};
use mn_core::numeric::{checked_exp, ensure_finite};

/// Overflow-checked exponential for device sub-terms.
#[inline]
pub fn exp(arg: f64, what: &'static str) -> DeviceResult<f64> {
    Ok(checked_exp(arg, what)?)
}

/// Ensure a value is finite, returning DeviceError if not.
pub fn check_finite(value: f64, what: &'static str) -> DeviceResult<f64> {
    Ok(ensure_finite(value, what)?)
}

/// Require a strictly positive, finite parameter.
pub fn require_positive(value: f64, what: &'static str) -> DeviceResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DeviceError::InvalidParam { what })
    }
}

/// Require a finite parameter of any sign.
pub fn require_finite(value: f64, what: &'static str) -> DeviceResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DeviceError::InvalidParam { what })
    }
}
