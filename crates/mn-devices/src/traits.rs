//! Core traits for device models.

use crate::error::DeviceResult;

/// Two-terminal element whose current depends only on the voltage across it.
///
/// Devices are deterministic functions of voltage and parameters, suitable
/// for evaluation inside every Runge-Kutta stage.
pub trait LeakageDevice: Send + Sync {
    /// Device name for debugging and identification.
    fn name(&self) -> &str;

    /// Current through the device (A) at voltage `v` (V).
    fn current(&self, v: f64) -> DeviceResult<f64>;
}

/// Instantaneous memristor response at one operating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemristorResponse {
    /// Device current (A).
    pub current: f64,
    /// Time derivative of the internal state variable (1/s).
    pub state_rate: f64,
}

/// Memristor with an internal state variable.
pub trait Memristor: Send + Sync {
    /// Device name for debugging and identification.
    fn name(&self) -> &str;

    /// Evaluate the device.
    ///
    /// # Arguments
    /// * `v1` - Voltage applied across the device (V)
    /// * `v2` - Current value of the internal state variable (nominally in [0, 1])
    fn evaluate(&self, v1: f64, v2: f64) -> DeviceResult<MemristorResponse>;
}
