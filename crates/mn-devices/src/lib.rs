//! mn-devices: nonlinear device library for memristive neuron circuits.
//!
//! Provides models for the two current-carrying elements of the circuit:
//! - Tunnel diodes with diode, tunneling and excess-current terms
//! - Threshold-switching memristors with a voltage-gated state equation
//!
//! All devices are pure functions of instantaneous voltages and immutable
//! parameters. Exponentials are overflow-checked, so an out-of-range voltage
//! surfaces as a [`DeviceError`] instead of an `inf` current.
//!
//! # Example
//!
//! ```
//! use mn_devices::{DiodePreset, LeakageDevice, Memristor, MemristorModel, TunnelDiode};
//!
//! let diode = TunnelDiode::from_preset(DiodePreset::Gi403);
//! assert_eq!(diode.current(0.0).unwrap(), 0.0);
//!
//! let memristor = MemristorModel::and_ts();
//! let response = memristor.evaluate(0.3, 0.5).unwrap();
//! println!("I = {} A, dx/dt = {} 1/s", response.current, response.state_rate);
//! ```

pub mod common;
pub mod diode;
pub mod error;
pub mod memristor;
pub mod traits;

// Re-exports
pub use diode::{DiodeExponent, DiodePreset, TunnelDiode, TunnelDiodeParams};
pub use error::{DeviceError, DeviceResult};
pub use memristor::{AndTsParams, MemristorModel, SwitchingDynamics, ThermalParams};
pub use traits::{LeakageDevice, Memristor, MemristorResponse};
