//! mn-core: stable foundation for memneuron.
//!
//! Contains:
//! - units (uom SI electrical types + constructors, physical constants)
//! - numeric (Real + tolerances + float helpers, overflow-checked exp)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
