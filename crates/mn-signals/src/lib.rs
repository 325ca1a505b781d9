//! Input current signals for memristive neuron simulations.
//!
//! A [`Waveform`] is the serializable description found in scenario files.
//! [`build_signal`] validates it and turns it into a [`Signal`] implementing
//! [`InputSignal`]. Deterministic waveforms are evaluated analytically;
//! random waveforms (normal and pink noise) are drawn once from a
//! caller-supplied RNG and replayed with a zero-order hold, so a run is fully
//! determined by its seed.

pub mod error;
pub mod noise;
pub mod sampled;
pub mod signal;
pub mod waveform;

pub use error::{SignalError, SignalResult};
pub use noise::{PinkNoise, normal_samples, pink_samples};
pub use sampled::{SampleGrid, SampledSignal};
pub use signal::{Analytic, InputSignal, Signal, build_signal};
pub use waveform::Waveform;
