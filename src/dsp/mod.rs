//! Low-level DSP primitives used by the software mixer.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside mixer voices. They stay focused on the signal math;
//! voice lifetime and scheduling live in `engine::mixer`.

/// Oscillator waveforms.
pub mod oscillator;
/// Sample-accurate linear gain ramps.
pub mod ramp;

pub use oscillator::Waveform;
pub use ramp::GainRamp;
