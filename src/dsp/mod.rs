//! Low-level DSP primitives used by the effect stages.
//!
//! Everything here is realtime-safe once constructed: buffers are sized up
//! front (or in an explicit `prepare`/`allocate` call) and the per-sample paths
//! never allocate. They intentionally stay focused on the signal-processing
//! math so the stages can layer on parameters and smoothing.

/// Fractional delay line with linear interpolation.
pub mod delay;
/// Saturation, quantisation and sample-and-hold.
pub mod distortion;
/// Tempo-synced pump gain curve.
pub mod envelope;
/// One-pole lowpass for tape tone.
pub mod filter;
/// Decibel conversion and block metering.
pub mod level;
/// Phase accumulators for wow and flutter.
pub mod lfo;
/// Equal-power and linear crossfades.
pub mod mix;
/// XorShift white noise.
pub mod noise;
/// Schroeder comb/allpass reverb core.
pub mod reverb;
/// Linear parameter ramps.
pub mod smooth;

pub use delay::DelayLine;
pub use filter::OnePoleLowpass;
pub use noise::NoiseGenerator;
pub use smooth::SmoothedValue;
