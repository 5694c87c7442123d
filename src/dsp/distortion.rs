//! Degradation primitives: waveshaping, bit-depth quantisation and
//! sample-and-hold rate reduction.
//!
//! # Cubic Soft Clip
//!
//! The classic polynomial saturator:
//!
//!   f(x) = x - x³/3      for x clamped to [-1, 1]
//!
//! - Unity slope at the origin, so quiet material passes almost untouched
//! - Slope reaches zero at ±1, where the output flattens at ±2/3
//! - Only odd harmonics (3rd dominant), the "warm tape" colour
//!
//! Driving the input harder pushes more of the waveform into the bend. We then
//! divide by the drive again so turning saturation up changes tone more than
//! level.
//!
//! # Quantisation
//!
//! Bit reduction snaps each sample to a uniform grid:
//!
//!   levels = 2^bits - 1
//!   step   = 2 / levels
//!   out    = round(x / step) * step
//!
//! The level index is clamped to ±(levels - 1) / 2, so a b-bit quantiser never
//! emits more than 2^b - 1 distinct values across [-1, 1].
//!
//! # Sample-and-Hold
//!
//! Rate reduction without resampling: grab one sample, repeat it for `divider`
//! samples, grab the next. Aliasing is the point.

/// Saturation below this amount is treated as off.
pub const SATURATION_FLOOR: f32 = 1.0e-4;

/// Quantisers at or above this depth are bypassed.
pub const TRANSPARENT_BIT_DEPTH: u32 = 24;

pub const MIN_BIT_DEPTH: u32 = 4;

/// Cubic soft clip `x - x³/3` on the input clamped to [-1, 1].
#[inline]
pub fn soft_clip_cubic(sample: f32) -> f32 {
    let x = sample.clamp(-1.0, 1.0);
    x - (x * x * x) / 3.0
}

/// Drive factor for a saturation amount in [0, 1].
///
/// Grows with the square of the amount: gentle at first, steep near 1.
#[inline]
pub fn saturation_drive(amount: f32) -> f32 {
    let amount = amount.clamp(0.0, 1.0);
    1.0 + 10.0 * amount * amount
}

/// Drive into the cubic clipper and compensate by the inverse drive.
#[inline]
pub fn saturate(sample: f32, drive: f32) -> f32 {
    soft_clip_cubic(sample * drive) / drive
}

/// Uniform mid-tread quantiser for a fixed bit depth.
#[derive(Debug, Clone, Copy)]
pub struct Quantizer {
    step: f32,
    max_index: f32,
    bypass: bool,
}

impl Quantizer {
    pub fn new(bit_depth: u32) -> Self {
        let bits = bit_depth.clamp(MIN_BIT_DEPTH, TRANSPARENT_BIT_DEPTH);
        let levels = ((1u64 << bits) - 1) as f64;
        Self {
            step: (2.0 / levels) as f32,
            max_index: ((levels - 1.0) / 2.0) as f32,
            bypass: bits >= TRANSPARENT_BIT_DEPTH,
        }
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    #[inline]
    pub fn process(&self, sample: f32) -> f32 {
        if self.bypass {
            return sample;
        }
        let clamped = sample.clamp(-1.0, 1.0);
        let index = (clamped / self.step)
            .round()
            .clamp(-self.max_index, self.max_index);
        index * self.step
    }
}

/// Per-channel sample-and-hold state.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleAndHold {
    counter: u32,
    held: f32,
}

impl SampleAndHold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture a fresh sample every `divider` calls, repeat it in between.
    ///
    /// A divider of 0 or 1 passes the input through.
    #[inline]
    pub fn process(&mut self, sample: f32, divider: u32) -> f32 {
        if divider <= 1 {
            return sample;
        }

        // A held value never outlasts the current divider
        self.counter = self.counter.min(divider);
        if self.counter == 0 {
            self.held = sample;
            self.counter = divider;
        }

        self.counter -= 1;
        self.held
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.held = 0.0;
    }
}
