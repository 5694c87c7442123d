//! Low Frequency Oscillator phase accumulation.

/*
Phase Accumulators
==================

An LFO is an oscillator running at control rate (roughly 0.01 - 20 Hz). All we
need to track is WHERE in the cycle we are; the waveform is computed from that
position on demand.

Vocabulary
----------

  phase       Position in the cycle, kept in [0, 1). Multiply by 2π for sin().

  increment   How far the phase moves per sample:
                  increment = frequency / sample_rate
              At 0.6 Hz and 48 kHz: 0.6 / 48000 = 0.0000125 per sample.

  wrap        When phase reaches 1.0 we SUBTRACT 1.0 rather than clamp or
              reset to zero. The leftover fraction carries over, so the
              waveform never skips or repeats a sample (phase continuity).


Why Not Keep Phase in Radians?
------------------------------

A [0, 1) phase doubles as a "fraction of the cycle" for tempo-synced shapes
(see the pump envelope), and wrapping by 1.0 is exact in binary floating
point. Radians are only needed at the moment we call sin().


Typical Rates in This Crate
---------------------------

    0.1 - 5 Hz    Wow: slow, seasick pitch drift of a warped reel
    7 - 17 Hz     Flutter: fast shimmer from capstan/motor irregularities
*/

use std::f32::consts::TAU;

/// Wrap any phase into [0, 1).
#[inline]
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase - phase.floor();
    // floor() of a value just below an integer can leave exactly 1.0 behind
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// A phase in [0, 1) advanced by a fixed increment each sample.
#[derive(Debug, Clone, Copy, Default)]
pub struct Phasor {
    phase: f32,
    increment: f32,
}

impl Phasor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_frequency(&mut self, frequency_hz: f32, sample_rate: f32) {
        self.increment = if sample_rate > 0.0 {
            (frequency_hz / sample_rate).clamp(0.0, 0.5)
        } else {
            0.0
        };
    }

    pub fn increment(&self) -> f32 {
        self.increment
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Bipolar sine (-1.0 to +1.0) at the current phase.
    #[inline]
    pub fn sine(&self) -> f32 {
        (TAU * self.phase).sin()
    }

    /// Move forward one sample, wrapping at 1.0.
    #[inline]
    pub fn advance(&mut self) {
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
