use std::f32::consts::TAU;

/*
One-Pole Lowpass
================

The simplest useful lowpass: each output moves a fixed fraction of the way
from the previous output toward the input.

    y[n] = y[n-1] + a * (x[n] - y[n-1])

    a = 1 - exp(-2π * cutoff / sample_rate)

| a     | behaviour                                  |
| ----- | ------------------------------------------ |
| 0.0   | frozen, output never moves                 |
| small | heavy smoothing, dark                      |
| 1.0   | transparent, output equals input           |

It rolls off at 6 dB/octave, which is exactly the gentle "worn tape head"
dulling we want. Computing `a` costs an `exp()`, so callers cache it and only
recompute when the cutoff has moved meaningfully.
*/

#[derive(Debug, Clone, Copy)]
pub struct OnePoleLowpass {
    state: f32,
    coefficient: f32,
}

impl OnePoleLowpass {
    pub fn new() -> Self {
        Self {
            state: 0.0,
            coefficient: 1.0,
        }
    }

    /// Smoothing coefficient for a cutoff frequency.
    ///
    /// Cutoffs at or above `transparent_above_hz` return 1.0 (filter bypassed).
    pub fn coefficient_for(cutoff_hz: f32, sample_rate: f32, transparent_above_hz: f32) -> f32 {
        if cutoff_hz >= transparent_above_hz {
            return 1.0;
        }
        let cutoff = cutoff_hz.max(0.0);
        1.0 - (-TAU * cutoff / sample_rate).exp()
    }

    pub fn set_coefficient(&mut self, coefficient: f32) {
        self.coefficient = coefficient.clamp(0.0, 1.0);
    }

    pub fn coefficient(&self) -> f32 {
        self.coefficient
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        if self.coefficient >= 1.0 {
            self.state = input;
            return input;
        }

        self.state += self.coefficient * (input - self.state);
        self.state
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

impl Default for OnePoleLowpass {
    fn default() -> Self {
        Self::new()
    }
}
