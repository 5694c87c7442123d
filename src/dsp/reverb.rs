//! Reverb - Room Simulation via Delay Networks
//!
//! Reverb simulates the sound of a space by creating many delayed, filtered
//! reflections of the input signal. This implementation uses the classic
//! Schroeder reverb algorithm.
//!
//! # Schroeder Reverb Architecture
//!
//! ```text
//! Input ──┬──→ [Comb 1] ──┐
//!         ├──→ [Comb 2] ──┤
//!         ├──→ [Comb 3] ──┼──→ (+) ──→ [Allpass 1] ──→ [Allpass 2] ──→ Output
//!         └──→ [Comb 4] ──┘
//! ```
//!
//! ## Comb Filters
//!
//! A comb filter creates a series of equally-spaced echoes that decay over time.
//! Multiple comb filters with different delay times create a dense reverb tail.
//!
//! ```text
//! y[n] = x[n] + feedback * y[n - delay]
//! ```
//!
//! The delay times are chosen to be mutually prime (no common factors) to avoid
//! resonant buildup at specific frequencies.
//!
//! ## Allpass Filters
//!
//! Allpass filters pass all frequencies equally but shift their phase. In reverb,
//! they add density and diffusion without coloring the sound.
//!
//! ```text
//! y[n] = -g * x[n] + x[n - delay] + g * y[n - delay]
//! ```
//!
//! ## Stereo Spread
//!
//! Each channel gets its own network. Channel `n` lengthens every delay by
//! `n * 23` samples so left and right tails decorrelate instead of collapsing
//! to mono.
//!
//! # Parameters
//!
//! - **Room Size**: Scales comb feedback (larger = longer decay), 0.7 to 0.98
//! - **Damping**: High-frequency absorption (higher = darker sound)
//!
//! Buffers are sized in [`SchroederReverb::prepare`]; `process` never allocates.

const COMB_DELAYS_MS: [f32; 4] = [29.7, 37.1, 41.1, 43.7];
const ALLPASS_DELAYS_MS: [f32; 2] = [5.0, 1.7];

/// Extra samples per channel index added to every delay line.
pub const STEREO_SPREAD_SAMPLES: usize = 23;

const DENORMAL_THRESHOLD: f32 = 1.0e-15;

#[inline]
fn flush_denormal(x: f32) -> f32 {
    if x.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        x
    }
}

fn ms_to_samples(ms: f32, sample_rate: f32) -> usize {
    ((ms * sample_rate / 1000.0) as usize).max(1)
}

/// A simple comb filter for reverb
#[derive(Debug, Clone, Default)]
pub struct CombFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    feedback: f32,
    damp: f32,
    filter_state: f32,
}

impl CombFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            feedback: 0.5,
            damp: 0.5,
            filter_state: 0.0,
        }
    }

    pub fn delay_samples(&self) -> usize {
        self.buffer.len()
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.99);
    }

    pub fn set_damp(&mut self, damp: f32) {
        self.damp = damp.clamp(0.0, 1.0);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.buffer[self.write_pos];

        // One-pole lowpass filter for damping (absorbs high frequencies)
        self.filter_state =
            flush_denormal(output * (1.0 - self.damp) + self.filter_state * self.damp);

        self.buffer[self.write_pos] = flush_denormal(input + self.filter_state * self.feedback);

        self.write_pos += 1;
        if self.write_pos >= self.buffer.len() {
            self.write_pos = 0;
        }

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.write_pos = 0;
    }
}

/// An allpass filter for reverb diffusion
#[derive(Debug, Clone, Default)]
pub struct AllpassFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    feedback: f32,
}

impl AllpassFilter {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            write_pos: 0,
            feedback: 0.5,
        }
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.9);
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let delayed = self.buffer[self.write_pos];

        // Allpass: output = -g*input + delayed + g*delayed_output
        let output = -self.feedback * input + delayed;

        self.buffer[self.write_pos] = flush_denormal(input + self.feedback * output);

        self.write_pos += 1;
        if self.write_pos >= self.buffer.len() {
            self.write_pos = 0;
        }

        output
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// Schroeder reverb with 4 comb filters and 2 allpass filters (one channel).
#[derive(Debug, Clone, Default)]
pub struct SchroederReverb {
    combs: Vec<CombFilter>,
    allpasses: Vec<AllpassFilter>,
    room_size: f32,
    damping: f32,
}

impl SchroederReverb {
    pub fn new(sample_rate: f32) -> Self {
        let mut reverb = Self::default();
        reverb.prepare(sample_rate, 0);
        reverb
    }

    /// Allocate delay lines for `sample_rate`, offset by the channel's stereo spread.
    ///
    /// Room size and damping survive a re-prepare.
    pub fn prepare(&mut self, sample_rate: f32, channel: usize) {
        let spread = channel * STEREO_SPREAD_SAMPLES;

        self.combs = COMB_DELAYS_MS
            .iter()
            .map(|&ms| CombFilter::new(ms_to_samples(ms, sample_rate) + spread))
            .collect();
        self.allpasses = ALLPASS_DELAYS_MS
            .iter()
            .map(|&ms| AllpassFilter::new(ms_to_samples(ms, sample_rate) + spread))
            .collect();

        self.set_room_size(self.room_size);
        self.set_damping(self.damping);
    }

    pub fn is_prepared(&self) -> bool {
        !self.combs.is_empty()
    }

    /// Set the room size (scales feedback for longer/shorter decay)
    pub fn set_room_size(&mut self, size: f32) {
        self.room_size = size.clamp(0.0, 1.0);
        let feedback = 0.7 + self.room_size * 0.28; // 0.7 to 0.98
        for comb in &mut self.combs {
            comb.set_feedback(feedback);
        }
    }

    /// Set damping (high frequency absorption)
    pub fn set_damping(&mut self, damp: f32) {
        self.damping = damp.clamp(0.0, 1.0);
        for comb in &mut self.combs {
            comb.set_damp(self.damping);
        }
    }

    pub fn room_size(&self) -> f32 {
        self.room_size
    }

    /// Process a single sample through the reverb
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        if self.combs.is_empty() {
            return 0.0;
        }

        // Sum outputs of all comb filters (parallel)
        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(input);
        }
        output *= 0.25; // Normalize for 4 combs

        // Pass through allpass filters (series)
        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }

        output
    }

    /// Reset all filter states
    pub fn reset(&mut self) {
        for comb in &mut self.combs {
            comb.reset();
        }
        for allpass in &mut self.allpasses {
            allpass.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comb_filter_creates_echo() {
        let mut comb = CombFilter::new(10);
        comb.set_feedback(0.5);
        comb.set_damp(0.0);

        // Feed an impulse
        let out1 = comb.process(1.0);
        assert!(out1.abs() < 0.01); // No output yet (delayed)

        for _ in 0..9 {
            comb.process(0.0);
        }

        // Now we should see the echo
        let echo = comb.process(0.0);
        assert!(echo.abs() > 0.4);
    }

    #[test]
    fn test_allpass_preserves_energy() {
        let mut allpass = AllpassFilter::new(5);
        allpass.set_feedback(0.5);

        let mut energy_in = 0.0;
        let mut energy_out = 0.0;

        for i in 0..100 {
            let input = if i < 10 { 1.0 } else { 0.0 };
            let output = allpass.process(input);
            energy_in += input * input;
            energy_out += output * output;
        }

        assert!(energy_out > energy_in * 0.8);
    }

    #[test]
    fn test_schroeder_reverb_produces_output() {
        let mut reverb = SchroederReverb::new(48000.0);
        reverb.set_room_size(0.5);
        reverb.set_damping(0.5);

        let _ = reverb.process(1.0);

        // Longest comb delay is ~43ms = ~2100 samples at 48kHz
        let mut has_tail = false;
        for _ in 0..5000 {
            let out = reverb.process(0.0);
            if out.abs() > 0.001 {
                has_tail = true;
                break;
            }
        }

        assert!(has_tail, "Reverb should produce a tail after impulse");
    }

    #[test]
    fn test_reverb_stability() {
        let mut reverb = SchroederReverb::new(48000.0);
        reverb.set_room_size(1.0); // Maximum feedback

        for _ in 0..10000 {
            let out = reverb.process(0.1);
            assert!(out.is_finite(), "Reverb output should be finite");
            assert!(out.abs() < 10.0, "Reverb output unstable: {}", out);
        }
    }

    #[test]
    fn test_channel_spread_lengthens_delays() {
        let mut left = SchroederReverb::default();
        let mut right = SchroederReverb::default();
        left.prepare(48_000.0, 0);
        right.prepare(48_000.0, 1);

        for (l, r) in left.combs.iter().zip(right.combs.iter()) {
            assert_eq!(r.delay_samples(), l.delay_samples() + STEREO_SPREAD_SAMPLES);
        }
    }

    #[test]
    fn test_unprepared_is_silent() {
        let mut reverb = SchroederReverb::default();
        assert!(!reverb.is_prepared());
        assert_eq!(reverb.process(1.0), 0.0);
    }

    #[test]
    fn test_room_size_survives_prepare() {
        let mut reverb = SchroederReverb::default();
        reverb.set_room_size(0.4);
        reverb.prepare(44_100.0, 0);
        assert!((reverb.room_size() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_tail_decays_to_silence() {
        let mut reverb = SchroederReverb::new(48_000.0);
        reverb.set_room_size(0.1);
        reverb.set_damping(0.5);
        reverb.process(1.0);
        for _ in 0..48_000 * 4 {
            reverb.process(0.0);
        }
        let mut peak = 0.0f32;
        for _ in 0..1000 {
            peak = peak.max(reverb.process(0.0).abs());
        }
        assert!(peak < 1e-4);
    }
}
