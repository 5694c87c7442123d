//! Tape hiss: one decorrelated white noise stream per channel.
//!
//! Unlike the other stages this one doesn't transform audio. It fills its own
//! buffer each block and the engine adds that buffer wherever the routing
//! says.

use crate::{
    dsp::{level::db_to_gain, mix::sum_in_place, NoiseGenerator},
    io::AudioBlock,
    params::NoiseParameters,
};

use super::ProcessSpec;

/// Base seed for channel 0; each further channel adds [`CHANNEL_SEED_STRIDE`].
pub const BASE_SEED: u32 = 0x00C0_FFEE;
pub const CHANNEL_SEED_STRIDE: u32 = 131;

/// Gains below this are treated as silence and skip generation.
pub const AUDIBLE_GAIN_THRESHOLD: f32 = 1.0e-6;

pub fn channel_seed(channel: usize) -> u32 {
    BASE_SEED.wrapping_add((channel as u32).wrapping_mul(CHANNEL_SEED_STRIDE))
}

pub struct NoiseSource {
    params: NoiseParameters,
    gain: f32,
    generators: Vec<NoiseGenerator>,
    buffer: AudioBlock,
    active: bool,
}

impl NoiseSource {
    pub fn new() -> Self {
        let params = NoiseParameters::default();
        Self {
            params,
            gain: db_to_gain(params.level_db),
            generators: Vec::new(),
            buffer: AudioBlock::default(),
            active: false,
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.generators = (0..spec.num_channels)
            .map(|channel| NoiseGenerator::new(channel_seed(channel)))
            .collect();
        self.buffer = AudioBlock::new(spec.num_channels, spec.max_block_size);
        self.reset();
    }

    /// Reseed every channel and clear the buffer.
    pub fn reset(&mut self) {
        for (channel, generator) in self.generators.iter_mut().enumerate() {
            generator.seed(channel_seed(channel));
        }
        self.buffer.clear();
        self.active = false;
    }

    pub fn set_parameters(&mut self, params: &NoiseParameters) {
        self.params = params.clamped();
        self.gain = db_to_gain(self.params.level_db);
    }

    pub fn parameters(&self) -> &NoiseParameters {
        &self.params
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Whether the last `generate` produced anything but silence.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Fill the buffer with `num_samples` of scaled noise per channel.
    pub fn generate(&mut self, num_samples: usize) {
        debug_assert!(num_samples <= self.buffer.max_len(), "block exceeds prepared size");

        self.buffer.set_len(num_samples.min(self.buffer.max_len()));

        if self.gain < AUDIBLE_GAIN_THRESHOLD {
            if self.active {
                self.buffer.clear();
            }
            self.active = false;
            return;
        }

        let gain = self.gain;
        for (channel, generator) in self.buffer.channels_mut().zip(self.generators.iter_mut()) {
            for sample in channel.iter_mut() {
                *sample = generator.next_sample() * gain;
            }
        }
        self.active = true;
    }

    pub fn buffer(&self) -> &AudioBlock {
        &self.buffer
    }

    /// Add the generated noise into every matching channel of `block`.
    pub fn add_to(&self, block: &mut AudioBlock) {
        if !self.active {
            return;
        }
        for (dst, src) in block.channels_mut().zip(self.buffer.channels()) {
            sum_in_place(dst, src);
        }
    }

    /// Noise sample for one channel at one index of the current buffer.
    #[inline]
    pub fn sample(&self, channel: usize, index: usize) -> f32 {
        if !self.active || channel >= self.buffer.num_channels() {
            return 0.0;
        }
        self.buffer.channel(channel)[index]
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new()
    }
}
