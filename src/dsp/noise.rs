//! Deterministic white noise for tape hiss.

/*
XorShift32
==========

Three shifts and three XORs per sample give a full-period (2³² - 1) sequence
of 32-bit states. It is not cryptographic and does not need to be: we want
broadband hiss that is cheap, allocation-free and repeatable.

    state ^= state << 13
    state ^= state >> 17
    state ^= state << 5

The all-zero state is a fixed point (every shift of zero is zero), so the
generator would emit silence forever. Seeding with zero therefore substitutes
a fixed non-zero state.

The state is reinterpreted as a signed 32-bit integer and scaled by 1/i32::MAX,
giving samples spread evenly across [-1, 1].
*/

/// Substitute state used when asked to seed with zero.
pub const ZERO_SEED_SUBSTITUTE: u32 = 0x1234_5678;

#[derive(Debug, Clone, Copy)]
pub struct NoiseGenerator {
    state: u32,
}

impl NoiseGenerator {
    pub fn new(seed: u32) -> Self {
        let mut generator = Self {
            state: ZERO_SEED_SUBSTITUTE,
        };
        generator.seed(seed);
        generator
    }

    pub fn seed(&mut self, seed: u32) {
        self.state = if seed == 0 { ZERO_SEED_SUBSTITUTE } else { seed };
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;

        (x as i32) as f32 / i32::MAX as f32
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new(ZERO_SEED_SUBSTITUTE)
    }
}
