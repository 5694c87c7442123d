//! Effect stages: the units the engine chains together.
//!
//! A stage owns all of its state (delay lines, phases, smoothers) and
//! processes an [`AudioBlock`] in place. The engine drives every stage through
//! the same four calls:
//!
//! ```text
//! prepare ──→ reset ──→ ┌─ update ──→ process ─┐ ──→ (drop)
//!   (alloc)   (clear)   └──────── per block ───┘
//! ```
//!
//! Only `prepare` may allocate. `update` receives the whole clamped parameter
//! snapshot plus tempo context; each stage picks the fields it cares about.

use crate::{io::AudioBlock, params::EngineParameters};

pub mod dirt;
pub mod noise;
pub mod pump;
pub mod reverb;
pub mod tape;

pub use dirt::DirtStage;
pub use noise::NoiseSource;
pub use pump::PumpStage;
pub use reverb::ReverbStage;
pub use tape::TapeStage;

/// Audio configuration known at prepare time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    pub sample_rate: f64,
    pub max_block_size: usize,
    pub num_channels: usize,
}

impl ProcessSpec {
    pub fn new(sample_rate: f64, max_block_size: usize, num_channels: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            num_channels,
        }
    }

    /// Convert milliseconds to samples at this rate.
    pub fn ms_to_samples(&self, ms: f64) -> f64 {
        ms * 0.001 * self.sample_rate
    }
}

/// Tempo context resolved once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockContext {
    /// Length of one pump cycle in samples.
    pub samples_per_cycle: f64,
    /// Position in the pump cycle at the first sample of the block, in [0, 1).
    pub cycle_phase: f64,
}

impl Default for BlockContext {
    fn default() -> Self {
        // 120 BPM eighth notes at 48 kHz
        Self {
            samples_per_cycle: 12_000.0,
            cycle_phase: 0.0,
        }
    }
}

/// Which stage a pipeline slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Tape,
    Dirt,
    Pump,
    Reverb,
}

impl StageKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Tape => "tape",
            Self::Dirt => "dirt",
            Self::Pump => "pump",
            Self::Reverb => "reverb",
        }
    }
}

/// Core trait for an in-place block processor.
pub trait Stage: Send {
    fn kind(&self) -> StageKind;

    /// Size buffers for `spec`. Allocates; never call from the audio thread.
    fn prepare(&mut self, spec: &ProcessSpec);

    /// Clear buffers and phases, snap smoothers to their targets.
    fn reset(&mut self);

    /// Cache the parameters this stage uses for the next `process` call.
    fn update(&mut self, params: &EngineParameters, ctx: &BlockContext);

    fn process(&mut self, block: &mut AudioBlock);
}
