//! Degradation: saturate → quantise → hold.
//!
//! Each effect bypasses itself at its neutral setting (saturation ≈ 0, 24
//! bits, divider 1), so a stage with all three neutral is bit-transparent.

use crate::{
    dsp::distortion::{saturate, saturation_drive, Quantizer, SampleAndHold, SATURATION_FLOOR},
    io::AudioBlock,
    params::{DirtParameters, EngineParameters},
};

use super::{BlockContext, ProcessSpec, Stage, StageKind};

pub struct DirtStage {
    params: DirtParameters,
    drive: f32,
    quantizer: Quantizer,
    holds: Vec<SampleAndHold>,
}

impl DirtStage {
    pub fn new() -> Self {
        let params = DirtParameters::default();
        Self {
            params,
            drive: saturation_drive(params.saturation),
            quantizer: Quantizer::new(params.bit_depth),
            holds: Vec::new(),
        }
    }

    pub fn set_parameters(&mut self, params: &DirtParameters) {
        let params = params.clamped();
        if params.bit_depth != self.params.bit_depth {
            self.quantizer = Quantizer::new(params.bit_depth);
        }
        self.drive = saturation_drive(params.saturation);
        self.params = params;
    }

    pub fn parameters(&self) -> &DirtParameters {
        &self.params
    }
}

impl Default for DirtStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for DirtStage {
    fn kind(&self) -> StageKind {
        StageKind::Dirt
    }

    fn prepare(&mut self, spec: &ProcessSpec) {
        self.holds = vec![SampleAndHold::new(); spec.num_channels];
    }

    fn reset(&mut self) {
        for hold in &mut self.holds {
            hold.reset();
        }
    }

    fn update(&mut self, params: &EngineParameters, _ctx: &BlockContext) {
        self.set_parameters(&params.dirt);
    }

    fn process(&mut self, block: &mut AudioBlock) {
        let saturating = self.params.saturation > SATURATION_FLOOR;
        let quantizing = !self.quantizer.is_bypassed();
        let divider = self.params.rate_divider;
        let holding = divider > 1;

        if !saturating && !quantizing && !holding {
            return;
        }

        for (channel, hold) in block.channels_mut().zip(self.holds.iter_mut()) {
            for sample in channel.iter_mut() {
                let mut x = *sample;
                if saturating {
                    x = saturate(x, self.drive);
                }
                if quantizing {
                    x = self.quantizer.process(x);
                }
                if holding {
                    x = hold.process(x, divider);
                }
                *sample = x;
            }
        }
    }
}
