//! Tempo-synced pumping.
//!
//! The envelope shape lives in [`crate::dsp::envelope`]. This stage only
//! tracks where in the cycle we are and multiplies every channel by the same
//! gain curve. The cycle position is handed in by the engine's tempo clock at
//! the start of each block, so the pump stays locked to the host's bar even
//! across transport jumps.

use crate::{
    dsp::{
        envelope::{pump_gain, pump_min_gain},
        lfo::wrap_phase,
    },
    io::AudioBlock,
    params::{EngineParameters, PumpParameters},
};

use super::{BlockContext, ProcessSpec, Stage, StageKind};

pub struct PumpStage {
    params: PumpParameters,
    min_gain: f32,
    phase: f64,
    increment: f64,
    gains: Vec<f32>,
}

impl PumpStage {
    pub fn new() -> Self {
        let params = PumpParameters::default();
        Self {
            params,
            min_gain: pump_min_gain(params.amount),
            phase: 0.0,
            increment: 1.0 / BlockContext::default().samples_per_cycle,
            gains: Vec::new(),
        }
    }

    pub fn set_parameters(&mut self, params: &PumpParameters) {
        self.params = params.clamped();
        self.min_gain = pump_min_gain(self.params.amount);
    }

    /// Set the cycle length and the cycle position of the next sample.
    pub fn set_sync(&mut self, samples_per_cycle: f64, cycle_phase: f64) {
        self.increment = if samples_per_cycle > 0.0 {
            1.0 / samples_per_cycle
        } else {
            0.0
        };
        self.phase = wrap_phase(cycle_phase);
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Gain the envelope applies at the current phase.
    pub fn current_gain(&self) -> f32 {
        let position = wrap_phase(self.phase + self.params.phase_offset as f64);
        pump_gain(position as f32, self.min_gain)
    }
}

impl Default for PumpStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for PumpStage {
    fn kind(&self) -> StageKind {
        StageKind::Pump
    }

    fn prepare(&mut self, spec: &ProcessSpec) {
        self.gains = vec![1.0; spec.max_block_size];
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }

    fn update(&mut self, params: &EngineParameters, ctx: &BlockContext) {
        self.set_parameters(&params.pump);
        self.set_sync(ctx.samples_per_cycle, ctx.cycle_phase);
    }

    fn process(&mut self, block: &mut AudioBlock) {
        debug_assert!(block.len() <= self.gains.len(), "block exceeds prepared size");

        let len = block.len().min(self.gains.len());

        if self.min_gain >= 1.0 {
            self.phase = wrap_phase(self.phase + self.increment * len as f64);
            return;
        }

        for i in 0..len {
            self.gains[i] = self.current_gain();
            self.phase += self.increment;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
        }

        for channel in block.channels_mut() {
            for (sample, &gain) in channel[..len].iter_mut().zip(&self.gains) {
                *sample *= gain;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::envelope::PUMP_DECAY_PORTION;

    fn prepared(amount: f32) -> PumpStage {
        let mut pump = PumpStage::new();
        pump.prepare(&ProcessSpec::new(48_000.0, 256, 2));
        pump.set_parameters(&PumpParameters {
            amount,
            ..PumpParameters::default()
        });
        pump
    }

    fn ones() -> AudioBlock {
        let mut block = AudioBlock::new(2, 256);
        for channel in block.channels_mut() {
            channel.fill(1.0);
        }
        block
    }

    #[test]
    fn zero_amount_is_identity() {
        let mut pump = prepared(0.0);
        for division in [1_000.0, 12_000.0, 3.0] {
            pump.set_sync(division, 0.37);
            let mut block = ones();
            pump.process(&mut block);
            assert!(block.channel(0).iter().all(|&s| s == 1.0));
        }
    }

    #[test]
    fn ducks_on_the_beat() {
        let mut pump = prepared(1.0);
        // 256-sample cycle: one full cycle per block
        pump.set_sync(256.0, 0.0);
        let mut block = ones();
        pump.process(&mut block);

        let out = block.channel(0);
        assert!((out[0] - 1.0).abs() < 1e-6);
        let trough = (PUMP_DECAY_PORTION * 256.0) as usize;
        assert!(out[trough] < 0.15);
        assert!(out[255] > 0.99);
        assert_eq!(block.channel(0), block.channel(1));
    }

    #[test]
    fn phase_offset_shifts_curve() {
        let mut pump = prepared(1.0);
        pump.set_parameters(&PumpParameters {
            amount: 1.0,
            phase_offset: PUMP_DECAY_PORTION,
            ..PumpParameters::default()
        });
        pump.set_sync(1_000.0, 0.0);
        assert!((pump.current_gain() - 0.1).abs() < 1e-4);
    }

    #[test]
    fn phase_advances_and_wraps() {
        let mut pump = prepared(0.5);
        pump.set_sync(100.0, 0.5);
        let mut block = ones();
        pump.process(&mut block);
        // 0.5 + 256/100 = 3.06 → 0.06
        assert!((pump.phase() - 0.06).abs() < 1e-6);
    }
}
