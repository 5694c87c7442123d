//! Pre-delayed room reverb with a smoothed wet level.

/*
Pre-Delay
=========

In a real room the first reflection arrives a little after the direct sound;
the gap tells the ear how far away the walls are. Each channel therefore runs
through a plain delay line (0 - 120 ms) before it reaches the reverb core.
Below 0.01 samples the line is skipped entirely and cleared, so turning
pre-delay back up doesn't replay stale audio.

Decay → Room Size
=================

The reverb core thinks in "room size" (comb feedback), the user thinks in
seconds of decay. We map linearly and keep away from the unstable top end:

    room_size = clamp(decay / 8, 0.05, 0.98)

Wet Level
=========

The blend is a linear crossfade against the stage's own input:

    out = in · (1 - wet) + reverb · wet

`wet` ramps toward the requested mix over 50 ms. While both the ramp and its
target sit at zero the stage does nothing at all, leaving the block untouched.
*/

use crate::{
    dsp::{mix::blend_dry_wet, reverb::SchroederReverb, DelayLine, SmoothedValue},
    io::AudioBlock,
    params::{EngineParameters, ReverbParameters, PRE_DELAY_MAX_MS},
};

use super::{BlockContext, ProcessSpec, Stage, StageKind};

const MIX_SMOOTHING_SECONDS: f32 = 0.05;
const PRE_DELAY_MIN_SAMPLES: f32 = 0.01;
const ROOM_SIZE_RANGE: (f32, f32) = (0.05, 0.98);
const DECAY_PER_ROOM_SIZE: f32 = 8.0;

/// Room size for a decay time in seconds.
#[inline]
pub fn room_size_for_decay(decay_s: f32) -> f32 {
    (decay_s / DECAY_PER_ROOM_SIZE).clamp(ROOM_SIZE_RANGE.0, ROOM_SIZE_RANGE.1)
}

pub struct ReverbStage {
    sample_rate: f32,
    params: ReverbParameters,
    pre_delays: Vec<DelayLine>,
    cores: Vec<SchroederReverb>,
    pre_delay_samples: f32,
    wet: SmoothedValue,
    wet_levels: Vec<f32>,
}

impl ReverbStage {
    pub fn new() -> Self {
        Self {
            sample_rate: 48_000.0,
            params: ReverbParameters::default(),
            pre_delays: Vec::new(),
            cores: Vec::new(),
            pre_delay_samples: 0.0,
            wet: SmoothedValue::new(0.0),
            wet_levels: Vec::new(),
        }
    }

    pub fn set_parameters(&mut self, params: &ReverbParameters) {
        self.params = params.clamped();

        let was_active = self.pre_delay_active();
        self.pre_delay_samples = self.params.pre_delay_ms * 0.001 * self.sample_rate;
        if was_active && !self.pre_delay_active() {
            for line in &mut self.pre_delays {
                line.reset();
            }
        }

        let room_size = room_size_for_decay(self.params.decay_s);
        for core in &mut self.cores {
            core.set_room_size(room_size);
            core.set_damping(self.params.damping);
        }
    }

    pub fn parameters(&self) -> &ReverbParameters {
        &self.params
    }

    fn pre_delay_active(&self) -> bool {
        self.pre_delay_samples >= PRE_DELAY_MIN_SAMPLES
    }

    /// Current (smoothed) wet level.
    pub fn wet_level(&self) -> f32 {
        self.wet.current()
    }

    /// Reverb tail length in samples for the current decay.
    pub fn tail_samples(&self) -> usize {
        (self.params.decay_s * self.sample_rate) as usize
    }

    /// Blend reverb into `block`, ramping the wet level toward `mix_target`.
    pub fn process_with_mix(&mut self, block: &mut AudioBlock, mix_target: f32) {
        debug_assert!(block.len() <= self.wet_levels.len(), "block exceeds prepared size");

        self.wet.set_target(mix_target.clamp(0.0, 1.0));
        if !self.wet.is_smoothing() && self.wet.current() == 0.0 {
            return;
        }

        let len = block.len().min(self.wet_levels.len());
        for level in &mut self.wet_levels[..len] {
            *level = self.wet.next();
        }

        let pre_delay = self.pre_delay_active().then_some(self.pre_delay_samples);

        for (channel, (line, core)) in block
            .channels_mut()
            .zip(self.pre_delays.iter_mut().zip(self.cores.iter_mut()))
        {
            for (sample, &wet) in channel[..len].iter_mut().zip(&self.wet_levels) {
                let dry = *sample;
                let send = match pre_delay {
                    Some(delay) => line.next_sample(dry, delay),
                    None => dry,
                };
                *sample = blend_dry_wet(dry, core.process(send), wet);
            }
        }
    }
}

impl Default for ReverbStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for ReverbStage {
    fn kind(&self) -> StageKind {
        StageKind::Reverb
    }

    fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.sample_rate as f32;

        let capacity = (spec.ms_to_samples(PRE_DELAY_MAX_MS as f64)).ceil() as usize + 2;
        self.pre_delays = (0..spec.num_channels)
            .map(|_| DelayLine::with_capacity(capacity))
            .collect();
        self.cores = (0..spec.num_channels)
            .map(|channel| {
                let mut core = SchroederReverb::default();
                core.prepare(self.sample_rate, channel);
                core
            })
            .collect();
        self.wet_levels = vec![0.0; spec.max_block_size];
        self.wet.reset(self.sample_rate, MIX_SMOOTHING_SECONDS);

        let params = self.params;
        self.set_parameters(&params);
        self.reset();
    }

    fn reset(&mut self) {
        for line in &mut self.pre_delays {
            line.reset();
        }
        for core in &mut self.cores {
            core.reset();
        }
        self.wet.snap(self.params.mix);
    }

    fn update(&mut self, params: &EngineParameters, _ctx: &BlockContext) {
        self.set_parameters(&params.reverb);
    }

    fn process(&mut self, block: &mut AudioBlock) {
        let mix = self.params.mix;
        self.process_with_mix(block, mix);
    }
}
