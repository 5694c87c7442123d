//! The orchestrator: owns every stage and turns a host block into output.
//!
//! One call to [`DustboxEngine::process`] does, in order:
//!
//! ```text
//!   input ──┬──────────────────────────────────────────── dry ───┐
//!           │                                                    │
//!           └─→ [noise?] → Tape → [noise?] → Dirt → Pump → Reverb │
//!                                                  │             │
//!                            equal-power mix ←─────┴─────────────┘
//!                                  │  (+ parallel noise)
//!                                  ↓
//!                             output gain  (+ post-mix noise)
//!                                  │
//!                           bypass crossfade ←── dry
//!                                  ↓
//!                                output
//! ```
//!
//! All allocation happens in [`prepare`](DustboxEngine::prepare). Once
//! bypass is fully engaged the DSP is skipped and the input passes through
//! untouched.

pub mod clock;
pub mod error;
pub mod meter;
pub mod pipeline;

use std::sync::Arc;

use log::{debug, info};

use crate::{
    dsp::{level::db_to_gain, mix::equal_power_gains, SmoothedValue},
    io::{AudioBlock, TransportInfo},
    params::{EngineParameters, NoiseRouting},
    stage::{NoiseSource, ProcessSpec, StageKind},
    MAX_BLOCK_SIZE, MAX_CHANNELS,
};

pub use clock::TempoClock;
pub use error::EngineError;
pub use meter::{LevelMeters, MeterBank, MeterReading};
#[cfg(feature = "rtrb")]
pub use meter::{ScopeReader, ScopeTap};
pub use pipeline::Pipeline;

const WET_MIX_SMOOTHING_SECONDS: f32 = 0.03;
const OUTPUT_GAIN_SMOOTHING_SECONDS: f32 = 0.03;
const BYPASS_SMOOTHING_SECONDS: f32 = 0.01;

/// Per-sample gains shared by every channel of a block.
#[derive(Default)]
struct GainScratch {
    dry: Vec<f32>,
    wet: Vec<f32>,
    output: Vec<f32>,
    bypass: Vec<f32>,
}

impl GainScratch {
    fn allocate(&mut self, len: usize) {
        self.dry = vec![1.0; len];
        self.wet = vec![0.0; len];
        self.output = vec![1.0; len];
        self.bypass = vec![0.0; len];
    }
}

pub struct DustboxEngine {
    spec: Option<ProcessSpec>,
    params: EngineParameters,
    pipeline: Pipeline,
    noise: NoiseSource,
    clock: TempoClock,
    dry: AudioBlock,
    wet_mix: SmoothedValue,
    output_gain: SmoothedValue,
    bypass: SmoothedValue,
    scratch: GainScratch,
    meters: Arc<LevelMeters>,
}

impl DustboxEngine {
    pub fn new() -> Self {
        Self::with_pipeline(Pipeline::standard())
    }

    /// Build an engine around a custom stage chain.
    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        let params = EngineParameters::default();
        Self {
            spec: None,
            params,
            pipeline,
            noise: NoiseSource::new(),
            clock: TempoClock::new(),
            dry: AudioBlock::default(),
            wet_mix: SmoothedValue::new(params.global.wet_mix),
            output_gain: SmoothedValue::new(db_to_gain(params.global.output_gain_db)),
            bypass: SmoothedValue::new(if params.global.bypass { 1.0 } else { 0.0 }),
            scratch: GainScratch::default(),
            meters: Arc::new(LevelMeters::new()),
        }
    }

    /// Size every buffer for the given stream format and reset all state.
    pub fn prepare(
        &mut self,
        sample_rate: f64,
        max_block_size: usize,
        num_channels: usize,
    ) -> Result<(), EngineError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(EngineError::InvalidSampleRate(sample_rate));
        }
        if max_block_size == 0 || max_block_size > MAX_BLOCK_SIZE {
            return Err(EngineError::InvalidBlockSize {
                requested: max_block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        if num_channels == 0 || num_channels > MAX_CHANNELS {
            return Err(EngineError::InvalidChannelCount {
                requested: num_channels,
                max: MAX_CHANNELS,
            });
        }

        let spec = ProcessSpec::new(sample_rate, max_block_size, num_channels);
        let rate = sample_rate as f32;

        self.pipeline.prepare(&spec);
        self.noise.prepare(&spec);
        self.clock.prepare(sample_rate);
        self.dry = AudioBlock::new(num_channels, max_block_size);
        self.scratch.allocate(max_block_size);

        self.wet_mix.reset(rate, WET_MIX_SMOOTHING_SECONDS);
        self.output_gain.reset(rate, OUTPUT_GAIN_SMOOTHING_SECONDS);
        self.bypass.reset(rate, BYPASS_SMOOTHING_SECONDS);

        self.spec = Some(spec);

        info!(
            "prepared: {} Hz, {} samples, {} channels, stages [{}]",
            sample_rate,
            max_block_size,
            num_channels,
            self.pipeline
                .kinds()
                .map(StageKind::name)
                .collect::<Vec<_>>()
                .join(" → ")
        );

        self.reset();
        Ok(())
    }

    /// Clear all audio history and jump every smoother to its target.
    pub fn reset(&mut self) {
        self.clock.reset();
        let ctx = self.clock.advance(None, self.params.pump.division, 0);
        self.pipeline.update(&self.params, &ctx);
        self.pipeline.reset();

        self.noise.set_parameters(&self.params.noise);
        self.noise.reset();

        self.dry.clear();
        self.wet_mix.snap(self.wet_mix.target());
        self.output_gain.snap(self.output_gain.target());
        self.bypass.snap(self.bypass.target());
        self.meters.clear();

        debug!("reset (bypass {})", self.params.global.bypass);
    }

    /// Accept the parameter snapshot for the next block. Values are clamped.
    pub fn set_parameters(&mut self, params: &EngineParameters) {
        self.params = params.clamped();
        let global = self.params.global;

        self.wet_mix.set_target(global.wet_mix);
        self.output_gain.set_target(db_to_gain(global.output_gain_db));
        self.bypass
            .set_target(if global.bypass { 1.0 } else { 0.0 });
        self.noise.set_parameters(&self.params.noise);
    }

    pub fn parameters(&self) -> &EngineParameters {
        &self.params
    }

    pub fn is_prepared(&self) -> bool {
        self.spec.is_some()
    }

    pub fn spec(&self) -> Option<ProcessSpec> {
        self.spec
    }

    /// Meters shared with display threads.
    pub fn meters(&self) -> Arc<LevelMeters> {
        Arc::clone(&self.meters)
    }

    pub fn clock(&self) -> &TempoClock {
        &self.clock
    }

    /// Processing latency reported to hosts. The tape delay is part of the
    /// sound, not something to compensate.
    pub fn latency_samples(&self) -> usize {
        0
    }

    /// How long the output keeps ringing after the input stops.
    pub fn tail_samples(&self) -> usize {
        match self.spec {
            Some(spec) => (self.params.reverb.decay_s as f64 * spec.sample_rate) as usize,
            None => 0,
        }
    }

    /// True once bypass is requested and its crossfade has finished.
    pub fn is_bypass_engaged(&self) -> bool {
        self.params.global.bypass && !self.bypass.is_smoothing() && self.bypass.current() >= 1.0
    }

    /// Process one block in place.
    pub fn process(&mut self, block: &mut AudioBlock, transport: Option<&TransportInfo>) {
        let Some(spec) = self.spec else {
            debug_assert!(false, "process() called before prepare()");
            return;
        };
        debug_assert!(
            block.len() <= spec.max_block_size,
            "block of {} exceeds prepared size {}",
            block.len(),
            spec.max_block_size
        );

        let len = block.len().min(spec.max_block_size);

        // Channels we weren't prepared for carry nothing.
        for channel in block.channels_mut().skip(spec.num_channels) {
            channel.fill(0.0);
        }

        self.meters.input.publish(block);
        self.dry.copy_from(block);

        let division = self.params.pump.division;

        if self.is_bypass_engaged() {
            self.clock.advance(transport, division, len);
            self.wet_mix.skip(len);
            self.output_gain.skip(len);
            self.meters.output.publish(block);
            return;
        }

        let ctx = self.clock.advance(transport, division, len);
        self.pipeline.update(&self.params, &ctx);

        let routing = self.params.noise.routing;
        self.noise.generate(len);

        if routing == NoiseRouting::PreChain {
            self.noise.add_to(block);
        }

        // Mid-chain hiss enters after the leading tape stages, or at the end
        // of a chain that has nothing else.
        let noise = &self.noise;
        let mut pending = routing == NoiseRouting::MidChain;
        self.pipeline.process(block, |kind, block| {
            if pending && kind != StageKind::Tape {
                noise.add_to(block);
                pending = false;
            }
        });
        if pending {
            self.noise.add_to(block);
        }

        self.mix_into(block, len, routing);
        self.meters.output.publish(block);
    }

    /// Blend dry and processed audio, apply output gain and bypass.
    fn mix_into(&mut self, block: &mut AudioBlock, len: usize, routing: NoiseRouting) {
        let scratch = &mut self.scratch;
        for i in 0..len {
            let gains = equal_power_gains(self.wet_mix.next());
            scratch.dry[i] = gains.dry;
            scratch.wet[i] = gains.wet;
            scratch.output[i] = self.output_gain.next();
        }

        let crossfading = self.bypass.is_smoothing() || self.bypass.target() >= 1.0;
        if crossfading {
            for level in &mut scratch.bypass[..len] {
                *level = self.bypass.next();
            }
        }

        let parallel = routing == NoiseRouting::Parallel;
        let post_mix = routing == NoiseRouting::PostMix;

        for (ch, (out, dry)) in block.channels_mut().zip(self.dry.channels()).enumerate() {
            for i in 0..len {
                let mut y = dry[i] * scratch.dry[i] + out[i] * scratch.wet[i];
                if parallel {
                    y += self.noise.sample(ch, i);
                }
                y *= scratch.output[i];
                if post_mix {
                    y += self.noise.sample(ch, i);
                }
                if crossfading {
                    let b = scratch.bypass[i];
                    y = dry[i] * b + y * (1.0 - b);
                }
                out[i] = y;
            }
        }
    }
}

impl Default for DustboxEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 48_000.0;
    const BLOCK: usize = 256;

    fn engine_with(params: EngineParameters) -> DustboxEngine {
        let mut engine = DustboxEngine::new();
        engine.prepare(SR, BLOCK, 2).unwrap();
        engine.set_parameters(&params);
        engine.reset();
        engine
    }

    fn dc(value: f32, channels: usize) -> AudioBlock {
        let mut block = AudioBlock::new(channels, BLOCK);
        for channel in block.channels_mut() {
            channel.fill(value);
        }
        block
    }

    #[test]
    fn rejects_bad_configuration() {
        let mut engine = DustboxEngine::new();
        assert_eq!(
            engine.prepare(0.0, 512, 2),
            Err(EngineError::InvalidSampleRate(0.0))
        );
        assert!(matches!(
            engine.prepare(SR, 0, 2),
            Err(EngineError::InvalidBlockSize { .. })
        ));
        assert!(matches!(
            engine.prepare(SR, MAX_BLOCK_SIZE + 1, 2),
            Err(EngineError::InvalidBlockSize { .. })
        ));
        assert!(matches!(
            engine.prepare(SR, 512, MAX_CHANNELS + 1),
            Err(EngineError::InvalidChannelCount { .. })
        ));
        assert!(!engine.is_prepared());
    }

    #[test]
    fn dry_only_mix_is_passthrough() {
        let mut params = EngineParameters::default();
        params.global.wet_mix = 0.0;
        params.noise.routing = NoiseRouting::MidChain;
        let mut engine = engine_with(params);

        let mut block = dc(0.25, 2);
        engine.process(&mut block, None);
        assert!(block.channel(0).iter().all(|&s| s == 0.25));
    }

    #[test]
    fn clears_unprepared_channels() {
        let mut engine = engine_with(EngineParameters::default());
        let mut block = dc(0.5, 4);
        engine.process(&mut block, None);
        assert!(block.channel(2).iter().all(|&s| s == 0.0));
        assert!(block.channel(3).iter().all(|&s| s == 0.0));
        assert_eq!(engine.meters().input.channel_count(), 4);
    }

    #[test]
    fn output_gain_applies() {
        let mut params = EngineParameters::default();
        params.global.wet_mix = 0.0;
        params.global.output_gain_db = -20.0;
        let mut engine = engine_with(params);

        let mut block = dc(1.0, 2);
        engine.process(&mut block, None);
        for &s in block.channel(1) {
            assert!((s - 0.1).abs() < 1e-6);
        }
    }

    #[test]
    fn post_mix_noise_survives_dry_mix() {
        let mut params = EngineParameters::default();
        params.global.wet_mix = 0.0;
        params.noise.routing = NoiseRouting::PostMix;
        params.noise.level_db = -20.0;
        let mut engine = engine_with(params);

        let mut block = dc(0.0, 2);
        engine.process(&mut block, None);
        assert!(crate::dsp::level::peak(block.channel(0)) > 0.01);
    }

    /// Tape as a plain 12 ms delay, everything after it neutral, fully wet.
    fn clean_tape(routing: NoiseRouting) -> EngineParameters {
        let mut params = EngineParameters::default();
        params.tape.wow_depth = 0.0;
        params.tape.flutter_depth = 0.0;
        params.tape.tone_cutoff_hz = 22_000.0;
        params.dirt.saturation = 0.0;
        params.dirt.bit_depth = 24;
        params.dirt.rate_divider = 1;
        params.pump.amount = 0.0;
        params.reverb.mix = 0.0;
        params.global.wet_mix = 1.0;
        params.noise.routing = routing;
        params.noise.level_db = -20.0;
        params
    }

    /// The first `BLOCK` samples a fresh noise source would produce.
    fn expected_noise(params: &EngineParameters) -> AudioBlock {
        let mut noise = NoiseSource::new();
        noise.prepare(&ProcessSpec::new(SR, BLOCK, 2));
        noise.set_parameters(&params.noise);
        noise.generate(BLOCK);
        noise.buffer().clone()
    }

    #[test]
    fn mid_chain_noise_skips_the_tape_delay() {
        let params = clean_tape(NoiseRouting::MidChain);
        let mut engine = engine_with(params);

        let mut block = dc(0.0, 2);
        engine.process(&mut block, None);
        let noise = expected_noise(&params);
        assert_eq!(block.channel(0), noise.channel(0));
        assert_eq!(block.channel(1), noise.channel(1));
    }

    #[test]
    fn pre_chain_noise_runs_through_the_tape_delay() {
        let params = clean_tape(NoiseRouting::PreChain);
        let mut engine = engine_with(params);

        let mut output = Vec::new();
        for _ in 0..3 {
            let mut block = dc(0.0, 2);
            engine.process(&mut block, None);
            output.extend_from_slice(block.channel(0));
        }

        // 12 ms at 48 kHz
        assert!(output[..576].iter().all(|&s| s == 0.0));
        let noise = expected_noise(&params);
        for (i, &n) in noise.channel(0)[..100].iter().enumerate() {
            assert!((output[576 + i] - n).abs() < 1e-6, "sample {i}");
        }
    }

    #[test]
    fn parallel_noise_bypasses_the_wet_path() {
        let mut params = clean_tape(NoiseRouting::Parallel);
        params.global.wet_mix = 0.0;
        let mut engine = engine_with(params);

        let mut block = dc(0.0, 2);
        engine.process(&mut block, None);
        let noise = expected_noise(&params);
        assert_eq!(block.channel(0), noise.channel(0));

        // Same settings but routed mid-chain: a dry-only mix hides it
        let mut params = params;
        params.noise.routing = NoiseRouting::MidChain;
        let mut engine = engine_with(params);
        let mut block = dc(0.0, 2);
        engine.process(&mut block, None);
        assert!(block.channel(0).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn mid_chain_noise_without_tape_stage() {
        let mut params = clean_tape(NoiseRouting::MidChain);
        params.dirt.bit_depth = 4;
        let mut engine =
            DustboxEngine::with_pipeline(Pipeline::new().with(crate::stage::DirtStage::new()));
        engine.prepare(SR, BLOCK, 2).unwrap();
        engine.set_parameters(&params);
        engine.reset();

        let mut block = dc(0.0, 2);
        engine.process(&mut block, None);

        // Noise reached the quantiser: audible, and on the 4-bit grid
        let step = 2.0 / 15.0;
        assert!(crate::dsp::level::peak(block.channel(0)) > 0.0);
        for &s in block.channel(0) {
            assert!((s - (s / step).round() * step).abs() < 1e-6);
        }

        let mut bare = DustboxEngine::with_pipeline(Pipeline::new());
        bare.prepare(SR, BLOCK, 2).unwrap();
        bare.set_parameters(&params);
        bare.reset();
        let mut block = dc(0.0, 2);
        bare.process(&mut block, None);
        assert_eq!(block.channel(1), expected_noise(&params).channel(1));
    }

    #[test]
    fn meters_track_input_and_output() {
        let mut params = EngineParameters::default();
        params.global.wet_mix = 0.0;
        params.global.output_gain_db = 6.0;
        let mut engine = engine_with(params);
        let meters = engine.meters();

        let mut block = dc(0.6, 2);
        engine.process(&mut block, None);
        assert!((meters.input.peak(0) - 0.6).abs() < 1e-6);
        assert!(!meters.input.clip(0));
        assert!(meters.output.peak(0) > 1.0);
        assert!(meters.output.clip(0));
    }

    #[test]
    fn bypass_engages_after_crossfade() {
        let mut engine = engine_with(EngineParameters::default());
        let mut params = EngineParameters::default();
        params.global.bypass = true;
        engine.set_parameters(&params);

        let mut block = dc(0.3, 2);
        engine.process(&mut block, None);
        assert!(!engine.is_bypass_engaged());

        // 10 ms = 480 samples: done within the second block
        let mut block = dc(0.3, 2);
        engine.process(&mut block, None);
        assert!(engine.is_bypass_engaged());

        let mut block = dc(0.3, 2);
        engine.process(&mut block, None);
        assert!(block.channel(0).iter().all(|&s| s == 0.3));
    }

    #[test]
    fn fallback_clock_runs_while_bypassed() {
        let mut params = EngineParameters::default();
        params.global.bypass = true;
        let mut engine = engine_with(params);
        assert!(engine.is_bypass_engaged());

        let mut block = dc(0.0, 2);
        engine.process(&mut block, None);
        // 256 / 12000 samples per eighth at 120 BPM
        assert!((engine.clock().fallback_phase() - 256.0 / 12_000.0).abs() < 1e-12);
    }

    #[test]
    fn tail_follows_decay() {
        let mut params = EngineParameters::default();
        params.reverb.decay_s = 3.0;
        let engine = engine_with(params);
        assert_eq!(engine.tail_samples(), 144_000);
        assert_eq!(engine.latency_samples(), 0);
    }
}
