//! Live playback: an internal test signal through the engine to the default
//! output device, with the TUI in the foreground.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use dustbox::{
    dsp::{lfo::Phasor, SmoothedValue},
    engine::ScopeTap,
    AudioBlock, DustboxEngine, SharedParameters, TransportInfo, MAX_CHANNELS,
};
use log::{error, info};
use std::sync::Arc;

use crate::{
    cli::{LiveArgs, PresetSource},
    presets,
    ui::{LiveUi, SessionInfo},
};

/// Largest block handed to the engine from the device callback
const LIVE_BLOCK_SIZE: usize = 512;
/// Capacity in samples for the audio→UI scope ring
const SCOPE_CAPACITY: usize = 16_384;
/// Tempo of the simulated host transport
const LIVE_BPM: f64 = 120.0;

/// A major triad, gated on the beat so the pump and tail have something to do.
pub struct TestSignal {
    voices: [Phasor; 3],
    gate: SmoothedValue,
}

const CHORD_HZ: [f32; 3] = [220.0, 277.18, 329.63];
const VOICE_LEVEL: f32 = 0.15;
/// Portion of each beat the chord sounds for
const GATE_LENGTH_BEATS: f64 = 0.6;
const GATE_RAMP_SECONDS: f32 = 0.005;

impl TestSignal {
    pub fn new(sample_rate: f32) -> Self {
        let mut voices = [Phasor::new(); 3];
        for (voice, &hz) in voices.iter_mut().zip(&CHORD_HZ) {
            voice.set_frequency(hz, sample_rate);
        }
        let mut gate = SmoothedValue::new(0.0);
        gate.reset(sample_rate, GATE_RAMP_SECONDS);
        Self { voices, gate }
    }

    /// Fill every channel of `block` with the same signal. `ppq` is the beat
    /// position of the first sample.
    pub fn fill(&mut self, block: &mut AudioBlock, ppq: f64, beats_per_sample: f64) {
        let len = block.len();
        for i in 0..len {
            let beat = ppq + i as f64 * beats_per_sample;
            let open = beat.fract() < GATE_LENGTH_BEATS;
            self.gate.set_target(if open { 1.0 } else { 0.0 });

            let mut sample = 0.0;
            for voice in &mut self.voices {
                sample += voice.sine() * VOICE_LEVEL;
                voice.advance();
            }
            sample *= self.gate.next();

            for channel in block.channels_mut() {
                channel[i] = sample;
            }
        }
    }
}

fn preset_label(source: &PresetSource) -> String {
    match source {
        PresetSource::Default => String::from("Default"),
        PresetSource::Factory(name) => presets::find(name)
            .map(|p| p.name.to_string())
            .unwrap_or_else(|| name.clone()),
        PresetSource::File(path) => path.display().to_string(),
    }
}

pub fn run(args: &LiveArgs) -> EyreResult<()> {
    let source = args.preset.source();
    let params = presets::resolve(&source)?;
    let shared = Arc::new(SharedParameters::new(&params));

    // --- Set up CPAL ---

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;
    if config.sample_format() != cpal::SampleFormat::F32 {
        return Err(eyre!(
            "output device uses {:?}, live mode needs f32",
            config.sample_format()
        ));
    }
    let sample_rate = config.sample_rate().0 as f64;
    let device_channels = config.channels() as usize;
    let engine_channels = device_channels.min(MAX_CHANNELS);

    let mut engine = DustboxEngine::new();
    engine
        .prepare(sample_rate, LIVE_BLOCK_SIZE, engine_channels)
        .wrap_err("failed to prepare engine")?;
    engine.set_parameters(&params);
    engine.reset();

    let meters = engine.meters();
    let (scope_tap, scope_reader) = ScopeTap::new(SCOPE_CAPACITY);

    info!(
        "live: {} Hz, {} device channels, preset {}",
        sample_rate,
        device_channels,
        preset_label(&source)
    );

    let stream = device
        .build_output_stream(
            &config.into(),
            {
                let shared = Arc::clone(&shared);
                let mut engine = engine;
                let mut scope_tap = scope_tap;
                let mut signal = TestSignal::new(sample_rate as f32);
                let mut block = AudioBlock::new(engine_channels, LIVE_BLOCK_SIZE);
                let beats_per_sample = LIVE_BPM / (60.0 * sample_rate);
                let mut ppq = 0.0;

                move |data: &mut [f32], _| {
                    for chunk in data.chunks_mut(LIVE_BLOCK_SIZE * device_channels) {
                        block.set_len(chunk.len() / device_channels);

                        signal.fill(&mut block, ppq, beats_per_sample);
                        engine.set_parameters(&shared.snapshot());
                        let transport = TransportInfo::playing(LIVE_BPM, ppq);
                        engine.process(&mut block, Some(&transport));

                        scope_tap.push_block(&block);
                        block.write_interleaved(chunk, device_channels);

                        ppq += block.len() as f64 * beats_per_sample;
                    }
                }
            },
            move |err| error!("stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;

    let info = SessionInfo {
        preset: preset_label(&source),
        sample_rate: sample_rate as f32,
        channels: device_channels,
        bpm: LIVE_BPM,
    };
    let mut ui = LiveUi::new(info, shared, meters, scope_reader);

    let mut terminal = ratatui::init();
    let result = ui.run(&mut terminal);
    ratatui::restore();

    drop(stream);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_follows_the_beat() {
        let sample_rate = 48_000.0;
        let mut signal = TestSignal::new(sample_rate);
        // One beat per 1000 samples
        let beats_per_sample = 0.001;

        let mut block = AudioBlock::new(2, 1000);
        signal.fill(&mut block, 0.0, beats_per_sample);

        let peak_open = dustbox::dsp::level::peak(&block.channel(0)[..600]);
        // Gate closes at 600 and takes 240 samples to ramp down
        let peak_closed = dustbox::dsp::level::peak(&block.channel(0)[850..]);
        assert!(peak_open > 0.1);
        assert_eq!(peak_closed, 0.0);
        assert_eq!(block.channel(0), block.channel(1));
    }

    #[test]
    fn preset_label_prefers_factory_name() {
        assert_eq!(
            preset_label(&PresetSource::Factory("warm crunch".into())),
            "Warm Crunch"
        );
        assert_eq!(preset_label(&PresetSource::Default), "Default");
    }
}
