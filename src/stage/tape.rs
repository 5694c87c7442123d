//! Tape transport: wow, flutter and tone roll-off.

/*
Wow and Flutter
===============

A tape machine never pulls the tape at exactly the right speed. Slow
irregularities (a warped reel, a stretched belt) bend the pitch up and down a
few times a second: WOW. Faster ones (capstan wobble, motor cogging) add a
fine shimmer: FLUTTER.

Pitch bends when the delay time changes while we read from it, so both are
modelled as LFOs sweeping the read position of a short delay line:

    delay(n) = base
             + wow_depth     · wow_range     · sin(2π · wow_phase)
             + flutter_depth · flutter_range · sin(2π · flutter_phase)

    base          12 ms    (centre of the sweep)
    wow_range      6 ms    (peak excursion at depth 1)
    flutter_range  1.2 ms
    flutter_rate  7 + 2 · wow_rate  Hz

The line holds base + both ranges + a 4 ms guard, so the read never catches up
with the write cursor. Both LFOs are shared by every channel: one tape, one
transport.

With both depths at zero the stage is a plain 12 ms delay. At 48 kHz that is
exactly 576 samples and the interpolated read returns single taps.


Tone
====

Worn tape and heads lose high end first. A one-pole lowpass per channel rolls
it off:

    y += a · (x - y)        a = 1 - exp(-2π · fc / fs)

The cutoff is smoothed over 50 ms so sweeping it doesn't click. exp() is not
free, so `a` is only recomputed when the smoothed cutoff has moved more than
1 Hz since the last computation (or has just landed on its target). At the top
of the range (0.45 · fs) the filter is switched to a = 1: fully transparent.
*/

use crate::{
    dsp::{lfo::Phasor, DelayLine, OnePoleLowpass, SmoothedValue},
    io::AudioBlock,
    params::{EngineParameters, TapeParameters},
};

use super::{BlockContext, ProcessSpec, Stage, StageKind};

pub const BASE_DELAY_MS: f64 = 12.0;
pub const WOW_RANGE_MS: f64 = 6.0;
pub const FLUTTER_RANGE_MS: f64 = 1.2;
const GUARD_MS: f64 = 4.0;

const TONE_SMOOTHING_SECONDS: f32 = 0.05;
const TONE_RECOMPUTE_THRESHOLD_HZ: f32 = 1.0;
const TONE_MIN_HZ: f32 = 20.0;
/// Fraction of the sample rate where the tone filter opens fully.
const TONE_MAX_RATIO: f32 = 0.45;

/// Flutter rate for a given wow rate.
#[inline]
pub fn flutter_rate_hz(wow_rate_hz: f32) -> f32 {
    7.0 + 2.0 * wow_rate_hz
}

/// Delay capacity (in samples) needed at `sample_rate`.
pub fn delay_capacity(sample_rate: f64) -> usize {
    let span_ms = BASE_DELAY_MS + WOW_RANGE_MS + FLUTTER_RANGE_MS + GUARD_MS;
    (span_ms * sample_rate / 1000.0).ceil() as usize + 2
}

pub struct TapeStage {
    sample_rate: f32,
    lines: Vec<DelayLine>,
    tones: Vec<OnePoleLowpass>,
    /// Per-sample delay times for the current block.
    delays: Vec<f32>,
    /// Per-sample tone coefficients for the current block.
    coefficients: Vec<f32>,

    wow: Phasor,
    flutter: Phasor,
    params: TapeParameters,

    base_delay: f32,
    wow_range: f32,
    flutter_range: f32,
    max_delay: f32,

    cutoff: SmoothedValue,
    max_cutoff: f32,
    coefficient: f32,
    coefficient_cutoff: f32,
}

impl TapeStage {
    pub fn new() -> Self {
        Self {
            sample_rate: 48_000.0,
            lines: Vec::new(),
            tones: Vec::new(),
            delays: Vec::new(),
            coefficients: Vec::new(),
            wow: Phasor::new(),
            flutter: Phasor::new(),
            params: TapeParameters::default(),
            base_delay: 0.0,
            wow_range: 0.0,
            flutter_range: 0.0,
            max_delay: 0.0,
            cutoff: SmoothedValue::new(TapeParameters::default().tone_cutoff_hz),
            max_cutoff: TONE_MAX_RATIO * 48_000.0,
            coefficient: 1.0,
            coefficient_cutoff: -1.0,
        }
    }

    pub fn set_parameters(&mut self, params: &TapeParameters) {
        self.params = params.clamped();

        self.wow.set_frequency(self.params.wow_rate_hz, self.sample_rate);
        self.flutter
            .set_frequency(flutter_rate_hz(self.params.wow_rate_hz), self.sample_rate);

        self.cutoff.set_target(self.clamp_cutoff(self.params.tone_cutoff_hz));
    }

    pub fn parameters(&self) -> &TapeParameters {
        &self.params
    }

    /// Base delay in samples at the prepared rate.
    pub fn base_delay_samples(&self) -> f32 {
        self.base_delay
    }

    fn clamp_cutoff(&self, cutoff_hz: f32) -> f32 {
        cutoff_hz.clamp(TONE_MIN_HZ, self.max_cutoff)
    }

    fn refresh_coefficient(&mut self, cutoff: f32) {
        let moved = (cutoff - self.coefficient_cutoff).abs() > TONE_RECOMPUTE_THRESHOLD_HZ;
        let landed = !self.cutoff.is_smoothing() && cutoff != self.coefficient_cutoff;

        if moved || landed {
            self.coefficient =
                OnePoleLowpass::coefficient_for(cutoff, self.sample_rate, self.max_cutoff);
            self.coefficient_cutoff = cutoff;
        }
    }
}

impl Default for TapeStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for TapeStage {
    fn kind(&self) -> StageKind {
        StageKind::Tape
    }

    fn prepare(&mut self, spec: &ProcessSpec) {
        let sample_rate = spec.sample_rate;
        self.sample_rate = sample_rate as f32;

        let capacity = delay_capacity(sample_rate);
        self.lines = (0..spec.num_channels)
            .map(|_| DelayLine::with_capacity(capacity))
            .collect();
        self.tones = vec![OnePoleLowpass::new(); spec.num_channels];
        self.delays = vec![0.0; spec.max_block_size];
        self.coefficients = vec![1.0; spec.max_block_size];

        self.base_delay = (BASE_DELAY_MS * sample_rate / 1000.0) as f32;
        self.wow_range = (WOW_RANGE_MS * sample_rate / 1000.0) as f32;
        self.flutter_range = (FLUTTER_RANGE_MS * sample_rate / 1000.0) as f32;
        self.max_delay = capacity.saturating_sub(2) as f32;

        self.max_cutoff = TONE_MAX_RATIO * self.sample_rate;
        self.cutoff.reset(self.sample_rate, TONE_SMOOTHING_SECONDS);

        let params = self.params;
        self.set_parameters(&params);
        self.reset();
    }

    fn reset(&mut self) {
        for line in &mut self.lines {
            line.reset();
        }
        for tone in &mut self.tones {
            tone.reset();
        }
        self.wow.reset();
        self.flutter.reset();

        let target = self.cutoff.target();
        self.cutoff.snap(target);
        self.coefficient_cutoff = -1.0;
        self.refresh_coefficient(target);
    }

    fn update(&mut self, params: &EngineParameters, _ctx: &BlockContext) {
        self.set_parameters(&params.tape);
    }

    fn process(&mut self, block: &mut AudioBlock) {
        debug_assert!(block.len() <= self.delays.len(), "block exceeds prepared size");

        let len = block.len().min(self.delays.len());
        let wow_amount = self.params.wow_depth * self.wow_range;
        let flutter_amount = self.params.flutter_depth * self.flutter_range;

        // Modulation and tone are shared across channels; compute them once.
        for i in 0..len {
            let delay =
                self.base_delay + wow_amount * self.wow.sine() + flutter_amount * self.flutter.sine();
            self.delays[i] = delay.clamp(1.0, self.max_delay);
            self.wow.advance();
            self.flutter.advance();

            let cutoff = self.cutoff.next();
            self.refresh_coefficient(cutoff);
            self.coefficients[i] = self.coefficient;
        }

        for (channel, (line, tone)) in block
            .channels_mut()
            .zip(self.lines.iter_mut().zip(self.tones.iter_mut()))
        {
            for ((sample, &delay), &coefficient) in channel[..len]
                .iter_mut()
                .zip(&self.delays)
                .zip(&self.coefficients)
            {
                let delayed = line.next_sample(*sample, delay);
                tone.set_coefficient(coefficient);
                *sample = tone.process(delayed);
            }
        }
    }
}
