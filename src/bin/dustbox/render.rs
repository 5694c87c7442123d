//! Offline rendering: WAV in, WAV out.

use color_eyre::eyre::{bail, Result as EyreResult, WrapErr};
use dustbox::{
    dsp::level::gain_to_db, AudioBlock, DustboxEngine, LevelMeters, TransportInfo, MAX_CHANNELS,
};
use log::info;
use std::path::Path;

use crate::{cli::RenderArgs, presets};

/// Frames handed to the engine per call, like a typical host buffer.
pub const RENDER_BLOCK_SIZE: usize = 512;

const SUMMARY_FLOOR_DB: f32 = -120.0;

/// Interleaved audio read from disk.
pub struct WavAudio {
    pub samples: Vec<f32>,
    pub channels: usize,
    pub sample_rate: u32,
}

impl WavAudio {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }
}

pub fn read_wav(path: &Path) -> EyreResult<WavAudio> {
    let mut reader = hound::WavReader::open(path)
        .wrap_err_with(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|x| x as f32 / max))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(WavAudio {
        samples,
        channels: spec.channels as usize,
        sample_rate: spec.sample_rate,
    })
}

pub fn write_wav(path: &Path, audio: &WavAudio) -> EyreResult<()> {
    let spec = hound::WavSpec {
        channels: audio.channels as u16,
        sample_rate: audio.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .wrap_err_with(|| format!("failed to create {}", path.display()))?;
    for &sample in &audio.samples {
        writer.write_sample(sample)?;
    }
    writer.finalize().wrap_err("failed to finalize WAV file")?;
    Ok(())
}

/// Loudest output seen per channel over a whole render.
#[derive(Debug, Default)]
pub struct RenderSummary {
    pub blocks: usize,
    pub peaks: Vec<f32>,
    pub clipped_blocks: Vec<usize>,
}

impl RenderSummary {
    fn new(channels: usize) -> Self {
        Self {
            blocks: 0,
            peaks: vec![0.0; channels],
            clipped_blocks: vec![0; channels],
        }
    }

    fn observe(&mut self, meters: &LevelMeters) {
        self.blocks += 1;
        for (ch, (peak, clips)) in self
            .peaks
            .iter_mut()
            .zip(self.clipped_blocks.iter_mut())
            .enumerate()
        {
            let reading = meters.output.reading(ch);
            *peak = peak.max(reading.peak);
            if reading.clip {
                *clips += 1;
            }
        }
    }
}

/// Run `audio` through `engine` in host-sized blocks, followed by enough
/// silence to let the tail ring out. `bpm` drives a simulated playing
/// transport starting at beat zero.
pub fn render(
    engine: &mut DustboxEngine,
    audio: &WavAudio,
    bpm: Option<f64>,
) -> (WavAudio, RenderSummary) {
    let channels = audio.channels.max(1);
    let sample_rate = audio.sample_rate as f64;
    let meters = engine.meters();

    let mut buffer = audio.samples.clone();
    buffer.resize((audio.frames() + engine.tail_samples()) * channels, 0.0);

    let mut block = AudioBlock::new(channels, RENDER_BLOCK_SIZE);
    let mut summary = RenderSummary::new(channels);
    let mut ppq = 0.0;

    for chunk in buffer.chunks_mut(RENDER_BLOCK_SIZE * channels) {
        block.read_interleaved(chunk, channels);
        let transport = bpm.map(|bpm| TransportInfo::playing(bpm, ppq));
        engine.process(&mut block, transport.as_ref());
        block.write_interleaved(chunk, channels);
        summary.observe(&meters);

        if let Some(bpm) = bpm {
            ppq += block.len() as f64 * bpm / (60.0 * sample_rate);
        }
    }

    let output = WavAudio {
        samples: buffer,
        channels,
        sample_rate: audio.sample_rate,
    };
    (output, summary)
}

pub fn run(args: &RenderArgs) -> EyreResult<()> {
    let params = presets::resolve(&args.preset.source())?;
    let input = read_wav(&args.input)?;

    if input.channels == 0 || input.channels > MAX_CHANNELS {
        bail!(
            "{} has {} channels, dustbox handles 1 to {}",
            args.input.display(),
            input.channels,
            MAX_CHANNELS
        );
    }

    info!(
        "read {}: {} Hz, {} channels, {} frames",
        args.input.display(),
        input.sample_rate,
        input.channels,
        input.frames()
    );

    let mut engine = DustboxEngine::new();
    engine
        .prepare(input.sample_rate as f64, RENDER_BLOCK_SIZE, input.channels)
        .wrap_err("failed to prepare engine")?;
    engine.set_parameters(&params);
    engine.reset();

    let (output, summary) = render(&mut engine, &input, args.bpm);
    write_wav(&args.output, &output)?;

    info!(
        "wrote {}: {} frames in {} blocks",
        args.output.display(),
        output.frames(),
        summary.blocks
    );
    for (ch, (&peak, &clips)) in summary
        .peaks
        .iter()
        .zip(&summary.clipped_blocks)
        .enumerate()
    {
        info!(
            "  channel {ch}: peak {:.1} dBFS, {clips} clipped blocks",
            gain_to_db(peak, SUMMARY_FLOOR_DB)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dustbox::EngineParameters;

    fn prepared(params: &EngineParameters, channels: usize) -> DustboxEngine {
        let mut engine = DustboxEngine::new();
        engine.prepare(48_000.0, RENDER_BLOCK_SIZE, channels).unwrap();
        engine.set_parameters(params);
        engine.reset();
        engine
    }

    #[test]
    fn render_appends_tail_and_counts_blocks() {
        let mut params = EngineParameters::default();
        params.reverb.decay_s = 0.1;
        let mut engine = prepared(&params, 2);

        let input = WavAudio {
            samples: vec![0.1; 1000 * 2],
            channels: 2,
            sample_rate: 48_000,
        };
        let (output, summary) = render(&mut engine, &input, Some(120.0));

        // 0.1 s of tail at 48 kHz
        assert_eq!(output.frames(), 1000 + 4800);
        assert_eq!(summary.blocks, (5800 + RENDER_BLOCK_SIZE - 1) / RENDER_BLOCK_SIZE);
        assert_eq!(summary.peaks.len(), 2);
        assert!(summary.peaks[0] > 0.0);
    }

    #[test]
    fn dry_render_is_passthrough() {
        let mut params = EngineParameters::default();
        params.global.wet_mix = 0.0;
        let mut engine = prepared(&params, 1);

        let samples: Vec<f32> = (0..700).map(|i| (i as f32 * 0.01).sin() * 0.5).collect();
        let input = WavAudio {
            samples: samples.clone(),
            channels: 1,
            sample_rate: 48_000,
        };
        let (output, summary) = render(&mut engine, &input, None);

        assert_eq!(&output.samples[..700], &samples[..]);
        assert!(output.samples[700..].iter().all(|&s| s == 0.0));
        assert!(summary.clipped_blocks.iter().all(|&c| c == 0));
    }
}
