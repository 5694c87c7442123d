//! Benchmarks for the full effect chain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use dustbox::{AudioBlock, DustboxEngine, EngineParameters, NoiseRouting, TransportInfo};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f64 = 48_000.0;
const CHANNELS: usize = 2;

fn prepared_engine(params: &EngineParameters, block_size: usize) -> DustboxEngine {
    let mut engine = DustboxEngine::new();
    engine
        .prepare(SAMPLE_RATE, block_size, CHANNELS)
        .expect("valid bench configuration");
    engine.set_parameters(params);
    engine.reset();
    engine
}

fn fill(block: &mut AudioBlock, offset: usize) {
    for (ch, channel) in block.channels_mut().enumerate() {
        for (i, sample) in channel.iter_mut().enumerate() {
            let t = (offset + i) as f32 + ch as f32 * 7.0;
            *sample = (t * 0.03).sin() * 0.5;
        }
    }
}

pub fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chain");

    let defaults = EngineParameters::default();

    let mut heavy = EngineParameters::default();
    heavy.tape.wow_depth = 0.6;
    heavy.tape.flutter_depth = 0.4;
    heavy.tape.tone_cutoff_hz = 6_000.0;
    heavy.dirt.saturation = 0.8;
    heavy.dirt.bit_depth = 8;
    heavy.dirt.rate_divider = 4;
    heavy.pump.amount = 0.7;
    heavy.reverb.mix = 0.4;
    heavy.reverb.decay_s = 4.0;
    heavy.noise.routing = NoiseRouting::Parallel;
    heavy.noise.level_db = -30.0;
    heavy.global.wet_mix = 1.0;

    let mut bypassed = EngineParameters::default();
    bypassed.global.bypass = true;

    let scenarios = [
        ("defaults", defaults),
        ("heavy", heavy),
        ("bypassed", bypassed),
    ];

    for &size in BLOCK_SIZES {
        for (name, params) in &scenarios {
            let mut engine = prepared_engine(params, size);
            let mut block = AudioBlock::new(CHANNELS, size);
            let mut ppq = 0.0;
            let beats_per_block = size as f64 * 120.0 / (60.0 * SAMPLE_RATE);

            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| {
                    fill(&mut block, 0);
                    engine.set_parameters(black_box(params));
                    let transport = TransportInfo::playing(120.0, ppq);
                    engine.process(black_box(&mut block), Some(&transport));
                    ppq += beats_per_block;
                })
            });
        }

        // Parameters changing every block keeps every smoother busy
        let mut engine = prepared_engine(&defaults, size);
        let mut block = AudioBlock::new(CHANNELS, size);
        let mut params = defaults;
        let mut counter = 0usize;
        group.bench_with_input(BenchmarkId::new("automated", size), &size, |b, _| {
            b.iter(|| {
                counter = counter.wrapping_add(1);
                params.global.wet_mix = (counter % 100) as f32 / 100.0;
                params.tape.tone_cutoff_hz = 2_000.0 + (counter % 50) as f32 * 300.0;
                params.global.output_gain_db = -((counter % 12) as f32);
                fill(&mut block, counter);
                engine.set_parameters(&params);
                engine.process(black_box(&mut block), None);
            })
        });
    }

    group.finish();
}
