//! Benchmarks for each stage on its own.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use dustbox::{
    engine::TempoClock,
    stage::{DirtStage, ProcessSpec, PumpStage, ReverbStage, Stage, TapeStage},
    AudioBlock, EngineParameters,
};

use crate::BLOCK_SIZES;

fn prepared(mut stage: Box<dyn Stage>, params: &EngineParameters, size: usize) -> Box<dyn Stage> {
    let spec = ProcessSpec::new(48_000.0, size, 2);
    let mut clock = TempoClock::new();
    clock.prepare(spec.sample_rate);
    let ctx = clock.advance(None, params.pump.division, 0);

    stage.prepare(&spec);
    stage.update(params, &ctx);
    stage.reset();
    stage
}

pub fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/stages");

    let mut params = EngineParameters::default();
    params.reverb.mix = 0.5;

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();

        let stages: [(&str, Box<dyn Stage>); 4] = [
            ("tape", Box::new(TapeStage::new())),
            ("dirt", Box::new(DirtStage::new())),
            ("pump", Box::new(PumpStage::new())),
            ("reverb", Box::new(ReverbStage::new())),
        ];

        for (name, stage) in stages {
            let mut stage = prepared(stage, &params, size);
            let mut block = AudioBlock::new(2, size);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for channel in block.channels_mut() {
                        channel.copy_from_slice(&input);
                    }
                    stage.process(black_box(&mut block));
                })
            });
        }
    }

    group.finish();
}
