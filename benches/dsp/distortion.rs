//! Benchmarks for the Dirt primitives.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use dustbox::dsp::distortion::{saturate, saturation_drive, Quantizer, SampleAndHold};

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        let drive = saturation_drive(0.6);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("saturate", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = saturate(*sample, black_box(drive));
                }
            })
        });

        let quantizer = Quantizer::new(8);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("quantize_8bit", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = quantizer.process(black_box(*sample));
                }
            })
        });

        let mut hold = SampleAndHold::new();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("hold_div4", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = hold.process(*sample, black_box(4));
                }
            })
        });
    }

    group.finish();
}
