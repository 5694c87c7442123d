//! Benchmarks for dry/wet blending.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use dustbox::dsp::{mix, NoiseGenerator};

use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for &size in BLOCK_SIZES {
        let dry: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let wet: Vec<f32> = (0..size).map(|i| (i as f32 * 0.15).cos()).collect();
        let mut output = vec![0.0f32; size];

        // Per-sample gains, as the engine computes them while the mix ramps
        group.bench_with_input(BenchmarkId::new("equal_power", size), &size, |b, _| {
            b.iter(|| {
                for (i, out) in output.iter_mut().enumerate() {
                    let gains = mix::equal_power_gains(black_box(i as f32 / size as f32));
                    *out = dry[i] * gains.dry + wet[i] * gains.wet;
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("linear_blend", size), &size, |b, _| {
            b.iter(|| {
                for (i, out) in output.iter_mut().enumerate() {
                    *out = mix::blend_dry_wet(dry[i], wet[i], black_box(0.3));
                }
            })
        });

        let mut noise = NoiseGenerator::new(0xC0FFEE);
        let mut hiss = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("add_noise", size), &size, |b, _| {
            b.iter(|| {
                output.copy_from_slice(&dry);
                for sample in hiss.iter_mut() {
                    *sample = noise.next_sample() * 0.004;
                }
                mix::sum_in_place(black_box(&mut output), &hiss);
            })
        });
    }

    group.finish();
}
