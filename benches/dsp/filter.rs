//! Benchmarks for the one-pole tone filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use dustbox::dsp::OnePoleLowpass;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let mut filter = OnePoleLowpass::new();
        filter.set_coefficient(OnePoleLowpass::coefficient_for(11_000.0, 48_000.0, 21_600.0));
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = filter.process(black_box(*sample));
                }
            })
        });

        // Coefficient recompute, as the tape stage does while the tone knob moves
        group.bench_with_input(BenchmarkId::new("coefficient", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for i in 0..size {
                    let cutoff = 2_000.0 + i as f32 * 10.0;
                    sum += OnePoleLowpass::coefficient_for(black_box(cutoff), 48_000.0, 21_600.0);
                }
                sum
            })
        });
    }

    group.finish();
}
