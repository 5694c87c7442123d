//! Benchmarks for the fractional delay line.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use dustbox::dsp::DelayLine;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    // Delay times in samples at 48 kHz
    let delay_times: &[f32] = &[
        576.0,  // tape base delay (12 ms)
        960.0,  // base + full wow
        5760.0, // longest pre-delay (120 ms)
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &delay_samples in delay_times {
            let mut delay = DelayLine::with_capacity(6_000);
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("render_{}", delay_samples as u32), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        delay.render(black_box(&mut buffer), black_box(delay_samples));
                    })
                },
            );
        }

        // Wow-style modulated read, one write per read
        let mut delay = DelayLine::with_capacity(1_116);
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for (i, &sample) in input.iter().enumerate() {
                    let delay_time = 576.0 + (i as f32 * 0.01).sin() * 288.0;
                    sum += delay.next_sample(sample, black_box(delay_time));
                }
                sum
            })
        });
    }

    group.finish();
}
