//! Benchmarks for the comb/allpass reverb core.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use dustbox::{dsp::reverb::SchroederReverb, stage::reverb::room_size_for_decay};

use crate::BLOCK_SIZES;

pub fn bench_reverb(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/reverb");

    let sample_rate = 48_000.0;

    // (label, decay seconds, damping)
    let rooms: &[(&str, f32, f32)] = &[
        ("short_bright", 0.4, 0.1),
        ("default", 1.8, 0.35),
        ("long_dark", 7.5, 0.9),
    ];

    for &size in BLOCK_SIZES {
        // Short click followed by a quiet sine so the tail never empties
        let input: Vec<f32> = (0..size)
            .map(|i| if i < 8 { 0.9 } else { (i as f32 * 0.03).sin() * 0.05 })
            .collect();

        for &(label, decay_s, damping) in rooms {
            let mut core = SchroederReverb::new(sample_rate);
            core.set_room_size(room_size_for_decay(decay_s));
            core.set_damping(damping);
            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter(|| {
                    let mut acc = 0.0f32;
                    for &sample in &input {
                        acc += core.process(black_box(sample));
                    }
                    acc
                })
            });
        }

        // Two channels, the second with its spread delay lengths
        let mut left = SchroederReverb::new(sample_rate);
        let mut right = SchroederReverb::new(sample_rate);
        left.prepare(sample_rate, 0);
        right.prepare(sample_rate, 1);
        group.bench_with_input(BenchmarkId::new("stereo_pair", size), &size, |b, _| {
            b.iter(|| {
                let mut acc = 0.0f32;
                for &sample in &input {
                    acc += left.process(black_box(sample)) - right.process(black_box(sample));
                }
                acc
            })
        });
    }

    group.finish();
}
