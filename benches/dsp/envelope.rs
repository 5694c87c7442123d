//! Benchmarks for the pump gain curve.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use dustbox::dsp::envelope::{pump_gain, pump_min_gain};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let min_gain = pump_min_gain(0.5);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        // One eighth note at 120 BPM, 48 kHz
        let increment = 1.0 / 12_000.0f32;

        group.bench_with_input(BenchmarkId::new("pump_gain", size), &size, |b, _| {
            b.iter(|| {
                let mut phase = 0.0f32;
                for gain in buffer.iter_mut() {
                    *gain = pump_gain(black_box(phase), min_gain);
                    phase += increment;
                    if phase >= 1.0 {
                        phase -= 1.0;
                    }
                }
            })
        });
    }

    group.finish();
}
