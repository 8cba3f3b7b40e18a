//! Benchmarks for linear gain ramps.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonewalk::dsp::GainRamp;

use crate::BLOCK_SIZES;

pub fn bench_ramp(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/ramp");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Restarted every block so it never settles
        let mut ramp = GainRamp::new(0.0);
        group.bench_with_input(BenchmarkId::new("ramping", size), &size, |b, _| {
            b.iter(|| {
                ramp.ramp_to(black_box(0.15), 0.125, 48_000.0);
                for out in buffer.iter_mut() {
                    *out = ramp.next_sample();
                }
                black_box(&buffer);
            })
        });

        // Settled ramp: the common case for a held voice
        let mut held = GainRamp::new(0.15);
        group.bench_with_input(BenchmarkId::new("held", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = held.next_sample();
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
