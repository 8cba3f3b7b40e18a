//! Benchmarks for the software mixer under voice load.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonewalk::{
    dsp::Waveform,
    engine::mixer,
    io::AudioBackend,
};

use crate::BLOCK_SIZES;

const VOICE_COUNTS: &[usize] = &[1, 8, 32, 128];

pub fn bench_mixer(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mixer");

    for &voices in VOICE_COUNTS {
        for &size in BLOCK_SIZES {
            let (mut handle, mut mixer) = mixer(48_000.0, voices, voices * 2);
            for i in 0..voices {
                let waveform = Waveform::ALL[i % Waveform::ALL.len()];
                if let Ok(voice) = handle.create_tone(110.0 + i as f32 * 10.0, waveform) {
                    let _ = handle.ramp_gain(voice, 0.1, 0.0);
                }
            }

            let mut buffer = vec![0.0f32; size];
            // Drain the creation commands outside the measurement
            mixer.render_block(&mut buffer);

            group.bench_with_input(
                BenchmarkId::new(format!("{voices}_voices"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        mixer.render_block(black_box(&mut buffer));
                    })
                },
            );
        }
    }

    group.finish();
}
