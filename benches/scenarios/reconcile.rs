//! Benchmarks for snapshot reconciliation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonewalk::{
    config::PresenceConfig,
    dsp::Waveform,
    io::testing::RecordingBackend,
    protocol::{SessionPresence, ToneDescriptor, WorldSnapshot},
    synth::Reconciler,
};

const SESSIONS: usize = 8;

/// `SESSIONS` participants each playing `tones` tones, offset by `shift`.
fn snapshot(tones: usize, shift: usize) -> WorldSnapshot {
    let mut snapshot = WorldSnapshot {
        current_session_id: "s0".into(),
        ..Default::default()
    };
    for s in 0..SESSIONS {
        let session = format!("s{s}");
        let mut presence = SessionPresence {
            session_id: session.as_str().into(),
            user: session.clone(),
            ..Default::default()
        };
        for t in 0..tones {
            let id = format!("t{}", t + shift);
            let tone = ToneDescriptor {
                id: id.as_str().into(),
                parent: None,
                frequency: 220.0 + t as f32,
                wave: Waveform::ALL[t % Waveform::ALL.len()],
                x: t as f32 * 50.0,
                y: 0.0,
            };
            presence.distances.insert(id.as_str().into(), t as f32 * 50.0);
            presence.oscillators.insert(id.as_str().into(), tone);
        }
        snapshot.users.insert(session.as_str().into(), presence);
    }
    snapshot
}

pub fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/reconcile");
    let presence = PresenceConfig {
        multiplayer: true,
        proximity: true,
    };

    for &tones in &[1usize, 4, 16] {
        let voices = tones * SESSIONS;

        // Steady state: the same snapshot every beat, nothing to do
        let steady = snapshot(tones, 0);
        let mut backend = RecordingBackend::new();
        let mut reconciler = Reconciler::new();
        reconciler.reconcile(&steady, presence, &mut backend);
        group.bench_with_input(BenchmarkId::new("steady", voices), &voices, |b, _| {
            b.iter(|| {
                black_box(reconciler.reconcile(black_box(&steady), presence, &mut backend));
            })
        });

        // Churn: every beat each session moves on by one tone
        let snapshots = [snapshot(tones, 0), snapshot(tones, 1)];
        let mut backend = RecordingBackend::new();
        let mut reconciler = Reconciler::new();
        let mut beat = 0usize;
        group.bench_with_input(BenchmarkId::new("churn", voices), &voices, |b, _| {
            b.iter(|| {
                beat += 1;
                let report = reconciler.reconcile(&snapshots[beat % 2], presence, &mut backend);
                backend.calls.clear();
                black_box(report);
            })
        });
    }

    group.finish();
}
