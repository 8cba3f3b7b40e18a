//! Benchmarks for one beat of graph walking plus the snapshot that follows.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tonewalk::{
    dsp::Waveform,
    host::{build_snapshot, Canvas, Session},
    ids::NodeId,
    protocol::Vector,
    sequencing::GraphWalker,
};

/// A ring of `nodes` tones, every node also fanning out to its neighbour
/// two ahead, with every node selected.
fn ring(nodes: usize) -> Canvas {
    let mut canvas = Canvas::new();
    let ids: Vec<NodeId> = (0..nodes)
        .map(|i| {
            canvas.add_tone(
                format!("n{i}"),
                220.0 + i as f32,
                Waveform::Sine,
                Vector::new(i as f32 * 40.0, 0.0),
            )
        })
        .collect();
    for i in 0..nodes {
        let next = ids[(i + 1) % nodes].clone();
        let skip = ids[(i + 2) % nodes].clone();
        canvas.connect(format!("e{i}a"), ids[i].clone(), next, 1 + (i % 4) as u32);
        canvas.connect(format!("e{i}b"), ids[i].clone(), skip, 2);
    }
    let mut me = Session::new("me", "Me");
    me.selection = ids;
    canvas.join(me);
    canvas
}

pub fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/walk");

    for &nodes in &[16usize, 64, 256] {
        let mut canvas = ring(nodes);
        let mut walker = GraphWalker::new();
        group.bench_with_input(BenchmarkId::new("tick", nodes), &nodes, |b, _| {
            b.iter(|| {
                black_box(walker.tick(&mut canvas));
            })
        });

        let canvas = ring(nodes);
        group.bench_with_input(BenchmarkId::new("snapshot", nodes), &nodes, |b, _| {
            b.iter(|| {
                black_box(build_snapshot(black_box(&canvas)));
            })
        });
    }

    group.finish();
}
