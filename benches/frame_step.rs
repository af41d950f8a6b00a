//! Benchmarks for the CPU side of a frame.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tumblebox::geometry::rounded_box;
use tumblebox::prelude::*;

fn state(box_count: usize) -> AppState {
    let params = SimulationParams { box_count, ..Default::default() };
    AppState::with_seed(params, ContainerSize::new(1280, 720), 1.0, 1).expect("valid params")
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for count in [10, 100, 500] {
        group.bench_with_input(BenchmarkId::new("boxes", count), &count, |b, &count| {
            let mut state = state(count);
            // Let the startup throw settle into steady tumbling.
            for _ in 0..120 {
                state.step();
            }
            b.iter(|| {
                state.step();
                black_box(state.scene().cubes.version())
            })
        });
    }

    group.finish();
}

fn bench_startup(c: &mut Criterion) {
    c.bench_function("startup_100_boxes", |b| b.iter(|| black_box(state(100))));

    c.bench_function("rounded_box_mesh", |b| {
        b.iter(|| black_box(rounded_box(0.03, 0.03, 0.03, 2, 0.006)))
    });
}

criterion_group!(benches, bench_step, bench_startup);
criterion_main!(benches);
