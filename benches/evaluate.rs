//! Throughput of the CPU reference evaluation.
//!
//! The GPU does this work in production; the bench keeps an eye on the
//! reference so property tests over large instance counts stay cheap.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use swale::grass::reference::{evaluate_vertex, BladePlacement};
use swale::grass::{FieldNoise, GrassConfig};

fn bench_placement(c: &mut Criterion) {
    c.bench_function("placement_16k", |b| {
        b.iter(|| {
            for i in 0..16_000u32 {
                black_box(BladePlacement::from_index(black_box(i), 0.75));
            }
        })
    });
}

fn bench_evaluate_vertex(c: &mut Criterion) {
    let config = GrassConfig::default();
    let field = FieldNoise::bake(1481, 256);
    let vertex_count = (config.segments + 1) * 4;

    c.bench_function("evaluate_blade_16k", |b| {
        b.iter(|| {
            for i in 0..16_000u32 {
                for vid in 0..vertex_count {
                    black_box(evaluate_vertex(
                        vid,
                        black_box(i),
                        &config,
                        Some(&field),
                        1.5,
                    ));
                }
            }
        })
    });
}

criterion_group!(benches, bench_placement, bench_evaluate_vertex);
criterion_main!(benches);
