//! Benchmarks for motif counting strategies.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use graphfeat_core::graph::Graph;
use graphfeat_core::motif::{CpuStrategy, MotifLevel, MotifStrategy};
#[cfg(feature = "accelerator")]
use graphfeat_core::motif::{AcceleratedStrategy, AcceleratorConfig, MotifOptions};

/// Ring lattice where every vertex links forward to its next `reach` vertices.
fn ring_lattice(n: usize, reach: usize) -> Graph {
    let mut edges = Vec::with_capacity(n * reach);
    for v in 0..n {
        for step in 1..=reach {
            edges.push((v as u32, ((v + step) % n) as u32));
        }
    }
    Graph::from_edges(n, &edges).unwrap()
}

fn bench_catalog(c: &mut Criterion) {
    c.bench_function("catalog_classify_4", |b| {
        let cat = graphfeat_core::motif::catalog(MotifLevel::Four);
        b.iter(|| {
            let mut hits = 0usize;
            for code in 0..4096u32 {
                hits += cat.classify(black_box(code)).is_some() as usize;
            }
            black_box(hits)
        });
    });
}

fn bench_cpu(c: &mut Criterion) {
    let mut group = c.benchmark_group("motif_cpu");
    for n in [500usize, 2000] {
        let graph = ring_lattice(n, 3);
        group.bench_with_input(BenchmarkId::new("level4", n), &graph, |b, g| {
            b.iter(|| black_box(CpuStrategy::default().count(g, MotifLevel::Four).unwrap()));
        });
    }
    group.finish();
}

#[cfg(feature = "accelerator")]
fn bench_accelerated(c: &mut Criterion) {
    let mut group = c.benchmark_group("motif_accelerated");
    let options = MotifOptions {
        accelerator: AcceleratorConfig::host(),
        ..MotifOptions::default()
    };
    let strategy = AcceleratedStrategy::probe(&options).unwrap();
    for n in [500usize, 2000] {
        let graph = ring_lattice(n, 3);
        group.bench_with_input(BenchmarkId::new("level4", n), &graph, |b, g| {
            b.iter(|| black_box(strategy.count(g, MotifLevel::Four).unwrap()));
        });
    }
    group.finish();
}

#[cfg(not(feature = "accelerator"))]
fn bench_accelerated(_c: &mut Criterion) {}

criterion_group!(benches, bench_catalog, bench_cpu, bench_accelerated);
criterion_main!(benches);
