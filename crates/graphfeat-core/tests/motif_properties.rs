//! Property checks for motif counting against brute force.

use graphfeat_core::graph::Graph;
use graphfeat_core::motif::catalog::{catalog, is_connected};
use graphfeat_core::motif::{
    AcceleratorBackend, AcceleratorConfig, AcceleratorFallback, MotifCounts, MotifLevel,
    MotifOptions, count_motifs,
};
use graphfeat_common::VertexId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_graph(seed: u64, n: usize, p: f64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    for u in 0..n as VertexId {
        for v in 0..n as VertexId {
            if rng.gen_bool(p) {
                edges.push((u, v));
            }
        }
    }
    Graph::from_edges(n, &edges).unwrap()
}

fn subsets(n: usize, k: usize) -> Vec<Vec<VertexId>> {
    fn rec(start: usize, n: usize, k: usize, cur: &mut Vec<VertexId>, out: &mut Vec<Vec<VertexId>>) {
        if cur.len() == k {
            out.push(cur.clone());
            return;
        }
        for v in start..n {
            cur.push(v as VertexId);
            rec(v + 1, n, k, cur, out);
            cur.pop();
        }
    }
    let mut out = Vec::new();
    rec(0, n, k, &mut Vec::new(), &mut out);
    out
}

fn brute_force(graph: &Graph, level: MotifLevel) -> (usize, Vec<u64>) {
    let k = level.size();
    let cat = catalog(level);
    let mut connected = 0;
    let mut counts = vec![0u64; graph.vertex_count() * cat.num_classes()];
    for set in subsets(graph.vertex_count(), k) {
        if let Some(class) = cat.classify_vertices(graph, &set) {
            connected += 1;
            for &v in &set {
                counts[v as usize * cat.num_classes() + class] += 1;
            }
        }
    }
    (connected, counts)
}

fn options(accelerated_fail: bool) -> MotifOptions {
    MotifOptions {
        seed_batch: 3,
        accelerator: AcceleratorConfig {
            backend: AcceleratorBackend::Host,
            block_size: 4,
            lanes: 16,
            fallback: if accelerated_fail {
                AcceleratorFallback::Fail
            } else {
                AcceleratorFallback::Cpu
            },
            ..AcceleratorConfig::default()
        },
    }
}

#[test]
fn test_total_matches_brute_force() {
    for seed in 0..6 {
        let graph = random_graph(seed, 9, 0.2);
        for level in [MotifLevel::Three, MotifLevel::Four] {
            let counts = count_motifs(&graph, level.size(), false, &options(false)).unwrap();
            let (connected, dense) = brute_force(&graph, level);
            assert_eq!(counts.total_subgraphs() as usize, connected, "seed {seed} level {level}");
            assert_eq!(counts.as_slice(), dense.as_slice(), "seed {seed} level {level}");
        }
    }
}

#[cfg(feature = "accelerator")]
#[test]
fn test_strategies_agree() {
    for seed in 10..16 {
        let graph = random_graph(seed, 14, 0.15);
        for level in [3, 4] {
            let cpu = count_motifs(&graph, level, false, &options(true)).unwrap();
            let accelerated = count_motifs(&graph, level, true, &options(true)).unwrap();
            assert_eq!(cpu, accelerated, "seed {seed} level {level}");
        }
    }
}

#[cfg(feature = "accelerator")]
#[test]
fn test_strategies_agree_on_hubs() {
    // Two hubs sharing a handful of leaves, far more neighbors than lanes.
    let mut edges = Vec::new();
    for v in 2..90 {
        edges.push((0, v));
        if v % 3 == 0 {
            edges.push((v, 1));
        }
    }
    edges.extend([(0, 1), (2, 3), (4, 2)]);
    let graph = Graph::from_edges(90, &edges).unwrap();
    for level in [3, 4] {
        let cpu = count_motifs(&graph, level, false, &options(true)).unwrap();
        let accelerated = count_motifs(&graph, level, true, &options(true)).unwrap();
        assert_eq!(cpu, accelerated, "level {level}");
    }
}

#[test]
fn test_only_connected_classes_are_counted() {
    let graph = random_graph(42, 12, 0.25);
    for level in [MotifLevel::Three, MotifLevel::Four] {
        let counts = count_motifs(&graph, level.size(), true, &options(false)).unwrap();
        let cat = catalog(level);
        for (class, &total) in counts.class_totals().iter().enumerate() {
            if total > 0 {
                let code = cat.canonical_code(class).unwrap();
                assert!(is_connected(level.size(), code));
            }
        }
    }
}

#[test]
fn test_directed_triangle() {
    let graph = Graph::from_edges(5, &[(0, 1), (1, 2), (2, 0)]).unwrap();
    let cycle = catalog(MotifLevel::Three)
        .classify_edges(&[(0, 1), (1, 2), (2, 0)])
        .unwrap()
        .unwrap();
    for accelerated in [false, true] {
        let counts = count_motifs(&graph, 3, accelerated, &options(false)).unwrap();
        for v in 0..3 {
            assert_eq!(counts.get(v, cycle), 1);
            assert_eq!(counts.vertex(v).iter().sum::<u64>(), 1);
        }
        for v in 3..5 {
            assert!(counts.vertex(v).iter().all(|&c| c == 0));
        }
    }
}

#[test]
fn test_isolated_vertex() {
    let graph = Graph::from_edges(1, &[]).unwrap();
    for level in [3, 4] {
        let counts: MotifCounts = count_motifs(&graph, level, false, &options(false)).unwrap();
        assert_eq!(counts.vertex_count(), 1);
        assert!(counts.vertex(0).iter().all(|&c| c == 0));
    }
}

#[test]
fn test_self_loops_do_not_change_counts() {
    let plain = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
    let looped = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (1, 1), (3, 3)]).unwrap();
    for level in [3, 4] {
        let a = count_motifs(&plain, level, false, &options(false)).unwrap();
        let b = count_motifs(&looped, level, false, &options(false)).unwrap();
        assert_eq!(a, b);
    }
}
