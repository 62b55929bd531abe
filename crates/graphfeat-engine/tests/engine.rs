//! End-to-end tests of the public engine operations.

use graphfeat_engine::{
    AcceleratorConfig, AcceleratorFallback, Config, Error, FeatureEngine, Graph, GraphBuilder,
    MotifLevel, Parameters, Value,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn create_engine() -> FeatureEngine {
    FeatureEngine::with_config(Config::default().with_threads(2)).unwrap()
}

fn create_random_graph(n: u32, edges: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = GraphBuilder::new(n as usize);
    for _ in 0..edges {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        builder.add_edge(u, v);
    }
    builder.build().unwrap()
}

#[test]
fn test_directed_triangle_motif() {
    let engine = create_engine();
    let graph = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 0)]).unwrap();
    let counts = engine.motif(&graph, 3, false).unwrap();

    assert_eq!(counts.level(), MotifLevel::Three);
    assert_eq!(counts.total_subgraphs(), 1);

    let class = counts
        .vertex(0)
        .iter()
        .position(|&c| c == 1)
        .expect("vertex 0 sits in one subgraph");
    for v in 0..3 {
        assert_eq!(counts.vertex(v).iter().sum::<u64>(), 1);
        assert_eq!(counts.get(v, class), 1);
    }
    assert!(counts.vertex(3).iter().all(|&c| c == 0));
}

#[test]
fn test_isolated_vertex_features() {
    let engine = create_engine();
    let graph = Graph::from_edges(1, &[]).unwrap();

    assert_eq!(engine.clustering_coefficient(&graph), vec![0.0]);
    assert_eq!(engine.k_core(&graph), vec![0]);
    let moments = engine.bfs_moments(&graph);
    assert_eq!(moments[0].mean, 0.0);
    assert_eq!(moments[0].variance, 0.0);

    for level in [3, 4] {
        for accelerated in [false, true] {
            let counts = engine.motif(&graph, level, accelerated).unwrap();
            assert_eq!(counts.total_subgraphs(), 0);
            assert!(counts.vertex(0).iter().all(|&c| c == 0));
        }
    }
}

#[cfg(feature = "accelerator")]
#[test]
fn test_strategies_agree_on_random_graph() {
    let config = Config::default()
        .with_threads(2)
        .with_accelerator(AcceleratorConfig::host().with_fallback(AcceleratorFallback::Fail));
    let engine = FeatureEngine::with_config(config).unwrap();
    let graph = create_random_graph(30, 90, 7);

    for level in [3, 4] {
        let cpu = engine.motif(&graph, level, false).unwrap();
        let accelerated = engine.motif(&graph, level, true).unwrap();
        assert_eq!(cpu, accelerated);
    }
}

#[test]
fn test_strict_fallback_reports_unavailable_accelerator() {
    let config = Config::default()
        .with_threads(1)
        .with_accelerator(AcceleratorConfig::disabled().with_fallback(AcceleratorFallback::Fail));
    let engine = FeatureEngine::with_config(config).unwrap();
    let graph = Graph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();

    assert!(matches!(
        engine.motif(&graph, 3, true),
        Err(Error::AcceleratorUnavailable(_))
    ));
    // CPU requests are unaffected by the policy.
    assert_eq!(engine.motif(&graph, 3, false).unwrap().total_subgraphs(), 1);
}

#[cfg(not(feature = "cuda"))]
#[test]
fn test_cuda_request_without_cuda_build() {
    let config = Config::default()
        .with_threads(1)
        .with_accelerator_fallback(AcceleratorFallback::Fail);
    let engine = FeatureEngine::with_config(config).unwrap();
    let graph = Graph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();

    match engine.motif(&graph, 3, true) {
        Err(Error::AcceleratorUnavailable(reason)) => assert!(reason.contains("feature")),
        other => panic!("expected AcceleratorUnavailable, got {other:?}"),
    }
}

#[test]
fn test_lenient_fallback_uses_cpu() {
    let config = Config::default().with_threads(1).without_accelerator();
    let engine = FeatureEngine::with_config(config).unwrap();
    let graph = Graph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();

    let counts = engine.motif(&graph, 3, true).unwrap();
    assert_eq!(counts.total_subgraphs(), 1);
}

#[test]
fn test_page_rank_sums_to_one() {
    let engine = create_engine();
    let graph = create_random_graph(50, 200, 11);
    let ranks = engine.page_rank(&graph).unwrap();

    assert_eq!(ranks.scores.len(), 50);
    let total: f64 = ranks.scores.iter().sum();
    assert!((total - 1.0).abs() < 1e-6);
}

#[test]
fn test_page_rank_rejects_bad_damping() {
    let engine = create_engine();
    let graph = Graph::from_edges(2, &[(0, 1)]).unwrap();
    assert!(matches!(
        engine.page_rank_with(&graph, 1.5, 1e-6, 100),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn test_page_rank_iteration_cap_is_best_effort() {
    let engine = create_engine();
    let graph = create_random_graph(20, 60, 3);
    let ranks = engine.page_rank_with(&graph, 0.85, 0.0, 1).unwrap();

    assert_eq!(ranks.iterations, 1);
    assert!(!ranks.converged);
    assert!(matches!(
        ranks.require_converged(),
        Err(Error::NonConvergence { iterations: 1, .. })
    ));
}

#[test]
fn test_k_core_members_are_nested() {
    let engine = create_engine();
    let graph = create_random_graph(40, 160, 5);
    let cores = engine.k_core(&graph);
    let max = cores.iter().copied().max().unwrap_or(0);

    let mut previous = engine.k_core_members(&graph, 0);
    assert_eq!(previous.len(), 40);
    for k in 1..=max + 1 {
        let members = engine.k_core_members(&graph, k);
        assert!(members.iter().all(|v| previous.contains(v)));
        let expected: Vec<u32> = (0..40).filter(|&v| cores[v as usize] >= k).collect();
        assert_eq!(members, expected);
        previous = members;
    }
    assert!(previous.is_empty());
}

#[test]
fn test_sampled_bfs_matches_full_run() {
    let engine = create_engine();
    let graph = create_random_graph(25, 70, 9);
    let full = engine.bfs_moments(&graph);
    let sampled = engine.bfs_moments_sampled(&graph, 5, 42);

    assert_eq!(sampled.len(), 5);
    for (v, moments) in &sampled {
        assert_eq!(*moments, full[*v as usize]);
    }
    assert_eq!(sampled, engine.bfs_moments_sampled(&graph, 5, 42));
}

#[test]
fn test_compute_motif_through_registry() {
    let engine = create_engine();
    let graph = Graph::from_edges(3, &[(0, 1), (1, 2), (2, 0)]).unwrap();
    let mut params = Parameters::new();
    params.set_int("level", 3);

    let table = engine.compute("motif", &graph, &params).unwrap();
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.columns.len(), 1 + MotifLevel::Three.num_classes());
    assert_eq!(table.rows[0][0], Value::Int64(0));
}

#[test]
fn test_invalid_config_is_rejected() {
    let err = FeatureEngine::with_config(Config::default().with_motif_batch_size(0)).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
