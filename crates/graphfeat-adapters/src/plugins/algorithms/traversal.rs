//! Breadth-first traversal and BFS distance moments.

use std::collections::VecDeque;
use std::sync::OnceLock;

use graphfeat_common::types::{Value, VertexId, vertex_index};
use graphfeat_common::utils::error::Result;
use graphfeat_core::graph::Graph;
use rand::SeedableRng;
use rand::rngs::StdRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::super::{FeatureResult, ParameterDef, ParameterType, Parameters};
use super::traits::GraphFeature;

const UNREACHED: u32 = u32::MAX;

/// Mean and population variance of BFS distances from one source.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BfsMoments {
    /// Mean distance to reachable vertices other than the source.
    pub mean: f64,
    /// Population variance of those distances.
    pub variance: f64,
}

impl BfsMoments {
    /// Moments from the count, sum and sum of squares of the distances.
    fn from_sums(count: u64, sum: u64, sum_sq: u64) -> Self {
        if count == 0 {
            return Self::default();
        }
        let c = count as f64;
        // c * sum_sq - sum^2 is exact and non-negative in integers.
        let spread = u128::from(count) * u128::from(sum_sq) - u128::from(sum) * u128::from(sum);
        Self {
            mean: sum as f64 / c,
            variance: spread as f64 / (c * c),
        }
    }
}

/// Reusable BFS buffers; one per worker.
struct BfsScratch {
    distance: Vec<u32>,
    queue: VecDeque<VertexId>,
    visited: Vec<VertexId>,
}

impl BfsScratch {
    fn new(n: usize) -> Self {
        Self {
            distance: vec![UNREACHED; n],
            queue: VecDeque::new(),
            visited: Vec::new(),
        }
    }

    fn moments(&mut self, graph: &Graph, source: VertexId) -> BfsMoments {
        let (mut count, mut sum, mut sum_sq) = (0u64, 0u64, 0u64);

        self.distance[vertex_index(source)] = 0;
        self.visited.push(source);
        self.queue.push_back(source);
        while let Some(v) = self.queue.pop_front() {
            let next = self.distance[vertex_index(v)] + 1;
            for &w in graph.neighbors_out(v) {
                let slot = &mut self.distance[vertex_index(w)];
                if *slot == UNREACHED {
                    *slot = next;
                    self.visited.push(w);
                    self.queue.push_back(w);
                    let d = u64::from(next);
                    count += 1;
                    sum += d;
                    sum_sq += d * d;
                }
            }
        }

        for v in self.visited.drain(..) {
            self.distance[vertex_index(v)] = UNREACHED;
        }
        BfsMoments::from_sums(count, sum, sum_sq)
    }
}

/// BFS layers along outgoing edges: `result[i]` holds the vertices at
/// distance `i` from `start`.
///
/// # Panics
///
/// Panics if `start` is not a vertex of `graph`.
#[must_use]
pub fn bfs_layers(graph: &Graph, start: VertexId) -> Vec<Vec<VertexId>> {
    let mut seen = vec![false; graph.vertex_count()];
    seen[vertex_index(start)] = true;
    let mut layers = vec![vec![start]];
    loop {
        let mut next = Vec::new();
        for &v in layers.last().map(Vec::as_slice).unwrap_or_default() {
            for &w in graph.neighbors_out(v) {
                if !seen[vertex_index(w)] {
                    seen[vertex_index(w)] = true;
                    next.push(w);
                }
            }
        }
        if next.is_empty() {
            return layers;
        }
        layers.push(next);
    }
}

/// BFS distance moments from a single source.
///
/// # Panics
///
/// Panics if `source` is not a vertex of `graph`.
#[must_use]
pub fn bfs_moments_from(graph: &Graph, source: VertexId) -> BfsMoments {
    BfsScratch::new(graph.vertex_count()).moments(graph, source)
}

fn moments_for_sources(graph: &Graph, sources: &[VertexId]) -> Vec<BfsMoments> {
    let n = graph.vertex_count();

    #[cfg(feature = "parallel")]
    {
        sources
            .par_iter()
            .map_init(|| BfsScratch::new(n), |scratch, &s| scratch.moments(graph, s))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        let mut scratch = BfsScratch::new(n);
        sources.iter().map(|&s| scratch.moments(graph, s)).collect()
    }
}

/// BFS distance moments from every vertex, indexed by vertex ID.
///
/// Distances follow outgoing edges and exclude the source itself. A vertex
/// that reaches nothing else gets `(0, 0)`. Sources run in parallel with the
/// `parallel` feature.
///
/// # Complexity
///
/// O(V * (V + E))
#[must_use]
pub fn bfs_moments(graph: &Graph) -> Vec<BfsMoments> {
    let sources: Vec<VertexId> = graph.vertices().collect();
    moments_for_sources(graph, &sources)
}

/// BFS distance moments from `count` sources drawn uniformly without
/// replacement, deterministically for a given `seed`.
///
/// Returns `(source, moments)` pairs sorted by source. A `count` of at least
/// the vertex count uses every vertex.
#[must_use]
pub fn bfs_moments_sampled(graph: &Graph, count: usize, seed: u64) -> Vec<(VertexId, BfsMoments)> {
    let n = graph.vertex_count();
    let mut sources: Vec<VertexId> = if count >= n {
        graph.vertices().collect()
    } else {
        let mut rng = StdRng::seed_from_u64(seed);
        rand::seq::index::sample(&mut rng, n, count)
            .into_iter()
            .map(|i| i as VertexId)
            .collect()
    };
    sources.sort_unstable();

    let moments = moments_for_sources(graph, &sources);
    sources.into_iter().zip(moments).collect()
}

// ============================================================================
// Feature Wrapper for Plugin Registry
// ============================================================================

static BFS_MOMENTS_PARAMS: OnceLock<Vec<ParameterDef>> = OnceLock::new();

fn bfs_moments_params() -> &'static [ParameterDef] {
    BFS_MOMENTS_PARAMS.get_or_init(|| {
        vec![
            ParameterDef {
                name: "sample".to_string(),
                description: "Number of sampled sources (default: all vertices)".to_string(),
                param_type: ParameterType::Integer,
                required: false,
                default: None,
            },
            ParameterDef {
                name: "seed".to_string(),
                description: "Sampling seed (default: 0)".to_string(),
                param_type: ParameterType::Integer,
                required: false,
                default: Some("0".to_string()),
            },
        ]
    })
}

/// BFS moments feature for the registry.
pub struct BfsMomentsFeature;

impl GraphFeature for BfsMomentsFeature {
    fn name(&self) -> &str {
        "bfs_moments"
    }

    fn description(&self) -> &str {
        "Mean and variance of BFS distances along outgoing edges"
    }

    fn parameters(&self) -> &[ParameterDef] {
        bfs_moments_params()
    }

    fn compute(&self, graph: &Graph, params: &Parameters) -> Result<FeatureResult> {
        let rows: Vec<(VertexId, BfsMoments)> = if params.contains("sample") {
            let count = params.usize_or("sample", 0)?;
            let seed = params.usize_or("seed", 0)? as u64;
            bfs_moments_sampled(graph, count, seed)
        } else {
            graph.vertices().zip(bfs_moments(graph)).collect()
        };

        let mut output = FeatureResult::with_capacity(
            vec![
                "node_id".to_string(),
                "bfs_mean".to_string(),
                "bfs_variance".to_string(),
            ],
            rows.len(),
        );
        for (v, m) in rows {
            output.add_row(vec![
                Value::from(v),
                Value::Float64(m.mean),
                Value::Float64(m.variance),
            ]);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_graph() -> Graph {
        //   0 -> 1 -> 2
        //   |         ^
        //   v         |
        //   3 --------+
        //   4 isolated
        Graph::from_edges(5, &[(0, 1), (1, 2), (0, 3), (3, 2)]).unwrap()
    }

    #[test]
    fn test_bfs_layers() {
        let layers = bfs_layers(&create_test_graph(), 0);
        assert_eq!(layers, vec![vec![0], vec![1, 3], vec![2]]);
    }

    #[test]
    fn test_moments_from_source() {
        let m = bfs_moments_from(&create_test_graph(), 0);
        // distances 1, 1, 2
        assert!((m.mean - 4.0 / 3.0).abs() < 1e-12);
        assert!((m.variance - 2.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_unreachable_and_isolated() {
        let moments = bfs_moments(&create_test_graph());
        assert_eq!(moments[2], BfsMoments::default());
        assert_eq!(moments[4], BfsMoments::default());
        assert_eq!(moments[1], BfsMoments { mean: 1.0, variance: 0.0 });
    }

    #[test]
    fn test_single_vertex() {
        let graph = Graph::from_edges(1, &[(0, 0)]).unwrap();
        assert_eq!(bfs_moments(&graph), vec![BfsMoments::default()]);
    }

    #[test]
    fn test_sampled_deterministic() {
        let edges: Vec<_> = (0..30u32).map(|v| (v, (v + 1) % 30)).collect();
        let graph = Graph::from_edges(30, &edges).unwrap();
        let a = bfs_moments_sampled(&graph, 5, 7);
        let b = bfs_moments_sampled(&graph, 5, 7);
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
        assert!(a.windows(2).all(|w| w[0].0 < w[1].0));

        let full = bfs_moments(&graph);
        for (v, m) in &a {
            assert_eq!(*m, full[*v as usize]);
        }
        assert_eq!(bfs_moments_sampled(&graph, 100, 0).len(), 30);
    }

    #[test]
    fn test_bfs_moments_feature() {
        let mut params = Parameters::new();
        let all = BfsMomentsFeature.compute(&create_test_graph(), &params).unwrap();
        assert_eq!(all.row_count(), 5);

        params.set_int("sample", 2).set_int("seed", 3);
        let sampled = BfsMomentsFeature.compute(&create_test_graph(), &params).unwrap();
        assert_eq!(sampled.row_count(), 2);
    }
}
