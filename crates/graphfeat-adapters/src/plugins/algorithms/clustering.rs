//! Clustering coefficient and triangle counting.
//!
//! These measure how tightly connected the neighbors of each vertex are.
//! Neighborhoods are taken from the undirected skeleton; the coefficient
//! itself is directed: among the `d(d-1)` ordered pairs of distinct
//! neighbors, it is the fraction joined by an edge in that direction.
//! For graphs whose edges all come in both directions this reduces to the
//! usual undirected coefficient.

use std::sync::OnceLock;

use graphfeat_common::types::{Value, VertexId};
use graphfeat_common::utils::error::Result;
use graphfeat_core::graph::Graph;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::super::{FeatureResult, ParameterDef, ParameterType, Parameters};
use super::traits::GraphFeature;

/// Default minimum vertex count for parallel execution.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 50;

// ============================================================================
// Result Types
// ============================================================================

/// Result of clustering coefficient computation, indexed by vertex ID.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringCoefficientResult {
    /// Directed local clustering coefficient for each vertex (0.0 to 1.0).
    pub coefficients: Vec<f64>,
    /// Number of undirected triangles containing each vertex.
    pub triangle_counts: Vec<u64>,
    /// Total number of unique triangles in the graph.
    pub total_triangles: u64,
    /// Global (average) clustering coefficient.
    pub global_coefficient: f64,
}

impl ClusteringCoefficientResult {
    fn from_parts(coefficients: Vec<f64>, triangle_counts: Vec<u64>) -> Self {
        let n = coefficients.len();
        let total_triangles = triangle_counts.iter().sum::<u64>() / 3;
        let global_coefficient = if n == 0 {
            0.0
        } else {
            coefficients.iter().sum::<f64>() / n as f64
        };
        Self {
            coefficients,
            triangle_counts,
            total_triangles,
            global_coefficient,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Coefficient and triangle count of a single vertex.
fn vertex_clustering(graph: &Graph, v: VertexId) -> (f64, u64) {
    let neighbors = graph.neighbors(v);
    let d = neighbors.len();
    if d < 2 {
        return (0.0, 0);
    }

    let mut links = 0u64;
    let mut triangles = 0u64;
    for (i, &u) in neighbors.iter().enumerate() {
        for &w in &neighbors[i + 1..] {
            let forward = graph.has_edge(u, w);
            let backward = graph.has_edge(w, u);
            links += u64::from(forward) + u64::from(backward);
            if forward || backward {
                triangles += 1;
            }
        }
    }

    let possible = (d * (d - 1)) as f64;
    (links as f64 / possible, triangles)
}

// ============================================================================
// Core Algorithm Functions
// ============================================================================

/// Counts the undirected triangles containing each vertex.
///
/// Each triangle is counted once for each of its three vertices.
///
/// # Complexity
///
/// O(V * d^2 * log d) where d is the average degree
#[must_use]
pub fn triangle_count(graph: &Graph) -> Vec<u64> {
    graph.vertices().map(|v| vertex_clustering(graph, v).1).collect()
}

/// Computes the directed local clustering coefficient of every vertex.
///
/// Vertices with fewer than two neighbors have coefficient 0.0.
///
/// # Complexity
///
/// O(V * d^2 * log d) where d is the average degree
#[must_use]
pub fn clustering_coefficient(graph: &Graph) -> Vec<f64> {
    graph.vertices().map(|v| vertex_clustering(graph, v).0).collect()
}

/// Computes the global (average) clustering coefficient.
///
/// An empty graph has coefficient 0.0.
#[must_use]
pub fn global_clustering_coefficient(graph: &Graph) -> f64 {
    clustering(graph).global_coefficient
}

/// Computes all clustering metrics in a single pass.
#[must_use]
pub fn clustering(graph: &Graph) -> ClusteringCoefficientResult {
    let (coefficients, triangle_counts) = graph
        .vertices()
        .map(|v| vertex_clustering(graph, v))
        .unzip();
    ClusteringCoefficientResult::from_parts(coefficients, triangle_counts)
}

// ============================================================================
// Parallel Implementation
// ============================================================================

/// Computes all clustering metrics in parallel using rayon.
///
/// Falls back to sequential execution for graphs with fewer than
/// `parallel_threshold` vertices. The result is identical to [`clustering`].
#[cfg(feature = "parallel")]
#[must_use]
pub fn clustering_parallel(graph: &Graph, parallel_threshold: usize) -> ClusteringCoefficientResult {
    let n = graph.vertex_count();
    if n < parallel_threshold {
        return clustering(graph);
    }

    let (coefficients, triangle_counts): (Vec<f64>, Vec<u64>) = (0..n)
        .into_par_iter()
        .map(|v| vertex_clustering(graph, v as VertexId))
        .unzip();
    ClusteringCoefficientResult::from_parts(coefficients, triangle_counts)
}

// ============================================================================
// Feature Wrapper for Plugin Registry
// ============================================================================

static CLUSTERING_PARAMS: OnceLock<Vec<ParameterDef>> = OnceLock::new();

fn clustering_params() -> &'static [ParameterDef] {
    CLUSTERING_PARAMS.get_or_init(|| {
        vec![
            ParameterDef {
                name: "parallel".to_string(),
                description: "Enable parallel computation (default: true)".to_string(),
                param_type: ParameterType::Boolean,
                required: false,
                default: Some("true".to_string()),
            },
            ParameterDef {
                name: "parallel_threshold".to_string(),
                description: "Minimum vertices for parallel execution (default: 50)".to_string(),
                param_type: ParameterType::Integer,
                required: false,
                default: Some("50".to_string()),
            },
        ]
    })
}

/// Clustering coefficient feature for the registry.
pub struct ClusteringCoefficientFeature;

impl GraphFeature for ClusteringCoefficientFeature {
    fn name(&self) -> &str {
        "clustering_coefficient"
    }

    fn description(&self) -> &str {
        "Directed local clustering coefficient with triangle counts"
    }

    fn parameters(&self) -> &[ParameterDef] {
        clustering_params()
    }

    fn compute(&self, graph: &Graph, params: &Parameters) -> Result<FeatureResult> {
        let parallel = params.bool_or("parallel", true)?;
        let threshold = params.usize_or("parallel_threshold", DEFAULT_PARALLEL_THRESHOLD)?;

        #[cfg(feature = "parallel")]
        let result = if parallel {
            clustering_parallel(graph, threshold)
        } else {
            clustering(graph)
        };

        #[cfg(not(feature = "parallel"))]
        let result = {
            let _ = (parallel, threshold);
            clustering(graph)
        };

        let mut output = FeatureResult::with_capacity(
            vec![
                "node_id".to_string(),
                "clustering_coefficient".to_string(),
                "triangle_count".to_string(),
            ],
            graph.vertex_count(),
        );
        for (v, (&coefficient, &triangles)) in result
            .coefficients
            .iter()
            .zip(&result.triangle_counts)
            .enumerate()
        {
            output.add_row(vec![
                Value::Int64(v as i64),
                Value::Float64(coefficient),
                Value::Int64(triangles as i64),
            ]);
        }

        Ok(output)
    }
}

// ============================================================================
// Tests
// ============================================================================
