//! PageRank centrality.

use std::sync::OnceLock;

use graphfeat_common::types::Value;
use graphfeat_common::utils::error::{Error, Result};
use graphfeat_core::graph::Graph;

use super::super::{FeatureResult, ParameterDef, ParameterType, Parameters};
use super::traits::{GraphFeature, NodeValueResultBuilder};

/// Default damping factor.
pub const DEFAULT_DAMPING: f64 = 0.85;
/// Default L1 convergence tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;
/// Default iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Outcome of a PageRank run.
///
/// A run that hits the iteration cap still returns its last scores with
/// `converged` unset; use [`require_converged`](Self::require_converged) to
/// turn that into an error.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRankResult {
    /// Score of each vertex, indexed by vertex ID. Sums to 1 for non-empty graphs.
    pub scores: Vec<f64>,
    /// Iterations performed.
    pub iterations: usize,
    /// L1 change in the final iteration.
    pub residual: f64,
    /// Whether the residual dropped below the tolerance.
    pub converged: bool,
}

impl PageRankResult {
    /// Returns `self` if converged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonConvergence`] otherwise.
    pub fn require_converged(self) -> Result<Self> {
        if self.converged {
            Ok(self)
        } else {
            Err(Error::NonConvergence {
                iterations: self.iterations,
                residual: self.residual,
            })
        }
    }
}

fn check_page_rank_args(damping: f64, tolerance: f64, max_iterations: usize) -> Result<()> {
    if !(damping > 0.0 && damping < 1.0) {
        return Err(Error::invalid_parameter(format!(
            "damping must be in (0, 1), got {damping}"
        )));
    }
    if !(tolerance >= 0.0 && tolerance.is_finite()) {
        return Err(Error::invalid_parameter(format!(
            "tolerance must be a finite non-negative number, got {tolerance}"
        )));
    }
    if max_iterations == 0 {
        return Err(Error::invalid_parameter("max_iterations must be at least 1"));
    }
    Ok(())
}

/// Computes PageRank by power iteration.
///
/// Each vertex passes `damping` of its score evenly along its outgoing edges
/// (self-loops included). Vertices without outgoing edges spread their score
/// uniformly over all vertices. Iteration stops once the L1 change between
/// rounds falls below `tolerance`, or after `max_iterations` rounds; in the
/// latter case a warning is logged and `converged` is false.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `damping` is outside (0, 1),
/// `tolerance` is negative or not finite, or `max_iterations` is zero.
///
/// # Complexity
///
/// O(iterations * (V + E))
pub fn page_rank(
    graph: &Graph,
    damping: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<PageRankResult> {
    check_page_rank_args(damping, tolerance, max_iterations)?;

    let n = graph.vertex_count();
    if n == 0 {
        return Ok(PageRankResult {
            scores: Vec::new(),
            iterations: 0,
            residual: 0.0,
            converged: true,
        });
    }

    let nf = n as f64;
    let mut scores = vec![1.0 / nf; n];
    let mut next = vec![0.0; n];
    let dangling: Vec<usize> = (0..n)
        .filter(|&v| graph.out_degree(v as u32) == 0)
        .collect();

    let mut iterations = 0;
    let mut residual = f64::INFINITY;
    while iterations < max_iterations {
        let dangling_sum: f64 = dangling.iter().map(|&v| scores[v]).sum();
        let base = (1.0 - damping) / nf + damping * dangling_sum / nf;
        next.fill(base);

        for v in graph.vertices() {
            let targets = graph.neighbors_out(v);
            if targets.is_empty() {
                continue;
            }
            let share = damping * scores[v as usize] / targets.len() as f64;
            for &w in targets {
                next[w as usize] += share;
            }
        }

        residual = scores
            .iter()
            .zip(&next)
            .map(|(old, new)| (old - new).abs())
            .sum();
        std::mem::swap(&mut scores, &mut next);
        iterations += 1;

        if residual < tolerance {
            break;
        }
    }

    let converged = residual < tolerance;
    if converged {
        tracing::debug!(iterations, residual, "PageRank converged");
    } else {
        tracing::warn!(
            iterations,
            residual,
            tolerance,
            "PageRank hit the iteration cap before converging"
        );
    }

    Ok(PageRankResult {
        scores,
        iterations,
        residual,
        converged,
    })
}

// ============================================================================
// Feature Wrapper for Plugin Registry
// ============================================================================

static PAGERANK_PARAMS: OnceLock<Vec<ParameterDef>> = OnceLock::new();

fn pagerank_params() -> &'static [ParameterDef] {
    PAGERANK_PARAMS.get_or_init(|| {
        vec![
            ParameterDef {
                name: "damping".to_string(),
                description: "Damping factor (default: 0.85)".to_string(),
                param_type: ParameterType::Float,
                required: false,
                default: Some("0.85".to_string()),
            },
            ParameterDef {
                name: "max_iterations".to_string(),
                description: "Maximum iterations (default: 100)".to_string(),
                param_type: ParameterType::Integer,
                required: false,
                default: Some("100".to_string()),
            },
            ParameterDef {
                name: "tolerance".to_string(),
                description: "L1 convergence tolerance (default: 1e-6)".to_string(),
                param_type: ParameterType::Float,
                required: false,
                default: Some("1e-6".to_string()),
            },
            ParameterDef {
                name: "require_converged".to_string(),
                description: "Fail instead of returning unconverged scores (default: false)"
                    .to_string(),
                param_type: ParameterType::Boolean,
                required: false,
                default: Some("false".to_string()),
            },
        ]
    })
}

/// PageRank feature for the registry.
pub struct PageRankFeature;

impl GraphFeature for PageRankFeature {
    fn name(&self) -> &str {
        "page_rank"
    }

    fn description(&self) -> &str {
        "PageRank score by power iteration"
    }

    fn parameters(&self) -> &[ParameterDef] {
        pagerank_params()
    }

    fn compute(&self, graph: &Graph, params: &Parameters) -> Result<FeatureResult> {
        let damping = params.float_or("damping", DEFAULT_DAMPING)?;
        let max_iterations = params.usize_or("max_iterations", DEFAULT_MAX_ITERATIONS)?;
        let tolerance = params.float_or("tolerance", DEFAULT_TOLERANCE)?;

        let mut result = page_rank(graph, damping, tolerance, max_iterations)?;
        if params.bool_or("require_converged", false)? {
            result = result.require_converged()?;
        }

        let mut builder = NodeValueResultBuilder::with_capacity("pagerank", result.scores.len());
        for (v, score) in graph.vertices().zip(result.scores) {
            builder.push(v, Value::Float64(score));
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_pagerank_graph() -> Graph {
        // 0 -> 1, 1 -> 2, 2 -> 0, 0 -> 2
        Graph::from_edges(3, &[(0, 1), (1, 2), (2, 0), (0, 2)]).unwrap()
    }

    #[test]
    fn test_pagerank_basic() {
        let result = page_rank(&create_pagerank_graph(), 0.85, 1e-9, 200).unwrap();
        assert!(result.converged);
        assert!(result.scores.iter().all(|&s| s > 0.0));
        let total: f64 = result.scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        // 2 receives from both 0 and 1
        assert!(result.scores[2] > result.scores[1]);
    }

    #[test]
    fn test_pagerank_dangling() {
        let graph = Graph::from_edges(2, &[(0, 1)]).unwrap();
        let result = page_rank(&graph, 0.85, 1e-8, 100).unwrap();
        let total: f64 = result.scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-8);
        assert!(result.scores[1] > result.scores[0]);
    }

    #[test]
    fn test_pagerank_self_loop_counts() {
        let looped = Graph::from_edges(2, &[(0, 0), (0, 1), (1, 0)]).unwrap();
        let result = page_rank(&looped, 0.85, 1e-10, 500).unwrap();
        assert!(result.scores[0] > result.scores[1]);
    }

    #[test]
    fn test_pagerank_empty() {
        let result = page_rank(&Graph::from_edges(0, &[]).unwrap(), 0.85, 1e-6, 100).unwrap();
        assert!(result.scores.is_empty());
        assert!(result.converged);
    }

    #[test]
    fn test_pagerank_isolated_vertex() {
        let graph = Graph::from_edges(1, &[]).unwrap();
        let result = page_rank(&graph, 0.85, 1e-6, 100).unwrap();
        assert_eq!(result.scores.len(), 1);
        assert!((result.scores[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pagerank_non_convergence() {
        let result = page_rank(&create_pagerank_graph(), 0.85, 0.0, 3).unwrap();
        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
        let total: f64 = result.scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(matches!(
            result.require_converged(),
            Err(Error::NonConvergence { iterations: 3, .. })
        ));
    }

    #[test]
    fn test_pagerank_invalid_arguments() {
        let graph = create_pagerank_graph();
        assert!(page_rank(&graph, 1.0, 1e-6, 100).is_err());
        assert!(page_rank(&graph, 0.0, 1e-6, 100).is_err());
        assert!(page_rank(&graph, 0.85, -1.0, 100).is_err());
        assert!(page_rank(&graph, 0.85, 1e-6, 0).is_err());
    }

    #[test]
    fn test_pagerank_feature_wrapper() {
        let mut params = Parameters::new();
        params.set_float("damping", 0.5).set_int("max_iterations", 50);
        let result = PageRankFeature
            .compute(&create_pagerank_graph(), &params)
            .unwrap();
        assert_eq!(result.columns, vec!["node_id", "pagerank"]);
        assert_eq!(result.row_count(), 3);

        params.set_float("tolerance", 0.0).set_bool("require_converged", true);
        assert!(
            PageRankFeature
                .compute(&create_pagerank_graph(), &params)
                .is_err()
        );
    }
}
