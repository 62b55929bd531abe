//! K-core decomposition.
//!
//! The k-core is the maximal subgraph in which every vertex has at least `k`
//! neighbors inside the subgraph. The coreness of a vertex is the largest `k`
//! whose k-core contains it. Degrees are taken on the undirected skeleton.

use std::collections::VecDeque;
use std::sync::OnceLock;

use graphfeat_common::types::{Value, VertexId, vertex_index};
use graphfeat_common::utils::error::Result;
use graphfeat_core::graph::Graph;

use super::super::{FeatureResult, ParameterDef, ParameterType, Parameters};
use super::traits::GraphFeature;

/// Result of k-core decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KCoreResult {
    /// Coreness of each vertex, indexed by vertex ID.
    pub core_numbers: Vec<u32>,
    /// Largest coreness in the graph.
    pub max_core: u32,
}

impl KCoreResult {
    /// Vertices with coreness of at least `k`, ascending.
    #[must_use]
    pub fn members(&self, k: u32) -> Vec<VertexId> {
        self.core_numbers
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c >= k)
            .map(|(v, _)| v as VertexId)
            .collect()
    }
}

/// Computes the coreness of every vertex by bucket-based peeling
/// (Batagelj-Zaversnik).
///
/// Vertices are kept sorted by current degree in a flat array partitioned
/// into degree buckets; removing the lowest vertex decrements each remaining
/// neighbor and moves it one bucket down in O(1).
///
/// # Complexity
///
/// O(V + E)
#[must_use]
pub fn kcore_decomposition(graph: &Graph) -> KCoreResult {
    let n = graph.vertex_count();
    if n == 0 {
        return KCoreResult {
            core_numbers: Vec::new(),
            max_core: 0,
        };
    }

    let mut degree: Vec<usize> = graph.vertices().map(|v| graph.degree(v)).collect();
    let max_degree = degree.iter().copied().max().unwrap_or(0);

    // bin[d] = start of the bucket for degree d in `order`
    let mut bin = vec![0usize; max_degree + 1];
    for &d in &degree {
        bin[d] += 1;
    }
    let mut start = 0;
    for slot in &mut bin {
        let count = *slot;
        *slot = start;
        start += count;
    }

    let mut order = vec![0 as VertexId; n];
    let mut position = vec![0usize; n];
    {
        let mut next = bin.clone();
        for v in 0..n {
            position[v] = next[degree[v]];
            order[position[v]] = v as VertexId;
            next[degree[v]] += 1;
        }
    }

    for i in 0..n {
        let v = order[i];
        let dv = degree[vertex_index(v)];
        for &u in graph.neighbors(v) {
            let ui = vertex_index(u);
            if degree[ui] > dv {
                // Swap u with the first vertex of its bucket, then shrink the bucket.
                let du = degree[ui];
                let pu = position[ui];
                let pw = bin[du];
                let w = order[pw];
                if u != w {
                    order[pu] = w;
                    order[pw] = u;
                    position[ui] = pw;
                    position[vertex_index(w)] = pu;
                }
                bin[du] += 1;
                degree[ui] -= 1;
            }
        }
    }

    let core_numbers: Vec<u32> = degree.into_iter().map(|d| d as u32).collect();
    let max_core = core_numbers.iter().copied().max().unwrap_or(0);
    KCoreResult {
        core_numbers,
        max_core,
    }
}

/// Coreness of every vertex, indexed by vertex ID.
#[must_use]
pub fn k_core(graph: &Graph) -> Vec<u32> {
    kcore_decomposition(graph).core_numbers
}

/// Vertices that survive peeling at threshold `k`, ascending.
///
/// Repeatedly removes vertices with fewer than `k` remaining neighbors. The
/// survivors are exactly the vertices with coreness of at least `k`.
#[must_use]
pub fn k_core_members(graph: &Graph, k: u32) -> Vec<VertexId> {
    let n = graph.vertex_count();
    let k = k as usize;
    let mut degree: Vec<usize> = graph.vertices().map(|v| graph.degree(v)).collect();
    let mut removed = vec![false; n];
    let mut queue: VecDeque<VertexId> = VecDeque::new();

    for v in graph.vertices() {
        if degree[vertex_index(v)] < k {
            removed[vertex_index(v)] = true;
            queue.push_back(v);
        }
    }

    while let Some(v) = queue.pop_front() {
        for &u in graph.neighbors(v) {
            let ui = vertex_index(u);
            if removed[ui] {
                continue;
            }
            degree[ui] -= 1;
            if degree[ui] < k {
                removed[ui] = true;
                queue.push_back(u);
            }
        }
    }

    graph.vertices().filter(|&v| !removed[vertex_index(v)]).collect()
}

// ============================================================================
// Feature Wrapper for Plugin Registry
// ============================================================================

static KCORE_PARAMS: OnceLock<Vec<ParameterDef>> = OnceLock::new();

fn kcore_params() -> &'static [ParameterDef] {
    KCORE_PARAMS.get_or_init(|| {
        vec![ParameterDef {
            name: "k".to_string(),
            description: "If set, add an in_k_core column for this threshold".to_string(),
            param_type: ParameterType::Integer,
            required: false,
            default: None,
        }]
    })
}

/// K-core feature for the registry.
pub struct KCoreFeature;

impl GraphFeature for KCoreFeature {
    fn name(&self) -> &str {
        "k_core"
    }

    fn description(&self) -> &str {
        "Coreness of each vertex from k-core peeling"
    }

    fn parameters(&self) -> &[ParameterDef] {
        kcore_params()
    }

    fn compute(&self, graph: &Graph, params: &Parameters) -> Result<FeatureResult> {
        let result = kcore_decomposition(graph);
        let threshold = if params.contains("k") {
            let k = params.usize_or("k", 0)?;
            Some(u32::try_from(k).unwrap_or(u32::MAX))
        } else {
            None
        };

        let mut columns = vec!["node_id".to_string(), "core_number".to_string()];
        if threshold.is_some() {
            columns.push("in_k_core".to_string());
        }
        let mut output = FeatureResult::with_capacity(columns, graph.vertex_count());
        for (v, &core) in result.core_numbers.iter().enumerate() {
            let mut row = vec![Value::Int64(v as i64), Value::Int64(i64::from(core))];
            if let Some(k) = threshold {
                row.push(Value::Bool(core >= k));
            }
            output.add_row(row);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_kcore_graph() -> Graph {
        // K_4 on 0..4, a tail 3 - 4 - 5, and isolated vertex 6
        let mut edges = Vec::new();
        for i in 0..4u32 {
            for j in (i + 1)..4 {
                edges.push((i, j));
            }
        }
        edges.extend([(3, 4), (5, 4)]);
        Graph::from_edges(7, &edges).unwrap()
    }

    #[test]
    fn test_core_numbers() {
        let result = kcore_decomposition(&create_kcore_graph());
        assert_eq!(result.core_numbers, vec![3, 3, 3, 3, 1, 1, 0]);
        assert_eq!(result.max_core, 3);
    }

    #[test]
    fn test_members_match_coreness() {
        let graph = create_kcore_graph();
        let result = kcore_decomposition(&graph);
        let mut previous = usize::MAX;
        for k in 0..=5 {
            let members = k_core_members(&graph, k);
            assert_eq!(members, result.members(k), "k = {k}");
            assert!(members.len() <= previous);
            previous = members.len();
        }
        assert_eq!(k_core_members(&graph, 3), vec![0, 1, 2, 3]);
        assert!(k_core_members(&graph, 4).is_empty());
    }

    #[test]
    fn test_isolated_and_empty() {
        assert!(k_core(&Graph::from_edges(0, &[]).unwrap()).is_empty());
        let single = Graph::from_edges(1, &[(0, 0)]).unwrap();
        assert_eq!(k_core(&single), vec![0]);
    }

    #[test]
    fn test_direction_ignored() {
        // Directed cycle is a 2-core on the skeleton
        let graph = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
        assert_eq!(k_core(&graph), vec![2, 2, 2, 2]);
    }

    #[test]
    fn test_kcore_feature_with_threshold() {
        let mut params = Parameters::new();
        params.set_int("k", 2);
        let result = KCoreFeature.compute(&create_kcore_graph(), &params).unwrap();
        assert_eq!(result.columns.len(), 3);
        assert_eq!(result.rows[0][2], Value::Bool(true));
        assert_eq!(result.rows[4][2], Value::Bool(false));
    }
}
