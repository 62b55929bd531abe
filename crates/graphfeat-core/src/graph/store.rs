//! The immutable [`Graph`].

use graphfeat_common::types::{VertexId, vertex_index};
use graphfeat_common::utils::error::{Error, Result};

use super::csr::CsrAdjacency;

/// An immutable directed graph over dense vertex IDs `[0, n)`.
///
/// Built once and shared read-only between feature computations; every
/// accessor takes `&self` so concurrent readers need no synchronization.
///
/// # Example
///
/// ```
/// use graphfeat_core::graph::Graph;
///
/// let graph = Graph::from_edges(3, &[(0, 1), (1, 2), (2, 0)])?;
/// assert!(graph.has_edge(0, 1));
/// assert!(!graph.has_edge(1, 0));
/// assert!(graph.is_adjacent(1, 0));
/// assert_eq!(graph.degree(0), 2);
/// # Ok::<(), graphfeat_common::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Graph {
    n: usize,
    out: CsrAdjacency,
    inc: CsrAdjacency,
    undirected: CsrAdjacency,
    self_loops: usize,
}

impl Graph {
    /// Builds a graph with `n` vertices from a directed edge list.
    ///
    /// Duplicate edges collapse into one. Self-loops are kept in the directed
    /// views and left out of the undirected skeleton.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGraph`] if `n` does not fit the vertex ID range
    /// or an edge references a vertex outside `[0, n)`.
    pub fn from_edges(n: usize, edges: &[(VertexId, VertexId)]) -> Result<Self> {
        check_vertex_count(n)?;
        for &(src, dst) in edges {
            for v in [src, dst] {
                if vertex_index(v) >= n {
                    return Err(Error::invalid_graph(format!(
                        "edge ({src}, {dst}) references vertex {v} outside [0, {n})"
                    )));
                }
            }
        }
        Ok(Self::from_valid_edges(n, edges.to_vec()))
    }

    /// Builds a graph from an out-adjacency in CSR form.
    ///
    /// `offsets` has `n + 1` entries; the targets of vertex `v` are
    /// `targets[offsets[v]..offsets[v + 1]]`. Rows need not be sorted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGraph`] if `offsets` is empty, does not start
    /// at zero, decreases anywhere, or does not end at `targets.len()`, or if
    /// a target is outside `[0, n)`.
    pub fn from_csr(offsets: &[usize], targets: &[VertexId]) -> Result<Self> {
        let Some((&first, _)) = offsets.split_first() else {
            return Err(Error::invalid_graph("CSR offsets must not be empty"));
        };
        if first != 0 {
            return Err(Error::invalid_graph(format!(
                "CSR offsets must start at 0, found {first}"
            )));
        }
        if let Some(pos) = offsets.windows(2).position(|w| w[0] > w[1]) {
            return Err(Error::invalid_graph(format!(
                "CSR offsets decrease at position {}: {} > {}",
                pos + 1,
                offsets[pos],
                offsets[pos + 1]
            )));
        }
        let end = offsets[offsets.len() - 1];
        if end != targets.len() {
            return Err(Error::invalid_graph(format!(
                "CSR offsets end at {end} but {} targets were given",
                targets.len()
            )));
        }

        let n = offsets.len() - 1;
        check_vertex_count(n)?;

        let mut edges = Vec::with_capacity(targets.len());
        for (v, row) in offsets.windows(2).enumerate() {
            for &dst in &targets[row[0]..row[1]] {
                if vertex_index(dst) >= n {
                    return Err(Error::invalid_graph(format!(
                        "CSR row {v} references vertex {dst} outside [0, {n})"
                    )));
                }
                edges.push((v as VertexId, dst));
            }
        }
        Ok(Self::from_valid_edges(n, edges))
    }

    pub(super) fn from_valid_edges(n: usize, edges: Vec<(VertexId, VertexId)>) -> Self {
        let self_loops = {
            let mut loops: Vec<VertexId> = edges
                .iter()
                .filter(|(s, d)| s == d)
                .map(|&(s, _)| s)
                .collect();
            loops.sort_unstable();
            loops.dedup();
            loops.len()
        };

        let reversed: Vec<_> = edges.iter().map(|&(s, d)| (d, s)).collect();
        let skeleton: Vec<_> = edges
            .iter()
            .filter(|(s, d)| s != d)
            .flat_map(|&(s, d)| [(s, d), (d, s)])
            .collect();

        let graph = Self {
            n,
            out: CsrAdjacency::from_pairs(n, edges),
            inc: CsrAdjacency::from_pairs(n, reversed),
            undirected: CsrAdjacency::from_pairs(n, skeleton),
            self_loops,
        };
        tracing::debug!(
            vertices = graph.n,
            edges = graph.edge_count(),
            "graph constructed"
        );
        graph
    }

    /// Returns the number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.n
    }

    /// Returns true if the graph has no vertices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Returns the number of distinct directed edges, self-loops included.
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.out.num_entries()
    }

    /// Returns the number of vertices carrying a self-loop.
    #[inline]
    #[must_use]
    pub fn self_loop_count(&self) -> usize {
        self.self_loops
    }

    /// Iterates over all vertex IDs in ascending order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + Clone + '_ {
        (0..self.n).map(|v| v as VertexId)
    }

    /// Sorted out-neighbors of `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex of this graph.
    #[inline]
    #[must_use]
    pub fn neighbors_out(&self, v: VertexId) -> &[VertexId] {
        self.out.row(v)
    }

    /// Sorted in-neighbors of `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex of this graph.
    #[inline]
    #[must_use]
    pub fn neighbors_in(&self, v: VertexId) -> &[VertexId] {
        self.inc.row(v)
    }

    /// Sorted undirected neighbors of `v`, never containing `v` itself.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a vertex of this graph.
    #[inline]
    #[must_use]
    pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
        self.undirected.row(v)
    }

    /// Out-degree of `v`.
    #[inline]
    #[must_use]
    pub fn out_degree(&self, v: VertexId) -> usize {
        self.out.row_len(v)
    }

    /// In-degree of `v`.
    #[inline]
    #[must_use]
    pub fn in_degree(&self, v: VertexId) -> usize {
        self.inc.row_len(v)
    }

    /// Undirected degree of `v`: the number of distinct other vertices
    /// joined to `v` by an edge in either direction.
    #[inline]
    #[must_use]
    pub fn degree(&self, v: VertexId) -> usize {
        self.undirected.row_len(v)
    }

    /// Returns true if the directed edge `u -> v` exists.
    ///
    /// O(log d) where d is the out-degree of `u`.
    #[inline]
    #[must_use]
    pub fn has_edge(&self, u: VertexId, v: VertexId) -> bool {
        self.out.contains(u, v)
    }

    /// Returns true if `u` and `v` are distinct and joined in either direction.
    ///
    /// O(log d) where d is the undirected degree of `u`.
    #[inline]
    #[must_use]
    pub fn is_adjacent(&self, u: VertexId, v: VertexId) -> bool {
        self.undirected.contains(u, v)
    }

    /// The out-adjacency in CSR form.
    #[must_use]
    pub fn out_adjacency(&self) -> &CsrAdjacency {
        &self.out
    }

    /// The undirected skeleton in CSR form.
    #[must_use]
    pub fn undirected_adjacency(&self) -> &CsrAdjacency {
        &self.undirected
    }

    /// Returns the graph with every edge `a -> b` turned into `b -> a`.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            n: self.n,
            out: self.inc.clone(),
            inc: self.out.clone(),
            undirected: self.undirected.clone(),
            self_loops: self.self_loops,
        }
    }

    /// Vertices sorted by descending undirected degree, ties broken by ID.
    #[must_use]
    pub fn vertices_by_degree(&self) -> Vec<VertexId> {
        let mut order: Vec<VertexId> = self.vertices().collect();
        order.sort_by(|&a, &b| self.degree(b).cmp(&self.degree(a)).then(a.cmp(&b)));
        order
    }

    /// Ratio of non-loop directed edges to the `n * (n - 1)` possible ones.
    ///
    /// Graphs with fewer than two vertices have density 0.
    #[must_use]
    pub fn density(&self) -> f64 {
        if self.n < 2 {
            return 0.0;
        }
        let possible = self.n as f64 * (self.n - 1) as f64;
        (self.edge_count() - self.self_loops) as f64 / possible
    }
}

fn check_vertex_count(n: usize) -> Result<()> {
    if n > VertexId::MAX as usize {
        return Err(Error::invalid_graph(format!(
            "vertex count {n} exceeds the supported maximum {}",
            VertexId::MAX
        )));
    }
    Ok(())
}
