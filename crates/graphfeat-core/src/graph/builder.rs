//! Incremental construction of a [`Graph`].

use graphfeat_common::types::{VertexId, vertex_index};
use graphfeat_common::utils::error::{Error, Result};

use super::store::Graph;

/// Collects vertices and edges, then freezes them into an immutable [`Graph`].
///
/// # Example
///
/// ```
/// use graphfeat_core::graph::GraphBuilder;
///
/// let mut builder = GraphBuilder::new(2);
/// let c = builder.add_vertex();
/// builder.add_edge(0, 1).add_edge(1, c);
/// let graph = builder.build()?;
/// assert_eq!(graph.vertex_count(), 3);
/// # Ok::<(), graphfeat_common::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    vertex_count: usize,
    edges: Vec<(VertexId, VertexId)>,
}

impl GraphBuilder {
    /// Creates a builder that starts with `vertex_count` vertices.
    #[must_use]
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            edges: Vec::new(),
        }
    }

    /// Creates a builder with room for `edges` edges.
    #[must_use]
    pub fn with_capacity(vertex_count: usize, edges: usize) -> Self {
        Self {
            vertex_count,
            edges: Vec::with_capacity(edges),
        }
    }

    /// Appends a fresh vertex and returns its ID.
    pub fn add_vertex(&mut self) -> VertexId {
        let id = self.vertex_count as VertexId;
        self.vertex_count += 1;
        id
    }

    /// Grows the vertex set so that it contains at least `count` vertices.
    pub fn ensure_vertices(&mut self, count: usize) -> &mut Self {
        self.vertex_count = self.vertex_count.max(count);
        self
    }

    /// Records the directed edge `src -> dst`. Endpoints are checked in
    /// [`build`](Self::build).
    pub fn add_edge(&mut self, src: VertexId, dst: VertexId) -> &mut Self {
        self.edges.push((src, dst));
        self
    }

    /// Records every edge yielded by `edges`.
    pub fn add_edges<I>(&mut self, edges: I) -> &mut Self
    where
        I: IntoIterator<Item = (VertexId, VertexId)>,
    {
        self.edges.extend(edges);
        self
    }

    /// Returns the current vertex count.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Freezes the builder into a [`Graph`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGraph`] if an edge references a vertex outside
    /// the declared vertex range.
    pub fn build(self) -> Result<Graph> {
        let n = self.vertex_count;
        if let Some(&(src, dst)) = self
            .edges
            .iter()
            .find(|(s, d)| vertex_index(*s) >= n || vertex_index(*d) >= n)
        {
            return Err(Error::invalid_graph(format!(
                "edge ({src}, {dst}) references a vertex outside [0, {n})"
            )));
        }
        if n > VertexId::MAX as usize {
            return Err(Error::invalid_graph(format!(
                "vertex count {n} exceeds the supported maximum {}",
                VertexId::MAX
            )));
        }
        Ok(Graph::from_valid_edges(n, self.edges))
    }
}
