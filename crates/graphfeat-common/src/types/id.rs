//! Vertex identifiers.

/// Dense vertex identifier.
///
/// Graphs are indexed by contiguous integers `[0, n)`, so a `u32` doubles as
/// an index into per-vertex result vectors. Four billion vertices is far
/// beyond what the motif engine can enumerate anyway.
pub type VertexId = u32;

/// Converts a vertex ID into a slice index.
#[inline]
#[must_use]
pub const fn vertex_index(v: VertexId) -> usize {
    v as usize
}
