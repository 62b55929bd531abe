//! Compressed sparse row adjacency.

use graphfeat_common::types::{VertexId, vertex_index};

/// Sorted, deduplicated adjacency rows packed into two flat arrays.
///
/// Row `v` is `targets[offsets[v]..offsets[v + 1]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrAdjacency {
    offsets: Vec<usize>,
    targets: Vec<VertexId>,
}

impl CsrAdjacency {
    /// Builds adjacency for `n` vertices from `(source, target)` pairs.
    ///
    /// Pairs are sorted and duplicates collapsed. Every endpoint must already
    /// be known to be below `n`.
    pub(crate) fn from_pairs(n: usize, mut pairs: Vec<(VertexId, VertexId)>) -> Self {
        pairs.sort_unstable();
        pairs.dedup();

        let mut offsets = vec![0usize; n + 1];
        for &(src, _) in &pairs {
            offsets[vertex_index(src) + 1] += 1;
        }
        for v in 0..n {
            offsets[v + 1] += offsets[v];
        }

        let targets = pairs.into_iter().map(|(_, dst)| dst).collect();
        Self { offsets, targets }
    }

    /// Returns the number of rows.
    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Returns the total number of stored entries.
    #[inline]
    #[must_use]
    pub fn num_entries(&self) -> usize {
        self.targets.len()
    }

    /// Returns row `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not below [`num_rows`](Self::num_rows).
    #[inline]
    #[must_use]
    pub fn row(&self, v: VertexId) -> &[VertexId] {
        let v = vertex_index(v);
        &self.targets[self.offsets[v]..self.offsets[v + 1]]
    }

    /// Returns the length of row `v`.
    #[inline]
    #[must_use]
    pub fn row_len(&self, v: VertexId) -> usize {
        let v = vertex_index(v);
        self.offsets[v + 1] - self.offsets[v]
    }

    /// Returns true if row `v` contains `w`. Out-of-range `v` yields false.
    #[inline]
    #[must_use]
    pub fn contains(&self, v: VertexId, w: VertexId) -> bool {
        vertex_index(v) < self.num_rows() && self.row(v).binary_search(&w).is_ok()
    }

    /// Row offsets, `num_rows() + 1` entries starting at zero.
    #[must_use]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Concatenated row contents.
    #[must_use]
    pub fn targets(&self) -> &[VertexId] {
        &self.targets
    }
}
