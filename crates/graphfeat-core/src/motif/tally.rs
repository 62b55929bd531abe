//! Per-vertex motif tallies.
//!
//! Workers record occurrences into a sparse [`BatchTally`] per seed batch and
//! flush it into the single dense [`SharedTally`] when the batch is done, so
//! the only `vertices * classes` buffer is the shared one.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use graphfeat_common::collections::{FeatMap, feat_map};
use graphfeat_common::types::{VertexId, vertex_index};

use super::MotifLevel;

/// Dense counters shared by all workers, `num_classes` per vertex.
#[derive(Debug)]
pub(crate) struct SharedTally {
    num_classes: usize,
    counts: Box<[AtomicU64]>,
}

impl SharedTally {
    pub(crate) fn zeroed(num_vertices: usize, num_classes: usize) -> Self {
        Self {
            num_classes,
            counts: (0..num_vertices * num_classes)
                .map(|_| AtomicU64::new(0))
                .collect(),
        }
    }

    /// Adds one occurrence of `class` for each vertex in `members`.
    #[cfg(feature = "accelerator")]
    #[inline]
    pub(crate) fn record(&self, members: &[VertexId], class: usize) {
        for &v in members {
            self.counts[vertex_index(v) * self.num_classes + class].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Adds every counter of `batch` and empties it.
    pub(crate) fn absorb(&self, batch: &mut BatchTally) {
        for (index, count) in batch.counts.drain() {
            self.counts[index].fetch_add(count, Ordering::Relaxed);
        }
    }

    pub(crate) fn into_counts(self, level: MotifLevel, num_vertices: usize) -> MotifCounts {
        let counts = self
            .counts
            .into_vec()
            .into_iter()
            .map(AtomicU64::into_inner)
            .collect();
        MotifCounts::from_raw(level, num_vertices, counts)
    }
}

/// Sparse counters for one seed batch, keyed by flat `vertex * classes + class`.
#[derive(Debug)]
pub(crate) struct BatchTally {
    num_classes: usize,
    counts: FeatMap<usize, u64>,
}

impl BatchTally {
    pub(crate) fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            counts: feat_map(),
        }
    }

    /// Adds one occurrence of `class` for each vertex in `members`.
    #[inline]
    pub(crate) fn record(&mut self, members: &[VertexId], class: usize) {
        for &v in members {
            *self
                .counts
                .entry(vertex_index(v) * self.num_classes + class)
                .or_insert(0) += 1;
        }
    }

    /// Number of distinct counters touched since the last flush.
    pub(crate) fn len(&self) -> usize {
        self.counts.len()
    }
}

/// Motif occurrence counts for every vertex of a graph.
///
/// Row `v` holds, for each class index, the number of connected induced
/// subgraphs of that class that contain `v`. Each occurrence is therefore
/// counted once per member, `k` times in total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotifCounts {
    level: MotifLevel,
    num_vertices: usize,
    counts: Vec<u64>,
}

impl MotifCounts {
    /// Wraps a dense row-major buffer of `num_vertices * level.num_classes()`
    /// counters.
    ///
    /// # Panics
    ///
    /// Panics if the buffer length does not match.
    #[must_use]
    pub fn from_raw(level: MotifLevel, num_vertices: usize, counts: Vec<u64>) -> Self {
        assert_eq!(
            counts.len(),
            num_vertices * level.num_classes(),
            "tally buffer does not match vertex and class counts"
        );
        Self {
            level,
            num_vertices,
            counts,
        }
    }

    /// The motif level these counts were computed for.
    #[must_use]
    pub fn level(&self) -> MotifLevel {
        self.level
    }

    /// Number of classes per vertex row.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.level.num_classes()
    }

    /// Number of vertex rows.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.num_vertices
    }

    /// Dense class counts of vertex `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is out of range.
    #[must_use]
    pub fn vertex(&self, v: VertexId) -> &[u64] {
        let c = self.num_classes();
        let start = vertex_index(v) * c;
        &self.counts[start..start + c]
    }

    /// Count of `class` at vertex `v`, zero when either is out of range.
    #[must_use]
    pub fn get(&self, v: VertexId, class: usize) -> u64 {
        let c = self.num_classes();
        if vertex_index(v) >= self.num_vertices || class >= c {
            return 0;
        }
        self.counts[vertex_index(v) * c + class]
    }

    /// Nonzero class counts of vertex `v`, keyed by class index.
    #[must_use]
    pub fn vertex_map(&self, v: VertexId) -> BTreeMap<usize, u64> {
        self.vertex(v)
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(class, &count)| (class, count))
            .collect()
    }

    /// Iterates over vertex rows in ID order.
    pub fn rows(&self) -> impl Iterator<Item = &[u64]> + '_ {
        self.counts.chunks_exact(self.num_classes())
    }

    /// Number of distinct connected subgraphs counted.
    #[must_use]
    pub fn total_subgraphs(&self) -> u64 {
        self.counts.iter().sum::<u64>() / self.level.size() as u64
    }

    /// Graph-wide number of occurrences of each class.
    #[must_use]
    pub fn class_totals(&self) -> Vec<u64> {
        let k = self.level.size() as u64;
        let mut totals = vec![0u64; self.num_classes()];
        for row in self.rows() {
            for (total, &count) in totals.iter_mut().zip(row) {
                *total += count;
            }
        }
        totals.iter_mut().for_each(|t| *t /= k);
        totals
    }

    /// The flat row-major buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[u64] {
        &self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_flush_into_shared() {
        let shared = SharedTally::zeroed(3, 13);
        let mut a = BatchTally::new(13);
        a.record(&[0, 1, 2], 4);
        let mut b = BatchTally::new(13);
        b.record(&[0, 1, 2], 4);
        b.record(&[0, 1, 2], 7);
        assert_eq!(b.len(), 6);

        shared.absorb(&mut a);
        shared.absorb(&mut b);
        assert_eq!(b.len(), 0);

        let counts = shared.into_counts(MotifLevel::Three, 3);
        assert_eq!(counts.get(0, 4), 2);
        assert_eq!(counts.get(2, 7), 1);
        assert_eq!(counts.total_subgraphs(), 3);
        assert_eq!(counts.class_totals()[4], 2);
    }

    #[cfg(feature = "accelerator")]
    #[test]
    fn test_shared_record_from_threads() {
        let shared = SharedTally::zeroed(2, 13);
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        shared.record(&[0, 1], 3);
                    }
                });
            }
        });
        let counts = shared.into_counts(MotifLevel::Three, 2);
        assert_eq!(counts.get(0, 3), 100);
        assert_eq!(counts.get(1, 3), 100);
    }

    #[test]
    fn test_untouched_tally_is_all_zero() {
        let counts = SharedTally::zeroed(4, 199).into_counts(MotifLevel::Four, 4);
        assert_eq!(counts.vertex_count(), 4);
        assert!(counts.as_slice().iter().all(|&c| c == 0));
        assert!(counts.vertex_map(3).is_empty());
    }

    #[test]
    fn test_vertex_map_sparse() {
        let mut raw = vec![0u64; 2 * 13];
        raw[13 + 5] = 9;
        let counts = MotifCounts::from_raw(MotifLevel::Three, 2, raw);
        let map = counts.vertex_map(1);
        assert_eq!(map.len(), 1);
        assert_eq!(map[&5], 9);
        assert_eq!(counts.get(7, 0), 0);
        assert_eq!(counts.rows().count(), 2);
    }
}
