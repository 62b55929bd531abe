//! Canonical isomorphism classes of small directed patterns.
//!
//! An ordering of `k` vertices turns an induced subgraph into a `k(k-1)`-bit
//! pattern: the ordered pair `(i, j)`, `i != j`, owns bit
//! [`pattern_slot(k, i, j)`](pattern_slot). Relabeling the vertices permutes
//! the bits, so the canonical code of a pattern is the smallest code reachable
//! through any of the `k!` relabelings. Weakly connected canonical codes,
//! sorted ascending, are numbered `0..num_classes` and those numbers are the
//! stable class indices used everywhere else.
//!
//! The per-level lookup table covers all `2^(k(k-1))` patterns (64 entries for
//! `k = 3`, 4096 for `k = 4`) and is built on first use, then shared for the
//! life of the process.

use std::sync::OnceLock;

use graphfeat_common::types::VertexId;
use graphfeat_common::utils::error::{Error, Result};

use super::MotifLevel;
use crate::graph::Graph;

/// Table entry for patterns that are not weakly connected.
const NO_CLASS: u16 = u16::MAX;

static CATALOG_THREE: OnceLock<MotifCatalog> = OnceLock::new();
static CATALOG_FOUR: OnceLock<MotifCatalog> = OnceLock::new();

/// Returns the shared catalog for `level`, building it on first use.
#[must_use]
pub fn catalog(level: MotifLevel) -> &'static MotifCatalog {
    match level {
        MotifLevel::Three => CATALOG_THREE.get_or_init(|| MotifCatalog::build(level)),
        MotifLevel::Four => CATALOG_FOUR.get_or_init(|| MotifCatalog::build(level)),
    }
}

/// Bit position of the ordered pair `(i, j)` in a `k`-vertex pattern.
#[inline]
#[must_use]
pub const fn pattern_slot(k: usize, i: usize, j: usize) -> usize {
    i * (k - 1) + if j < i { j } else { j - 1 }
}

/// Encodes the pattern whose edge `i -> j` is present iff `edge(i, j)`.
#[inline]
pub fn encode_pattern<F>(k: usize, mut edge: F) -> u32
where
    F: FnMut(usize, usize) -> bool,
{
    let mut code = 0u32;
    for i in 0..k {
        for j in 0..k {
            if i != j && edge(i, j) {
                code |= 1 << pattern_slot(k, i, j);
            }
        }
    }
    code
}

/// Returns true if the `k`-vertex pattern `code` is weakly connected.
#[must_use]
pub fn is_connected(k: usize, code: u32) -> bool {
    let mut adjacency = [0u8; 4];
    for i in 0..k {
        for j in 0..k {
            if i != j && code & (1 << pattern_slot(k, i, j)) != 0 {
                adjacency[i] |= 1 << j;
                adjacency[j] |= 1 << i;
            }
        }
    }

    let full = (1u8 << k) - 1;
    let mut seen = 1u8;
    let mut frontier = 1u8;
    while frontier != 0 {
        let mut next = 0u8;
        for (i, adj) in adjacency.iter().enumerate().take(k) {
            if frontier & (1 << i) != 0 {
                next |= adj;
            }
        }
        frontier = next & !seen;
        seen |= next;
    }
    seen & full == full
}

fn permutations(k: usize) -> Vec<[usize; 4]> {
    fn extend(k: usize, prefix: &mut Vec<usize>, out: &mut Vec<[usize; 4]>) {
        if prefix.len() == k {
            let mut perm = [0usize; 4];
            perm[..k].copy_from_slice(prefix);
            out.push(perm);
            return;
        }
        for v in 0..k {
            if !prefix.contains(&v) {
                prefix.push(v);
                extend(k, prefix, out);
                prefix.pop();
            }
        }
    }

    let mut out = Vec::new();
    extend(k, &mut Vec::with_capacity(k), &mut out);
    out
}

fn relabel(k: usize, code: u32, perm: &[usize; 4]) -> u32 {
    encode_pattern(k, |i, j| {
        // Vertex i of the relabeled pattern was vertex perm[i] before.
        code & (1 << pattern_slot(k, perm[i], perm[j])) != 0
    })
}

/// Lookup tables for one motif level.
#[derive(Debug)]
pub struct MotifCatalog {
    level: MotifLevel,
    table: Box<[u16]>,
    canonical: Vec<u32>,
}

impl MotifCatalog {
    fn build(level: MotifLevel) -> Self {
        let k = level.size();
        let perms = permutations(k);
        let patterns = 1usize << level.pattern_bits();

        let canonical_of: Vec<u32> = (0..patterns as u32)
            .map(|code| {
                perms
                    .iter()
                    .map(|perm| relabel(k, code, perm))
                    .min()
                    .unwrap_or(code)
            })
            .collect();

        let mut canonical: Vec<u32> = canonical_of
            .iter()
            .copied()
            .filter(|&c| is_connected(k, c))
            .collect();
        canonical.sort_unstable();
        canonical.dedup();
        debug_assert_eq!(canonical.len(), level.num_classes());

        let table = canonical_of
            .iter()
            .map(|&c| match canonical.binary_search(&c) {
                Ok(class) => class as u16,
                Err(_) => NO_CLASS,
            })
            .collect();

        tracing::debug!(
            level = k,
            classes = canonical.len(),
            patterns,
            "motif catalog built"
        );

        Self {
            level,
            table,
            canonical,
        }
    }

    /// The level this catalog describes.
    #[must_use]
    pub fn level(&self) -> MotifLevel {
        self.level
    }

    /// Number of classes: 13 for three vertices, 199 for four.
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.canonical.len()
    }

    /// Class of a raw pattern code, or `None` if it is disconnected.
    ///
    /// Codes outside the pattern range also yield `None`.
    #[inline]
    #[must_use]
    pub fn classify(&self, code: u32) -> Option<usize> {
        match self.table.get(code as usize) {
            Some(&class) if class != NO_CLASS => Some(class as usize),
            _ => None,
        }
    }

    /// The lookup table widened for device upload; disconnected patterns map
    /// to `u32::MAX`.
    #[cfg(feature = "cuda")]
    pub(crate) fn device_table(&self) -> Vec<u32> {
        self.table
            .iter()
            .map(|&class| {
                if class == NO_CLASS {
                    u32::MAX
                } else {
                    u32::from(class)
                }
            })
            .collect()
    }

    /// Canonical (minimum) pattern code of `class`.
    #[must_use]
    pub fn canonical_code(&self, class: usize) -> Option<u32> {
        self.canonical.get(class).copied()
    }

    /// Edge list of the canonical pattern of `class`, as `(from, to)` positions.
    #[must_use]
    pub fn class_edges(&self, class: usize) -> Option<Vec<(usize, usize)>> {
        let code = self.canonical_code(class)?;
        let k = self.level.size();
        let mut edges = Vec::new();
        for i in 0..k {
            for j in 0..k {
                if i != j && code & (1 << pattern_slot(k, i, j)) != 0 {
                    edges.push((i, j));
                }
            }
        }
        Some(edges)
    }

    /// Classifies a pattern given as an edge list over positions `0..k`.
    ///
    /// Returns `Ok(None)` for disconnected patterns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for self-loops or positions outside
    /// `0..k`.
    pub fn classify_edges(&self, edges: &[(usize, usize)]) -> Result<Option<usize>> {
        let k = self.level.size();
        let mut code = 0u32;
        for &(i, j) in edges {
            if i >= k || j >= k || i == j {
                return Err(Error::invalid_parameter(format!(
                    "pattern edge ({i}, {j}) is not a valid pair of distinct positions below {k}"
                )));
            }
            code |= 1 << pattern_slot(k, i, j);
        }
        Ok(self.classify(code))
    }

    /// Classifies the subgraph of `graph` induced by `vertices`.
    ///
    /// Self-loops are ignored.
    #[inline]
    #[must_use]
    pub fn classify_vertices(&self, graph: &Graph, vertices: &[VertexId]) -> Option<usize> {
        let code = encode_pattern(vertices.len(), |i, j| {
            graph.has_edge(vertices[i], vertices[j])
        });
        self.classify(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_slot_layout() {
        let slots: Vec<usize> = [(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)]
            .iter()
            .map(|&(i, j)| pattern_slot(3, i, j))
            .collect();
        assert_eq!(slots, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(pattern_slot(4, 3, 2), 11);
    }

    #[test]
    fn test_class_counts() {
        assert_eq!(catalog(MotifLevel::Three).num_classes(), 13);
        assert_eq!(catalog(MotifLevel::Four).num_classes(), 199);
    }

    #[test]
    fn test_canonical_codes_sorted_and_connected() {
        for level in [MotifLevel::Three, MotifLevel::Four] {
            let cat = catalog(level);
            let codes: Vec<u32> = (0..cat.num_classes())
                .map(|c| cat.canonical_code(c).unwrap())
                .collect();
            assert!(codes.windows(2).all(|w| w[0] < w[1]));
            assert!(codes.iter().all(|&c| is_connected(level.size(), c)));
            for (class, &code) in codes.iter().enumerate() {
                assert_eq!(cat.classify(code), Some(class));
            }
        }
    }

    #[test]
    fn test_cycle_rotations_share_class() {
        let cat = catalog(MotifLevel::Three);
        let cycle = cat.classify_edges(&[(0, 1), (1, 2), (2, 0)]).unwrap();
        let reversed = cat.classify_edges(&[(1, 0), (2, 1), (0, 2)]).unwrap();
        assert!(cycle.is_some());
        assert_eq!(cycle, reversed);

        let transitive = cat.classify_edges(&[(0, 1), (1, 2), (0, 2)]).unwrap();
        assert_ne!(cycle, transitive);
    }

    #[test]
    fn test_disconnected_has_no_class() {
        let cat = catalog(MotifLevel::Three);
        assert_eq!(cat.classify(0), None);
        assert_eq!(cat.classify_edges(&[(0, 1)]).unwrap(), None);

        let cat = catalog(MotifLevel::Four);
        assert_eq!(cat.classify_edges(&[(0, 1), (2, 3)]).unwrap(), None);
        assert_eq!(cat.classify(1 << 20), None);
    }

    #[test]
    fn test_classify_edges_rejects_bad_positions() {
        let cat = catalog(MotifLevel::Three);
        assert!(cat.classify_edges(&[(0, 3)]).is_err());
        assert!(cat.classify_edges(&[(1, 1)]).is_err());
    }

    #[test]
    fn test_class_edges_round_trip() {
        let cat = catalog(MotifLevel::Four);
        for class in 0..cat.num_classes() {
            let edges = cat.class_edges(class).unwrap();
            assert_eq!(cat.classify_edges(&edges).unwrap(), Some(class));
        }
        assert!(cat.class_edges(199).is_none());
    }

    #[test]
    fn test_is_connected() {
        assert!(is_connected(3, encode_pattern(3, |i, j| i + 1 == j)));
        assert!(!is_connected(3, encode_pattern(3, |i, j| i == 0 && j == 1)));
        assert!(is_connected(4, encode_pattern(4, |i, j| i == 0 && j > 0)));
    }

    #[test]
    fn test_classify_vertices_ignores_order() {
        let graph = Graph::from_edges(3, &[(0, 1), (1, 2), (0, 0)]).unwrap();
        let cat = catalog(MotifLevel::Three);
        let a = cat.classify_vertices(&graph, &[0, 1, 2]);
        let b = cat.classify_vertices(&graph, &[2, 0, 1]);
        assert!(a.is_some());
        assert_eq!(a, b);
    }
}
