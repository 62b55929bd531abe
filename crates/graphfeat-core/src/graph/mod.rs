//! Immutable graph storage.
//!
//! A [`Graph`] is built once from an edge list, a [`GraphBuilder`] or raw CSR
//! arrays and is never mutated afterwards. It keeps three sorted adjacency
//! views side by side:
//!
//! | View | Contents | Used by |
//! |------|----------|---------|
//! | out | `v -> w` targets, self-loops included | PageRank, BFS |
//! | in | `w -> v` sources, self-loops included | in-degree, reversal |
//! | undirected | union of in and out, self excluded | motifs, clustering, k-core |
//!
//! All rows are sorted and deduplicated, so membership tests are binary
//! searches.

mod builder;
mod csr;
mod store;

pub use builder::GraphBuilder;
pub use csr::CsrAdjacency;
pub use store::Graph;
