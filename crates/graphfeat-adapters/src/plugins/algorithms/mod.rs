//! Per-node graph features.
//!
//! ## Feature Categories
//!
//! - [`clustering`] - Directed clustering coefficient, triangle counts
//! - [`structure`] - K-core decomposition
//! - [`centrality`] - PageRank
//! - [`traversal`] - BFS layers and distance moments
//! - [`motif`] - Connected subgraph counts
//!
//! ## Usage
//!
//! ```
//! use graphfeat_adapters::plugins::algorithms::{clustering_coefficient, k_core, page_rank};
//! use graphfeat_core::graph::Graph;
//!
//! let graph = Graph::from_edges(3, &[(0, 1), (1, 2), (2, 0)])?;
//! assert_eq!(k_core(&graph), vec![2, 2, 2]);
//! assert_eq!(clustering_coefficient(&graph), vec![0.5, 0.5, 0.5]);
//! let ranks = page_rank(&graph, 0.85, 1e-6, 100)?;
//! assert!(ranks.converged);
//! # Ok::<(), graphfeat_common::Error>(())
//! ```

pub mod centrality;
pub mod clustering;
pub mod motif;
pub mod structure;
pub mod traversal;
mod traits;

// Core traits
pub use traits::{GraphFeature, NodeValueResultBuilder};

// Feature functions
pub use centrality::{
    DEFAULT_DAMPING, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, PageRankResult, page_rank,
};
#[cfg(feature = "parallel")]
pub use clustering::clustering_parallel;
pub use clustering::{
    ClusteringCoefficientResult, clustering, clustering_coefficient, global_clustering_coefficient,
    triangle_count,
};
pub use motif::motif;
pub use structure::{KCoreResult, k_core, k_core_members, kcore_decomposition};
pub use traversal::{BfsMoments, bfs_layers, bfs_moments, bfs_moments_from, bfs_moments_sampled};

// Feature wrappers
pub use centrality::PageRankFeature;
pub use clustering::ClusteringCoefficientFeature;
pub use motif::MotifFeature;
pub use structure::KCoreFeature;
pub use traversal::BfsMomentsFeature;
