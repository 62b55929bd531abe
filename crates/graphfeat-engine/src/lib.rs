//! # graphfeat-engine
//!
//! The public entry point of graphfeat.
//!
//! A [`FeatureEngine`] owns a [`Config`] and a dedicated worker pool and
//! exposes the five per-node features of a directed [`Graph`]:
//!
//! | Operation | Result |
//! |-----------|--------|
//! | [`clustering_coefficient`](FeatureEngine::clustering_coefficient) | `Vec<f64>` |
//! | [`k_core`](FeatureEngine::k_core) | `Vec<u32>` |
//! | [`page_rank`](FeatureEngine::page_rank) | [`PageRankResult`] |
//! | [`bfs_moments`](FeatureEngine::bfs_moments) | `Vec<BfsMoments>` |
//! | [`motif`](FeatureEngine::motif) | [`MotifCounts`] |
//!
//! ```
//! use graphfeat_engine::{Config, FeatureEngine, Graph};
//!
//! let engine = FeatureEngine::with_config(Config::default().with_threads(2))?;
//! let graph = Graph::from_edges(3, &[(0, 1), (1, 2), (2, 0)])?;
//!
//! let counts = engine.motif(&graph, 3, false)?;
//! assert_eq!(counts.total_subgraphs(), 1);
//! # Ok::<(), graphfeat_engine::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
mod engine;

pub use config::{Config, ConfigError, PageRankDefaults};
pub use engine::FeatureEngine;

pub use graphfeat_adapters::plugins::algorithms::{BfsMoments, ClusteringCoefficientResult, PageRankResult};
pub use graphfeat_adapters::plugins::{FeatureRegistry, FeatureResult, Parameters};
pub use graphfeat_common::{Error, Result, Value, VertexId};
pub use graphfeat_core::graph::{Graph, GraphBuilder};
pub use graphfeat_core::motif::{
    AcceleratorBackend, AcceleratorConfig, AcceleratorFallback, MotifCounts, MotifLevel,
};
