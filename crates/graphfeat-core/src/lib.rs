//! # graphfeat-core
//!
//! The compute layer of graphfeat: an immutable CSR graph store and the
//! motif counting engine.
//!
//! ## Modules
//!
//! - [`graph`] - Immutable adjacency with directed and undirected views
//! - [`motif`] - Connected-subgraph enumeration, classification and tallies
//!
//! ## Features
//!
//! - `accelerator` (default) - the level-synchronous frontier strategy
//! - `cuda` - runs the frontier kernels on an NVIDIA device through `cudarc`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
pub mod motif;

pub use graph::{Graph, GraphBuilder};
pub use motif::{MotifCounts, MotifLevel};
