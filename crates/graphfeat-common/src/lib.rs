//! # graphfeat-common
//!
//! Foundation types shared by every graphfeat crate.
//!
//! ## Modules
//!
//! - [`types`] - Vertex identifiers and dynamically typed result values
//! - [`collections`] - FxHash-backed map and set aliases
//! - [`utils`] - The crate-wide [`Error`](utils::error::Error) type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collections;
pub mod types;
pub mod utils;

pub use types::{Value, VertexId};
pub use utils::error::{Error, Result};
