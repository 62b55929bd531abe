//! Core types shared across graphfeat crates.
//!
//! - [`VertexId`] - Dense vertex identifier in `[0, n)`
//! - [`Value`] - Dynamically typed cell of a tabular feature result

mod id;
mod value;

pub use id::{VertexId, vertex_index};
pub use value::Value;
