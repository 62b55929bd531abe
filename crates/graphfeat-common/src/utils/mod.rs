//! Common utilities used throughout graphfeat.
//!
//! - [`error`] - The [`Error`] enum and [`Result`] alias

pub mod error;

pub use error::{Error, Result};
