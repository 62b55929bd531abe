//! Error types for graphfeat.
//!
//! Every public operation returns [`Result<T>`]. Computations are pure
//! functions of their input graph, so none of these errors is retried
//! internally: running the same request again reproduces the same error.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building graphs or computing features.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed vertex or edge references, or conflicting construction input.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Motif level outside the supported set.
    #[error("unsupported motif size {0}: expected 3 or 4")]
    UnsupportedMotifSize(usize),

    /// Accelerated execution was requested but no device can serve it.
    #[error("accelerator unavailable: {0}")]
    AcceleratorUnavailable(String),

    /// PageRank hit its iteration cap before reaching the tolerance.
    #[error("PageRank did not converge after {iterations} iterations (residual {residual:e})")]
    NonConvergence {
        /// Iterations performed.
        iterations: usize,
        /// L1 change observed in the last iteration.
        residual: f64,
    },

    /// A feature parameter has the wrong type or an out-of-range value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No feature is registered under the requested name.
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    /// The engine configuration was rejected.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates an [`Error::InvalidGraph`].
    #[must_use]
    pub fn invalid_graph(msg: impl Into<String>) -> Self {
        Error::InvalidGraph(msg.into())
    }

    /// Creates an [`Error::InvalidParameter`].
    #[must_use]
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }

    /// Returns true if the result that accompanied this error is still usable.
    ///
    /// Only non-convergence qualifies: PageRank still produced scores.
    #[must_use]
    pub fn is_best_effort(&self) -> bool {
        matches!(self, Error::NonConvergence { .. })
    }
}
