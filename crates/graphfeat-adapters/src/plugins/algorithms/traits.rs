//! The feature plugin contract.

use graphfeat_common::types::{Value, VertexId};
use graphfeat_common::utils::error::Result;
use graphfeat_core::graph::Graph;

use super::super::{FeatureResult, ParameterDef, Parameters};

/// A per-node feature computable on any [`Graph`].
///
/// Implementations are stateless apart from immutable settings, so one
/// instance can serve concurrent callers.
pub trait GraphFeature: Send + Sync {
    /// Registry name.
    fn name(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str;

    /// Parameters understood by [`compute`](Self::compute).
    fn parameters(&self) -> &[ParameterDef];

    /// Computes the feature for every vertex.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid parameters or if the computation fails.
    fn compute(&self, graph: &Graph, params: &Parameters) -> Result<FeatureResult>;
}

/// Builds a two-column `node_id` / value result.
pub struct NodeValueResultBuilder {
    result: FeatureResult,
}

impl NodeValueResultBuilder {
    /// Creates a builder for the value column `column`.
    #[must_use]
    pub fn with_capacity(column: &str, capacity: usize) -> Self {
        Self {
            result: FeatureResult::with_capacity(
                vec!["node_id".to_string(), column.to_string()],
                capacity,
            ),
        }
    }

    /// Appends the row for vertex `v`.
    pub fn push(&mut self, v: VertexId, value: Value) {
        self.result.add_row(vec![Value::from(v), value]);
    }

    /// Finishes the result.
    #[must_use]
    pub fn build(self) -> FeatureResult {
        self.result
    }
}
