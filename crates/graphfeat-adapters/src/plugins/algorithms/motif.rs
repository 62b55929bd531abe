//! Motif count feature.

use std::sync::OnceLock;

use graphfeat_common::types::Value;
use graphfeat_common::utils::error::Result;
use graphfeat_core::graph::Graph;
use graphfeat_core::motif::{MotifCounts, MotifOptions, count_motifs};

use super::super::{FeatureResult, ParameterDef, ParameterType, Parameters};
use super::traits::GraphFeature;

/// Counts motifs of size `level` with default options.
///
/// # Errors
///
/// Returns [`UnsupportedMotifSize`](graphfeat_common::Error::UnsupportedMotifSize)
/// for levels other than 3 and 4, and
/// [`AcceleratorUnavailable`](graphfeat_common::Error::AcceleratorUnavailable)
/// only under a strict fallback policy.
pub fn motif(graph: &Graph, level: usize, accelerated: bool) -> Result<MotifCounts> {
    count_motifs(graph, level, accelerated, &MotifOptions::default())
}

static MOTIF_PARAMS: OnceLock<Vec<ParameterDef>> = OnceLock::new();

fn motif_params() -> &'static [ParameterDef] {
    MOTIF_PARAMS.get_or_init(|| {
        vec![
            ParameterDef {
                name: "level".to_string(),
                description: "Motif size, 3 or 4 (default: 3)".to_string(),
                param_type: ParameterType::Integer,
                required: false,
                default: Some("3".to_string()),
            },
            ParameterDef {
                name: "accelerated".to_string(),
                description: "Use the accelerated strategy (default: false)".to_string(),
                param_type: ParameterType::Boolean,
                required: false,
                default: Some("false".to_string()),
            },
        ]
    })
}

/// Motif count feature for the registry.
///
/// Emits one column per class, named `motif{level}_{class}`.
#[derive(Debug, Clone, Default)]
pub struct MotifFeature {
    options: MotifOptions,
}

impl MotifFeature {
    /// Creates the feature with explicit strategy options.
    #[must_use]
    pub fn with_options(options: MotifOptions) -> Self {
        Self { options }
    }
}

impl GraphFeature for MotifFeature {
    fn name(&self) -> &str {
        "motif"
    }

    fn description(&self) -> &str {
        "Per-vertex counts of connected 3- or 4-vertex subgraph classes"
    }

    fn parameters(&self) -> &[ParameterDef] {
        motif_params()
    }

    fn compute(&self, graph: &Graph, params: &Parameters) -> Result<FeatureResult> {
        let level = params.usize_or("level", 3)?;
        let accelerated = params.bool_or("accelerated", false)?;
        let counts = count_motifs(graph, level, accelerated, &self.options)?;

        let mut columns = Vec::with_capacity(counts.num_classes() + 1);
        columns.push("node_id".to_string());
        columns.extend((0..counts.num_classes()).map(|c| format!("motif{level}_{c}")));

        let mut output = FeatureResult::with_capacity(columns, counts.vertex_count());
        for (v, row) in counts.rows().enumerate() {
            let mut values = Vec::with_capacity(row.len() + 1);
            values.push(Value::Int64(v as i64));
            values.extend(row.iter().map(|&c| Value::Int64(c as i64)));
            output.add_row(values);
        }
        Ok(output)
    }
}
