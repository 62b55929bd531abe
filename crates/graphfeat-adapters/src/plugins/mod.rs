//! Plugin infrastructure: parameters, tabular results and the registry.

pub mod algorithms;
mod registry;

pub use registry::FeatureRegistry;

use graphfeat_common::collections::{FeatMap, feat_map};
use graphfeat_common::types::Value;
use graphfeat_common::utils::error::{Error, Result};

/// Type of a feature parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    /// `true` / `false`.
    Boolean,
    /// Signed integer.
    Integer,
    /// Floating point; integers are accepted and widened.
    Float,
}

/// Declaration of a parameter accepted by a feature.
#[derive(Debug, Clone)]
pub struct ParameterDef {
    /// Parameter name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Expected type.
    pub param_type: ParameterType,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Default value, rendered as text.
    pub default: Option<String>,
}

/// Named parameter values passed to [`GraphFeature::compute`](algorithms::GraphFeature::compute).
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    values: FeatMap<String, Value>,
}

impl Parameters {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self { values: feat_map() }
    }

    /// Sets `name` to `value`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Sets a boolean parameter.
    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) -> &mut Self {
        self.set(name, value)
    }

    /// Sets an integer parameter.
    pub fn set_int(&mut self, name: impl Into<String>, value: i64) -> &mut Self {
        self.set(name, value)
    }

    /// Sets a float parameter.
    pub fn set_float(&mut self, name: impl Into<String>, value: f64) -> &mut Self {
        self.set(name, value)
    }

    /// Raw value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns true if `name` has been set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Boolean value of `name`, `None` if absent or of another type.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Integer value of `name`, `None` if absent or of another type.
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int64)
    }

    /// Float value of `name` (integers widened), `None` if absent or of another type.
    #[must_use]
    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_float64)
    }

    /// Boolean value of `name`, or `default` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the value is not a boolean.
    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool> {
        self.typed(name, default, Value::as_bool, "a boolean")
    }

    /// Integer value of `name`, or `default` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the value is not an integer.
    pub fn int_or(&self, name: &str, default: i64) -> Result<i64> {
        self.typed(name, default, Value::as_int64, "an integer")
    }

    /// Float value of `name`, or `default` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the value is not numeric.
    pub fn float_or(&self, name: &str, default: f64) -> Result<f64> {
        self.typed(name, default, Value::as_float64, "a number")
    }

    /// Non-negative integer value of `name`, or `default` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the value is not an integer or is negative.
    pub fn usize_or(&self, name: &str, default: usize) -> Result<usize> {
        match self.get(name) {
            None => Ok(default),
            Some(value) => value
                .as_int64()
                .and_then(|i| usize::try_from(i).ok())
                .ok_or_else(|| {
                    Error::invalid_parameter(format!(
                        "{name} must be a non-negative integer, got {} {value}",
                        value.type_name()
                    ))
                }),
        }
    }

    fn typed<T>(
        &self,
        name: &str,
        default: T,
        extract: impl Fn(&Value) -> Option<T>,
        expected: &str,
    ) -> Result<T> {
        match self.get(name) {
            None => Ok(default),
            Some(value) => extract(value).ok_or_else(|| {
                Error::invalid_parameter(format!(
                    "{name} must be {expected}, got {} {value}",
                    value.type_name()
                ))
            }),
        }
    }
}

/// Tabular output of a feature: one row per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureResult {
    /// Column names; the first is always `node_id`.
    pub columns: Vec<String>,
    /// Rows of values, one entry per column.
    pub rows: Vec<Vec<Value>>,
}

impl FeatureResult {
    /// Creates an empty result with the given columns.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates an empty result with room for `rows` rows.
    #[must_use]
    pub fn with_capacity(columns: Vec<String>, rows: usize) -> Self {
        Self {
            columns,
            rows: Vec::with_capacity(rows),
        }
    }

    /// Appends a row.
    pub fn add_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of column `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of column `name`, in row order.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }
}
