//! Name-based feature lookup.

use std::sync::Arc;

use graphfeat_common::collections::{FeatMap, feat_map};
use graphfeat_common::utils::error::{Error, Result};
use graphfeat_core::graph::Graph;
use graphfeat_core::motif::MotifOptions;
use parking_lot::RwLock;

use super::algorithms::{
    BfsMomentsFeature, ClusteringCoefficientFeature, GraphFeature, KCoreFeature, MotifFeature,
    PageRankFeature,
};
use super::{FeatureResult, Parameters};

/// Registry of features keyed by name.
///
/// [`new`](Self::new) and [`Default`] both start with the five built-in
/// features; [`empty`](Self::empty) starts with none. Registration and lookup
/// may happen from different threads.
pub struct FeatureRegistry {
    features: RwLock<FeatMap<String, Arc<dyn GraphFeature>>>,
}

impl FeatureRegistry {
    /// Creates a registry holding the five built-in features.
    #[must_use]
    pub fn new() -> Self {
        Self::with_motif_options(MotifOptions::default())
    }

    /// Creates a registry with no features.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            features: RwLock::new(feat_map()),
        }
    }

    /// Like [`new`](Self::new), with explicit motif options.
    #[must_use]
    pub fn with_motif_options(options: MotifOptions) -> Self {
        let registry = Self::empty();
        registry.register(Arc::new(ClusteringCoefficientFeature));
        registry.register(Arc::new(KCoreFeature));
        registry.register(Arc::new(PageRankFeature));
        registry.register(Arc::new(BfsMomentsFeature));
        registry.register(Arc::new(MotifFeature::with_options(options)));
        registry
    }

    /// Registers `feature` under its name, returning the one it replaced.
    pub fn register(&self, feature: Arc<dyn GraphFeature>) -> Option<Arc<dyn GraphFeature>> {
        let name = feature.name().to_string();
        let previous = self.features.write().insert(name.clone(), feature);
        if previous.is_some() {
            tracing::debug!(feature = %name, "feature replaced");
        }
        previous
    }

    /// Looks up a feature by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFeature`] if nothing is registered under `name`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn GraphFeature>> {
        self.features
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownFeature(name.to_string()))
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.features.read().contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.features.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.read().len()
    }

    /// Returns true if no feature is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.read().is_empty()
    }

    /// Runs the feature registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFeature`] for unregistered names and any error
    /// of the feature itself.
    pub fn compute(&self, name: &str, graph: &Graph, params: &Parameters) -> Result<FeatureResult> {
        let feature = self.get(name)?;
        feature.compute(graph, params)
    }
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::new()
    }
}
