//! # graphfeat-adapters
//!
//! Per-node feature plugins on top of [`graphfeat_core`].
//!
//! Every feature is available both as a plain function returning its native
//! result type and as a [`GraphFeature`](plugins::algorithms::GraphFeature)
//! plugin producing a tabular [`FeatureResult`](plugins::FeatureResult), so
//! callers can drive all features by name through a
//! [`FeatureRegistry`](plugins::FeatureRegistry).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod plugins;
