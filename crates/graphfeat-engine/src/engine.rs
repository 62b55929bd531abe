//! The feature engine facade.

use graphfeat_adapters::plugins::algorithms::{
    self, BfsMoments, ClusteringCoefficientResult, PageRankResult,
};
use graphfeat_adapters::plugins::{FeatureRegistry, FeatureResult, Parameters};
use graphfeat_common::types::VertexId;
use graphfeat_common::utils::error::{Error, Result};
use graphfeat_core::graph::Graph;
use graphfeat_core::motif::{MotifCounts, count_motifs};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::Config;

/// Computes per-node features of directed graphs.
///
/// Every operation runs inside the engine's own worker pool, sized by
/// [`Config::threads`]. The engine never mutates a graph, so one engine can
/// serve any number of graphs concurrently.
///
/// # Examples
///
/// ```
/// use graphfeat_engine::{FeatureEngine, Graph};
///
/// let engine = FeatureEngine::new()?;
/// let graph = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 0), (2, 3)])?;
///
/// assert_eq!(engine.k_core(&graph), vec![2, 2, 2, 1]);
/// let ranks = engine.page_rank(&graph)?;
/// assert!((ranks.scores.iter().sum::<f64>() - 1.0).abs() < 1e-6);
/// # Ok::<(), graphfeat_engine::Error>(())
/// ```
pub struct FeatureEngine {
    config: Config,
    pool: ThreadPool,
    registry: FeatureRegistry,
}

impl FeatureEngine {
    /// Creates an engine with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the worker pool cannot be started.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Creates an engine with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid or the
    /// worker pool cannot be started.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("graphfeat-worker-{i}"))
            .build()
            .map_err(|e| Error::Config(format!("failed to start worker pool: {e}")))?;

        let registry = FeatureRegistry::with_motif_options(config.motif_options());

        tracing::info!(
            threads = config.threads,
            accelerator = config.accelerator.enabled,
            fallback = ?config.accelerator.fallback,
            "feature engine started"
        );

        Ok(Self {
            config,
            pool,
            registry,
        })
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the feature registry used by [`compute`](Self::compute).
    #[must_use]
    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    // ========================================================================
    // Clustering
    // ========================================================================

    /// Directed local clustering coefficient per vertex.
    #[must_use]
    pub fn clustering_coefficient(&self, graph: &Graph) -> Vec<f64> {
        self.clustering(graph).coefficients
    }

    /// Clustering coefficients together with triangle counts and the global
    /// coefficient.
    #[must_use]
    pub fn clustering(&self, graph: &Graph) -> ClusteringCoefficientResult {
        let _span = tracing::info_span!("clustering", vertices = graph.vertex_count()).entered();
        self.pool.install(|| {
            #[cfg(feature = "parallel")]
            {
                algorithms::clustering_parallel(graph, self.config.parallel_threshold)
            }
            #[cfg(not(feature = "parallel"))]
            {
                algorithms::clustering(graph)
            }
        })
    }

    // ========================================================================
    // K-core
    // ========================================================================

    /// Coreness of every vertex.
    #[must_use]
    pub fn k_core(&self, graph: &Graph) -> Vec<u32> {
        let _span = tracing::info_span!("k_core", vertices = graph.vertex_count()).entered();
        self.pool.install(|| algorithms::k_core(graph))
    }

    /// Vertices of the `k`-core, in ascending ID order.
    #[must_use]
    pub fn k_core_members(&self, graph: &Graph, k: u32) -> Vec<VertexId> {
        self.pool.install(|| algorithms::k_core_members(graph, k))
    }

    // ========================================================================
    // PageRank
    // ========================================================================

    /// PageRank with the configured defaults.
    ///
    /// A run that hits the iteration cap is returned with
    /// `converged == false`; see [`PageRankResult::require_converged`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] only if the configured defaults
    /// are out of range, which [`Config::validate`] already rules out.
    pub fn page_rank(&self, graph: &Graph) -> Result<PageRankResult> {
        let defaults = self.config.page_rank;
        self.page_rank_with(
            graph,
            defaults.damping,
            defaults.tolerance,
            defaults.max_iterations,
        )
    }

    /// PageRank with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `damping` is outside (0, 1),
    /// `tolerance` is negative or not finite, or `max_iterations` is zero.
    pub fn page_rank_with(
        &self,
        graph: &Graph,
        damping: f64,
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<PageRankResult> {
        let _span = tracing::info_span!("page_rank", vertices = graph.vertex_count()).entered();
        self.pool
            .install(|| algorithms::page_rank(graph, damping, tolerance, max_iterations))
    }

    // ========================================================================
    // BFS moments
    // ========================================================================

    /// Mean and variance of BFS distances from every vertex.
    #[must_use]
    pub fn bfs_moments(&self, graph: &Graph) -> Vec<BfsMoments> {
        let _span = tracing::info_span!("bfs_moments", vertices = graph.vertex_count()).entered();
        self.pool.install(|| algorithms::bfs_moments(graph))
    }

    /// BFS moments from `count` sources drawn with a seeded generator.
    #[must_use]
    pub fn bfs_moments_sampled(
        &self,
        graph: &Graph,
        count: usize,
        seed: u64,
    ) -> Vec<(VertexId, BfsMoments)> {
        self.pool
            .install(|| algorithms::bfs_moments_sampled(graph, count, seed))
    }

    // ========================================================================
    // Motifs
    // ========================================================================

    /// Per-vertex counts of connected `level`-vertex subgraphs by class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMotifSize`] for levels other than 3 and 4,
    /// and [`Error::AcceleratorUnavailable`] when `accelerated` is requested,
    /// no accelerator is usable, and the fallback policy is
    /// [`AcceleratorFallback::Fail`](crate::AcceleratorFallback::Fail).
    pub fn motif(&self, graph: &Graph, level: usize, accelerated: bool) -> Result<MotifCounts> {
        let options = self.config.motif_options();
        self.pool
            .install(|| count_motifs(graph, level, accelerated, &options))
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Runs a registered feature by name and returns its table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFeature`] for unregistered names, otherwise
    /// whatever the feature returns.
    pub fn compute(&self, name: &str, graph: &Graph, params: &Parameters) -> Result<FeatureResult> {
        let _span = tracing::info_span!("compute", feature = name).entered();
        self.pool
            .install(|| self.registry.compute(name, graph, params))
    }
}

impl std::fmt::Debug for FeatureEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureEngine")
            .field("config", &self.config)
            .field("features", &self.registry.names())
            .finish()
    }
}
