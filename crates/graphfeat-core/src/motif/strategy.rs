//! Execution strategy selection for motif counting.

use std::fmt;

use graphfeat_common::utils::error::{Error, Result};

use super::cpu::CpuStrategy;
use super::tally::MotifCounts;
use super::MotifLevel;
use crate::graph::Graph;

/// Default number of seeds handed to a worker (or a device batch) at once.
pub const DEFAULT_SEED_BATCH: usize = 256;

/// A way of running enumeration, classification and tallying.
///
/// Implementations must agree exactly: for the same graph and level every
/// strategy returns identical [`MotifCounts`].
pub trait MotifStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Counts motifs of `level` for every vertex of `graph`.
    ///
    /// # Errors
    ///
    /// Returns an error if the strategy cannot run on this graph.
    fn count(&self, graph: &Graph, level: MotifLevel) -> Result<MotifCounts>;
}

/// What to do when accelerated execution is requested but unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceleratorFallback {
    /// Fail with [`Error::AcceleratorUnavailable`].
    Fail,
    /// Log a warning and run the CPU strategy instead.
    #[default]
    Cpu,
}

/// Where the accelerated strategy runs its kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcceleratorBackend {
    /// An NVIDIA device opened through CUDA. Needs the `cuda` feature and a
    /// device at [`AcceleratorConfig::ordinal`].
    #[default]
    Cuda,
    /// The same kernels on the host thread pool. Always available; used to
    /// check the frontier algorithm without a device.
    Host,
}

impl fmt::Display for AcceleratorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cuda => write!(f, "cuda"),
            Self::Host => write!(f, "host"),
        }
    }
}

/// Settings for the accelerated strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceleratorConfig {
    /// Whether the accelerator may be used at all.
    pub enabled: bool,
    /// Policy when the accelerator cannot serve a request.
    pub fallback: AcceleratorFallback,
    /// Kernel backend.
    pub backend: AcceleratorBackend,
    /// CUDA device ordinal.
    pub ordinal: usize,
    /// Threads per block; also the compaction granularity on the host.
    pub block_size: usize,
    /// Upper bound on the frontier states one expansion wave may produce.
    pub lanes: usize,
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fallback: AcceleratorFallback::Cpu,
            backend: AcceleratorBackend::Cuda,
            ordinal: 0,
            block_size: 256,
            lanes: 1 << 16,
        }
    }
}

impl AcceleratorConfig {
    /// A configuration with the accelerator switched off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// A configuration running the kernels on the host thread pool.
    #[must_use]
    pub fn host() -> Self {
        Self {
            backend: AcceleratorBackend::Host,
            ..Self::default()
        }
    }

    /// Sets the fallback policy.
    #[must_use]
    pub fn with_fallback(mut self, fallback: AcceleratorFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Sets the launch geometry.
    #[must_use]
    pub fn with_geometry(mut self, block_size: usize, lanes: usize) -> Self {
        self.block_size = block_size;
        self.lanes = lanes;
        self
    }
}

/// Options shared by all motif strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotifOptions {
    /// Seeds per work unit.
    pub seed_batch: usize,
    /// Accelerator settings.
    pub accelerator: AcceleratorConfig,
}

impl Default for MotifOptions {
    fn default() -> Self {
        Self {
            seed_batch: DEFAULT_SEED_BATCH,
            accelerator: AcceleratorConfig::default(),
        }
    }
}

impl MotifOptions {
    /// Checks that all sizes are positive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.seed_batch == 0 {
            return Err(Error::invalid_parameter("seed_batch must be at least 1"));
        }
        if self.accelerator.block_size == 0 {
            return Err(Error::invalid_parameter(
                "accelerator block_size must be at least 1",
            ));
        }
        if self.accelerator.lanes == 0 {
            return Err(Error::invalid_parameter("accelerator lanes must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(feature = "accelerator")]
fn accelerated_strategy(
    options: &MotifOptions,
) -> std::result::Result<Box<dyn MotifStrategy>, String> {
    super::accelerated::AcceleratedStrategy::probe(options)
        .map(|s| Box::new(s) as Box<dyn MotifStrategy>)
}

#[cfg(not(feature = "accelerator"))]
fn accelerated_strategy(
    _options: &MotifOptions,
) -> std::result::Result<Box<dyn MotifStrategy>, String> {
    Err("built without the `accelerator` feature".to_string())
}

/// Picks the strategy for a request.
///
/// # Errors
///
/// Returns [`Error::AcceleratorUnavailable`] if `accelerated` is set, no
/// accelerator can serve it, and the fallback policy is
/// [`AcceleratorFallback::Fail`].
pub fn select_strategy(accelerated: bool, options: &MotifOptions) -> Result<Box<dyn MotifStrategy>> {
    options.validate()?;
    if !accelerated {
        return Ok(Box::new(CpuStrategy::new(options.seed_batch)));
    }

    match accelerated_strategy(options) {
        Ok(strategy) => Ok(strategy),
        Err(reason) => match options.accelerator.fallback {
            AcceleratorFallback::Fail => Err(Error::AcceleratorUnavailable(reason)),
            AcceleratorFallback::Cpu => {
                tracing::warn!(%reason, "accelerator unavailable, using CPU motif strategy");
                Ok(Box::new(CpuStrategy::new(options.seed_batch)))
            }
        },
    }
}

/// Counts `level`-vertex motifs for every vertex of `graph`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedMotifSize`] for levels other than 3 and 4, and
/// the errors of [`select_strategy`].
pub fn count_motifs(
    graph: &Graph,
    level: usize,
    accelerated: bool,
    options: &MotifOptions,
) -> Result<MotifCounts> {
    let level = MotifLevel::try_from(level)?;
    let strategy = select_strategy(accelerated, options)?;
    let _span = tracing::info_span!("motif", level = level.size(), strategy = strategy.name())
        .entered();
    let counts = strategy.count(graph, level)?;
    tracing::info!(
        vertices = graph.vertex_count(),
        subgraphs = counts.total_subgraphs(),
        "motif counting finished"
    );
    Ok(counts)
}
