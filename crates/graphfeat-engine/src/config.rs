//! Engine configuration.

use std::fmt;

use graphfeat_adapters::plugins::algorithms::{
    DEFAULT_DAMPING, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
};
use graphfeat_adapters::plugins::algorithms::clustering::DEFAULT_PARALLEL_THRESHOLD;
use graphfeat_common::utils::error::Error;
use graphfeat_core::motif::strategy::DEFAULT_SEED_BATCH;
use graphfeat_core::motif::{AcceleratorConfig, AcceleratorFallback, MotifOptions};

/// Errors from [`Config::validate()`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Thread count must be greater than zero.
    ZeroThreads,
    /// Motif seed batch size must be greater than zero.
    ZeroMotifBatchSize,
    /// Accelerator block size must be greater than zero.
    ZeroBlockSize,
    /// Accelerator lane count must be greater than zero.
    ZeroLanes,
    /// PageRank damping must lie strictly between 0 and 1.
    DampingOutOfRange(f64),
    /// PageRank tolerance must be finite and non-negative.
    InvalidTolerance(f64),
    /// PageRank iteration cap must be greater than zero.
    ZeroIterations,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroThreads => write!(f, "threads must be greater than zero"),
            Self::ZeroMotifBatchSize => write!(f, "motif_batch_size must be greater than zero"),
            Self::ZeroBlockSize => write!(f, "accelerator block_size must be greater than zero"),
            Self::ZeroLanes => write!(f, "accelerator lanes must be greater than zero"),
            Self::DampingOutOfRange(d) => {
                write!(f, "page_rank damping must be in (0, 1), got {d}")
            }
            Self::InvalidTolerance(t) => {
                write!(f, "page_rank tolerance must be finite and non-negative, got {t}")
            }
            Self::ZeroIterations => {
                write!(f, "page_rank max_iterations must be greater than zero")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Default PageRank settings used by [`FeatureEngine::page_rank`](crate::FeatureEngine::page_rank).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRankDefaults {
    /// Damping factor.
    pub damping: f64,
    /// L1 convergence tolerance.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: usize,
}

impl Default for PageRankDefaults {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Number of worker threads in the engine's pool.
    pub threads: usize,

    /// Accelerated motif strategy settings, including the fallback policy.
    pub accelerator: AcceleratorConfig,

    /// Defaults for PageRank.
    pub page_rank: PageRankDefaults,

    /// Seeds handed to a motif worker at once.
    pub motif_batch_size: usize,

    /// Minimum vertex count before clustering runs in parallel.
    pub parallel_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            accelerator: AcceleratorConfig::default(),
            page_rank: PageRankDefaults::default(),
            motif_batch_size: DEFAULT_SEED_BATCH,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl Config {
    /// Sets the number of worker threads.
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sets the accelerator configuration.
    #[must_use]
    pub fn with_accelerator(mut self, accelerator: AcceleratorConfig) -> Self {
        self.accelerator = accelerator;
        self
    }

    /// Sets the accelerator fallback policy.
    #[must_use]
    pub fn with_accelerator_fallback(mut self, fallback: AcceleratorFallback) -> Self {
        self.accelerator.fallback = fallback;
        self
    }

    /// Disables the accelerator.
    #[must_use]
    pub fn without_accelerator(mut self) -> Self {
        self.accelerator.enabled = false;
        self
    }

    /// Sets the PageRank defaults.
    #[must_use]
    pub fn with_page_rank(mut self, page_rank: PageRankDefaults) -> Self {
        self.page_rank = page_rank;
        self
    }

    /// Sets the motif seed batch size.
    #[must_use]
    pub fn with_motif_batch_size(mut self, batch: usize) -> Self {
        self.motif_batch_size = batch;
        self
    }

    /// Sets the parallel threshold for clustering.
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Motif strategy options derived from this configuration.
    #[must_use]
    pub fn motif_options(&self) -> MotifOptions {
        MotifOptions {
            seed_batch: self.motif_batch_size,
            accelerator: self.accelerator.clone(),
        }
    }

    /// Validates the configuration.
    ///
    /// Called automatically by [`FeatureEngine::with_config()`](crate::FeatureEngine::with_config).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any setting is invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }

        if self.motif_batch_size == 0 {
            return Err(ConfigError::ZeroMotifBatchSize);
        }

        if self.accelerator.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }

        if self.accelerator.lanes == 0 {
            return Err(ConfigError::ZeroLanes);
        }

        let damping = self.page_rank.damping;
        if !(damping > 0.0 && damping < 1.0) {
            return Err(ConfigError::DampingOutOfRange(damping));
        }

        let tolerance = self.page_rank.tolerance;
        if !(tolerance >= 0.0 && tolerance.is_finite()) {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }

        if self.page_rank.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }

        Ok(())
    }
}

/// Helper function to get CPU count.
mod num_cpus {
    pub fn get() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.threads > 0);
        assert!(config.accelerator.enabled);
        assert_eq!(config.accelerator.fallback, AcceleratorFallback::Cpu);
        assert_eq!(config.page_rank, PageRankDefaults::default());
        assert!((config.page_rank.damping - 0.85).abs() < f64::EPSILON);
        assert_eq!(config.page_rank.max_iterations, 100);
        assert_eq!(config.motif_batch_size, DEFAULT_SEED_BATCH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder_chaining() {
        let config = Config::default()
            .with_threads(4)
            .with_motif_batch_size(16)
            .with_parallel_threshold(10)
            .with_accelerator_fallback(AcceleratorFallback::Fail)
            .without_accelerator();

        assert_eq!(config.threads, 4);
        assert_eq!(config.motif_batch_size, 16);
        assert_eq!(config.parallel_threshold, 10);
        assert_eq!(config.accelerator.fallback, AcceleratorFallback::Fail);
        assert!(!config.accelerator.enabled);

        let options = config.motif_options();
        assert_eq!(options.seed_batch, 16);
        assert!(!options.accelerator.enabled);
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        assert_eq!(
            Config::default().with_threads(0).validate(),
            Err(ConfigError::ZeroThreads)
        );
        assert_eq!(
            Config::default().with_motif_batch_size(0).validate(),
            Err(ConfigError::ZeroMotifBatchSize)
        );
        let accelerator = AcceleratorConfig {
            block_size: 0,
            ..AcceleratorConfig::default()
        };
        assert_eq!(
            Config::default().with_accelerator(accelerator).validate(),
            Err(ConfigError::ZeroBlockSize)
        );
        let accelerator = AcceleratorConfig {
            lanes: 0,
            ..AcceleratorConfig::default()
        };
        assert_eq!(
            Config::default().with_accelerator(accelerator).validate(),
            Err(ConfigError::ZeroLanes)
        );
    }

    #[test]
    fn test_validate_page_rank_defaults() {
        let bad_damping = PageRankDefaults {
            damping: 1.0,
            ..PageRankDefaults::default()
        };
        assert_eq!(
            Config::default().with_page_rank(bad_damping).validate(),
            Err(ConfigError::DampingOutOfRange(1.0))
        );

        let bad_iterations = PageRankDefaults {
            max_iterations: 0,
            ..PageRankDefaults::default()
        };
        assert_eq!(
            Config::default().with_page_rank(bad_iterations).validate(),
            Err(ConfigError::ZeroIterations)
        );

        let bad_tolerance = PageRankDefaults {
            tolerance: f64::NAN,
            ..PageRankDefaults::default()
        };
        assert!(matches!(
            Config::default().with_page_rank(bad_tolerance).validate(),
            Err(ConfigError::InvalidTolerance(_))
        ));
    }

    #[test]
    fn test_config_error_into_error() {
        let err: Error = ConfigError::ZeroThreads.into();
        assert_eq!(
            err,
            Error::Config("threads must be greater than zero".to_string())
        );
    }
}
