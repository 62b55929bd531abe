//! Data-parallel motif counting on a device-style execution model.
//!
//! The adjacency is uploaded once into flat device buffers. Seeds are then
//! processed in batches; each batch grows a frontier of partial subgraphs
//! one vertex per level through the expansion kernel, in waves bounded by
//! the configured lane count, and the classification kernel tallies every
//! finished `k`-vertex subgraph with atomic increments. The tally is copied
//! back once at the end.
//!
//! Kernels run on a CUDA device (`cuda` feature) or on the host thread pool.
//! The CUDA device is opened when the strategy is created, so a missing
//! driver or device surfaces as an unavailable accelerator and the caller's
//! fallback policy applies.

#[cfg(feature = "cuda")]
mod cuda;
mod device;
mod frontier;

#[cfg(feature = "cuda")]
pub use cuda::CudaBackend;
pub use device::{DeviceGraph, HostDevice};

use graphfeat_common::utils::error::Result;

use self::frontier::{FrontierSession, FrontierStats, State};
use super::MotifLevel;
use super::catalog::{MotifCatalog, catalog};
use super::strategy::{AcceleratorBackend, AcceleratorConfig, MotifOptions, MotifStrategy};
use super::tally::{MotifCounts, SharedTally};
use crate::graph::Graph;

#[derive(Debug, Clone)]
enum Backend {
    Host(HostDevice),
    #[cfg(feature = "cuda")]
    Cuda(CudaBackend),
}

/// Level-synchronous frontier strategy.
#[derive(Debug, Clone)]
pub struct AcceleratedStrategy {
    backend: Backend,
    seed_batch: usize,
}

impl AcceleratedStrategy {
    /// Creates a strategy running its kernels on the host device.
    #[must_use]
    pub fn host(device: HostDevice, seed_batch: usize) -> Self {
        Self {
            backend: Backend::Host(device),
            seed_batch: seed_batch.max(1),
        }
    }

    /// Opens the configured backend.
    ///
    /// # Errors
    ///
    /// Returns the reason no device is available: the accelerator is
    /// disabled, the crate was built without the `cuda` feature, or the
    /// CUDA driver or device could not be opened.
    pub fn probe(options: &MotifOptions) -> std::result::Result<Self, String> {
        let config = &options.accelerator;
        if !config.enabled {
            return Err("accelerator disabled by configuration".to_string());
        }
        let backend = match config.backend {
            AcceleratorBackend::Host => Backend::Host(HostDevice::open(config)?),
            AcceleratorBackend::Cuda => open_cuda(config)?,
        };
        tracing::debug!(
            backend = %config.backend,
            block_size = config.block_size,
            lanes = config.lanes,
            "accelerator opened"
        );
        Ok(Self {
            backend,
            seed_batch: options.seed_batch.max(1),
        })
    }

    /// The backend the kernels run on.
    #[must_use]
    pub fn backend(&self) -> AcceleratorBackend {
        match self.backend {
            Backend::Host(_) => AcceleratorBackend::Host,
            #[cfg(feature = "cuda")]
            Backend::Cuda(_) => AcceleratorBackend::Cuda,
        }
    }

    fn run(&self, graph: &Graph, level: MotifLevel) -> Result<(MotifCounts, FrontierStats)> {
        let k = level.size();
        let classes = catalog(level);
        let n = graph.vertex_count();
        let seeds = graph.vertices_by_degree();

        match &self.backend {
            Backend::Host(device) => {
                let mut session = HostSession {
                    device,
                    graph: DeviceGraph::upload(graph)?,
                    catalog: classes,
                    tally: SharedTally::zeroed(n, classes.num_classes()),
                };
                let stats = frontier::drive(&mut session, &seeds, self.seed_batch, k)?;
                Ok((session.tally.into_counts(level, n), stats))
            }
            #[cfg(feature = "cuda")]
            Backend::Cuda(backend) => {
                let mut session = backend.session(graph, classes)?;
                let stats = frontier::drive(&mut session, &seeds, self.seed_batch, k)?;
                let counts = session.copy_to_host()?;
                Ok((MotifCounts::from_raw(level, n, counts), stats))
            }
        }
    }
}

#[cfg(feature = "cuda")]
fn open_cuda(config: &AcceleratorConfig) -> std::result::Result<Backend, String> {
    CudaBackend::open(config).map(Backend::Cuda)
}

#[cfg(not(feature = "cuda"))]
fn open_cuda(_config: &AcceleratorConfig) -> std::result::Result<Backend, String> {
    Err("no cuda device: built without the `cuda` feature".to_string())
}

impl MotifStrategy for AcceleratedStrategy {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn count(&self, graph: &Graph, level: MotifLevel) -> Result<MotifCounts> {
        let (counts, stats) = self.run(graph, level)?;
        tracing::debug!(
            backend = %self.backend(),
            waves = stats.waves,
            peak_states = stats.peak_states,
            "frontier counting finished"
        );
        Ok(counts)
    }
}

/// Host-resident graph and tally.
struct HostSession<'a> {
    device: &'a HostDevice,
    graph: DeviceGraph,
    catalog: &'static MotifCatalog,
    tally: SharedTally,
}

impl FrontierSession for HostSession<'_> {
    fn lanes(&self) -> usize {
        self.device.lanes()
    }

    fn max_degree(&self) -> usize {
        self.graph.max_degree()
    }

    fn expand(&mut self, states: &[State], size: usize) -> Result<Vec<State>> {
        let graph = &self.graph;
        Ok(self.device.launch_compact(states, |state, out| {
            frontier::expand(graph, state, size, out);
        }))
    }

    fn classify(&mut self, states: &[State], size: usize) -> Result<()> {
        let (graph, catalog, tally) = (&self.graph, self.catalog, &self.tally);
        self.device.launch(states, |state| {
            frontier::classify(graph, catalog, tally, state, size);
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motif::cpu::CpuStrategy;

    fn create_mixed_graph() -> Graph {
        Graph::from_edges(
            7,
            &[
                (0, 1),
                (1, 0),
                (1, 2),
                (2, 3),
                (3, 1),
                (3, 4),
                (4, 5),
                (5, 3),
                (6, 6),
                (0, 4),
            ],
        )
        .unwrap()
    }

    /// Hub 0 joined to every leaf, plus a sparse ring among the leaves.
    fn create_hub_graph(leaves: u32) -> Graph {
        let mut edges: Vec<(u32, u32)> = (1..=leaves).map(|v| (0, v)).collect();
        edges.extend((1..leaves).step_by(7).map(|v| (v, v + 1)));
        Graph::from_edges(leaves as usize + 1, &edges).unwrap()
    }

    fn host_strategy(seed_batch: usize, block_size: usize, lanes: usize) -> AcceleratedStrategy {
        let options = MotifOptions {
            seed_batch,
            accelerator: AcceleratorConfig::host().with_geometry(block_size, lanes),
        };
        AcceleratedStrategy::probe(&options).unwrap()
    }

    #[test]
    fn test_matches_cpu() {
        let graph = create_mixed_graph();
        let accelerated = host_strategy(2, 2, 5);
        for level in [MotifLevel::Three, MotifLevel::Four] {
            let expected = CpuStrategy::new(3).count(&graph, level).unwrap();
            let actual = accelerated.count(&graph, level).unwrap();
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_hub_frontier_stays_bounded() {
        let leaves = 59;
        let graph = create_hub_graph(leaves);
        let max_degree = graph.vertices().map(|v| graph.degree(v)).max().unwrap();
        let (seed_batch, lanes) = (4, 16);
        let strategy = host_strategy(seed_batch, 4, lanes);

        for level in [MotifLevel::Three, MotifLevel::Four] {
            let expected = CpuStrategy::new(8).count(&graph, level).unwrap();
            let (counts, stats) = strategy.run(&graph, level).unwrap();
            assert_eq!(counts, expected);

            // C(59, 3) four-vertex stars hang off the hub alone.
            if level == MotifLevel::Four {
                assert!(counts.total_subgraphs() >= 32_509);
            }
            let bound = seed_batch.max(lanes).max((level.size() - 1) * max_degree);
            assert!(
                stats.peak_states <= bound,
                "peak {} exceeds {bound}",
                stats.peak_states
            );
        }
    }

    #[test]
    fn test_isolated_vertex() {
        let graph = Graph::from_edges(1, &[]).unwrap();
        let strategy = host_strategy(256, 256, 1 << 16);
        let counts = strategy.count(&graph, MotifLevel::Four).unwrap();
        assert_eq!(counts.vertex(0), &[0u64; 199][..]);
    }

    #[test]
    fn test_disabled_config_is_unavailable() {
        let options = MotifOptions {
            accelerator: AcceleratorConfig::disabled(),
            ..MotifOptions::default()
        };
        assert!(AcceleratedStrategy::probe(&options).is_err());
    }

    #[test]
    fn test_host_constructor() {
        let device = HostDevice::open(&AcceleratorConfig::host()).unwrap();
        let strategy = AcceleratedStrategy::host(device, 0);
        assert_eq!(strategy.backend(), AcceleratorBackend::Host);
        let graph = Graph::from_edges(3, &[(0, 1), (1, 2), (2, 0)]).unwrap();
        assert_eq!(
            strategy.count(&graph, MotifLevel::Three).unwrap().total_subgraphs(),
            1
        );
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn test_cuda_backend_unavailable_without_feature() {
        use crate::motif::strategy::AcceleratorFallback;

        let options = MotifOptions {
            accelerator: AcceleratorConfig::default().with_fallback(AcceleratorFallback::Fail),
            ..MotifOptions::default()
        };
        let reason = AcceleratedStrategy::probe(&options).unwrap_err();
        assert!(reason.contains("`cuda` feature"));
    }
}
