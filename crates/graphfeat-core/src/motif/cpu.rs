//! Thread-parallel motif counting.

use graphfeat_common::types::VertexId;
use graphfeat_common::utils::error::Result;
use rayon::prelude::*;

use super::MotifLevel;
use super::catalog::catalog;
use super::enumerate::enumerate_from;
use super::strategy::{DEFAULT_SEED_BATCH, MotifStrategy};
use super::tally::{BatchTally, MotifCounts, SharedTally};
use crate::graph::Graph;

/// Runs ESU enumeration on rayon workers.
///
/// Seeds are ordered by descending degree so that the most expensive ones
/// start first, then split into batches. A batch counts into a sparse tally
/// of its own and flushes it into one shared dense tally when it finishes.
#[derive(Debug, Clone)]
pub struct CpuStrategy {
    seed_batch: usize,
}

impl CpuStrategy {
    /// Creates a strategy handing out `seed_batch` seeds per work unit.
    #[must_use]
    pub fn new(seed_batch: usize) -> Self {
        Self {
            seed_batch: seed_batch.max(1),
        }
    }
}

impl Default for CpuStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_SEED_BATCH)
    }
}

impl MotifStrategy for CpuStrategy {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn count(&self, graph: &Graph, level: MotifLevel) -> Result<MotifCounts> {
        let k = level.size();
        let classes = catalog(level);
        let n = graph.vertex_count();
        let seeds = graph.vertices_by_degree();

        let tally = SharedTally::zeroed(n, classes.num_classes());

        seeds.par_chunks(self.seed_batch).for_each(|batch| {
            let mut local = BatchTally::new(classes.num_classes());
            for &seed in batch {
                enumerate_from(graph, seed, k, &mut |members: &[VertexId]| {
                    if let Some(class) = classes.classify_vertices(graph, members) {
                        local.record(members, class);
                    }
                });
            }
            tracing::debug!(
                seeds = batch.len(),
                counters = local.len(),
                "motif seed batch done"
            );
            tally.absorb(&mut local);
        });

        Ok(tally.into_counts(level, n))
    }
}
