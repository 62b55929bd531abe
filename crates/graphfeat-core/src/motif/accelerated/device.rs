//! Host execution model and the flat graph buffers shared with devices.
//!
//! On the host, kernels are plain functions applied to one work item per
//! lane. Lanes are grouped into blocks of `block_size`; blocks run
//! concurrently on the rayon pool and a launch never processes more than
//! `lanes` items at once. Kernels that emit output write into a per-block
//! buffer which is compacted into one contiguous array in block order, so
//! launch results are deterministic.

use graphfeat_common::types::{VertexId, vertex_index};
use graphfeat_common::utils::error::{Error, Result};
use rayon::prelude::*;

use crate::graph::{CsrAdjacency, Graph};
use crate::motif::strategy::AcceleratorConfig;

/// The host thread pool seen as a device with a fixed launch geometry.
#[derive(Debug, Clone)]
pub struct HostDevice {
    block_size: usize,
    lanes: usize,
}

impl HostDevice {
    /// Opens a host device with the geometry of `config`.
    ///
    /// # Errors
    ///
    /// Returns the reason the geometry is unusable.
    pub fn open(config: &AcceleratorConfig) -> std::result::Result<Self, String> {
        if config.block_size == 0 || config.lanes == 0 {
            return Err(format!(
                "invalid launch geometry: block_size {} lanes {}",
                config.block_size, config.lanes
            ));
        }
        Ok(Self {
            block_size: config.block_size,
            lanes: config.lanes.max(config.block_size),
        })
    }

    /// Lanes per block.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Maximum items per launch.
    #[must_use]
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Runs `kernel` on every item.
    pub fn launch<T, K>(&self, items: &[T], kernel: K)
    where
        T: Sync,
        K: Fn(&T) + Sync,
    {
        for wave in items.chunks(self.lanes) {
            wave.par_chunks(self.block_size)
                .for_each(|block| block.iter().for_each(&kernel));
        }
    }

    /// Runs `kernel` on every item and returns the compacted output.
    ///
    /// Output order is block order, then emission order within a block.
    pub fn launch_compact<T, O, K>(&self, items: &[T], kernel: K) -> Vec<O>
    where
        T: Sync,
        O: Send,
        K: Fn(&T, &mut Vec<O>) + Sync,
    {
        let mut output = Vec::new();
        for wave in items.chunks(self.lanes) {
            let blocks: Vec<Vec<O>> = wave
                .par_chunks(self.block_size)
                .map(|block| {
                    let mut out = Vec::new();
                    for item in block {
                        kernel(item, &mut out);
                    }
                    out
                })
                .collect();

            let total: usize = blocks.iter().map(Vec::len).sum();
            output.reserve(total);
            for block in blocks {
                output.extend(block);
            }
        }
        output
    }
}

/// A graph copied into flat device buffers.
///
/// Offsets are 32-bit, as on the device; graphs with more adjacency entries
/// than that cannot be uploaded.
#[derive(Debug)]
pub struct DeviceGraph {
    undirected_offsets: Vec<u32>,
    undirected_targets: Vec<VertexId>,
    out_offsets: Vec<u32>,
    out_targets: Vec<VertexId>,
    max_degree: usize,
}

impl DeviceGraph {
    /// Copies the undirected and outgoing adjacency of `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AcceleratorUnavailable`] if an adjacency has more
    /// entries than 32-bit offsets can address.
    pub fn upload(graph: &Graph) -> Result<Self> {
        let (undirected_offsets, undirected_targets) =
            flatten(graph.undirected_adjacency(), "undirected")?;
        let (out_offsets, out_targets) = flatten(graph.out_adjacency(), "outgoing")?;
        tracing::debug!(
            bytes = 4 * (undirected_offsets.len()
                + undirected_targets.len()
                + out_offsets.len()
                + out_targets.len()),
            "graph uploaded to device"
        );
        let max_degree = undirected_offsets
            .windows(2)
            .map(|w| (w[1] - w[0]) as usize)
            .max()
            .unwrap_or(0);
        Ok(Self {
            undirected_offsets,
            undirected_targets,
            out_offsets,
            out_targets,
            max_degree,
        })
    }

    /// Largest undirected degree.
    #[must_use]
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// Undirected offsets and targets.
    #[cfg(feature = "cuda")]
    pub(crate) fn undirected_buffers(&self) -> (&[u32], &[VertexId]) {
        (&self.undirected_offsets, &self.undirected_targets)
    }

    /// Outgoing offsets and targets.
    #[cfg(feature = "cuda")]
    pub(crate) fn out_buffers(&self) -> (&[u32], &[VertexId]) {
        (&self.out_offsets, &self.out_targets)
    }

    /// Undirected neighbors of `v`.
    #[inline]
    pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
        let v = vertex_index(v);
        let start = self.undirected_offsets[v] as usize;
        let end = self.undirected_offsets[v + 1] as usize;
        &self.undirected_targets[start..end]
    }

    /// Whether `u` and `v` are joined in either direction.
    #[inline]
    pub fn is_adjacent(&self, u: VertexId, v: VertexId) -> bool {
        self.neighbors(u).binary_search(&v).is_ok()
    }

    /// Whether the directed edge `u -> v` exists.
    #[inline]
    pub fn has_edge(&self, u: VertexId, v: VertexId) -> bool {
        let u = vertex_index(u);
        let start = self.out_offsets[u] as usize;
        let end = self.out_offsets[u + 1] as usize;
        self.out_targets[start..end].binary_search(&v).is_ok()
    }
}

fn flatten(adjacency: &CsrAdjacency, view: &str) -> Result<(Vec<u32>, Vec<VertexId>)> {
    let offsets = adjacency
        .offsets()
        .iter()
        .map(|&o| u32::try_from(o))
        .collect::<std::result::Result<Vec<u32>, _>>()
        .map_err(|_| {
            Error::AcceleratorUnavailable(format!(
                "{view} adjacency has {} entries, beyond 32-bit device offsets",
                adjacency.num_entries()
            ))
        })?;
    Ok((offsets, adjacency.targets().to_vec()))
}
