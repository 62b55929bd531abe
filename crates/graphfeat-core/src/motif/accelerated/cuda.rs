//! Frontier kernels on an NVIDIA device through `cudarc`.
//!
//! The kernels are compiled from CUDA C with NVRTC when the backend is
//! opened. Expansion runs in two launches: `expand_count` sizes every
//! state's children, the host turns the sizes into offsets, and
//! `expand_write` fills one contiguous child buffer. `classify` encodes each
//! finished subgraph, looks its class up in the device copy of the catalog
//! table, and bumps the tally with `atomicAdd`.

use std::fmt;
use std::sync::Arc;

use cudarc::driver::{CudaDevice, CudaFunction, CudaSlice, LaunchAsync, LaunchConfig};
use cudarc::nvrtc::compile_ptx;
use graphfeat_common::utils::error::{Error, Result};

use super::device::DeviceGraph;
use super::frontier::{FrontierSession, State};
use crate::graph::Graph;
use crate::motif::catalog::MotifCatalog;
use crate::motif::strategy::AcceleratorConfig;

const MODULE: &str = "graphfeat_frontier";
const EXPAND_COUNT: &str = "expand_count";
const EXPAND_WRITE: &str = "expand_write";
const CLASSIFY: &str = "classify";

/// Largest block CUDA accepts.
const MAX_BLOCK_SIZE: usize = 1024;

const FRONTIER_KERNELS: &str = r#"
typedef unsigned int u32;
typedef unsigned long long u64;

#define NO_CLASS 0xFFFFFFFFu

__device__ bool row_contains(const u32* offsets, const u32* targets, u32 v, u32 w) {
    u32 lo = offsets[v];
    u32 hi = offsets[v + 1];
    while (lo < hi) {
        u32 mid = lo + (hi - lo) / 2;
        u32 t = targets[mid];
        if (t == w) return true;
        if (t < w) lo = mid + 1; else hi = mid;
    }
    return false;
}

__device__ bool connected_without(const unsigned char* adj, u32 m, u32 skip) {
    unsigned char alive = ((1u << m) - 1) & ~(1u << skip);
    unsigned char seen = 1;
    unsigned char frontier = 1;
    while (frontier != 0) {
        unsigned char next = 0;
        for (u32 i = 0; i < m; ++i) {
            if (frontier & (1u << i)) next |= adj[i] & alive;
        }
        frontier = next & ~seen;
        seen |= next;
    }
    return seen == alive;
}

__device__ u32 canonical_last(const u32* uo, const u32* ut, const u32* members, u32 m) {
    unsigned char adj[4] = {0, 0, 0, 0};
    for (u32 i = 0; i < m; ++i) {
        for (u32 j = i + 1; j < m; ++j) {
            if (row_contains(uo, ut, members[i], members[j])) {
                adj[i] |= 1u << j;
                adj[j] |= 1u << i;
            }
        }
    }
    u32 best = members[0];
    bool found = false;
    for (u32 p = 1; p < m; ++p) {
        if (connected_without(adj, m, p) && (!found || members[p] > best)) {
            best = members[p];
            found = true;
        }
    }
    return best;
}

// Writes accepted children to `out` when it is non-null; returns how many.
__device__ u32 expand_state(const u32* uo, const u32* ut, const u32* state, u32 size, u32* out) {
    u32 seed = state[0];
    u32 emitted = 0;
    for (u32 i = 0; i < size; ++i) {
        u32 w = state[i];
        for (u32 e = uo[w]; e < uo[w + 1]; ++e) {
            u32 u = ut[e];
            if (u <= seed) continue;
            bool skip = false;
            for (u32 x = 0; x < size; ++x) {
                if (state[x] == u) { skip = true; break; }
            }
            for (u32 x = 0; !skip && x < i; ++x) {
                if (row_contains(uo, ut, state[x], u)) skip = true;
            }
            if (skip) continue;
            u32 child[4] = {state[0], state[1], state[2], state[3]};
            child[size] = u;
            if (canonical_last(uo, ut, child, size + 1) != u) continue;
            if (out) {
                for (u32 x = 0; x < 4; ++x) out[4 * emitted + x] = child[x];
            }
            ++emitted;
        }
    }
    return emitted;
}

extern "C" __global__ void expand_count(
    const u32* uo, const u32* ut, const u32* states, u32 m, u32 size, u32* counts
) {
    u32 t = blockIdx.x * blockDim.x + threadIdx.x;
    if (t >= m) return;
    counts[t] = expand_state(uo, ut, states + 4 * t, size, 0);
}

extern "C" __global__ void expand_write(
    const u32* uo, const u32* ut, const u32* states, u32 m, u32 size,
    const u32* offsets, u32* children
) {
    u32 t = blockIdx.x * blockDim.x + threadIdx.x;
    if (t >= m) return;
    expand_state(uo, ut, states + 4 * t, size, children + 4 * offsets[t]);
}

extern "C" __global__ void classify(
    const u32* oo, const u32* ot, const u32* table, const u32* states,
    u32 m, u32 k, u32 num_classes, u64* tally
) {
    u32 t = blockIdx.x * blockDim.x + threadIdx.x;
    if (t >= m) return;
    const u32* s = states + 4 * t;
    u32 code = 0;
    for (u32 i = 0; i < k; ++i) {
        for (u32 j = 0; j < k; ++j) {
            if (i != j && row_contains(oo, ot, s[i], s[j])) {
                code |= 1u << (i * (k - 1) + (j < i ? j : j - 1));
            }
        }
    }
    u32 cls = table[code];
    if (cls == NO_CLASS) return;
    for (u32 i = 0; i < k; ++i) {
        atomicAdd(&tally[(u64)s[i] * num_classes + cls], 1ULL);
    }
}
"#;

/// An opened CUDA device with the frontier kernels loaded.
#[derive(Clone)]
pub struct CudaBackend {
    device: Arc<CudaDevice>,
    ordinal: usize,
    block_size: u32,
    lanes: usize,
}

impl fmt::Debug for CudaBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CudaBackend")
            .field("ordinal", &self.ordinal)
            .field("block_size", &self.block_size)
            .field("lanes", &self.lanes)
            .finish_non_exhaustive()
    }
}

impl CudaBackend {
    /// Opens device `config.ordinal` and loads the frontier kernels.
    ///
    /// # Errors
    ///
    /// Returns the reason the device cannot be used: a bad launch geometry,
    /// no driver or device, or a kernel that fails to compile or load.
    pub fn open(config: &AcceleratorConfig) -> std::result::Result<Self, String> {
        if config.block_size == 0 || config.block_size > MAX_BLOCK_SIZE || config.lanes == 0 {
            return Err(format!(
                "invalid launch geometry: block_size {} lanes {}",
                config.block_size, config.lanes
            ));
        }
        let device = CudaDevice::new(config.ordinal)
            .map_err(|e| format!("cuda device {}: {e}", config.ordinal))?;
        let ptx = compile_ptx(FRONTIER_KERNELS).map_err(|e| format!("compile kernels: {e}"))?;
        device
            .load_ptx(ptx, MODULE, &[EXPAND_COUNT, EXPAND_WRITE, CLASSIFY])
            .map_err(|e| format!("load kernels: {e}"))?;
        tracing::info!(ordinal = config.ordinal, "cuda device opened");

        Ok(Self {
            device,
            ordinal: config.ordinal,
            // Bounded by MAX_BLOCK_SIZE above.
            block_size: config.block_size as u32,
            lanes: config.lanes.max(config.block_size),
        })
    }

    /// Device ordinal.
    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Uploads `graph` and the class table of `catalog` and zeroes a tally.
    pub(crate) fn session(
        &self,
        graph: &Graph,
        catalog: &'static MotifCatalog,
    ) -> Result<CudaSession<'_>> {
        let resident = DeviceGraph::upload(graph)?;
        let (uo, ut) = resident.undirected_buffers();
        let (oo, ot) = resident.out_buffers();
        let num_vertices = graph.vertex_count();
        let num_classes = catalog.num_classes();
        let tally = self
            .device
            .alloc_zeros::<u64>((num_vertices * num_classes).max(1))
            .map_err(device_error("alloc tally"))?;

        Ok(CudaSession {
            backend: self,
            max_degree: resident.max_degree(),
            undirected_offsets: self.upload(uo, "undirected offsets")?,
            undirected_targets: self.upload(ut, "undirected targets")?,
            out_offsets: self.upload(oo, "out offsets")?,
            out_targets: self.upload(ot, "out targets")?,
            table: self.upload(&catalog.device_table(), "class table")?,
            level_size: catalog.level().size() as u32,
            num_classes,
            num_vertices,
            tally,
        })
    }

    /// Copies `data` to the device; empty buffers get one padding word.
    fn upload(&self, data: &[u32], what: &'static str) -> Result<CudaSlice<u32>> {
        let data = if data.is_empty() { &[0][..] } else { data };
        self.device.htod_sync_copy(data).map_err(device_error(what))
    }

    fn function(&self, name: &str) -> Result<CudaFunction> {
        self.device
            .get_func(MODULE, name)
            .ok_or_else(|| Error::AcceleratorUnavailable(format!("kernel {name} not loaded")))
    }

    fn launch_config(&self, items: usize) -> LaunchConfig {
        let blocks = items.div_ceil(self.block_size as usize).max(1);
        LaunchConfig {
            grid_dim: (blocks as u32, 1, 1),
            block_dim: (self.block_size, 1, 1),
            shared_mem_bytes: 0,
        }
    }
}

fn device_error<E: fmt::Display>(stage: &'static str) -> impl FnOnce(E) -> Error {
    move |e| Error::AcceleratorUnavailable(format!("{stage}: {e}"))
}

fn flatten_states(states: &[State]) -> Vec<u32> {
    states.iter().flat_map(|s| s.iter().copied()).collect()
}

/// Graph buffers, class table and tally resident on the device.
pub(crate) struct CudaSession<'a> {
    backend: &'a CudaBackend,
    max_degree: usize,
    undirected_offsets: CudaSlice<u32>,
    undirected_targets: CudaSlice<u32>,
    out_offsets: CudaSlice<u32>,
    out_targets: CudaSlice<u32>,
    table: CudaSlice<u32>,
    level_size: u32,
    num_classes: usize,
    num_vertices: usize,
    tally: CudaSlice<u64>,
}

impl CudaSession<'_> {
    /// Copies the tally back, `num_classes` counters per vertex.
    pub(crate) fn copy_to_host(&self) -> Result<Vec<u64>> {
        let mut counts = self
            .backend
            .device
            .dtoh_sync_copy(&self.tally)
            .map_err(device_error("copy tally"))?;
        counts.truncate(self.num_vertices * self.num_classes);
        Ok(counts)
    }
}

impl FrontierSession for CudaSession<'_> {
    fn lanes(&self) -> usize {
        self.backend.lanes
    }

    fn max_degree(&self) -> usize {
        self.max_degree
    }

    fn expand(&mut self, states: &[State], size: usize) -> Result<Vec<State>> {
        if states.is_empty() {
            return Ok(Vec::new());
        }
        let backend = self.backend;
        let device = &backend.device;
        let m = states.len();
        let d_states = backend.upload(&flatten_states(states), "frontier states")?;
        let mut d_counts = device
            .alloc_zeros::<u32>(m)
            .map_err(device_error("alloc child counts"))?;

        let count = backend.function(EXPAND_COUNT)?;
        // SAFETY: argument order and types match `expand_count`; every state
        // holds four words and `d_counts` holds `m`.
        unsafe {
            count.launch(
                backend.launch_config(m),
                (
                    &self.undirected_offsets,
                    &self.undirected_targets,
                    &d_states,
                    m as u32,
                    size as u32,
                    &mut d_counts,
                ),
            )
        }
        .map_err(device_error("launch expand_count"))?;

        let counts = device
            .dtoh_sync_copy(&d_counts)
            .map_err(device_error("copy child counts"))?;
        let mut offsets = Vec::with_capacity(m);
        let mut total = 0usize;
        for &c in &counts {
            offsets.push(u32::try_from(total).map_err(device_error("child offsets"))?);
            total += c as usize;
        }
        if total == 0 {
            return Ok(Vec::new());
        }

        let d_offsets = backend.upload(&offsets, "child offsets")?;
        let mut d_children = device
            .alloc_zeros::<u32>(4 * total)
            .map_err(device_error("alloc children"))?;
        let write = backend.function(EXPAND_WRITE)?;
        // SAFETY: `d_children` holds four words for each counted child and
        // `d_offsets` is the exclusive prefix sum of those counts.
        unsafe {
            write.launch(
                backend.launch_config(m),
                (
                    &self.undirected_offsets,
                    &self.undirected_targets,
                    &d_states,
                    m as u32,
                    size as u32,
                    &d_offsets,
                    &mut d_children,
                ),
            )
        }
        .map_err(device_error("launch expand_write"))?;

        let flat = device
            .dtoh_sync_copy(&d_children)
            .map_err(device_error("copy children"))?;
        Ok(flat
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect())
    }

    fn classify(&mut self, states: &[State], size: usize) -> Result<()> {
        debug_assert_eq!(size as u32, self.level_size);
        let backend = self.backend;
        for wave in states.chunks(backend.lanes) {
            let m = wave.len();
            let d_states = backend.upload(&flatten_states(wave), "frontier states")?;
            let classify = backend.function(CLASSIFY)?;
            // SAFETY: the table covers every `k(k-1)`-bit code and the tally
            // holds `num_classes` counters for every vertex a state can name.
            unsafe {
                classify.launch(
                    backend.launch_config(m),
                    (
                        &self.out_offsets,
                        &self.out_targets,
                        &self.table,
                        &d_states,
                        m as u32,
                        self.level_size,
                        self.num_classes as u32,
                        &mut self.tally,
                    ),
                )
            }
            .map_err(device_error("launch classify"))?;
        }
        Ok(())
    }
}
