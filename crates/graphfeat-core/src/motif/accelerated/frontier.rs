//! Frontier kernels and the wave driver for level-synchronous subgraph growth.
//!
//! A frontier holds partial subgraphs of equal size, seed (smallest vertex)
//! first. Expansion is stateless per lane: a child `S + u` is kept only if
//! `u` is the child's *canonical last vertex*, the largest non-seed member
//! whose removal leaves the child connected. Every connected set has such a
//! member, and removing it yields exactly one connected parent, so each
//! connected set is produced once without any coordination between lanes.
//!
//! The driver walks the levels depth first. A frontier is cut into waves
//! small enough that one wave's children fit in `lanes` states, and each
//! wave is carried down to `k` vertices and classified before the next wave
//! is expanded. At most one wave per level is alive at a time, so memory is
//! bounded by `k * max(lanes, (k - 1) * max_degree)` states however many
//! subgraphs a hub vertex roots.

use graphfeat_common::types::VertexId;
use graphfeat_common::utils::error::Result;

use super::device::DeviceGraph;
use crate::motif::catalog::{MotifCatalog, encode_pattern};
use crate::motif::tally::SharedTally;

/// A partial subgraph; only the first `size` slots of a frontier are used.
pub(crate) type State = [VertexId; 4];

/// One single-vertex state per seed.
pub(crate) fn seed_states(seeds: &[VertexId]) -> Vec<State> {
    seeds.iter().map(|&s| [s, 0, 0, 0]).collect()
}

/// Expansion kernel: appends every accepted `size + 1` child of `state`.
pub(crate) fn expand(graph: &DeviceGraph, state: &State, size: usize, out: &mut Vec<State>) {
    let members = &state[..size];
    let seed = members[0];
    for (i, &w) in members.iter().enumerate() {
        for &u in graph.neighbors(w) {
            if u <= seed || members.contains(&u) {
                continue;
            }
            // Generate u only from the first member it touches.
            if members[..i].iter().any(|&x| graph.is_adjacent(x, u)) {
                continue;
            }
            let mut child = *state;
            child[size] = u;
            if canonical_last(graph, &child[..=size]) == u {
                out.push(child);
            }
        }
    }
}

/// Classification kernel: tallies one occurrence for each member.
pub(crate) fn classify(
    graph: &DeviceGraph,
    catalog: &MotifCatalog,
    tally: &SharedTally,
    state: &State,
    size: usize,
) {
    let members = &state[..size];
    let code = encode_pattern(size, |i, j| graph.has_edge(members[i], members[j]));
    if let Some(class) = catalog.classify(code) {
        tally.record(members, class);
    }
}

fn canonical_last(graph: &DeviceGraph, members: &[VertexId]) -> VertexId {
    let m = members.len();
    let mut adjacency = [0u8; 4];
    for i in 0..m {
        for j in (i + 1)..m {
            if graph.is_adjacent(members[i], members[j]) {
                adjacency[i] |= 1 << j;
                adjacency[j] |= 1 << i;
            }
        }
    }

    (1..m)
        .filter(|&p| connected_without(&adjacency, m, p))
        .map(|p| members[p])
        .max()
        .unwrap_or(members[0])
}

/// Whether positions `0..m` minus `skip` form a connected set. `skip` > 0.
fn connected_without(adjacency: &[u8; 4], m: usize, skip: usize) -> bool {
    let alive = ((1u8 << m) - 1) & !(1 << skip);
    let mut seen = 1u8;
    let mut frontier = 1u8;
    while frontier != 0 {
        let mut next = 0u8;
        for (i, adj) in adjacency.iter().enumerate().take(m) {
            if frontier & (1 << i) != 0 {
                next |= adj & alive;
            }
        }
        frontier = next & !seen;
        seen |= next;
    }
    seen == alive
}

// ============================================================================
// Wave driver
// ============================================================================

/// A graph and its tally resident on one execution device.
pub(crate) trait FrontierSession {
    /// Upper bound on the children one expansion wave should produce.
    fn lanes(&self) -> usize;

    /// Largest undirected degree of the resident graph.
    fn max_degree(&self) -> usize;

    /// Runs the expansion kernel over `states` of `size` vertices.
    fn expand(&mut self, states: &[State], size: usize) -> Result<Vec<State>>;

    /// Runs the classification kernel over `states` of `size` vertices.
    fn classify(&mut self, states: &[State], size: usize) -> Result<()>;
}

/// Launch statistics of one counting run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrontierStats {
    /// Kernel waves launched.
    pub(crate) waves: usize,
    /// Largest frontier handed to a single launch.
    pub(crate) peak_states: usize,
}

/// Number of `size`-vertex states per expansion wave.
///
/// A state has at most `size * max_degree` children, so a wave of this many
/// states emits at most `lanes` children. A single state may exceed that
/// when `size * max_degree > lanes`.
pub(crate) fn wave_len(lanes: usize, size: usize, max_degree: usize) -> usize {
    (lanes / (size * max_degree).max(1)).max(1)
}

/// Counts every connected `k`-subset rooted at `seeds`, in batches of
/// `seed_batch` seeds.
pub(crate) fn drive<S: FrontierSession>(
    session: &mut S,
    seeds: &[VertexId],
    seed_batch: usize,
    k: usize,
) -> Result<FrontierStats> {
    let mut stats = FrontierStats::default();
    for (batch, chunk) in seeds.chunks(seed_batch.max(1)).enumerate() {
        descend(session, &seed_states(chunk), 1, k, &mut stats)?;
        tracing::debug!(batch, seeds = chunk.len(), "frontier seed batch done");
    }
    Ok(stats)
}

fn descend<S: FrontierSession>(
    session: &mut S,
    states: &[State],
    size: usize,
    k: usize,
    stats: &mut FrontierStats,
) -> Result<()> {
    stats.peak_states = stats.peak_states.max(states.len());
    if size == k {
        stats.waves += 1;
        return session.classify(states, k);
    }

    let wave = wave_len(session.lanes(), size, session.max_degree());
    for chunk in states.chunks(wave) {
        stats.waves += 1;
        let children = session.expand(chunk, size)?;
        if !children.is_empty() {
            descend(session, &children, size + 1, k, stats)?;
        }
    }
    Ok(())
}
