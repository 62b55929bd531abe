//! Connected subgraph enumeration (ESU).
//!
//! Every connected `k`-vertex subset is reported exactly once, from the seed
//! that is its smallest vertex. The subset grows one vertex at a time; a
//! vertex enters the extension set only if its ID exceeds the seed and it is
//! an *exclusive* neighbor of the vertex just added, i.e. not yet in the
//! subset and not adjacent to any earlier member. Two different growth orders
//! therefore never meet on the same subset.
//!
//! Worst case `O(n * d^(k-1))` for maximum undirected degree `d`.

use graphfeat_common::types::VertexId;
use smallvec::SmallVec;

use crate::graph::Graph;

/// Vertex set of one candidate subgraph, in discovery order.
pub type Subgraph = SmallVec<[VertexId; 4]>;

type Extension = SmallVec<[VertexId; 32]>;

/// Calls `visit` once for every connected `k`-vertex subset whose smallest
/// vertex is `seed`.
///
/// The slice handed to `visit` lists the vertices in discovery order, seed
/// first. `k` of 0 reports nothing; `k` of 1 reports `[seed]`.
pub fn enumerate_from<F>(graph: &Graph, seed: VertexId, k: usize, visit: &mut F)
where
    F: FnMut(&[VertexId]),
{
    if k == 0 {
        return;
    }
    let mut subgraph = Subgraph::new();
    subgraph.push(seed);
    let extension: Extension = graph
        .neighbors(seed)
        .iter()
        .copied()
        .filter(|&u| u > seed)
        .collect();
    extend(graph, seed, k, &mut subgraph, extension, visit);
}

fn extend<F>(
    graph: &Graph,
    seed: VertexId,
    k: usize,
    subgraph: &mut Subgraph,
    mut extension: Extension,
    visit: &mut F,
) where
    F: FnMut(&[VertexId]),
{
    if subgraph.len() == k {
        visit(subgraph.as_slice());
        return;
    }

    while let Some(w) = extension.pop() {
        let mut next = extension.clone();
        if subgraph.len() + 1 < k {
            for &u in graph.neighbors(w) {
                if u > seed
                    && !subgraph.contains(&u)
                    && !subgraph.iter().any(|&x| graph.is_adjacent(x, u))
                    && !next.contains(&u)
                {
                    next.push(u);
                }
            }
        }
        subgraph.push(w);
        extend(graph, seed, k, subgraph, next, visit);
        subgraph.pop();
    }
}
