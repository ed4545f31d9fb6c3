//! Graph topology analysis algorithms
//!
//! Triangle counting over the simple undirected view of a graph.

use super::graph::{intersection_size, GraphStore, SymmetricAdjacency};
use rayon::prelude::*;

/// Triangle counting result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriangleCount {
    /// Sum over canonical edges `(u, v)`, `u < v`, of `|N(u) ∩ N(v)|`
    edge_intersections: u64,
}

impl TriangleCount {
    /// Number of distinct triangles; each one is counted once
    pub fn triangles(&self) -> u64 {
        self.edge_intersections / 3
    }

    /// Sum over vertices of the triangles each vertex belongs to
    /// (three per triangle)
    pub fn participation_sum(&self) -> u64 {
        self.edge_intersections
    }
}

/// Count triangles.
///
/// Direction, self-loops, parallel edges and weights are ignored: a weighted
/// graph gives the same count as its unweighted edge list.
pub fn count_triangles(graph: &GraphStore) -> TriangleCount {
    let sym = SymmetricAdjacency::from_graph(graph);

    let edge_intersections: u64 = (0..sym.vertex_count())
        .into_par_iter()
        .map(|u| {
            let u_neighbors = sym.neighbors(u);
            u_neighbors
                .iter()
                .filter(|&&v| v as usize > u)
                .map(|&v| intersection_size(u_neighbors, sym.neighbors(v as usize)) as u64)
                .sum::<u64>()
        })
        .sum();

    tracing::debug!("Triangle counting summed {} edge intersections", edge_intersections);
    TriangleCount { edge_intersections }
}

/// Number of distinct triangles in the graph
pub fn triangle_count(graph: &GraphStore) -> u64 {
    count_triangles(graph).triangles()
}
