//! Traversal and shortest-path algorithms
//!
//! Level-synchronous BFS, Dijkstra-based SSSP, and the distance table both of
//! them produce.

use super::error::{GraphError, GraphResult};
use super::graph::{GraphStore, VertexId};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;

/// Sentinel distance for vertices BFS never reached
pub const UNREACHED: u32 = u32::MAX;

/// A distance type with a reserved "not reached" value
pub trait DistanceValue: Copy + PartialEq + Debug + Send + Sync {
    const UNREACHED: Self;
}

impl DistanceValue for u32 {
    const UNREACHED: u32 = u32::MAX;
}

impl DistanceValue for f64 {
    const UNREACHED: f64 = f64::MAX;
}

/// Columnar distance table: one row per vertex, `vertex` ascending.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceTable<D> {
    pub vertex: Vec<VertexId>,
    pub distance: Vec<D>,
    /// Discovering vertex for each row; `None` for the source and unreached rows
    pub predecessor: Option<Vec<Option<VertexId>>>,
}

impl<D: DistanceValue> DistanceTable<D> {
    pub fn len(&self) -> usize {
        self.vertex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex.is_empty()
    }

    /// Distance recorded for `v`, if the table has a row for it
    pub fn distance_of(&self, v: VertexId) -> Option<D> {
        self.vertex.binary_search(&v).ok().map(|row| self.distance[row])
    }

    pub fn predecessor_of(&self, v: VertexId) -> Option<VertexId> {
        let row = self.vertex.binary_search(&v).ok()?;
        self.predecessor.as_ref().and_then(|p| p[row])
    }

    pub fn reachable_count(&self) -> usize {
        self.distance.iter().filter(|&&d| d != D::UNREACHED).count()
    }
}

/// Drop every row whose distance is the sentinel, keeping columns aligned
pub fn filter_unreachable<D: DistanceValue>(table: &DistanceTable<D>) -> DistanceTable<D> {
    let keep: Vec<usize> = (0..table.len())
        .filter(|&row| table.distance[row] != D::UNREACHED)
        .collect();

    DistanceTable {
        vertex: keep.iter().map(|&row| table.vertex[row]).collect(),
        distance: keep.iter().map(|&row| table.distance[row]).collect(),
        predecessor: table
            .predecessor
            .as_ref()
            .map(|p| keep.iter().map(|&row| p[row]).collect()),
    }
}

/// BFS configuration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BfsConfig {
    /// Record the discovering vertex of every reached vertex
    pub record_predecessors: bool,
    /// Frontiers at least this large are expanded in parallel
    pub frontier_parallel_threshold: usize,
}

impl Default for BfsConfig {
    fn default() -> Self {
        Self {
            record_predecessors: false,
            frontier_parallel_threshold: 1024,
        }
    }
}

impl BfsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predecessors(mut self) -> Self {
        self.record_predecessors = true;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.frontier_parallel_threshold = threshold;
        self
    }
}

/// Breadth-first distances from `source` to every vertex
pub fn bfs(graph: &GraphStore, source: VertexId) -> GraphResult<DistanceTable<u32>> {
    bfs_with_config(graph, source, &BfsConfig::default())
}

/// BFS that also records first-discoverer predecessors
pub fn bfs_with_predecessors(graph: &GraphStore, source: VertexId) -> GraphResult<DistanceTable<u32>> {
    bfs_with_config(graph, source, &BfsConfig::new().with_predecessors())
}

/// Level-synchronous BFS.
///
/// Each level proposes `(neighbor, parent)` pairs from a read-only snapshot of
/// the visited set, in frontier order. A sequential commit pass then writes
/// each distance once; the earliest proposal wins, so predecessors are
/// deterministic regardless of how the level was expanded.
pub fn bfs_with_config(
    graph: &GraphStore,
    source: VertexId,
    config: &BfsConfig,
) -> GraphResult<DistanceTable<u32>> {
    let src = graph.check_vertex(source as u64)?;
    let n = graph.vertex_count();

    let mut distance = vec![UNREACHED; n];
    let mut predecessor: Option<Vec<Option<VertexId>>> = config.record_predecessors.then(|| vec![None; n]);
    distance[src as usize] = 0;

    let mut frontier = vec![src];
    let mut level = 0u32;

    while !frontier.is_empty() {
        level += 1;
        let parallel = frontier.len() >= config.frontier_parallel_threshold;
        let proposals = expand_frontier(graph, &frontier, &distance, parallel);

        let mut next_frontier = Vec::new();
        for (v, parent) in proposals {
            let slot = v as usize;
            if distance[slot] == UNREACHED {
                distance[slot] = level;
                if let Some(p) = predecessor.as_mut() {
                    p[slot] = Some(parent);
                }
                next_frontier.push(v);
            }
        }
        frontier = next_frontier;
    }

    let reached = distance.iter().filter(|&&d| d != UNREACHED).count();
    tracing::debug!("BFS from {} reached {} of {} vertices", src, reached, n);

    Ok(DistanceTable {
        vertex: (0..n as VertexId).collect(),
        distance,
        predecessor,
    })
}

fn expand_frontier(
    graph: &GraphStore,
    frontier: &[VertexId],
    visited: &[u32],
    parallel: bool,
) -> Vec<(VertexId, VertexId)> {
    let unvisited = move |&u: &VertexId| {
        graph
            .neighbors(u)
            .iter()
            .filter(move |&&v| visited[v as usize] == UNREACHED)
            .map(move |&v| (v, u))
    };

    if parallel {
        frontier.par_iter().flat_map_iter(unvisited).collect()
    } else {
        frontier.iter().flat_map(unvisited).collect()
    }
}

/// State for the Dijkstra priority queue
#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: VertexId,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; ties broken by vertex id
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source shortest paths (Dijkstra).
///
/// Unweighted edges cost 1.0; negative weights are rejected. Unreached
/// vertices keep `f64::MAX`.
pub fn sssp(graph: &GraphStore, source: VertexId) -> GraphResult<DistanceTable<f64>> {
    let src = graph.check_vertex(source as u64)?;
    if let Some(weights) = graph.csr().weights().as_slice() {
        if let Some(pos) = weights.iter().position(|&w| w < 0.0) {
            return Err(GraphError::InvalidGraph(format!(
                "SSSP requires non-negative weights, entry {} is {}",
                pos, weights[pos]
            )));
        }
    }

    let n = graph.vertex_count();
    let mut dist = vec![f64::MAX; n];
    let mut parent: Vec<Option<VertexId>> = vec![None; n];
    let mut heap = BinaryHeap::new();

    dist[src as usize] = 0.0;
    heap.push(State { cost: 0.0, node: src });

    while let Some(State { cost, node }) = heap.pop() {
        if cost > dist[node as usize] {
            continue;
        }

        for (next, weight) in graph.weighted_neighbors(node) {
            let next_cost = cost + weight;
            if next_cost < dist[next as usize] {
                dist[next as usize] = next_cost;
                parent[next as usize] = Some(node);
                heap.push(State { cost: next_cost, node: next });
            }
        }
    }

    Ok(DistanceTable {
        vertex: (0..n as VertexId).collect(),
        distance: dist,
        predecessor: Some(parent),
    })
}
