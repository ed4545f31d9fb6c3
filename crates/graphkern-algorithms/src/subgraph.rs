//! Induced subgraph extraction

use super::error::{GraphError, GraphResult};
use super::graph::{EdgeWeights, GraphStore, VertexId};
use rustc_hash::FxHashSet;

/// A compacted subgraph together with its id mapping
#[derive(Debug, Clone, PartialEq)]
pub struct Subgraph {
    pub graph: GraphStore,
    /// `vertices[new_id]` is the original id, ascending
    pub vertices: Vec<VertexId>,
}

impl Subgraph {
    pub fn original_id(&self, v: VertexId) -> Option<VertexId> {
        self.vertices.get(v as usize).copied()
    }
}

/// Induced subgraph on `vertex_set`, keeping global vertex ids.
///
/// The result has the same vertex count as `graph`; vertices outside the set
/// remain as isolated slots. Weights and directedness are preserved.
pub fn subgraph(graph: &GraphStore, vertex_set: &[VertexId]) -> GraphResult<GraphStore> {
    let members = normalize_members(graph, vertex_set)?;
    extract(graph, &members, false)
}

/// Induced subgraph on `vertex_set`, relabeled to `[0, |S|)` in ascending
/// original-id order
pub fn subgraph_compacted(graph: &GraphStore, vertex_set: &[VertexId]) -> GraphResult<Subgraph> {
    let members = normalize_members(graph, vertex_set)?;
    let sub = extract(graph, &members, true)?;
    Ok(Subgraph { graph: sub, vertices: members })
}

fn normalize_members(graph: &GraphStore, vertex_set: &[VertexId]) -> GraphResult<Vec<VertexId>> {
    if vertex_set.is_empty() {
        return Err(GraphError::EmptyResult("subgraph vertex set is empty".to_string()));
    }
    for &v in vertex_set {
        graph.check_vertex(v as u64)?;
    }

    let unique: FxHashSet<VertexId> = vertex_set.iter().copied().collect();
    let mut members: Vec<VertexId> = unique.into_iter().collect();
    members.sort_unstable();
    Ok(members)
}

/// Filter the CSR rows of `members`. Relabeling is monotonic, so filtered rows
/// stay ascending and can be handed straight to `from_csr`.
fn extract(graph: &GraphStore, members: &[VertexId], relabel: bool) -> GraphResult<GraphStore> {
    let n = graph.vertex_count();
    let mut new_id: Vec<Option<VertexId>> = vec![None; n];
    for (i, &v) in members.iter().enumerate() {
        new_id[v as usize] = Some(if relabel { i as VertexId } else { v });
    }

    let row_count = if relabel { members.len() } else { n };
    let mut offsets = Vec::with_capacity(row_count + 1);
    let mut indices = Vec::new();
    let mut weights = graph.is_weighted().then(Vec::new);
    offsets.push(0);

    for v in 0..n as VertexId {
        let member = new_id[v as usize].is_some();
        if relabel && !member {
            continue;
        }
        if member {
            let row_weights = graph.edge_weights(v);
            for (i, &u) in graph.neighbors(v).iter().enumerate() {
                if let Some(mapped) = new_id[u as usize] {
                    indices.push(mapped);
                    if let (Some(out), Some(w)) = (weights.as_mut(), row_weights) {
                        out.push(w[i]);
                    }
                }
            }
        }
        offsets.push(indices.len());
    }

    let weights = match weights {
        Some(w) => EdgeWeights::Weighted(w),
        None => EdgeWeights::Unweighted,
    };
    GraphStore::from_csr(offsets, indices, weights, graph.is_directed())
}
