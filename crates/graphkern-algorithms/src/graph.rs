//! Immutable graph storage shared by every kernel
//!
//! A [`GraphStore`] keeps the same edge multiset twice: once in Compressed
//! Sparse Row form (outgoing adjacency) and once in Compressed Sparse Column
//! form (incoming adjacency). Rows are sorted ascending, which the merge-based
//! intersections in `similarity` and `topology` depend on.

use super::error::{GraphError, GraphResult};
use rayon::prelude::*;

/// Dense vertex identifier in `[0, vertex_count)`
pub type VertexId = u32;

/// Per-edge weight.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Weight {
    Unweighted,
    Weighted(f64),
}

impl Weight {
    /// Numeric value; unweighted edges count as 1.0
    pub fn value(&self) -> f64 {
        match self {
            Weight::Unweighted => 1.0,
            Weight::Weighted(w) => *w,
        }
    }

    pub fn is_weighted(&self) -> bool {
        matches!(self, Weight::Weighted(_))
    }
}

/// A single directed (or, in an undirected graph, unordered) edge
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub src: VertexId,
    pub dst: VertexId,
    pub weight: Weight,
}

impl Edge {
    pub fn new(src: VertexId, dst: VertexId) -> Self {
        Edge { src, dst, weight: Weight::Unweighted }
    }

    pub fn weighted(src: VertexId, dst: VertexId, weight: f64) -> Self {
        Edge { src, dst, weight: Weight::Weighted(weight) }
    }
}

/// Graph-level weight storage, aligned with the index array it belongs to
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeWeights {
    Unweighted,
    Weighted(Vec<f64>),
}

impl EdgeWeights {
    pub fn is_weighted(&self) -> bool {
        matches!(self, EdgeWeights::Weighted(_))
    }

    pub fn as_slice(&self) -> Option<&[f64]> {
        match self {
            EdgeWeights::Unweighted => None,
            EdgeWeights::Weighted(w) => Some(w),
        }
    }

    /// Weight of the entry at `pos`, 1.0 when unweighted
    pub fn value_at(&self, pos: usize) -> f64 {
        match self {
            EdgeWeights::Unweighted => 1.0,
            EdgeWeights::Weighted(w) => w[pos],
        }
    }
}

/// Compressed sparse row (or column) arrays.
///
/// `offsets` has length `n + 1`; row `v` spans
/// `indices[offsets[v]..offsets[v + 1]]`, ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct Compressed {
    offsets: Vec<usize>,
    indices: Vec<VertexId>,
    weights: EdgeWeights,
}

impl Compressed {
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn indices(&self) -> &[VertexId] {
        &self.indices
    }

    pub fn weights(&self) -> &EdgeWeights {
        &self.weights
    }

    pub fn row(&self, v: usize) -> &[VertexId] {
        &self.indices[self.offsets[v]..self.offsets[v + 1]]
    }

    pub fn row_weights(&self, v: usize) -> Option<&[f64]> {
        self.weights
            .as_slice()
            .map(|w| &w[self.offsets[v]..self.offsets[v + 1]])
    }

    pub fn row_len(&self, v: usize) -> usize {
        self.offsets[v + 1] - self.offsets[v]
    }

    fn entry_count(&self) -> usize {
        self.indices.len()
    }

    /// Bucket `(rows[e], cols[e], weights[e])` triples by row, then sort each
    /// row by column. Parallel entries keep their relative input order.
    fn from_triples(n: usize, rows: &[VertexId], cols: &[VertexId], weights: Option<&[f64]>) -> Self {
        let m = rows.len();
        let mut offsets = vec![0usize; n + 1];
        for &r in rows {
            offsets[r as usize + 1] += 1;
        }
        for i in 0..n {
            offsets[i + 1] += offsets[i];
        }

        let mut cursor = offsets.clone();
        let mut indices: Vec<VertexId> = vec![0; m];
        let mut flat_weights = weights.map(|_| vec![0.0; m]);

        for (e, (&r, &c)) in rows.iter().zip(cols.iter()).enumerate() {
            let slot = cursor[r as usize];
            cursor[r as usize] += 1;
            indices[slot] = c;
            if let (Some(out), Some(w)) = (flat_weights.as_mut(), weights) {
                out[slot] = w[e];
            }
        }

        for v in 0..n {
            let (start, end) = (offsets[v], offsets[v + 1]);
            match flat_weights.as_mut() {
                None => indices[start..end].sort_unstable(),
                Some(w) => {
                    let mut row: Vec<(VertexId, f64)> = indices[start..end]
                        .iter()
                        .copied()
                        .zip(w[start..end].iter().copied())
                        .collect();
                    row.sort_by_key(|&(c, _)| c);
                    for (i, (c, x)) in row.into_iter().enumerate() {
                        indices[start + i] = c;
                        w[start + i] = x;
                    }
                }
            }
        }

        Compressed {
            offsets,
            indices,
            weights: match flat_weights {
                Some(w) => EdgeWeights::Weighted(w),
                None => EdgeWeights::Unweighted,
            },
        }
    }

    /// Row index of every stored entry, in storage order
    fn expanded_rows(&self) -> Vec<VertexId> {
        let n = self.offsets.len() - 1;
        let mut rows = Vec::with_capacity(self.entry_count());
        for v in 0..n {
            rows.extend(std::iter::repeat(v as VertexId).take(self.row_len(v)));
        }
        rows
    }

    fn transpose(&self) -> Self {
        let n = self.offsets.len() - 1;
        let rows = self.expanded_rows();
        Compressed::from_triples(n, &self.indices, &rows, self.weights.as_slice())
    }
}

/// Coordinate (edge list) view: parallel source/destination/weight arrays
#[derive(Debug, Clone, PartialEq)]
pub struct CooView {
    pub src: Vec<VertexId>,
    pub dst: Vec<VertexId>,
    pub weights: EdgeWeights,
}

impl CooView {
    pub fn len(&self) -> usize {
        self.src.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }
}

/// Raw input accepted by [`build_graph`]
#[derive(Debug, Clone)]
pub enum GraphInput {
    EdgeList(Vec<Edge>),
    Csr {
        offsets: Vec<usize>,
        indices: Vec<VertexId>,
        weights: EdgeWeights,
    },
}

/// Build a graph from either an edge list or CSR arrays.
///
/// With `weighted == false` any supplied weights are discarded and the graph
/// is purely structural. With `weighted == true` the input must carry weights.
pub fn build_graph(input: GraphInput, directed: bool, weighted: bool) -> GraphResult<GraphStore> {
    match input {
        GraphInput::EdgeList(mut edges) => {
            if weighted {
                if edges.iter().any(|e| !e.weight.is_weighted()) {
                    return Err(GraphError::invalid_graph(
                        "weighted graph requested but some edges carry no weight",
                    ));
                }
            } else {
                for e in edges.iter_mut() {
                    e.weight = Weight::Unweighted;
                }
            }
            GraphStore::from_edge_list(&edges, directed)
        }
        GraphInput::Csr { offsets, indices, weights } => {
            let weights = match (weighted, weights) {
                (false, _) => EdgeWeights::Unweighted,
                (true, EdgeWeights::Unweighted) if !indices.is_empty() => {
                    return Err(GraphError::invalid_graph(
                        "weighted graph requested but no weight array supplied",
                    ))
                }
                (true, w) => w,
            };
            GraphStore::from_csr(offsets, indices, weights, directed)
        }
    }
}

/// Immutable adjacency store with consistent CSR and CSC views.
///
/// Once constructed it is never mutated, so it can be shared across threads
/// and algorithm invocations without locking.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStore {
    vertex_count: usize,
    directed: bool,
    /// Outgoing adjacency
    csr: Compressed,
    /// Incoming adjacency (transpose of `csr`)
    csc: Compressed,
}

impl GraphStore {
    /// Build from an edge list; the vertex count is `max id + 1`.
    pub fn from_edge_list(edges: &[Edge], directed: bool) -> GraphResult<Self> {
        let vertex_count = edges
            .iter()
            .map(|e| e.src.max(e.dst) as usize + 1)
            .max()
            .unwrap_or(0);
        Self::from_edge_list_with_vertex_count(vertex_count, edges, directed)
    }

    /// Build from an edge list over an explicit vertex count.
    ///
    /// Undirected graphs store every non-loop edge in both directions.
    pub fn from_edge_list_with_vertex_count(
        vertex_count: usize,
        edges: &[Edge],
        directed: bool,
    ) -> GraphResult<Self> {
        check_vertex_count(vertex_count)?;

        let weighted = edges.first().map(|e| e.weight.is_weighted()).unwrap_or(false);
        let capacity = if directed { edges.len() } else { edges.len() * 2 };
        let mut rows = Vec::with_capacity(capacity);
        let mut cols = Vec::with_capacity(capacity);
        let mut weights = if weighted { Some(Vec::with_capacity(capacity)) } else { None };

        for (i, edge) in edges.iter().enumerate() {
            for id in [edge.src, edge.dst] {
                if id as usize >= vertex_count {
                    return Err(GraphError::invalid_graph(format!(
                        "edge {} references vertex {} outside [0, {})",
                        i, id, vertex_count
                    )));
                }
            }
            if edge.weight.is_weighted() != weighted {
                return Err(GraphError::invalid_graph(format!(
                    "edge {} mixes weighted and unweighted edges",
                    i
                )));
            }
            let w = edge.weight.value();
            if !w.is_finite() {
                return Err(GraphError::invalid_graph(format!("edge {} has non-finite weight", i)));
            }

            rows.push(edge.src);
            cols.push(edge.dst);
            if let Some(ws) = weights.as_mut() {
                ws.push(w);
            }
            if !directed && edge.src != edge.dst {
                rows.push(edge.dst);
                cols.push(edge.src);
                if let Some(ws) = weights.as_mut() {
                    ws.push(w);
                }
            }
        }

        let csr = Compressed::from_triples(vertex_count, &rows, &cols, weights.as_deref());
        let csc = csr.transpose();
        Ok(GraphStore { vertex_count, directed, csr, csc })
    }

    /// Build from CSR arrays.
    ///
    /// `offsets` must start at 0, be non-decreasing and end at
    /// `indices.len()`; every row must be ascending and every index must lie
    /// in `[0, offsets.len() - 1)`.
    pub fn from_csr(
        offsets: Vec<usize>,
        indices: Vec<VertexId>,
        weights: EdgeWeights,
        directed: bool,
    ) -> GraphResult<Self> {
        let Some(&last) = offsets.last() else {
            return Err(GraphError::invalid_graph("row_offsets must have length n + 1"));
        };
        let vertex_count = offsets.len() - 1;
        check_vertex_count(vertex_count)?;
        if offsets[0] != 0 {
            return Err(GraphError::invalid_graph("row_offsets must start at 0"));
        }
        if let Some(pos) = offsets.windows(2).position(|w| w[0] > w[1]) {
            return Err(GraphError::invalid_graph(format!(
                "row_offsets decrease at position {}",
                pos + 1
            )));
        }
        if last != indices.len() {
            return Err(GraphError::invalid_graph(format!(
                "row_offsets end at {} but {} column indices were supplied",
                last,
                indices.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&c| c as usize >= vertex_count) {
            return Err(GraphError::invalid_graph(format!(
                "column index {} outside [0, {})",
                bad, vertex_count
            )));
        }
        if let EdgeWeights::Weighted(w) = &weights {
            if w.len() != indices.len() {
                return Err(GraphError::invalid_graph(format!(
                    "weight array has length {} but {} column indices were supplied",
                    w.len(),
                    indices.len()
                )));
            }
            if w.iter().any(|x| !x.is_finite()) {
                return Err(GraphError::invalid_graph("weight array contains non-finite values"));
            }
        }
        for v in 0..vertex_count {
            let row = &indices[offsets[v]..offsets[v + 1]];
            if row.windows(2).any(|p| p[0] > p[1]) {
                return Err(GraphError::invalid_graph(format!(
                    "column indices of row {} are not ascending",
                    v
                )));
            }
        }

        let csr = Compressed { offsets, indices, weights };
        let csc = csr.transpose();
        Ok(GraphStore { vertex_count, directed, csr, csc })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of stored entries (undirected edges count once per direction)
    pub fn edge_count(&self) -> usize {
        self.csr.entry_count()
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn is_weighted(&self) -> bool {
        self.csr.weights.is_weighted()
    }

    // The per-vertex accessors below index the CSR/CSC arrays directly.
    // Algorithm entry points validate ids with `check_vertex` first.

    /// Out-degree of `v`
    ///
    /// # Panics
    ///
    /// Panics if `v >= self.vertex_count()`; the same holds for
    /// [`in_degree`](Self::in_degree), [`neighbors`](Self::neighbors),
    /// [`in_neighbors`](Self::in_neighbors), [`edge_weights`](Self::edge_weights)
    /// and [`weighted_neighbors`](Self::weighted_neighbors).
    pub fn degree(&self, v: VertexId) -> usize {
        self.csr.row_len(v as usize)
    }

    pub fn in_degree(&self, v: VertexId) -> usize {
        self.csc.row_len(v as usize)
    }

    /// Outgoing neighbors of `v`, ascending
    pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
        self.csr.row(v as usize)
    }

    /// Incoming neighbors of `v`, ascending
    pub fn in_neighbors(&self, v: VertexId) -> &[VertexId] {
        self.csc.row(v as usize)
    }

    /// Weights aligned with [`GraphStore::neighbors`], `None` when unweighted
    pub fn edge_weights(&self, v: VertexId) -> Option<&[f64]> {
        self.csr.row_weights(v as usize)
    }

    /// `(neighbor, weight)` pairs of `v`; unweighted edges yield 1.0
    pub fn weighted_neighbors(&self, v: VertexId) -> impl Iterator<Item = (VertexId, f64)> + '_ {
        let start = self.csr.offsets[v as usize];
        self.neighbors(v)
            .iter()
            .enumerate()
            .map(move |(i, &u)| (u, self.csr.weights.value_at(start + i)))
    }

    pub fn csr(&self) -> &Compressed {
        &self.csr
    }

    pub fn csc(&self) -> &Compressed {
        &self.csc
    }

    /// Every stored entry as an [`Edge`], in CSR order
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.vertex_count as VertexId).flat_map(move |v| {
            let start = self.csr.offsets[v as usize];
            self.neighbors(v).iter().enumerate().map(move |(i, &u)| Edge {
                src: v,
                dst: u,
                weight: match &self.csr.weights {
                    EdgeWeights::Unweighted => Weight::Unweighted,
                    EdgeWeights::Weighted(w) => Weight::Weighted(w[start + i]),
                },
            })
        })
    }

    /// Convert the CSR back to coordinate form
    pub fn coo(&self) -> CooView {
        CooView {
            src: self.csr.expanded_rows(),
            dst: self.csr.indices.clone(),
            weights: self.csr.weights.clone(),
        }
    }

    /// Validate a caller-supplied vertex id
    pub fn check_vertex(&self, v: u64) -> GraphResult<VertexId> {
        if v < self.vertex_count as u64 {
            Ok(v as VertexId)
        } else {
            Err(GraphError::InvalidVertex { vertex: v, vertex_count: self.vertex_count })
        }
    }

    /// Every unordered pair of distinct vertices that are both neighbors of
    /// some vertex, as `(a, b)` with `a < b`, sorted and deduplicated.
    pub fn two_hop_pairs(&self) -> Vec<(VertexId, VertexId)> {
        let mut pairs: Vec<(VertexId, VertexId)> = (0..self.vertex_count as VertexId)
            .into_par_iter()
            .flat_map_iter(|v| {
                let mut row = self.neighbors(v).to_vec();
                row.dedup();
                let mut local = Vec::with_capacity(row.len() * row.len().saturating_sub(1) / 2);
                for (i, &a) in row.iter().enumerate() {
                    for &b in &row[i + 1..] {
                        local.push((a, b));
                    }
                }
                local
            })
            .collect();
        pairs.par_sort_unstable();
        pairs.dedup();
        pairs
    }
}

/// Every vertex id must fit in a [`VertexId`]
fn check_vertex_count(vertex_count: usize) -> GraphResult<()> {
    if vertex_count > VertexId::MAX as usize {
        return Err(GraphError::invalid_graph(format!(
            "vertex count {} exceeds the id range",
            vertex_count
        )));
    }
    Ok(())
}

/// Simple undirected view of a graph: union of outgoing and incoming
/// neighbors, self-loops dropped, parallel entries merged with their weights
/// summed.
///
/// An undirected [`GraphStore`] stores each edge in both directions, so every
/// weight here is doubled. The factor is uniform and cancels wherever the view
/// is consumed.
#[derive(Debug, Clone)]
pub struct SymmetricAdjacency {
    offsets: Vec<usize>,
    indices: Vec<VertexId>,
    weights: Vec<f64>,
}

impl SymmetricAdjacency {
    pub fn from_graph(graph: &GraphStore) -> Self {
        let n = graph.vertex_count();
        let rows: Vec<Vec<(VertexId, f64)>> = (0..n)
            .into_par_iter()
            .map(|v| merge_rows(v as VertexId, graph.csr(), graph.csc()))
            .collect();

        let mut offsets = Vec::with_capacity(n + 1);
        let mut indices = Vec::new();
        let mut weights = Vec::new();
        offsets.push(0);
        for row in rows {
            for (u, w) in row {
                indices.push(u);
                weights.push(w);
            }
            offsets.push(indices.len());
        }

        SymmetricAdjacency { offsets, indices, weights }
    }

    pub fn vertex_count(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn neighbors(&self, v: usize) -> &[VertexId] {
        &self.indices[self.offsets[v]..self.offsets[v + 1]]
    }

    pub fn weights(&self, v: usize) -> &[f64] {
        &self.weights[self.offsets[v]..self.offsets[v + 1]]
    }

    /// Number of distinct neighbors
    pub fn degree(&self, v: usize) -> usize {
        self.offsets[v + 1] - self.offsets[v]
    }

    /// Sum of merged weights
    pub fn weighted_degree(&self, v: usize) -> f64 {
        self.weights(v).iter().sum()
    }
}

fn merge_rows(v: VertexId, csr: &Compressed, csc: &Compressed) -> Vec<(VertexId, f64)> {
    let out_row = csr.row(v as usize);
    let in_row = csc.row(v as usize);
    let out_start = csr.offsets[v as usize];
    let in_start = csc.offsets[v as usize];

    let mut merged: Vec<(VertexId, f64)> = Vec::with_capacity(out_row.len() + in_row.len());
    let (mut i, mut j) = (0, 0);
    while i < out_row.len() || j < in_row.len() {
        let take_out = j >= in_row.len() || (i < out_row.len() && out_row[i] <= in_row[j]);
        let (u, w) = if take_out {
            i += 1;
            (out_row[i - 1], csr.weights.value_at(out_start + i - 1))
        } else {
            j += 1;
            (in_row[j - 1], csc.weights.value_at(in_start + j - 1))
        };
        if u == v {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.0 == u => last.1 += w,
            _ => merged.push((u, w)),
        }
    }
    merged
}

/// Size of the intersection of two ascending sequences.
///
/// Two-pointer walk: advance both on equality, otherwise advance the lesser.
pub fn intersection_size(a: &[VertexId], b: &[VertexId]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            count += 1;
            i += 1;
            j += 1;
        } else if a[i] < b[j] {
            i += 1;
        } else {
            j += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> GraphStore {
        // 0 -> 1 -> 2, 0 -> 2
        GraphStore::from_edge_list(&[Edge::new(1, 2), Edge::new(0, 2), Edge::new(0, 1)], true).unwrap()
    }

    #[test]
    fn test_csr_rows_are_sorted() {
        let g = path_graph();
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.neighbors(0), &[1, 2]);
        assert_eq!(g.neighbors(1), &[2]);
        assert!(g.neighbors(2).is_empty());
        assert_eq!(g.csr().offsets(), &[0, 2, 3, 3]);
    }

    #[test]
    fn test_csc_is_transpose() {
        let g = path_graph();
        assert_eq!(g.in_neighbors(2), &[0, 1]);
        assert_eq!(g.in_degree(2), 2);
        assert_eq!(g.in_degree(0), 0);

        let mut from_csr: Vec<(u32, u32)> = g.edges().map(|e| (e.src, e.dst)).collect();
        let mut from_csc: Vec<(u32, u32)> = (0..3u32)
            .flat_map(|v| g.in_neighbors(v).iter().map(move |&u| (u, v)))
            .collect();
        from_csr.sort();
        from_csc.sort();
        assert_eq!(from_csr, from_csc);
    }

    #[test]
    fn test_weights_follow_sorted_columns() {
        let edges = [Edge::weighted(0, 2, 5.0), Edge::weighted(0, 1, 3.0), Edge::weighted(1, 0, 7.0)];
        let g = GraphStore::from_edge_list(&edges, true).unwrap();
        assert_eq!(g.neighbors(0), &[1, 2]);
        assert_eq!(g.edge_weights(0), Some(&[3.0, 5.0][..]));
        assert_eq!(g.csc().row(0), &[1]);
        assert_eq!(g.csc().row_weights(0), Some(&[7.0][..]));
        assert_eq!(g.csc().row_weights(2), Some(&[5.0][..]));
    }

    #[test]
    fn test_undirected_mirrors_edges() {
        let g = GraphStore::from_edge_list(&[Edge::new(0, 1), Edge::new(2, 2)], false).unwrap();
        assert_eq!(g.neighbors(0), &[1]);
        assert_eq!(g.neighbors(1), &[0]);
        // self-loop stored once
        assert_eq!(g.neighbors(2), &[2]);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn test_parallel_edges_pass_through() {
        let g = GraphStore::from_edge_list(&[Edge::new(0, 1), Edge::new(0, 1)], true).unwrap();
        assert_eq!(g.neighbors(0), &[1, 1]);
        assert_eq!(g.degree(0), 2);
    }

    #[test]
    fn test_from_csr_validation() {
        let ok = GraphStore::from_csr(vec![0, 1, 2], vec![1, 0], EdgeWeights::Unweighted, false);
        assert!(ok.is_ok());

        let bad_len = GraphStore::from_csr(vec![0, 1], vec![0, 0], EdgeWeights::Unweighted, true);
        assert!(matches!(bad_len, Err(GraphError::InvalidGraph(_))));

        let decreasing = GraphStore::from_csr(vec![0, 2, 1, 2], vec![0, 1], EdgeWeights::Unweighted, true);
        assert!(matches!(decreasing, Err(GraphError::InvalidGraph(_))));

        let out_of_range = GraphStore::from_csr(vec![0, 1, 1], vec![5], EdgeWeights::Unweighted, true);
        assert!(matches!(out_of_range, Err(GraphError::InvalidGraph(_))));

        let weight_mismatch =
            GraphStore::from_csr(vec![0, 1, 1], vec![1], EdgeWeights::Weighted(vec![1.0, 2.0]), true);
        assert!(matches!(weight_mismatch, Err(GraphError::InvalidGraph(_))));

        let unsorted = GraphStore::from_csr(vec![0, 2, 2, 2], vec![2, 1], EdgeWeights::Unweighted, true);
        assert!(matches!(unsorted, Err(GraphError::InvalidGraph(_))));

        let empty = GraphStore::from_csr(vec![], vec![], EdgeWeights::Unweighted, true);
        assert!(matches!(empty, Err(GraphError::InvalidGraph(_))));
    }

    #[test]
    fn test_edge_list_validation() {
        let out_of_range = GraphStore::from_edge_list_with_vertex_count(2, &[Edge::new(0, 2)], true);
        assert!(matches!(out_of_range, Err(GraphError::InvalidGraph(_))));

        let mixed = GraphStore::from_edge_list(&[Edge::weighted(0, 1, 1.0), Edge::new(1, 0)], true);
        assert!(matches!(mixed, Err(GraphError::InvalidGraph(_))));

        let nan = GraphStore::from_edge_list(&[Edge::weighted(0, 1, f64::NAN)], true);
        assert!(matches!(nan, Err(GraphError::InvalidGraph(_))));
    }

    #[test]
    fn test_build_graph_weighted_flag() {
        let edges = vec![Edge::weighted(0, 1, 2.5)];
        let structural = build_graph(GraphInput::EdgeList(edges.clone()), true, false).unwrap();
        assert!(!structural.is_weighted());

        let weighted = build_graph(GraphInput::EdgeList(edges), true, true).unwrap();
        assert_eq!(weighted.edge_weights(0), Some(&[2.5][..]));

        let missing = build_graph(GraphInput::EdgeList(vec![Edge::new(0, 1)]), true, true);
        assert!(matches!(missing, Err(GraphError::InvalidGraph(_))));

        let csr = build_graph(
            GraphInput::Csr { offsets: vec![0, 1, 1], indices: vec![1], weights: EdgeWeights::Unweighted },
            true,
            false,
        )
        .unwrap();
        assert_eq!(csr.neighbors(0), &[1]);
    }

    #[test]
    fn test_coo_round_trip() {
        let g = path_graph();
        let coo = g.coo();
        assert_eq!(coo.src, vec![0, 0, 1]);
        assert_eq!(coo.dst, vec![1, 2, 2]);
        assert_eq!(coo.weights, EdgeWeights::Unweighted);

        let edges: Vec<Edge> = coo.src.iter().zip(&coo.dst).map(|(&s, &d)| Edge::new(s, d)).collect();
        assert_eq!(GraphStore::from_edge_list(&edges, true).unwrap(), g);
    }

    #[test]
    fn test_two_hop_pairs() {
        // star centered at 0 plus edge 1-4
        let edges = [Edge::new(0, 1), Edge::new(0, 2), Edge::new(0, 3), Edge::new(1, 4)];
        let g = GraphStore::from_edge_list(&edges, false).unwrap();
        let pairs = g.two_hop_pairs();
        // via 0: (1,2) (1,3) (2,3); via 1: (0,4)
        assert_eq!(pairs, vec![(0, 4), (1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_symmetric_adjacency_merges_directions() {
        let edges = [
            Edge::weighted(0, 1, 1.0),
            Edge::weighted(1, 0, 2.0),
            Edge::weighted(1, 2, 4.0),
            Edge::weighted(2, 2, 9.0),
        ];
        let g = GraphStore::from_edge_list(&edges, true).unwrap();
        let sym = SymmetricAdjacency::from_graph(&g);
        assert_eq!(sym.neighbors(0), &[1]);
        // 0->1 from the out row plus 1->0 from the in row
        assert_eq!(sym.weights(0), &[3.0]);
        assert_eq!(sym.weights(1), &[3.0, 4.0]);
        assert_eq!(sym.neighbors(1), &[0, 2]);
        assert_eq!(sym.neighbors(2), &[1]);
        assert_eq!(sym.degree(2), 1);
        assert_eq!(sym.weighted_degree(2), 4.0);
    }

    #[test]
    fn test_intersection_size() {
        assert_eq!(intersection_size(&[1, 3, 5, 7], &[2, 3, 4, 7, 9]), 2);
        assert_eq!(intersection_size(&[], &[1, 2]), 0);
        assert_eq!(intersection_size(&[1, 1, 2], &[1, 1]), 2);
    }

    #[test]
    fn test_vertex_count_must_fit_id_range() {
        assert!(check_vertex_count(VertexId::MAX as usize).is_ok());
        assert!(matches!(
            check_vertex_count(VertexId::MAX as usize + 1),
            Err(GraphError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_check_vertex() {
        let g = path_graph();
        assert_eq!(g.check_vertex(2), Ok(2));
        assert_eq!(g.check_vertex(3), Err(GraphError::InvalidVertex { vertex: 3, vertex_count: 3 }));
    }

    #[test]
    #[should_panic]
    fn test_degree_out_of_range_panics() {
        let g = path_graph();
        g.degree(3);
    }
}
