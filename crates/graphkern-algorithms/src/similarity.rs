//! Neighborhood similarity between vertex pairs
//!
//! Both coefficients are driven by the merge intersection of two sorted CSR
//! rows, so a pair costs `O(deg(a) + deg(b))`.

use super::error::GraphResult;
use super::graph::{intersection_size, GraphStore, VertexId};
use rayon::prelude::*;

/// Overlap coefficient `|N(a) ∩ N(b)| / min(deg(a), deg(b))` per pair.
///
/// Output order matches `pairs`. A pair whose second vertex has no neighbors
/// yields NaN; when only the first vertex is isolated the intersection is
/// empty and the coefficient is 0.
pub fn overlap(graph: &GraphStore, pairs: &[(VertexId, VertexId)]) -> GraphResult<Vec<f64>> {
    validate_pairs(graph, pairs)?;

    Ok(pairs
        .par_iter()
        .map(|&(a, b)| overlap_coefficient(graph, a, b))
        .collect())
}

/// Jaccard coefficient `|N(a) ∩ N(b)| / |N(a) ∪ N(b)|` per pair; NaN when the
/// union is empty
pub fn jaccard(graph: &GraphStore, pairs: &[(VertexId, VertexId)]) -> GraphResult<Vec<f64>> {
    validate_pairs(graph, pairs)?;

    Ok(pairs
        .par_iter()
        .map(|&(a, b)| {
            let shared = intersection_size(graph.neighbors(a), graph.neighbors(b));
            let union = graph.degree(a) + graph.degree(b) - shared;
            if union == 0 {
                f64::NAN
            } else {
                shared as f64 / union as f64
            }
        })
        .collect())
}

fn overlap_coefficient(graph: &GraphStore, a: VertexId, b: VertexId) -> f64 {
    let deg_b = graph.degree(b);
    if deg_b == 0 {
        return f64::NAN;
    }
    let deg_a = graph.degree(a);
    if deg_a == 0 {
        return 0.0;
    }
    let shared = intersection_size(graph.neighbors(a), graph.neighbors(b));
    shared as f64 / deg_a.min(deg_b) as f64
}

fn validate_pairs(graph: &GraphStore, pairs: &[(VertexId, VertexId)]) -> GraphResult<()> {
    for &(a, b) in pairs {
        graph.check_vertex(a as u64)?;
        graph.check_vertex(b as u64)?;
    }
    Ok(())
}
