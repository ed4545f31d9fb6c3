//! Spectral embedding via the normalized graph Laplacian
//!
//! `L = I − D^{-1/2} A D^{-1/2}` has its spectrum in `[0, 2]`. The solver works
//! on the shifted operator `M = 2I − L = I + D^{-1/2} A D^{-1/2}`, whose
//! largest eigenpairs are the smallest of `L`, using block subspace iteration
//! with Rayleigh–Ritz extraction. The trivial eigenvector `D^{1/2}·1` is
//! projected out of every iterate.

use super::graph::{GraphStore, SymmetricAdjacency};
use ndarray::{s, Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;

/// Result of the eigensolve
pub(crate) struct Embedding {
    /// One row per vertex, whitened column by column
    pub coordinates: Array2<f64>,
    /// Ritz values of `L`, ascending
    pub eigenvalues: Vec<f64>,
    pub iterations: usize,
    /// Largest residual norm among the returned Ritz pairs
    pub residual: f64,
    pub converged: bool,
}

/// Iteration limits for [`embed`]
pub(crate) struct EigenLimits {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub oversample: usize,
}

/// `D^{-1/2} A D^{-1/2}` over the symmetric view of a graph
pub(crate) struct NormalizedAdjacency {
    sym: SymmetricAdjacency,
    inv_sqrt_degree: Vec<f64>,
    /// Unit-norm `D^{1/2}·1`; `None` when the graph has no edges
    trivial: Option<Array1<f64>>,
}

impl NormalizedAdjacency {
    pub fn new(graph: &GraphStore) -> Self {
        let sym = SymmetricAdjacency::from_graph(graph);
        let n = sym.vertex_count();
        let degree: Vec<f64> = (0..n).map(|v| sym.weighted_degree(v)).collect();
        let inv_sqrt_degree = degree
            .iter()
            .map(|&d| if d > 0.0 { 1.0 / d.sqrt() } else { 0.0 })
            .collect();

        let sqrt_degree = Array1::from_iter(degree.iter().map(|&d| d.max(0.0).sqrt()));
        let norm = sqrt_degree.dot(&sqrt_degree).sqrt();
        let trivial = (norm > 0.0).then(|| sqrt_degree / norm);

        NormalizedAdjacency { sym, inv_sqrt_degree, trivial }
    }

    pub fn vertex_count(&self) -> usize {
        self.sym.vertex_count()
    }

    /// `M·X` for an `n × p` block
    fn apply_shifted(&self, x: &Array2<f64>) -> Array2<f64> {
        let (n, p) = x.dim();
        let mut out = vec![0.0; n * p];

        out.par_chunks_mut(p).enumerate().for_each(|(i, row)| {
            for (k, slot) in row.iter_mut().enumerate() {
                *slot = x[[i, k]];
            }
            let si = self.inv_sqrt_degree[i];
            if si == 0.0 {
                return;
            }
            for (&j, &w) in self.sym.neighbors(i).iter().zip(self.sym.weights(i)) {
                let j = j as usize;
                let c = si * w * self.inv_sqrt_degree[j];
                for (k, slot) in row.iter_mut().enumerate() {
                    *slot += c * x[[j, k]];
                }
            }
        });

        Array2::from_shape_fn((n, p), |(i, k)| out[i * p + k])
    }

    fn deflate(&self, v: &mut Array1<f64>) {
        if let Some(t) = &self.trivial {
            let c = v.dot(t);
            v.scaled_add(-c, t);
        }
    }
}

/// Compute the `nev` smallest non-trivial eigenvectors of the normalized
/// Laplacian and turn them into per-vertex coordinates.
///
/// Requires `1 <= nev < n`. Never loops past `limits.max_iterations`; when the
/// cap is hit the current Ritz vectors are returned with `converged == false`.
pub(crate) fn embed(op: &NormalizedAdjacency, nev: usize, limits: &EigenLimits, rng: &mut StdRng) -> Embedding {
    let n = op.vertex_count();
    let block = nev.saturating_add(limits.oversample).min(n - 1).max(nev);

    let mut x = Array2::from_shape_fn((n, block), |_| rng.gen_range(-1.0..1.0));
    orthonormalize(op, &mut x, rng);

    let mut theta = vec![0.0; block];
    let mut residual = f64::INFINITY;
    let mut iterations = 0;
    let mut converged = false;

    for it in 1..=limits.max_iterations.max(1) {
        iterations = it;
        let z = op.apply_shifted(&x);

        let h = x.t().dot(&z);
        let h = (&h + &h.t()) * 0.5;
        let (values, rotation) = symmetric_eigen(&h);

        let ritz_x = x.dot(&rotation);
        let ritz_z = z.dot(&rotation);

        residual = (0..nev)
            .map(|i| {
                let r = &ritz_z.column(i) - &(&ritz_x.column(i) * values[i]);
                r.dot(&r).sqrt()
            })
            .fold(0.0, f64::max);
        theta = values;

        if residual <= limits.tolerance || it == limits.max_iterations.max(1) {
            converged = residual <= limits.tolerance;
            x = ritz_x;
            break;
        }

        x = ritz_z;
        orthonormalize(op, &mut x, rng);
    }

    tracing::debug!(
        "Eigensolver finished after {} iterations, residual {:.3e}",
        iterations,
        residual
    );

    let vectors = x.slice(s![.., ..nev]).to_owned();
    Embedding {
        coordinates: whiten(scale_rows(&vectors, &op.inv_sqrt_degree)),
        eigenvalues: theta.iter().take(nev).map(|t| 2.0 - t).collect(),
        iterations,
        residual,
        converged,
    }
}

/// Modified Gram–Schmidt with reorthogonalization, keeping every column
/// orthogonal to the trivial vector. A column that collapses is refilled with
/// random entries.
fn orthonormalize(op: &NormalizedAdjacency, x: &mut Array2<f64>, rng: &mut StdRng) {
    let (n, p) = x.dim();
    let mut basis: Vec<Array1<f64>> = Vec::with_capacity(p);

    for j in 0..p {
        let mut v = x.column(j).to_owned();
        for _attempt in 0..4 {
            for _pass in 0..2 {
                op.deflate(&mut v);
                for q in &basis {
                    let c = v.dot(q);
                    v.scaled_add(-c, q);
                }
            }
            let norm = v.dot(&v).sqrt();
            if norm > 1e-10 {
                v /= norm;
                break;
            }
            v = Array1::from_shape_fn(n, |_| rng.gen_range(-1.0..1.0));
        }
        x.column_mut(j).assign(&v);
        basis.push(v);
    }
}

/// Eigen-decomposition of a small symmetric matrix by cyclic Jacobi sweeps.
/// Eigenvalues come back in descending order, eigenvectors as matching
/// columns.
pub(crate) fn symmetric_eigen(matrix: &Array2<f64>) -> (Vec<f64>, Array2<f64>) {
    const MAX_SWEEPS: usize = 100;
    let p = matrix.nrows();
    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(p);

    let scale: f64 = a.iter().map(|x| x * x).sum::<f64>().max(f64::MIN_POSITIVE);
    for _ in 0..MAX_SWEEPS {
        let mut off = 0.0;
        for i in 0..p {
            for j in 0..p {
                if i != j {
                    off += a[[i, j]] * a[[i, j]];
                }
            }
        }
        if off <= 1e-24 * scale {
            break;
        }

        for i in 0..p {
            for j in (i + 1)..p {
                let aij = a[[i, j]];
                if aij == 0.0 {
                    continue;
                }
                let theta = (a[[j, j]] - a[[i, i]]) / (2.0 * aij);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..p {
                    let (aki, akj) = (a[[k, i]], a[[k, j]]);
                    a[[k, i]] = c * aki - s * akj;
                    a[[k, j]] = s * aki + c * akj;
                }
                for k in 0..p {
                    let (aik, ajk) = (a[[i, k]], a[[j, k]]);
                    a[[i, k]] = c * aik - s * ajk;
                    a[[j, k]] = s * aik + c * ajk;
                }
                for k in 0..p {
                    let (vki, vkj) = (v[[k, i]], v[[k, j]]);
                    v[[k, i]] = c * vki - s * vkj;
                    v[[k, j]] = s * vki + c * vkj;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..p).collect();
    order.sort_by(|&x, &y| a[[y, y]].total_cmp(&a[[x, x]]));

    let values = order.iter().map(|&i| a[[i, i]]).collect();
    let vectors = Array2::from_shape_fn((p, p), |(r, c)| v[[r, order[c]]]);
    (values, vectors)
}

fn scale_rows(vectors: &Array2<f64>, row_scale: &[f64]) -> Array2<f64> {
    Array2::from_shape_fn(vectors.dim(), |(i, k)| vectors[[i, k]] * row_scale[i])
}

/// Shift every column to zero mean and unit variance; constant columns
/// become zero
fn whiten(mut coords: Array2<f64>) -> Array2<f64> {
    let n = coords.nrows() as f64;
    for mut column in coords.columns_mut() {
        let mean = column.sum() / n;
        let var = column.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
        let std = var.sqrt();
        if std > 1e-12 {
            column.mapv_inplace(|x| (x - mean) / std);
        } else {
            column.fill(0.0);
        }
    }
    coords
}

/// Squared Euclidean distance between two rows
pub(crate) fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
