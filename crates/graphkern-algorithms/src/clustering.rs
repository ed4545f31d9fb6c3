//! Spectral balanced-cut clustering and edge-cut scoring
//!
//! The graph is embedded with the smallest non-trivial eigenvectors of its
//! normalized Laplacian, then the embedded points are partitioned with
//! k-means. Both iterative stages are capped; hitting a cap produces a
//! best-effort result tagged with [`NumericalNonConvergence`].

use super::error::{GraphError, GraphResult};
use super::graph::{GraphStore, VertexId};
use super::spectral::{embed, squared_distance, EigenLimits, NormalizedAdjacency};
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Spectral clustering configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SpectralConfig {
    /// Cap on eigensolver iterations
    pub max_eigen_iterations: usize,
    /// Residual norm at which a Ritz pair counts as converged
    pub eigen_tolerance: f64,
    /// Extra block vectors carried by the eigensolver
    pub oversample: usize,
    /// Cap on Lloyd iterations per k-means run
    pub max_kmeans_iterations: usize,
    /// Largest squared centroid shift that still counts as converged
    pub kmeans_tolerance: f64,
    /// Independent k-means runs; the lowest inertia wins
    pub kmeans_restarts: usize,
    /// Seed for the eigensolver start block and k-means++ seeding
    pub seed: u64,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            max_eigen_iterations: 2000,
            eigen_tolerance: 1e-6,
            oversample: 8,
            max_kmeans_iterations: 100,
            kmeans_tolerance: 1e-10,
            kmeans_restarts: 4,
            seed: 0,
        }
    }
}

/// Iterative stage that hit its cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStage {
    Eigensolver,
    KMeans,
}

/// Non-fatal flag: the stage stopped at its iteration cap and its last
/// estimate was used.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumericalNonConvergence {
    pub stage: SolverStage,
    pub iterations: usize,
    /// Eigen residual norm, or the last squared centroid shift for k-means
    pub residual: f64,
}

/// Vertex to cluster mapping
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClusterAssignment {
    k: usize,
    clusters: Vec<u32>,
}

impl ClusterAssignment {
    /// Validate `clusters` against `k`
    pub fn new(k: usize, clusters: Vec<u32>) -> GraphResult<Self> {
        if let Some(&bad) = clusters.iter().find(|&&c| c as usize >= k) {
            return Err(GraphError::InvalidArgument(format!(
                "cluster id {} outside [0, {})",
                bad, k
            )));
        }
        Ok(ClusterAssignment { k, clusters })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Cluster of vertex `v`
    ///
    /// # Panics
    ///
    /// Panics if `v >= self.len()`.
    pub fn cluster_of(&self, v: VertexId) -> u32 {
        self.clusters[v as usize]
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Number of vertices in each cluster
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &c in &self.clusters {
            sizes[c as usize] += 1;
        }
        sizes
    }
}

/// Spectral clustering result
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpectralClustering {
    pub assignment: ClusterAssignment,
    /// Smallest non-trivial Laplacian eigenvalue estimates, ascending
    pub eigenvalues: Vec<f64>,
    pub eigen_iterations: usize,
    pub kmeans_iterations: usize,
    /// Empty when both stages converged
    pub warnings: Vec<NumericalNonConvergence>,
}

impl SpectralClustering {
    pub fn converged(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Partition the graph into `k` clusters using `num_eigenvectors` spectral
/// coordinates and the default configuration.
pub fn spectral_balanced_cut(
    graph: &GraphStore,
    k: usize,
    num_eigenvectors: usize,
) -> GraphResult<SpectralClustering> {
    spectral_balanced_cut_with_config(graph, k, num_eigenvectors, &SpectralConfig::default())
}

/// Spectral balanced-cut clustering.
///
/// Requires `1 <= k <= num_eigenvectors < n`. Direction and self-loops are
/// ignored. The output depends only on the graph, `k`, `num_eigenvectors` and
/// `config`.
pub fn spectral_balanced_cut_with_config(
    graph: &GraphStore,
    k: usize,
    num_eigenvectors: usize,
    config: &SpectralConfig,
) -> GraphResult<SpectralClustering> {
    check_spectral_parameters(graph.vertex_count(), k, num_eigenvectors)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let op = NormalizedAdjacency::new(graph);
    let limits = EigenLimits {
        max_iterations: config.max_eigen_iterations,
        tolerance: config.eigen_tolerance,
        oversample: config.oversample,
    };
    let embedding = embed(&op, num_eigenvectors, &limits, &mut rng);

    let mut warnings = Vec::new();
    if !embedding.converged {
        tracing::warn!(
            "Eigensolver stopped at {} iterations with residual {:.3e}",
            embedding.iterations,
            embedding.residual
        );
        warnings.push(NumericalNonConvergence {
            stage: SolverStage::Eigensolver,
            iterations: embedding.iterations,
            residual: embedding.residual,
        });
    }

    let partition = kmeans(&embedding.coordinates, k, config, &mut rng);
    if !partition.converged {
        tracing::warn!(
            "k-means stopped at {} iterations with centroid shift {:.3e}",
            partition.iterations,
            partition.shift
        );
        warnings.push(NumericalNonConvergence {
            stage: SolverStage::KMeans,
            iterations: partition.iterations,
            residual: partition.shift,
        });
    }

    Ok(SpectralClustering {
        assignment: ClusterAssignment { k, clusters: partition.assignment },
        eigenvalues: embedding.eigenvalues,
        eigen_iterations: embedding.iterations,
        kmeans_iterations: partition.iterations,
        warnings,
    })
}

/// Check `1 <= k <= num_eigenvectors < n` for an `n`-vertex graph
pub fn check_spectral_parameters(n: usize, k: usize, num_eigenvectors: usize) -> GraphResult<()> {
    if k == 0 {
        return Err(GraphError::invalid_argument("partition count must be at least 1"));
    }
    if num_eigenvectors < k {
        return Err(GraphError::invalid_argument(format!(
            "need at least {} eigenvectors for {} partitions, got {}",
            k, k, num_eigenvectors
        )));
    }
    if k > n {
        return Err(GraphError::invalid_argument(format!(
            "cannot split {} vertices into {} partitions",
            n, k
        )));
    }
    if num_eigenvectors >= n {
        return Err(GraphError::invalid_argument(format!(
            "{} eigenvectors requested but a {}-vertex graph has only {} non-trivial ones",
            num_eigenvectors,
            n,
            n.saturating_sub(1)
        )));
    }
    Ok(())
}

/// Normalized edge cut of an assignment; lower is better.
///
/// Every stored edge `(u, v, w)` adds `w` to the volume of both endpoint
/// clusters, and to the boundary of both when they differ. The score is the
/// sum over clusters of `boundary / volume`; clusters with no volume add 0.
pub fn edge_cut_score(graph: &GraphStore, k: usize, assignment: &[u32]) -> GraphResult<f64> {
    if k == 0 {
        return Err(GraphError::invalid_argument("partition count must be at least 1"));
    }
    if assignment.len() != graph.vertex_count() {
        return Err(GraphError::invalid_argument(format!(
            "assignment covers {} vertices but the graph has {}",
            assignment.len(),
            graph.vertex_count()
        )));
    }
    if let Some(&bad) = assignment.iter().find(|&&c| c as usize >= k) {
        return Err(GraphError::invalid_argument(format!(
            "cluster id {} outside [0, {})",
            bad, k
        )));
    }

    let mut boundary = vec![0.0; k];
    let mut volume = vec![0.0; k];
    for u in 0..graph.vertex_count() as VertexId {
        let cu = assignment[u as usize] as usize;
        for (v, w) in graph.weighted_neighbors(u) {
            let cv = assignment[v as usize] as usize;
            volume[cu] += w;
            volume[cv] += w;
            if cu != cv {
                boundary[cu] += w;
                boundary[cv] += w;
            }
        }
    }

    Ok(boundary
        .iter()
        .zip(&volume)
        .map(|(&b, &vol)| if vol > 0.0 { b / vol } else { 0.0 })
        .sum())
}

struct KMeansOutput {
    assignment: Vec<u32>,
    inertia: f64,
    iterations: usize,
    shift: f64,
    converged: bool,
}

/// Best of `config.kmeans_restarts` k-means runs
fn kmeans(points: &Array2<f64>, k: usize, config: &SpectralConfig, rng: &mut StdRng) -> KMeansOutput {
    let mut best: Option<KMeansOutput> = None;
    for _ in 0..config.kmeans_restarts.max(1) {
        let run = kmeans_once(points, k, config, rng);
        tracing::debug!("k-means run: inertia {:.6}, {} iterations", run.inertia, run.iterations);
        if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }
    // at least one run always happens
    best.unwrap_or_else(|| kmeans_once(points, k, config, rng))
}

fn kmeans_once(points: &Array2<f64>, k: usize, config: &SpectralConfig, rng: &mut StdRng) -> KMeansOutput {
    let (n, dim) = points.dim();
    let mut centroids = seed_centroids(points, k, rng);
    let mut assignment = vec![u32::MAX; n];
    let mut iterations = 0;
    let mut shift = f64::INFINITY;
    let mut converged = false;

    for it in 1..=config.max_kmeans_iterations.max(1) {
        iterations = it;
        let mut next: Vec<u32> = (0..n)
            .into_par_iter()
            .map(|i| nearest(points.row(i), &centroids).0 as u32)
            .collect();
        reseed_empty_clusters(points, &centroids, &mut next, k);

        let mut sums = Array2::<f64>::zeros((k, dim));
        let mut counts = vec![0usize; k];
        for (i, &c) in next.iter().enumerate() {
            let mut row = sums.row_mut(c as usize);
            row += &points.row(i);
            counts[c as usize] += 1;
        }
        shift = 0.0;
        for c in 0..k {
            if counts[c] == 0 {
                continue;
            }
            let updated = &sums.row(c) / counts[c] as f64;
            shift = f64::max(shift, squared_distance(updated.view(), centroids.row(c)));
            centroids.row_mut(c).assign(&updated);
        }

        let stable = next == assignment;
        assignment = next;
        if stable || shift <= config.kmeans_tolerance {
            converged = true;
            break;
        }
    }

    let inertia = (0..n)
        .map(|i| squared_distance(points.row(i), centroids.row(assignment[i] as usize)))
        .sum();

    KMeansOutput { assignment, inertia, iterations, shift, converged }
}

/// k-means++ seeding. Falls back to the first unchosen point once every
/// remaining point coincides with a centroid.
fn seed_centroids(points: &Array2<f64>, k: usize, rng: &mut StdRng) -> Array2<f64> {
    let n = points.nrows();
    let mut chosen = vec![rng.gen_range(0..n)];
    let mut d2: Vec<f64> = (0..n)
        .map(|i| squared_distance(points.row(i), points.row(chosen[0])))
        .collect();

    while chosen.len() < k {
        let total: f64 = d2.iter().sum();
        let pick = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut pick = None;
            for (i, &d) in d2.iter().enumerate() {
                if d > 0.0 {
                    pick = Some(i);
                    if target < d {
                        break;
                    }
                    target -= d;
                }
            }
            pick
        } else {
            None
        };
        let next = pick
            .or_else(|| (0..n).find(|i| !chosen.contains(i)))
            .unwrap_or(chosen[0]);

        for (i, d) in d2.iter_mut().enumerate() {
            *d = d.min(squared_distance(points.row(i), points.row(next)));
        }
        chosen.push(next);
    }

    let dim = points.ncols();
    Array2::from_shape_fn((k, dim), |(c, j)| points[[chosen[c], j]])
}

fn nearest(point: ArrayView1<f64>, centroids: &Array2<f64>) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (c, centroid) in centroids.rows().into_iter().enumerate() {
        let d = squared_distance(point, centroid);
        if d < best.1 {
            best = (c, d);
        }
    }
    best
}

/// Give every empty cluster the point farthest from its current centroid,
/// taken from a cluster that keeps at least one member.
fn reseed_empty_clusters(points: &Array2<f64>, centroids: &Array2<f64>, assignment: &mut [u32], k: usize) {
    let mut counts = vec![0usize; k];
    for &c in assignment.iter() {
        counts[c as usize] += 1;
    }

    for empty in 0..k {
        if counts[empty] > 0 {
            continue;
        }
        let donor = (0..assignment.len())
            .filter(|&i| counts[assignment[i] as usize] > 1)
            .map(|i| (i, squared_distance(points.row(i), centroids.row(assignment[i] as usize))))
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, bd)) if bd >= d => best,
                _ => Some((i, d)),
            });
        if let Some((i, _)) = donor {
            counts[assignment[i] as usize] -= 1;
            assignment[i] = empty as u32;
            counts[empty] = 1;
        }
    }
}
