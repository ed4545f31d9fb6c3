//! Graph algorithms module
//!
//! Algorithms are implemented in the `graphkern-algorithms` crate.
//! This module provides the integration/adapter layer: every call runs on the
//! configured thread pool, reserves its working set through the allocation
//! strategy and is traced.

use crate::config::KernelConfig;
use crate::error::{KernelError, KernelResult};
use crate::memory::{self, AllocationStrategy, Reservation};
use graphkern_algorithms::{
    BfsConfig, DistanceTable, GraphInput, GraphStore, SpectralClustering, Subgraph, TriangleCount, VertexId,
};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::mem::size_of;
use std::sync::Arc;
use tracing::{debug, info_span, warn};

// Re-export algorithms
pub use graphkern_algorithms::{
    bfs, bfs_with_predecessors, build_graph, count_triangles, edge_cut_score, filter_unreachable, jaccard, overlap,
    spectral_balanced_cut, spectral_balanced_cut_with_config, sssp, subgraph, subgraph_compacted, triangle_count,
};

/// Configured entry point for the analytics kernels
#[derive(Debug)]
pub struct Kernel {
    config: KernelConfig,
    strategy: Arc<dyn AllocationStrategy>,
    pool: Option<ThreadPool>,
}

impl Kernel {
    /// Kernel with its own allocation strategy built from `config.memory`
    pub fn new(config: KernelConfig) -> KernelResult<Self> {
        let strategy = memory::strategy_for(&config.memory);
        Self::with_strategy(config, strategy)
    }

    /// Kernel sharing the process-wide strategy installed by
    /// [`memory::initialize`]
    pub fn from_global(config: KernelConfig) -> KernelResult<Self> {
        let strategy = memory::current().ok_or(KernelError::NotInitialized)?;
        Self::with_strategy(config, strategy)
    }

    pub fn with_strategy(config: KernelConfig, strategy: Arc<dyn AllocationStrategy>) -> KernelResult<Self> {
        config.validate()?;
        let pool = match config.parallel.threads {
            Some(threads) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("graphkern-{}", i))
                    .build()
                    .map_err(|e| KernelError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };
        Ok(Self { config, strategy, pool })
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn strategy(&self) -> &Arc<dyn AllocationStrategy> {
        &self.strategy
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    fn reserve(&self, bytes: usize) -> KernelResult<Reservation> {
        Ok(Reservation::new(self.strategy.clone(), bytes)?)
    }

    pub fn build_graph(&self, input: GraphInput, directed: bool, weighted: bool) -> KernelResult<GraphStore> {
        let _span = info_span!("build_graph", directed, weighted).entered();
        let edges = match &input {
            GraphInput::EdgeList(edges) => edges.len().saturating_mul(if directed { 1 } else { 2 }),
            GraphInput::Csr { indices, .. } => indices.len(),
        };
        // CSR + CSC indices and weights
        let _reservation = self.reserve(edges.saturating_mul(2 * (size_of::<VertexId>() + size_of::<f64>())))?;

        let graph = self.install(|| build_graph(input, directed, weighted))?;
        debug!(
            "Built graph: {} vertices, {} edges",
            graph.vertex_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    pub fn bfs(&self, graph: &GraphStore, source: VertexId) -> KernelResult<DistanceTable<u32>> {
        self.traverse(graph, source, false)
    }

    pub fn bfs_with_predecessors(&self, graph: &GraphStore, source: VertexId) -> KernelResult<DistanceTable<u32>> {
        self.traverse(graph, source, true)
    }

    fn traverse(&self, graph: &GraphStore, source: VertexId, predecessors: bool) -> KernelResult<DistanceTable<u32>> {
        let _span = info_span!("bfs", source, predecessors).entered();
        let per_vertex = 3 * size_of::<u32>() + if predecessors { size_of::<Option<VertexId>>() } else { 0 };
        let _reservation = self.reserve(graph.vertex_count().saturating_mul(per_vertex))?;

        let mut config = BfsConfig::new().with_parallel_threshold(self.config.parallel.frontier_parallel_threshold);
        if predecessors {
            config = config.with_predecessors();
        }
        let table = self.install(|| graphkern_algorithms::bfs_with_config(graph, source, &config))?;
        debug!("BFS reached {} of {} vertices", table.reachable_count(), table.len());
        Ok(table)
    }

    pub fn sssp(&self, graph: &GraphStore, source: VertexId) -> KernelResult<DistanceTable<f64>> {
        let _span = info_span!("sssp", source).entered();
        let _reservation = self.reserve(graph.vertex_count().saturating_mul(size_of::<u32>() + 2 * size_of::<f64>()))?;

        let table = self.install(|| sssp(graph, source))?;
        debug!("SSSP reached {} of {} vertices", table.reachable_count(), table.len());
        Ok(table)
    }

    /// Spectral clustering with the configured solver limits
    pub fn spectral_balanced_cut(
        &self,
        graph: &GraphStore,
        k: usize,
        num_eigenvectors: usize,
    ) -> KernelResult<SpectralClustering> {
        let _span = info_span!("spectral_balanced_cut", k, num_eigenvectors).entered();
        let n = graph.vertex_count();
        graphkern_algorithms::check_spectral_parameters(n, k, num_eigenvectors)?;
        let block = num_eigenvectors.saturating_add(self.config.spectral.oversample).min(n);
        // iterate, operator image and Ritz rotations
        let _reservation = self.reserve(n.saturating_mul(block).saturating_mul(4 * size_of::<f64>()))?;

        let result = self.install(|| {
            spectral_balanced_cut_with_config(graph, k, num_eigenvectors, &self.config.spectral)
        })?;
        for warning in &result.warnings {
            warn!(
                "{:?} did not converge: {} iterations, residual {:.3e}",
                warning.stage, warning.iterations, warning.residual
            );
        }
        debug!(
            "Spectral clustering: cluster sizes {:?}, {} eigen iterations, {} k-means iterations",
            result.assignment.sizes(),
            result.eigen_iterations,
            result.kmeans_iterations
        );
        Ok(result)
    }

    pub fn edge_cut_score(&self, graph: &GraphStore, k: usize, assignment: &[u32]) -> KernelResult<f64> {
        let _span = info_span!("edge_cut_score", k).entered();
        let score = edge_cut_score(graph, k, assignment)?;
        debug!("Edge cut score {:.6}", score);
        Ok(score)
    }

    pub fn overlap(&self, graph: &GraphStore, pairs: &[(VertexId, VertexId)]) -> KernelResult<Vec<f64>> {
        let _span = info_span!("overlap", pairs = pairs.len()).entered();
        let _reservation = self.reserve(pairs.len().saturating_mul(size_of::<f64>()))?;

        let scores = self.install(|| overlap(graph, pairs))?;
        debug!(
            "Overlap scored {} pairs, {} undefined",
            scores.len(),
            scores.iter().filter(|s| s.is_nan()).count()
        );
        Ok(scores)
    }

    pub fn jaccard(&self, graph: &GraphStore, pairs: &[(VertexId, VertexId)]) -> KernelResult<Vec<f64>> {
        let _span = info_span!("jaccard", pairs = pairs.len()).entered();
        let _reservation = self.reserve(pairs.len().saturating_mul(size_of::<f64>()))?;
        Ok(self.install(|| jaccard(graph, pairs))?)
    }

    pub fn count_triangles(&self, graph: &GraphStore) -> KernelResult<TriangleCount> {
        let _span = info_span!("triangle_count").entered();
        // symmetric adjacency: both directions of every edge plus merged weights
        let _reservation =
            self.reserve(graph.edge_count().saturating_mul(2 * (size_of::<VertexId>() + size_of::<f64>())))?;

        let count = self.install(|| count_triangles(graph));
        debug!("Counted {} triangles", count.triangles());
        Ok(count)
    }

    pub fn triangle_count(&self, graph: &GraphStore) -> KernelResult<u64> {
        Ok(self.count_triangles(graph)?.triangles())
    }

    pub fn subgraph(&self, graph: &GraphStore, vertex_set: &[VertexId]) -> KernelResult<GraphStore> {
        let _span = info_span!("subgraph", vertices = vertex_set.len()).entered();
        let _reservation = self.reserve(self.extraction_estimate(graph))?;

        let sub = self.install(|| subgraph(graph, vertex_set))?;
        debug!("Subgraph kept {} edges", sub.edge_count());
        Ok(sub)
    }

    pub fn subgraph_compacted(&self, graph: &GraphStore, vertex_set: &[VertexId]) -> KernelResult<Subgraph> {
        let _span = info_span!("subgraph_compacted", vertices = vertex_set.len()).entered();
        let _reservation = self.reserve(self.extraction_estimate(graph))?;

        let sub = self.install(|| subgraph_compacted(graph, vertex_set))?;
        debug!(
            "Subgraph kept {} vertices and {} edges",
            sub.vertices.len(),
            sub.graph.edge_count()
        );
        Ok(sub)
    }

    fn extraction_estimate(&self, graph: &GraphStore) -> usize {
        graph
            .vertex_count()
            .saturating_mul(size_of::<Option<VertexId>>())
            .saturating_add(graph.edge_count().saturating_mul(2 * (size_of::<VertexId>() + size_of::<f64>())))
    }

    pub fn filter_unreachable<D: graphkern_algorithms::DistanceValue>(&self, table: &DistanceTable<D>) -> DistanceTable<D> {
        let filtered = filter_unreachable(table);
        debug!("Kept {} of {} rows", filtered.len(), table.len());
        filtered
    }
}
