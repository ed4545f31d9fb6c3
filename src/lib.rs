//! graphkern
//!
//! Analytics kernels over immutable CSR graphs: breadth-first search,
//! spectral balanced-cut clustering, overlap similarity, triangle counting
//! and induced subgraph extraction.
//!
//! The kernels live in the `graphkern-algorithms` crate. This crate adds the
//! configuration layer, the process-wide allocation strategy and the
//! [`Kernel`] adapter that runs algorithms on a configured thread pool.
//!
//! ## Example Usage
//!
//! ```rust
//! use graphkern::{Edge, GraphStore, Kernel, KernelConfig};
//!
//! let edges = vec![Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 0)];
//! let graph = GraphStore::from_edge_list(&edges, false).unwrap();
//!
//! let kernel = Kernel::new(KernelConfig::default()).unwrap();
//! assert_eq!(kernel.triangle_count(&graph).unwrap(), 1);
//!
//! let distances = kernel.bfs(&graph, 0).unwrap();
//! assert_eq!(distances.distance, vec![0, 1, 1]);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod error;
pub mod memory;

pub use algo::Kernel;
pub use config::{ConfigError, ConfigResult, KernelConfig, ParallelConfig};
pub use error::{KernelError, KernelResult};
pub use memory::{
    AllocationStrategy, DirectStrategy, MemoryConfig, MemoryError, MemoryStats, PoolStrategy, Reservation,
};

pub use graphkern_algorithms::{
    ClusterAssignment, DistanceTable, Edge, EdgeWeights, GraphError, GraphInput, GraphResult, GraphStore,
    NumericalNonConvergence, SolverStage, SpectralClustering, SpectralConfig, Subgraph, TriangleCount, VertexId,
    Weight, UNREACHED,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
