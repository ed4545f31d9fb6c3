pub mod error;
pub mod graph;
pub mod pathfinding;
pub mod similarity;
pub mod topology;
pub mod clustering;
pub mod subgraph;
mod spectral;

pub use error::{GraphError, GraphResult};
pub use graph::{build_graph, Compressed, CooView, Edge, EdgeWeights, GraphInput, GraphStore, VertexId, Weight};
pub use pathfinding::{bfs, bfs_with_config, bfs_with_predecessors, filter_unreachable, sssp, BfsConfig, DistanceTable, DistanceValue, UNREACHED};
pub use similarity::{jaccard, overlap};
pub use topology::{count_triangles, triangle_count, TriangleCount};
pub use clustering::{check_spectral_parameters, edge_cut_score, spectral_balanced_cut, spectral_balanced_cut_with_config, ClusterAssignment, NumericalNonConvergence, SolverStage, SpectralClustering, SpectralConfig};
pub use subgraph::{subgraph, subgraph_compacted, Subgraph};
