//! Error types shared by every kernel in this crate

use thiserror::Error;

/// Errors raised by graph construction and algorithm entry points.
///
/// Structural problems are reported at the call that detects them and are
/// never recovered from internally. Numerical non-convergence is not an error;
/// see [`crate::clustering::NumericalNonConvergence`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Malformed CSR/CSC arrays, out-of-range ids or mismatched lengths
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    /// A source, seed or pair vertex outside `[0, vertex_count)`
    #[error("Invalid vertex {vertex}: graph has {vertex_count} vertices")]
    InvalidVertex { vertex: u64, vertex_count: usize },

    /// The operation's input set is empty and no meaningful result exists
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// A parameter outside the range the algorithm accepts
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    pub(crate) fn invalid_graph(msg: impl Into<String>) -> Self {
        GraphError::InvalidGraph(msg.into())
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        GraphError::InvalidArgument(msg.into())
    }
}
