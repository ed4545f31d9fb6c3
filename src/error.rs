//! Errors surfaced by the kernel layer

use crate::config::ConfigError;
use crate::memory::MemoryError;
use graphkern_algorithms::GraphError;
use thiserror::Error;

/// Kernel errors
///
/// Algorithm errors pass through unchanged in [`KernelError::Graph`].
#[derive(Error, Debug)]
pub enum KernelError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `Kernel::from_global` was called before `memory::initialize`
    #[error("Allocation strategy not initialized")]
    NotInitialized,

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

pub type KernelResult<T> = Result<T, KernelError>;
