//! Kernel configuration
//!
//! Loaded from YAML or JSON. Every section has defaults, so a partial file
//! only overrides what it names.

use crate::memory::MemoryConfig;
use graphkern_algorithms::{BfsConfig, SpectralConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Thread pool and frontier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParallelConfig {
    /// Worker threads for a dedicated pool; `None` runs on the global rayon pool
    pub threads: Option<usize>,
    /// Frontier size at which BFS expands a level in parallel
    pub frontier_parallel_threshold: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            threads: None,
            frontier_parallel_threshold: BfsConfig::default().frontier_parallel_threshold,
        }
    }
}

/// Top-level kernel configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KernelConfig {
    pub memory: MemoryConfig,
    pub spectral: SpectralConfig,
    pub parallel: ParallelConfig,
}

impl KernelConfig {
    pub fn from_yaml_str(s: &str) -> ConfigResult<Self> {
        let config: KernelConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> ConfigResult<Self> {
        let config: KernelConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` is parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
    }

    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.memory.pool && self.memory.initial_pool_size == 0 {
            return Err(invalid("memory.initial_pool_size", "pool size must be positive"));
        }
        if self.memory.capacity == Some(0) {
            return Err(invalid("memory.capacity", "capacity must be positive"));
        }

        let s = &self.spectral;
        if s.max_eigen_iterations == 0 {
            return Err(invalid("spectral.max_eigen_iterations", "must be at least 1"));
        }
        if s.max_kmeans_iterations == 0 {
            return Err(invalid("spectral.max_kmeans_iterations", "must be at least 1"));
        }
        if s.kmeans_restarts == 0 {
            return Err(invalid("spectral.kmeans_restarts", "must be at least 1"));
        }
        if !(s.eigen_tolerance > 0.0 && s.eigen_tolerance.is_finite()) {
            return Err(invalid("spectral.eigen_tolerance", format!("{} is not a positive tolerance", s.eigen_tolerance)));
        }
        if !(s.kmeans_tolerance > 0.0 && s.kmeans_tolerance.is_finite()) {
            return Err(invalid("spectral.kmeans_tolerance", format!("{} is not a positive tolerance", s.kmeans_tolerance)));
        }

        if self.parallel.threads == Some(0) {
            return Err(invalid("parallel.threads", "must be at least 1 when set"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.into() }
}
