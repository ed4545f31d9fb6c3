//! Process-wide allocation strategy
//!
//! Kernels do not allocate through this module; they report the scratch and
//! output sizes they are about to use so the strategy can account for them,
//! enforce a capacity, or grow a pool. Results never depend on which strategy
//! is installed.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, info};

/// Default initial pool size (256 MiB)
pub const DEFAULT_INITIAL_POOL_SIZE: usize = 2 << 27;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Out of memory: requested {requested} bytes with {in_use} of {capacity} in use")]
    OutOfMemory {
        requested: usize,
        in_use: usize,
        capacity: usize,
    },
}

pub type MemoryResult<T> = Result<T, MemoryError>;

/// Allocation strategy selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemoryConfig {
    /// Managed memory may oversubscribe; no capacity is enforced
    pub managed: bool,
    /// Serve reservations from a growable pool
    pub pool: bool,
    /// Initial pool size in bytes
    pub initial_pool_size: usize,
    /// Hard limit for non-managed direct allocation
    pub capacity: Option<usize>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            managed: false,
            pool: false,
            initial_pool_size: DEFAULT_INITIAL_POOL_SIZE,
            capacity: None,
        }
    }
}

impl MemoryConfig {
    pub fn managed() -> Self {
        Self { managed: true, ..Self::default() }
    }

    pub fn pooled(initial_pool_size: usize) -> Self {
        Self { pool: true, initial_pool_size, ..Self::default() }
    }

    pub fn with_managed(mut self, managed: bool) -> Self {
        self.managed = managed;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Every managed × pooled combination at the given pool size
    pub fn sweep(initial_pool_size: usize) -> Vec<MemoryConfig> {
        let mut modes = Vec::with_capacity(4);
        for managed in [false, true] {
            for pool in [false, true] {
                modes.push(MemoryConfig {
                    managed,
                    pool,
                    initial_pool_size,
                    capacity: None,
                });
            }
        }
        modes
    }
}

/// Usage counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub in_use: usize,
    pub peak: usize,
    /// Current pool size; 0 for direct strategies
    pub pool_size: usize,
    pub reservations: usize,
}

/// Pluggable allocation strategy
pub trait AllocationStrategy: Send + Sync + Debug {
    fn config(&self) -> MemoryConfig;

    /// Account for `bytes` about to be used
    fn reserve(&self, bytes: usize) -> MemoryResult<()>;

    /// Return bytes previously reserved
    fn release(&self, bytes: usize);

    fn stats(&self) -> MemoryStats;
}

/// Build the strategy a config selects
pub fn strategy_for(config: &MemoryConfig) -> Arc<dyn AllocationStrategy> {
    if config.pool {
        Arc::new(PoolStrategy::new(config.clone()))
    } else {
        Arc::new(DirectStrategy::new(config.clone()))
    }
}

/// Unpooled allocation
#[derive(Debug)]
pub struct DirectStrategy {
    config: MemoryConfig,
    in_use: AtomicUsize,
    peak: AtomicUsize,
    reservations: AtomicUsize,
}

impl DirectStrategy {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            in_use: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            reservations: AtomicUsize::new(0),
        }
    }

    fn limit(&self) -> Option<usize> {
        if self.config.managed {
            None
        } else {
            self.config.capacity
        }
    }
}

impl AllocationStrategy for DirectStrategy {
    fn config(&self) -> MemoryConfig {
        self.config.clone()
    }

    fn reserve(&self, bytes: usize) -> MemoryResult<()> {
        let limit = self.limit();
        let previous = self
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                let next = current.saturating_add(bytes);
                match limit {
                    Some(capacity) if next > capacity => None,
                    _ => Some(next),
                }
            })
            .map_err(|in_use| MemoryError::OutOfMemory {
                requested: bytes,
                in_use,
                capacity: limit.unwrap_or(usize::MAX),
            })?;
        self.peak.fetch_max(previous.saturating_add(bytes), Ordering::AcqRel);
        self.reservations.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn release(&self, bytes: usize) {
        let _ = self
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| Some(current.saturating_sub(bytes)));
    }

    fn stats(&self) -> MemoryStats {
        MemoryStats {
            in_use: self.in_use.load(Ordering::Acquire),
            peak: self.peak.load(Ordering::Acquire),
            pool_size: 0,
            reservations: self.reservations.load(Ordering::Acquire),
        }
    }
}

/// Pool that starts at `initial_pool_size` and doubles until a request fits.
/// A non-managed pool with a capacity never grows past it.
#[derive(Debug)]
pub struct PoolStrategy {
    config: MemoryConfig,
    state: Mutex<MemoryStats>,
}

impl PoolStrategy {
    pub fn new(config: MemoryConfig) -> Self {
        let state = MemoryStats {
            pool_size: config.initial_pool_size.max(1),
            ..MemoryStats::default()
        };
        info!("Memory pool created with {} bytes", state.pool_size);
        Self { config, state: Mutex::new(state) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryStats> {
        // counters stay consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AllocationStrategy for PoolStrategy {
    fn config(&self) -> MemoryConfig {
        self.config.clone()
    }

    fn reserve(&self, bytes: usize) -> MemoryResult<()> {
        let mut state = self.lock();
        let needed = state.in_use.saturating_add(bytes);
        let limit = if self.config.managed { None } else { self.config.capacity };

        if let Some(capacity) = limit {
            if needed > capacity {
                return Err(MemoryError::OutOfMemory {
                    requested: bytes,
                    in_use: state.in_use,
                    capacity,
                });
            }
        }

        if needed > state.pool_size {
            let mut size = state.pool_size;
            while size < needed {
                size = size.saturating_mul(2);
            }
            if let Some(capacity) = limit {
                size = size.min(capacity);
            }
            info!("Memory pool grew from {} to {} bytes", state.pool_size, size);
            state.pool_size = size;
        }

        state.in_use = needed;
        state.peak = state.peak.max(needed);
        state.reservations += 1;
        Ok(())
    }

    fn release(&self, bytes: usize) {
        let mut state = self.lock();
        state.in_use = state.in_use.saturating_sub(bytes);
    }

    fn stats(&self) -> MemoryStats {
        *self.lock()
    }
}

/// Reserved bytes, released on drop
#[derive(Debug)]
pub struct Reservation {
    strategy: Arc<dyn AllocationStrategy>,
    bytes: usize,
}

impl Reservation {
    pub fn new(strategy: Arc<dyn AllocationStrategy>, bytes: usize) -> MemoryResult<Self> {
        strategy.reserve(bytes)?;
        Ok(Self { strategy, bytes })
    }

    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        self.strategy.release(self.bytes);
    }
}

static GLOBAL: RwLock<Option<Arc<dyn AllocationStrategy>>> = RwLock::new(None);

/// Install the process-wide strategy, replacing any previous one
pub fn initialize(config: MemoryConfig) -> Arc<dyn AllocationStrategy> {
    let strategy = strategy_for(&config);
    let mut global = GLOBAL.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    if global.is_some() {
        debug!("Replacing process-wide allocation strategy");
    }
    *global = Some(strategy.clone());
    info!(
        "Allocation strategy initialized (managed: {}, pool: {}, initial pool: {} bytes)",
        config.managed, config.pool, config.initial_pool_size
    );
    strategy
}

/// Remove the process-wide strategy
pub fn finalize() {
    let mut global = GLOBAL.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    if global.take().is_some() {
        info!("Allocation strategy finalized");
    }
}

pub fn is_initialized() -> bool {
    current().is_some()
}

/// The process-wide strategy, if one is installed
pub fn current() -> Option<Arc<dyn AllocationStrategy>> {
    GLOBAL
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}
