use std::mem;

use crate::error::{PoolError, PoolResult};

/// Pool size used when no configuration is given.
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Maximum number of free regions tracked when no configuration is given.
pub const DEFAULT_MAX_FREE_ENTRIES: usize = 64;

/// Bytes reserved in front of every allocation to record its size.
pub const DEFAULT_HEADER_SIZE: usize = 8;

/// Fixed parameters of a [`PoolAllocator`](crate::PoolAllocator).
///
/// ```rust
/// use rpool::PoolConfig;
///
/// let config = PoolConfig::new(256, 16, 8);
/// assert!(config.validate().is_ok());
///
/// let broken = PoolConfig::new(256, 16, 4);
/// assert!(broken.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
  /// Total bytes in the pool, headers included.
  pub pool_capacity: usize,
  /// Upper bound on the number of entries in the free list.
  pub max_free_entries: usize,
  /// Size of the hidden header written before each user block.
  pub header_size: usize,
}

impl PoolConfig {
  pub fn new(
    pool_capacity: usize,
    max_free_entries: usize,
    header_size: usize,
  ) -> Self {
    Self {
      pool_capacity,
      max_free_entries,
      header_size,
    }
  }

  /// Checks that the configuration can back a working allocator.
  pub fn validate(&self) -> PoolResult<()> {
    if self.pool_capacity == 0 {
      return Err(PoolError::InvalidConfig("pool capacity must be non-zero"));
    }

    if self.max_free_entries == 0 {
      return Err(PoolError::InvalidConfig("free list must hold at least one entry"));
    }

    // The header stores the block size as a u64.
    if self.header_size < mem::size_of::<u64>() {
      return Err(PoolError::InvalidConfig("header must be at least 8 bytes"));
    }

    Ok(())
  }
}

impl Default for PoolConfig {
  fn default() -> Self {
    Self::new(
      DEFAULT_POOL_CAPACITY,
      DEFAULT_MAX_FREE_ENTRIES,
      DEFAULT_HEADER_SIZE,
    )
  }
}
