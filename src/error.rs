use thiserror::Error;

use crate::allocator::Allocation;

/// Failures reported by the pool allocator.
///
/// Every variant is raised before the allocator touches its bookkeeping, so a
/// failed call leaves the pool and the free list exactly as they were.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
  /// No free region is large enough for the header-adjusted request.
  #[error("out of space: need {requested} bytes, largest free region is {largest_free}")]
  OutOfSpace {
    /// Requested size plus header.
    requested: usize,
    /// Length of the biggest free region at the time of the request.
    largest_free: usize,
  },

  /// Adding the header to the request does not fit in a `usize`.
  #[error("request of {requested} bytes overflows once the header is added")]
  SizeOverflow { requested: usize },

  /// The free list already holds its maximum number of entries.
  #[error("free list is full ({max_entries} entries)")]
  TrackerCapacityExhausted { max_entries: usize },

  /// A raw pointer handed to release does not point into the pool.
  #[error("pointer {address:#x} does not belong to this pool")]
  ForeignPointer { address: usize },

  /// An allocation handle created by a different allocator.
  #[error("allocation at {offset:#x} was not made by this allocator")]
  ForeignAllocation { offset: usize },

  /// The header in front of a released block describes a block that cannot
  /// exist in this pool.
  #[error("block at {offset:#x} has a corrupt header (total size {total_size})")]
  CorruptHeader { offset: usize, total_size: usize },

  #[error("invalid configuration: {0}")]
  InvalidConfig(&'static str),
}

pub type PoolResult<T> = Result<T, PoolError>;

/// A failed release, carrying the block back so the caller can retry or
/// keep using it.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("{error}")]
pub struct ReleaseError {
  pub error: PoolError,
  pub allocation: Allocation,
}

impl ReleaseError {
  #[inline]
  pub fn error(&self) -> &PoolError {
    &self.error
  }

  #[inline]
  pub fn into_allocation(self) -> Allocation {
    self.allocation
  }
}

impl From<ReleaseError> for PoolError {
  fn from(release: ReleaseError) -> Self {
    release.error
  }
}
