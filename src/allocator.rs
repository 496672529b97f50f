use std::{
  ops::Range,
  ptr::NonNull,
  sync::atomic::{AtomicU64, Ordering},
};

use log::{Level, debug, log_enabled, trace, warn};

use crate::{
  block::BlockHeader,
  config::PoolConfig,
  error::{PoolError, PoolResult, ReleaseError},
  free_list::{FreeRegion, FreeSpaceTracker},
  pool::Pool,
};

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(0);

/// A live block handed out by [`PoolAllocator::allocate`].
///
/// The handle is consumed by a successful [`PoolAllocator::release`], so the
/// same block cannot be released twice through it. Handles remember the
/// allocator that made them and are refused by any other.
#[derive(Debug, PartialEq, Eq)]
pub struct Allocation {
  pool_id: u64,
  offset: usize,
  size: usize,
}

impl Allocation {
  /// Offset of the first user byte inside the pool (past the header).
  #[inline]
  pub fn offset(&self) -> usize {
    self.offset
  }

  /// Number of usable bytes, as requested.
  #[inline]
  pub fn size(&self) -> usize {
    self.size
  }
}

/// Best-fit allocator over a single fixed-size pool.
///
/// Allocation carves the front of the tightest fitting free region; release
/// appends the block back to the free list. Neighbouring free regions are
/// never merged and exhausted regions stay in the list with zero length.
pub struct PoolAllocator {
  id: u64,
  config: PoolConfig,
  pool: Pool,
  free_list: FreeSpaceTracker,
  in_use: usize,
  live_allocations: usize,
}

impl PoolAllocator {
  pub fn new(config: PoolConfig) -> PoolResult<Self> {
    config.validate()?;

    Ok(Self::with_valid_config(config))
  }

  fn with_valid_config(config: PoolConfig) -> Self {
    Self {
      id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
      pool: Pool::new(config.pool_capacity),
      free_list: FreeSpaceTracker::new(config.pool_capacity, config.max_free_entries),
      config,
      in_use: 0,
      live_allocations: 0,
    }
  }

  #[inline]
  pub fn config(&self) -> &PoolConfig {
    &self.config
  }

  #[inline]
  pub fn pool(&self) -> &Pool {
    &self.pool
  }

  #[inline]
  pub fn free_list(&self) -> &FreeSpaceTracker {
    &self.free_list
  }

  /// Bytes currently held by live blocks, headers included.
  #[inline]
  pub fn in_use(&self) -> usize {
    self.in_use
  }

  #[inline]
  pub fn live_allocations(&self) -> usize {
    self.live_allocations
  }

  /// Reserves `size` usable bytes.
  ///
  /// `size + header_size` bytes are taken from the front of the smallest free
  /// region that can hold them. Fails with [`PoolError::OutOfSpace`] without
  /// touching any state when no region fits.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> PoolResult<Allocation> {
    let result = self.carve(size);

    match &result {
      Ok(allocation) => {
        debug!(
          "allocate({}): block at {:#06x}, user data at {:#06x}",
          size,
          allocation.offset - self.config.header_size,
          allocation.offset
        );
        self.log_free_list();
      }
      Err(error) => warn!("allocate({}) failed: {}", size, error),
    }

    result
  }

  fn carve(
    &mut self,
    size: usize,
  ) -> PoolResult<Allocation> {
    let header_size = self.config.header_size;
    let total_size = size
      .checked_add(header_size)
      .ok_or(PoolError::SizeOverflow { requested: size })?;

    let region = self.free_list.find_region(total_size)?;
    let base = region.address;
    region.carve_prefix(total_size);

    BlockHeader::new(total_size).write_to(&mut self.pool, base, header_size);

    self.in_use += total_size;
    self.live_allocations += 1;

    Ok(Allocation {
      pool_id: self.id,
      offset: base + header_size,
      size,
    })
  }

  /// Gives a block back to the free list.
  ///
  /// The size recorded in the block header decides how many bytes return.
  /// On failure nothing changes and the handle comes back inside the
  /// [`ReleaseError`]; with [`PoolError::TrackerCapacityExhausted`] the block
  /// simply stays allocated.
  pub fn release(
    &mut self,
    allocation: Allocation,
  ) -> Result<(), ReleaseError> {
    match self.reclaim(&allocation) {
      Ok(header) => {
        debug!(
          "release({:#06x}): {} bytes back to the free list",
          allocation.offset, header.total_size
        );
        self.log_free_list();
        Ok(())
      }
      Err(error) => {
        warn!("release({:#06x}) failed: {}", allocation.offset, error);
        Err(ReleaseError { error, allocation })
      }
    }
  }

  fn check_owner(
    &self,
    allocation: &Allocation,
  ) -> PoolResult<()> {
    if allocation.pool_id != self.id {
      return Err(PoolError::ForeignAllocation {
        offset: allocation.offset,
      });
    }

    Ok(())
  }

  fn reclaim(
    &mut self,
    allocation: &Allocation,
  ) -> PoolResult<BlockHeader> {
    self.check_owner(allocation)?;

    let offset = allocation.offset;
    let base = offset
      .checked_sub(self.config.header_size)
      .ok_or(PoolError::ForeignAllocation { offset })?;
    let header = BlockHeader::read_from(&self.pool, base);

    // A free region must never reach past the end of the pool.
    let in_bounds = base
      .checked_add(header.total_size)
      .is_some_and(|end| end <= self.pool.capacity());

    if header.total_size < self.config.header_size || !in_bounds {
      return Err(PoolError::CorruptHeader {
        offset,
        total_size: header.total_size,
      });
    }

    self.free_list.record_free(base, header.total_size)?;

    self.in_use = self.in_use.saturating_sub(header.total_size);
    self.live_allocations = self.live_allocations.saturating_sub(1);

    Ok(header)
  }

  /// Pointer flavour of [`allocate`](Self::allocate).
  ///
  /// The pointer is valid for `size` bytes of reads and writes until it is
  /// passed to [`release_raw`](Self::release_raw) or the allocator is
  /// dropped. Other allocations made in between do not invalidate it.
  pub fn allocate_raw(
    &mut self,
    size: usize,
  ) -> PoolResult<NonNull<u8>> {
    let allocation = self.allocate(size)?;
    let offset = allocation.offset;

    self
      .pool
      .ptr_at(offset)
      .ok_or(PoolError::ForeignAllocation { offset })
  }

  /// Pointer flavour of [`release`](Self::release).
  ///
  /// Pointers outside the pool are rejected with
  /// [`PoolError::ForeignPointer`]. An in-pool pointer that did not come from
  /// [`allocate_raw`](Self::allocate_raw), or one released twice, is not
  /// detected and leaves overlapping entries in the free list.
  pub fn release_raw(
    &mut self,
    ptr: NonNull<u8>,
  ) -> PoolResult<()> {
    let address = ptr.as_ptr() as usize;
    let header_size = self.config.header_size;

    let offset = match self
      .pool
      .offset_of(address)
      .filter(|offset| *offset >= header_size)
    {
      Some(offset) => offset,
      None => {
        let error = PoolError::ForeignPointer { address };
        warn!("release failed: {}", error);
        return Err(error);
      }
    };

    let header = BlockHeader::read_from(&self.pool, offset - header_size);

    self.release(Allocation {
      pool_id: self.id,
      offset,
      size: header.total_size.saturating_sub(header_size),
    })?;

    Ok(())
  }

  /// User bytes of a live block.
  pub fn payload(
    &self,
    allocation: &Allocation,
  ) -> PoolResult<&[u8]> {
    let range = self.payload_range(allocation)?;

    Ok(self.pool.bytes(range))
  }

  pub fn payload_mut(
    &mut self,
    allocation: &Allocation,
  ) -> PoolResult<&mut [u8]> {
    let range = self.payload_range(allocation)?;

    Ok(self.pool.bytes_mut(range))
  }

  fn payload_range(
    &self,
    allocation: &Allocation,
  ) -> PoolResult<Range<usize>> {
    self.check_owner(allocation)?;

    let range = allocation.offset..allocation.offset.saturating_add(allocation.size);
    if !self.pool.contains(&range) {
      return Err(PoolError::ForeignAllocation {
        offset: allocation.offset,
      });
    }

    Ok(range)
  }

  /// Snapshot of the free list, in list order.
  pub fn diagnostic_dump(&self) -> Vec<FreeRegion> {
    self.free_list.regions().to_vec()
  }

  fn log_free_list(&self) {
    if !log_enabled!(Level::Trace) {
      return;
    }

    trace!(
      "free list ({}/{} entries):",
      self.free_list.len(),
      self.free_list.max_entries()
    );
    for region in self.free_list.regions() {
      trace!("  {}", region);
    }
  }
}

impl Default for PoolAllocator {
  fn default() -> Self {
    Self::with_valid_config(PoolConfig::default())
  }
}
