use std::fmt;

use crate::error::{PoolError, PoolResult};

/// A span of the pool that backs no live allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeRegion {
  /// Byte offset of the region inside the pool.
  pub address: usize,
  /// Number of bytes available from `address`.
  pub length: usize,
}

impl FreeRegion {
  pub fn new(
    address: usize,
    length: usize,
  ) -> Self {
    Self { address, length }
  }

  /// Consumes `size` bytes from the front of the region.
  ///
  /// The entry stays in place even when it drops to zero length.
  pub(crate) fn carve_prefix(
    &mut self,
    size: usize,
  ) {
    debug_assert!(size <= self.length);

    self.address += size;
    self.length -= size;
  }
}

impl fmt::Display for FreeRegion {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{:#06x} ({})", self.address, self.length)
  }
}

/// Bounded list of free regions, in the order they were recorded.
///
/// Entries are never merged or removed: allocation shrinks an entry in place
/// and release appends a new one. Overlapping entries are not detected.
#[derive(Debug)]
pub struct FreeSpaceTracker {
  entries: Vec<FreeRegion>,
  max_entries: usize,
}

impl FreeSpaceTracker {
  /// Creates a tracker holding one region that spans the whole pool.
  pub fn new(
    pool_capacity: usize,
    max_entries: usize,
  ) -> Self {
    let mut entries = Vec::with_capacity(max_entries);
    entries.push(FreeRegion::new(0, pool_capacity));

    Self {
      entries,
      max_entries,
    }
  }

  /// Best-fit search: the smallest region with `length >= size`.
  ///
  /// Ties go to the entry that comes first in the list.
  pub fn find_region(
    &mut self,
    size: usize,
  ) -> PoolResult<&mut FreeRegion> {
    let largest_free = self.largest();

    self
      .entries
      .iter_mut()
      .filter(|region| region.length >= size)
      .min_by_key(|region| region.length)
      .ok_or(PoolError::OutOfSpace {
        requested: size,
        largest_free,
      })
  }

  /// Appends a released region at the next free slot.
  pub fn record_free(
    &mut self,
    address: usize,
    length: usize,
  ) -> PoolResult<()> {
    if self.is_full() {
      return Err(PoolError::TrackerCapacityExhausted {
        max_entries: self.max_entries,
      });
    }

    self.entries.push(FreeRegion::new(address, length));
    Ok(())
  }

  #[inline]
  pub fn regions(&self) -> &[FreeRegion] {
    &self.entries
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Never true once built: the initial region is only ever shrunk.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  #[inline]
  pub fn is_full(&self) -> bool {
    self.entries.len() >= self.max_entries
  }

  #[inline]
  pub fn max_entries(&self) -> usize {
    self.max_entries
  }

  /// Length of the biggest free region, 0 when everything is handed out.
  pub fn largest(&self) -> usize {
    self
      .entries
      .iter()
      .map(|region| region.length)
      .max()
      .unwrap_or(0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tracker_with(lengths: &[usize]) -> FreeSpaceTracker {
    let mut tracker = FreeSpaceTracker::new(0, 8);
    let mut address = 0;

    for length in lengths {
      tracker.record_free(address, *length).unwrap();
      address += length;
    }

    tracker
  }

  #[test]
  fn test_starts_with_whole_pool() {
    let tracker = FreeSpaceTracker::new(64, 64);

    assert_eq!(tracker.regions(), &[FreeRegion::new(0, 64)]);
    assert_eq!(tracker.largest(), 64);
  }

  #[test]
  fn test_best_fit_picks_tightest_region() {
    // Slot 0 is the zero-length initial region.
    let mut tracker = tracker_with(&[10, 4, 6]);

    let region = tracker.find_region(5).unwrap();

    assert_eq!(*region, FreeRegion::new(14, 6));
  }

  #[test]
  fn test_best_fit_tie_goes_to_first() {
    let mut tracker = tracker_with(&[6, 9, 6]);

    let region = tracker.find_region(6).unwrap();

    assert_eq!(region.address, 0);
  }

  #[test]
  fn test_find_region_reports_largest_on_failure() {
    let mut tracker = tracker_with(&[3, 7, 2]);

    assert_eq!(
      tracker.find_region(8),
      Err(PoolError::OutOfSpace {
        requested: 8,
        largest_free: 7,
      })
    );
  }

  #[test]
  fn test_handle_mutates_entry_in_place() {
    let mut tracker = FreeSpaceTracker::new(64, 4);

    tracker.find_region(12).unwrap().carve_prefix(12);
    tracker.find_region(52).unwrap().carve_prefix(52);

    assert_eq!(tracker.regions(), &[FreeRegion::new(64, 0)]);
    assert_eq!(tracker.len(), 1);
    assert!(!tracker.is_empty());
  }

  #[test]
  fn test_record_free_respects_bound() {
    let mut tracker = FreeSpaceTracker::new(64, 2);

    tracker.record_free(0, 12).unwrap();

    assert!(tracker.is_full());
    assert_eq!(
      tracker.record_free(12, 12),
      Err(PoolError::TrackerCapacityExhausted { max_entries: 2 })
    );
    assert_eq!(tracker.len(), 2);
  }

  #[test]
  fn test_display() {
    assert_eq!(FreeRegion::new(36, 28).to_string(), "0x0024 (28)");
  }
}
