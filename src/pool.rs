use std::{
  ops::Range,
  ptr::{self, NonNull},
  slice,
};

/// Fixed-capacity byte region every allocation is carved from.
///
/// The backing storage is allocated once when the pool is built and is never
/// resized; the allocator only ever hands out sub-ranges of it.
///
/// The storage is held through a raw base pointer rather than a `Box`, so
/// pointers returned by [`ptr_at`](Self::ptr_at) stay usable while the pool is
/// read and written through [`bytes`](Self::bytes) and
/// [`bytes_mut`](Self::bytes_mut).
pub struct Pool {
  base: NonNull<u8>,
  capacity: usize,
}

// The pool exclusively owns its storage, like the `Box<[u8]>` it came from.
unsafe impl Send for Pool {}

impl Pool {
  pub fn new(capacity: usize) -> Self {
    let bytes: &'static mut [u8] = Box::leak(vec![0u8; capacity].into_boxed_slice());

    Self {
      base: NonNull::from(bytes).cast(),
      capacity,
    }
  }

  #[inline]
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  /// Address of the first byte of the pool.
  #[inline]
  pub fn base_ptr(&self) -> *const u8 {
    self.base.as_ptr()
  }

  /// Pointer to the byte at `offset`, or `None` past the one-past-the-end
  /// address.
  pub fn ptr_at(
    &self,
    offset: usize,
  ) -> Option<NonNull<u8>> {
    if offset > self.capacity {
      return None;
    }

    // SAFETY: `offset <= capacity`, so the result stays inside the allocation
    // or one past its end.
    Some(unsafe { self.base.add(offset) })
  }

  /// Offset of `address` from the pool base. The one-past-the-end address is
  /// accepted since zero-sized blocks may end up there.
  pub fn offset_of(
    &self,
    address: usize,
  ) -> Option<usize> {
    let base = self.base_ptr() as usize;

    address
      .checked_sub(base)
      .filter(|offset| *offset <= self.capacity)
  }

  /// Whether `range` lies inside the pool.
  #[inline]
  pub fn contains(
    &self,
    range: &Range<usize>,
  ) -> bool {
    range.start <= range.end && range.end <= self.capacity
  }

  #[inline]
  pub fn bytes(
    &self,
    range: Range<usize>,
  ) -> &[u8] {
    // SAFETY: `base` points to `capacity` initialized bytes owned by the pool.
    let all = unsafe { slice::from_raw_parts(self.base.as_ptr(), self.capacity) };
    &all[range]
  }

  #[inline]
  pub fn bytes_mut(
    &mut self,
    range: Range<usize>,
  ) -> &mut [u8] {
    // SAFETY: as in `bytes`; `&mut self` rules out other slices of the pool.
    let all = unsafe { slice::from_raw_parts_mut(self.base.as_ptr(), self.capacity) };
    &mut all[range]
  }
}

impl Drop for Pool {
  fn drop(&mut self) {
    // SAFETY: `base` and `capacity` come from the leaked boxed slice in `new`.
    unsafe {
      drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
        self.base.as_ptr(),
        self.capacity,
      )));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new_pool_is_zeroed() {
    let pool = Pool::new(32);

    assert_eq!(pool.capacity(), 32);
    assert!(pool.bytes(0..32).iter().all(|byte| *byte == 0));
  }

  #[test]
  fn test_offset_of() {
    let pool = Pool::new(16);
    let base = pool.base_ptr() as usize;

    assert_eq!(pool.offset_of(base), Some(0));
    assert_eq!(pool.offset_of(base + 15), Some(15));
    assert_eq!(pool.offset_of(base + 16), Some(16));
    assert_eq!(pool.offset_of(base + 17), None);
    assert_eq!(pool.offset_of(base.wrapping_sub(1)), None);
  }

  #[test]
  fn test_bytes_mut_writes_through() {
    let mut pool = Pool::new(8);

    pool.bytes_mut(2..5).copy_from_slice(b"abc");

    assert_eq!(pool.bytes(0..8), b"\0\0abc\0\0\0");
  }

  #[test]
  fn test_ptr_at_outlives_slice_access() {
    let mut pool = Pool::new(8);
    let first = pool.ptr_at(1).unwrap();
    let second = pool.ptr_at(4).unwrap();

    pool.bytes_mut(6..8).copy_from_slice(b"zz");
    unsafe {
      first.write(b'x');
      second.write(b'y');
    }

    assert_eq!(pool.bytes(0..8), b"\0x\0\0y\0zz");
    assert_eq!(
      pool.ptr_at(8).map(|end| end.as_ptr() as usize),
      Some(pool.base_ptr() as usize + 8)
    );
    assert!(pool.ptr_at(9).is_none());
  }

  #[test]
  fn test_contains() {
    let pool = Pool::new(16);

    assert!(pool.contains(&(0..16)));
    assert!(pool.contains(&(16..16)));
    assert!(!pool.contains(&(8..17)));
  }
}
