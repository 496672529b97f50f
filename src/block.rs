use std::mem;

use crate::pool::Pool;

const SIZE_FIELD: usize = mem::size_of::<u64>();

/// Hidden record placed right before every user block.
///
/// ```text
///   ┌──────────────────────┬──────────────────────────┐
///   │ total_size (u64) pad │  requested_size bytes    │
///   └──────────────────────┴──────────────────────────┘
///   ▲                      ▲
///   block offset           offset handed to the user
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
  /// Requested size plus header size.
  pub total_size: usize,
}

impl BlockHeader {
  pub fn new(total_size: usize) -> Self {
    Self { total_size }
  }

  /// Encodes the header at `offset`, zero-filling any bytes past the size
  /// field.
  pub fn write_to(
    &self,
    pool: &mut Pool,
    offset: usize,
    header_size: usize,
  ) {
    let header = pool.bytes_mut(offset..offset + header_size);
    let (size_field, padding) = header.split_at_mut(SIZE_FIELD);

    size_field.copy_from_slice(&(self.total_size as u64).to_ne_bytes());
    padding.fill(0);
  }

  pub fn read_from(
    pool: &Pool,
    offset: usize,
  ) -> Self {
    let mut raw = [0u8; SIZE_FIELD];
    raw.copy_from_slice(pool.bytes(offset..offset + SIZE_FIELD));

    Self::new(u64::from_ne_bytes(raw) as usize)
  }
}
