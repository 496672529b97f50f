//! # rpool - A Best-Fit Allocator over a Fixed Pool
//!
//! This crate provides a small **best-fit allocator** that carves blocks out of
//! one fixed-size byte pool, without ever asking the system allocator for more
//! memory once the pool exists.
//!
//! ## Overview
//!
//! Free space is described by a bounded list of `(address, length)` regions.
//! The list starts with a single region covering the whole pool:
//!
//! ```text
//!   Initial state (64-byte pool):
//!
//!   ┌────────────────────────────────────────────────────────────────┐
//!   │                        free (0, 64)                            │
//!   └────────────────────────────────────────────────────────────────┘
//!
//!   After three allocate(4) calls (8-byte header each):
//!
//!   ┌────────┬────┬────────┬────┬────────┬────┬────────────────────────┐
//!   │ hdr 12 │aaa │ hdr 12 │bbb │ hdr 12 │ccc │      free (36, 28)     │
//!   └────────┴────┴────────┴────┴────────┴────┴────────────────────────┘
//!            ▲             ▲             ▲
//!            8             20            32    offsets handed out
//! ```
//!
//! An allocation picks the smallest region that fits `size + header`, writes
//! the header at the region start and shrinks the region from the front. A
//! release reads the header back and appends the block to the list as a new
//! region. Regions are never merged.
//!
//! ## Crate Structure
//!
//! ```text
//!   rpool
//!   ├── allocator  - PoolAllocator, Allocation handles
//!   ├── block      - Hidden block header encoding
//!   ├── config     - PoolConfig and default constants
//!   ├── error      - PoolError
//!   ├── free_list  - FreeRegion and the bounded FreeSpaceTracker
//!   └── pool       - The fixed byte pool
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rpool::PoolAllocator;
//!
//! let mut allocator = PoolAllocator::default();
//!
//! let block = allocator.allocate(4).unwrap();
//! allocator.payload_mut(&block).unwrap().copy_from_slice(b"aaa\0");
//! assert_eq!(allocator.payload(&block).unwrap(), b"aaa\0");
//!
//! allocator.release(block).unwrap();
//!
//! for region in allocator.diagnostic_dump() {
//!   println!("{}", region);
//! }
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: wrap the allocator in a lock to share it
//! - **No coalescing**: adjacent free regions are never merged
//! - **Bounded free list**: every release uses a new entry, and a full list
//!   makes release fail
//! - **No alignment**: blocks land on whatever byte the carve reaches

mod allocator;
mod block;
pub mod config;
mod error;
mod free_list;
mod pool;

pub use allocator::{Allocation, PoolAllocator};
pub use block::BlockHeader;
pub use config::PoolConfig;
pub use error::{PoolError, PoolResult, ReleaseError};
pub use free_list::{FreeRegion, FreeSpaceTracker};
pub use pool::Pool;
