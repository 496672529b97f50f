use rpool::{Allocation, PoolAllocator, PoolResult};

/// Prints the free list the way the allocator sees it.
fn print_free_list(allocator: &PoolAllocator) {
  println!("FREE_LIST:");
  for region in allocator.diagnostic_dump() {
    println!("  {}", region);
  }
}

/// Allocates a block and copies `text` into it.
fn allocate_text(
  allocator: &mut PoolAllocator,
  text: &[u8],
) -> PoolResult<Allocation> {
  let block = allocator.allocate(text.len())?;
  allocator.payload_mut(&block)?.copy_from_slice(text);

  println!("allocate({}) -> {:#06x}", text.len(), block.offset());
  print_free_list(allocator);

  Ok(block)
}

fn release(
  allocator: &mut PoolAllocator,
  block: Allocation,
) -> PoolResult<()> {
  let offset = block.offset();
  allocator.release(block)?;

  println!("release({:#06x})", offset);
  print_free_list(allocator);

  Ok(())
}

fn main() -> PoolResult<()> {
  // RUST_LOG=trace shows the allocator's own bookkeeping as well.
  pretty_env_logger::init();

  // 64-byte pool, 64 free-list entries, 8-byte headers.
  let mut allocator = PoolAllocator::default();

  // --------------------------------------------------------------------
  // 1) Three 4-byte blocks, 12 bytes each with their headers.
  // --------------------------------------------------------------------
  let a = allocate_text(&mut allocator, b"aaa\0")?;
  let b = allocate_text(&mut allocator, b"bbb\0")?;
  let c = allocate_text(&mut allocator, b"ccc\0")?;

  for block in [&a, &b, &c] {
    println!(
      "{:#06x}: {}",
      block.offset(),
      String::from_utf8_lossy(allocator.payload(block)?)
    );
  }

  // --------------------------------------------------------------------
  // 2) Free the middle block, then ask for the same size again.
  //    Best fit prefers the freed 12-byte hole over the 28-byte tail.
  // --------------------------------------------------------------------
  release(&mut allocator, b)?;
  let d = allocate_text(&mut allocator, b"ddd\0")?;

  // --------------------------------------------------------------------
  // 3) Same again with the first block.
  // --------------------------------------------------------------------
  release(&mut allocator, a)?;
  let e = allocate_text(&mut allocator, b"eee\0")?;

  // --------------------------------------------------------------------
  // 4) Release everything. Regions are appended, never merged.
  // --------------------------------------------------------------------
  release(&mut allocator, c)?;
  release(&mut allocator, d)?;
  release(&mut allocator, e)?;

  println!(
    "\n{} bytes in use, {} free-list entries",
    allocator.in_use(),
    allocator.free_list().len()
  );

  Ok(())
}
