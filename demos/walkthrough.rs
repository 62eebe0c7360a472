use std::{io::Read, ptr::NonNull};

use pagemalloc::{Heap, SizeClass, config::PAGE_SIZE};

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap` or
/// `gdb` between steps.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints where a block landed and how much of it is usable.
fn print_alloc(
  heap: &Heap,
  requested: usize,
  block: NonNull<u8>,
) {
  let addr = block.as_ptr() as usize;
  println!(
    "Requested {} bytes, address = {:#x}, usable = {}, page offset = {}",
    requested,
    addr,
    unsafe { heap.usable_size(block.as_ptr()) },
    addr % PAGE_SIZE,
  );
}

fn print_free_lists(heap: &Heap) {
  for class in SizeClass::all() {
    println!("  class {:>4}: {:>3} free", class.block_size(), heap.free_blocks(class));
  }
}

fn main() {
  let mut heap = Heap::new();

  println!("[start] PID = {}", std::process::id());
  print_free_lists(&heap);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Allocate 4 bytes. The 16-byte class is empty, so a page is mapped
  //    and carved: block 1 comes back, blocks 2..255 join the list.
  // --------------------------------------------------------------------
  let first = heap.allocate(4);
  println!("\n[1] Allocate 4 bytes");
  print_alloc(&heap, 4, first);
  print_free_lists(&heap);

  unsafe { first.cast::<u32>().write(0xDEADBEEF) };
  println!("[1] Value written = 0x{:X}", unsafe { first.cast::<u32>().read() });

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Allocate 100 bytes, rounded to the 128-byte class.
  // --------------------------------------------------------------------
  let second = heap.allocate(100);
  println!("\n[2] Allocate 100 bytes");
  print_alloc(&heap, 100, second);

  unsafe { second.as_ptr().write_bytes(0xAB, 100) };
  println!("[2] Initialized block with 0xAB");

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Release the first block and ask for 2 bytes. Same class, so the
  //    block just pushed onto the list is popped straight back.
  // --------------------------------------------------------------------
  unsafe { heap.release(first.as_ptr()) };
  println!("\n[3] Released first block at {:?}", first);

  let third = heap.allocate(2);
  print_alloc(&heap, 2, third);
  println!(
    "[3] third == first? {}",
    if third == first {
      "Yes, it reused the freed block"
    } else {
      "No, it allocated somewhere else"
    }
  );

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Release addresses that were never ours. Nothing happens.
  // --------------------------------------------------------------------
  let mut on_stack = [0u8; 32];
  unsafe {
    println!("\n[4] usable_size(stack) = {}", heap.usable_size(on_stack.as_ptr()));
    heap.release(on_stack.as_mut_ptr());
    heap.release(std::ptr::null_mut());
  }
  println!("[4] Foreign and null releases ignored");

  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Allocate 64 KiB. Above the largest class, so it is mapped directly.
  //    Releasing it retires the region; the next 64 KiB request reuses it.
  // --------------------------------------------------------------------
  let big = heap.allocate(64 * 1024);
  println!("\n[5] Allocate large 64 KiB block");
  print_alloc(&heap, 64 * 1024, big);
  block_until_enter_pressed();

  unsafe { heap.release(big.as_ptr()) };
  println!("[5] Large block retired, {} region(s) waiting", heap.retired_regions());

  let reused = heap.allocate(60 * 1024);
  println!("[5] reused == big? {}", reused == big);

  println!("\n[6] End of walkthrough. Every mapping stays until exit.");
}
