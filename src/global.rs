//! The process-wide heap behind the three public entry points.
//!
//! There is exactly one [`Heap`] here and nothing guards it: every entry point
//! is `unsafe` and must only ever be called from one thread at a time.

use std::{cell::UnsafeCell, ptr::NonNull};

use crate::{heap::Heap, source::Mmap};

struct GlobalHeap(UnsafeCell<Heap<Mmap>>);

// Single-threaded by contract, see the module docs.
unsafe impl Sync for GlobalHeap {}

static HEAP: GlobalHeap = GlobalHeap(UnsafeCell::new(Heap::new()));

/// # Safety
///
/// No other call into the global heap may be in progress.
unsafe fn heap() -> &'static mut Heap<Mmap> {
  unsafe { &mut *HEAP.0.get() }
}

/// Allocates at least `size` bytes from the process-wide heap.
///
/// The returned memory is uninitialised. Mapping failures terminate the
/// process with exit status 2, so the result is never null.
///
/// # Safety
///
/// Must not run concurrently with any other entry point of this module.
pub unsafe fn allocate(size: usize) -> NonNull<u8> {
  unsafe { heap() }.allocate(size)
}

/// Returns `addr` to the process-wide heap. Null and foreign addresses are
/// ignored.
///
/// # Safety
///
/// Must not run concurrently with any other entry point of this module.
/// `addr` must be null or lie in a mapped page, and the block it names must
/// not be used afterwards.
pub unsafe fn release(addr: *mut u8) {
  unsafe { heap().release(addr) }
}

/// Usable size of the block holding `addr`, 0 for null or foreign addresses.
///
/// # Safety
///
/// `addr` must be null or lie in a mapped page.
pub unsafe fn usable_size(addr: *const u8) -> usize {
  unsafe { crate::heap::usable_size(addr) }
}

/// `malloc(3)` family over the process-wide heap.
#[cfg(feature = "c_api")]
mod c_api {
  use std::{ffi::c_void, ptr};

  use super::{allocate, release, usable_size};

  #[unsafe(no_mangle)]
  pub unsafe extern "C" fn malloc(size: usize) -> *mut c_void {
    unsafe { allocate(size) }.as_ptr().cast()
  }

  #[unsafe(no_mangle)]
  pub unsafe extern "C" fn free(ptr: *mut c_void) {
    unsafe { release(ptr.cast()) }
  }

  #[unsafe(no_mangle)]
  pub unsafe extern "C" fn calloc(
    nmemb: usize,
    size: usize,
  ) -> *mut c_void {
    let Some(total) = nmemb.checked_mul(size) else {
      return ptr::null_mut();
    };

    let block = unsafe { allocate(total) }.as_ptr();
    unsafe { ptr::write_bytes(block, 0, total) };
    block.cast()
  }

  /// Never resizes in place: a block that is already big enough is kept,
  /// anything else is moved to a fresh block.
  #[unsafe(no_mangle)]
  pub unsafe extern "C" fn realloc(
    ptr: *mut c_void,
    size: usize,
  ) -> *mut c_void {
    if ptr.is_null() {
      return unsafe { malloc(size) };
    }
    if size == 0 {
      unsafe { free(ptr) };
      return ptr::null_mut();
    }

    let old_size = unsafe { usable_size(ptr.cast()) };
    if old_size >= size {
      return ptr;
    }

    let block = unsafe { allocate(size) }.as_ptr();
    unsafe {
      ptr::copy_nonoverlapping(ptr.cast::<u8>(), block, old_size);
      release(ptr.cast());
    }
    block.cast()
  }

  #[unsafe(no_mangle)]
  pub unsafe extern "C" fn malloc_usable_size(ptr: *mut c_void) -> usize {
    unsafe { usable_size(ptr.cast()) }
  }
}
