use std::ptr::{self, NonNull};

use crate::config::FREE_BLOCK_KEY;

/// The view of a free block while it sits on a free list.
///
/// Only memory owned by a free list is ever read through this type. Once a
/// block is handed to a caller its first words belong to the caller.
#[repr(C)]
pub struct FreeBlock {
  pub next: *mut FreeBlock,
  key: usize,
}

impl FreeBlock {
  /// Reinterprets `addr` as a free block linking to `next` and returns it.
  ///
  /// # Safety
  ///
  /// `addr` must point to at least `size_of::<FreeBlock>()` writable bytes,
  /// aligned for `usize`, that nobody else is using.
  pub unsafe fn init(
    addr: NonNull<u8>,
    next: *mut FreeBlock,
  ) -> NonNull<FreeBlock> {
    let block = addr.cast::<FreeBlock>();
    unsafe {
      block.as_ptr().write(FreeBlock {
        next,
        key: Self::key_for(addr.as_ptr()),
      })
    };
    block
  }

  /// Forgets that the block was free and hands back its raw address.
  ///
  /// # Safety
  ///
  /// `block` must be a live free block that has just been unlinked.
  pub unsafe fn take(block: NonNull<FreeBlock>) -> NonNull<u8> {
    unsafe { ptr::addr_of_mut!((*block.as_ptr()).key).write(0) };
    block.cast()
  }

  /// Whether the block at `addr` carries the key of a listed free block.
  ///
  /// A match is only a hint, caller data can collide with the key.
  ///
  /// # Safety
  ///
  /// `addr` must point to at least `size_of::<FreeBlock>()` readable bytes.
  pub unsafe fn looks_free(addr: *const u8) -> bool {
    let key = unsafe { ptr::addr_of!((*addr.cast::<FreeBlock>()).key).read() };
    key == Self::key_for(addr)
  }

  fn key_for(addr: *const u8) -> usize {
    addr as usize ^ FREE_BLOCK_KEY
  }
}
