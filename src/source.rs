use std::ptr::{self, NonNull};

use crate::{
  config::PAGE_SIZE,
  error::{MapError, last_errno},
};

/// Where the heap gets its memory from.
///
/// Mappings are never handed back: small-object pages and retired large
/// regions stay mapped for the life of the heap.
///
/// # Safety
///
/// `map` must return a fresh, page-aligned, readable and writable region of
/// at least `len` bytes that nothing else uses and that stays mapped. The
/// heap stamps headers at page starts and trusts them later.
pub unsafe trait PageSource {
  fn map(
    &mut self,
    len: usize,
  ) -> Result<NonNull<u8>, MapError>;
}

/// Anonymous private mappings from `mmap(2)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mmap;

unsafe impl PageSource for Mmap {
  fn map(
    &mut self,
    len: usize,
  ) -> Result<NonNull<u8>, MapError> {
    debug_assert!(len % PAGE_SIZE == 0);

    let addr = unsafe {
      libc::mmap(
        ptr::null_mut(),
        len,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if addr == libc::MAP_FAILED {
      return Err(MapError::Map {
        len,
        errno: last_errno(),
      });
    }

    NonNull::new(addr.cast::<u8>()).ok_or(MapError::Map { len, errno: 0 })
  }
}
