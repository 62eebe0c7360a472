//! Direct mappings for requests above the largest size class.
//!
//! A large region is sized with the same doubling scheme as the small
//! classes, header included, and never touches the free lists. Released
//! regions stay mapped: they are re-tagged as retired and queued for the
//! next large request of the same mapped length.

use std::ptr::{self, NonNull};

use crate::{
  config::HEADER_SIZE,
  error::MapError,
  header::PageHeader,
  size_class::checked_round_up,
  source::PageSource,
};

/// Bytes to map for a large request of `size` bytes.
pub fn mapping_len(size: usize) -> Result<usize, MapError> {
  size
    .checked_add(HEADER_SIZE)
    .and_then(checked_round_up)
    .ok_or(MapError::Overflow { size })
}

/// Released large regions, linked through the word right after each header.
pub struct RetiredRegions {
  head: *mut u8,
}

impl RetiredRegions {
  pub const fn new() -> Self {
    Self {
      head: ptr::null_mut(),
    }
  }

  /// Retires the region at `base` and queues it for reuse.
  ///
  /// # Safety
  ///
  /// `base` and `mapped` must come from a header lookup of a live large
  /// region.
  pub unsafe fn push(
    &mut self,
    base: NonNull<u8>,
    mapped: usize,
  ) {
    unsafe {
      PageHeader::retire(base, mapped);
      Self::link(base.as_ptr()).write(self.head);
    }
    self.head = base.as_ptr();
  }

  /// Unlinks the first retired region mapped with exactly `len` bytes.
  pub fn take(
    &mut self,
    len: usize,
  ) -> Option<NonNull<u8>> {
    let mut link: *mut *mut u8 = &mut self.head;

    unsafe {
      while !(*link).is_null() {
        let base = *link;
        let next = Self::link(base);

        if PageHeader::retired_len(NonNull::new_unchecked(base)) == len {
          *link = next.read();
          return NonNull::new(base);
        }
        link = next;
      }
    }
    None
  }

  /// Number of regions waiting for reuse.
  pub fn len(&self) -> usize {
    let mut count = 0;
    let mut current = self.head;

    while !current.is_null() {
      count += 1;
      current = unsafe { Self::link(current).read() };
    }
    count
  }

  pub fn is_empty(&self) -> bool {
    self.head.is_null()
  }

  fn link(base: *mut u8) -> *mut *mut u8 {
    base.wrapping_add(HEADER_SIZE).cast()
  }
}

impl Default for RetiredRegions {
  fn default() -> Self {
    Self::new()
  }
}

/// Returns the caller's address of a large region, reusing a retired one of
/// the same mapped length when there is one.
pub fn allocate<S: PageSource>(
  source: &mut S,
  retired: &mut RetiredRegions,
  size: usize,
) -> Result<NonNull<u8>, MapError> {
  let len = mapping_len(size)?;
  let base = match retired.take(len) {
    Some(base) => base,
    None => source.map(len)?,
  };

  Ok(unsafe { PageHeader::stamp_large(base, len) })
}
