//! Out-of-band metadata stamped at the start of every mapping.
//!
//! A small-object page begins with a [`PageHeader`] tagged [`PAGE_MAGIC`]
//! whose `size` is the block size of every block carved from it. A large
//! region begins with a header tagged [`LARGE_MAGIC`] whose `size` is the
//! length of the whole mapping. Once released, a large region is re-tagged
//! [`RETIRED_MAGIC`] and stays mapped, so later lookups find nothing.
//!
//! ```text
//!   small page (class 64)                      large region
//!   ┌────────┬───────┬───────┬─────┬───────┐   ┌────────┬──────────────────┐
//!   │ header │ blk 1 │ blk 2 │ ... │ blk 63│   │ header │  caller bytes    │
//!   └────────┴───────┴───────┴─────┴───────┘   └────────┴──────────────────┘
//!   ▲ page start = addr & !(PAGE_SIZE - 1)      ▲ base   ▲ base + HEADER_SIZE
//! ```
//!
//! Lookup masks any address down to its page start and trusts the header
//! only if the sentinel matches and the recorded size is sane.

use std::ptr::NonNull;

use crate::{
  config::{HEADER_SIZE, LARGE_MAGIC, LARGE_THRESHOLD, PAGE_MAGIC, PAGE_SIZE, RETIRED_MAGIC},
  size_class::SizeClass,
};

#[repr(C)]
pub struct PageHeader {
  magic: u64,
  size: usize,
}

/// What a header lookup found behind an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
  /// A block of `class` carved from a small-object page.
  Small {
    block: NonNull<u8>,
    class: SizeClass,
  },
  /// A directly mapped region of `mapped` bytes starting at `base`.
  Large { base: NonNull<u8>, mapped: usize },
}

impl Owner {
  /// Bytes the caller may use starting from the block or region start.
  pub fn usable_size(&self) -> usize {
    match *self {
      Owner::Small { class, .. } => class.block_size(),
      Owner::Large { mapped, .. } => mapped - HEADER_SIZE,
    }
  }
}

impl PageHeader {
  /// Stamps a small-object header at the start of `page`.
  ///
  /// # Safety
  ///
  /// `page` must be the start of a freshly mapped, writable page.
  pub unsafe fn stamp_page(
    page: NonNull<u8>,
    class: SizeClass,
  ) {
    unsafe {
      page.cast::<PageHeader>().as_ptr().write(PageHeader {
        magic: PAGE_MAGIC,
        size: class.block_size(),
      })
    };
  }

  /// Stamps a large-region header and returns the caller's address.
  ///
  /// # Safety
  ///
  /// `base` must be the start of a freshly mapped, writable region of
  /// `mapped` bytes.
  pub unsafe fn stamp_large(
    base: NonNull<u8>,
    mapped: usize,
  ) -> NonNull<u8> {
    unsafe {
      base.cast::<PageHeader>().as_ptr().write(PageHeader {
        magic: LARGE_MAGIC,
        size: mapped,
      });
      base.add(HEADER_SIZE)
    }
  }

  /// Marks a released large region so lookups no longer recognise it.
  ///
  /// # Safety
  ///
  /// `base` must be the start of a mapped large region of `mapped` bytes.
  pub unsafe fn retire(
    base: NonNull<u8>,
    mapped: usize,
  ) {
    unsafe {
      base.cast::<PageHeader>().as_ptr().write(PageHeader {
        magic: RETIRED_MAGIC,
        size: mapped,
      })
    };
  }

  /// Mapped length recorded in a retired region's header.
  ///
  /// # Safety
  ///
  /// `base` must be the start of a region stamped by [`PageHeader::retire`].
  pub unsafe fn retired_len(base: NonNull<u8>) -> usize {
    let header = unsafe { base.cast::<PageHeader>().as_ptr().read() };
    debug_assert_eq!(header.magic, RETIRED_MAGIC);
    header.size
  }

  /// Finds the allocation `addr` belongs to, or `None` for foreign memory.
  ///
  /// Small-page addresses may point anywhere inside a block and are rounded
  /// down to the block start. Large regions are only recognised through the
  /// exact address handed to the caller.
  ///
  /// # Safety
  ///
  /// The page containing `addr` must be mapped and readable.
  pub unsafe fn lookup(addr: *const u8) -> Option<Owner> {
    let addr = NonNull::new(addr.cast_mut())?;
    let offset = addr.as_ptr() as usize & (PAGE_SIZE - 1);
    let page = unsafe { addr.byte_sub(offset) };
    let header = unsafe { page.cast::<PageHeader>().as_ptr().read() };

    match header.magic {
      PAGE_MAGIC => {
        let class = SizeClass::from_block_size(header.size)?;
        let block_start = crate::align_down!(offset, class.block_size());

        // The first slot holds the header itself.
        if block_start == 0 {
          return None;
        }

        Some(Owner::Small {
          block: unsafe { page.byte_add(block_start) },
          class,
        })
      }
      LARGE_MAGIC if offset == HEADER_SIZE => {
        if header.size <= LARGE_THRESHOLD || header.size % PAGE_SIZE != 0 {
          return None;
        }

        Some(Owner::Large {
          base: page,
          mapped: header.size,
        })
      }
      _ => None,
    }
  }
}
