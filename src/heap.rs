use std::ptr::{self, NonNull};

use crate::{
  block::FreeBlock,
  config::{HEADER_SIZE, PAGE_SIZE},
  diag,
  error::MapError,
  free_list::FreeLists,
  header::{Owner, PageHeader},
  large::{self, RetiredRegions},
  size_class::SizeClass,
  source::{Mmap, PageSource},
};

/// Number of blocks a fresh page of `class` yields once the header slot is
/// taken out.
pub const fn blocks_per_page(class: SizeClass) -> usize {
  let size = class.block_size();
  PAGE_SIZE / size - crate::align_up!(HEADER_SIZE, size) / size
}

/// Segregated free-list heap.
///
/// All state lives in this value: one free list per size class, the released
/// large regions waiting for reuse, and the page source new pages come from. It is not synchronised in any way, callers that
/// share one `Heap` between threads must serialise access themselves.
pub struct Heap<S: PageSource = Mmap> {
  source: S,
  lists: FreeLists,
  retired: RetiredRegions,
}

impl Heap<Mmap> {
  pub const fn new() -> Self {
    Self::with_source(Mmap)
  }
}

impl Default for Heap<Mmap> {
  fn default() -> Self {
    Self::new()
  }
}

impl<S: PageSource> Heap<S> {
  pub const fn with_source(source: S) -> Self {
    Self {
      source,
      lists: FreeLists::new(),
      retired: RetiredRegions::new(),
    }
  }

  pub fn source(&self) -> &S {
    &self.source
  }

  /// Returns a block of at least `size` bytes.
  ///
  /// The memory is not zeroed. The process is terminated if the OS refuses
  /// to map more memory, so this never fails from the caller's point of view.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> NonNull<u8> {
    match self.try_allocate(size) {
      Ok(block) => block,
      Err(err) => diag::fatal(&err),
    }
  }

  fn try_allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, MapError> {
    let Some(class) = SizeClass::for_request(size) else {
      return large::allocate(&mut self.source, &mut self.retired, size);
    };

    if let Some(block) = unsafe { self.lists.pop(class) } {
      return Ok(block);
    }

    self.carve(class)
  }

  /// Maps one page for `class`, stamps its header and threads the remaining
  /// slots into the class list. The first block is returned directly.
  ///
  /// ```text
  ///   ┌────────┬─────────┬─────────┬─────────┬─────┬─────────┐
  ///   │ header │ block 1 │ block 2 │ block 3 │ ... │ block n │
  ///   └────────┴─────────┴────┬────┴────┬────┴─────┴────┬────┘
  ///              returned     └─► head  └─► ...   ...──► null
  /// ```
  fn carve(
    &mut self,
    class: SizeClass,
  ) -> Result<NonNull<u8>, MapError> {
    debug_assert!(self.lists.get(class).is_none());

    let page = self.source.map(PAGE_SIZE)?;
    unsafe { PageHeader::stamp_page(page, class) };

    let size = class.block_size();
    let first = PAGE_SIZE / size - blocks_per_page(class);

    // Link back to front so every push lands in address order.
    let mut next: *mut FreeBlock = ptr::null_mut();
    for slot in ((first + 1)..(PAGE_SIZE / size)).rev() {
      let addr = unsafe { page.add(slot * size) };
      next = unsafe { FreeBlock::init(addr, next) }.as_ptr();
    }
    self.lists.put(class, NonNull::new(next));

    Ok(unsafe { page.add(first * size) })
  }

  /// Hands a block back to the heap.
  ///
  /// Null, foreign addresses and blocks that are already free are ignored
  /// without a diagnostic. Any address inside a small block releases that
  /// block; a large region is only released through the exact address
  /// [`Heap::allocate`] returned for it. Released large regions stay mapped
  /// and no longer answer lookups until they are handed out again.
  ///
  /// # Safety
  ///
  /// The page containing `addr` must be mapped. The block must not be used
  /// after this call.
  pub unsafe fn release(
    &mut self,
    addr: *mut u8,
  ) {
    match unsafe { PageHeader::lookup(addr) } {
      Some(Owner::Small { block, class }) => {
        if unsafe { FreeBlock::looks_free(block.as_ptr()) && self.lists.contains(class, block) } {
          return;
        }
        unsafe { self.lists.push(class, block) };
      }
      Some(Owner::Large { base, mapped }) => unsafe { self.retired.push(base, mapped) },
      None => {}
    }
  }

  /// Usable bytes of the block holding `addr`, or 0 for null and foreign
  /// addresses.
  ///
  /// # Safety
  ///
  /// The page containing `addr` must be mapped.
  pub unsafe fn usable_size(
    &self,
    addr: *const u8,
  ) -> usize {
    unsafe { usable_size(addr) }
  }

  /// Number of free blocks queued for `class`.
  pub fn free_blocks(
    &self,
    class: SizeClass,
  ) -> usize {
    unsafe { self.lists.len(class) }
  }

  /// Number of released large regions waiting for reuse.
  pub fn retired_regions(&self) -> usize {
    self.retired.len()
  }
}

/// Header-only size lookup; needs no heap state.
///
/// # Safety
///
/// The page containing `addr` must be mapped.
pub unsafe fn usable_size(addr: *const u8) -> usize {
  unsafe { PageHeader::lookup(addr) }.map_or(0, |owner| owner.usable_size())
}
