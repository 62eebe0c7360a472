use std::ptr::{self, NonNull};

use crate::{block::FreeBlock, config::CLASS_COUNT, size_class::SizeClass};

/// One free-list head per size class.
///
/// Every non-null head points to a free block whose page header declares the
/// block size of that class.
pub struct FreeLists {
  heads: [*mut FreeBlock; CLASS_COUNT],
}

impl FreeLists {
  pub const fn new() -> Self {
    Self {
      heads: [ptr::null_mut(); CLASS_COUNT],
    }
  }

  pub fn get(
    &self,
    class: SizeClass,
  ) -> Option<NonNull<FreeBlock>> {
    NonNull::new(self.heads[class.index()])
  }

  pub fn put(
    &mut self,
    class: SizeClass,
    head: Option<NonNull<FreeBlock>>,
  ) {
    self.heads[class.index()] = head.map_or(ptr::null_mut(), NonNull::as_ptr);
  }

  /// Unlinks the head block of `class`.
  ///
  /// # Safety
  ///
  /// The list for `class` must only contain live free blocks.
  pub unsafe fn pop(
    &mut self,
    class: SizeClass,
  ) -> Option<NonNull<u8>> {
    let head = self.get(class)?;
    let next = unsafe { head.as_ref().next };
    self.put(class, NonNull::new(next));

    Some(unsafe { FreeBlock::take(head) })
  }

  /// Makes the block at `addr` the new head of `class`.
  ///
  /// # Safety
  ///
  /// `addr` must be the start of a block of `class` that nobody uses anymore.
  pub unsafe fn push(
    &mut self,
    class: SizeClass,
    addr: NonNull<u8>,
  ) {
    let block = unsafe { FreeBlock::init(addr, self.heads[class.index()]) };
    self.put(class, Some(block));
  }

  /// Walks the list of `class` looking for `addr`.
  ///
  /// # Safety
  ///
  /// The list for `class` must only contain live free blocks.
  pub unsafe fn contains(
    &self,
    class: SizeClass,
    addr: NonNull<u8>,
  ) -> bool {
    let mut current = self.heads[class.index()];

    while !current.is_null() {
      if current.cast::<u8>() == addr.as_ptr() {
        return true;
      }
      current = unsafe { (*current).next };
    }
    false
  }

  /// Number of blocks queued for `class`.
  ///
  /// # Safety
  ///
  /// The list for `class` must only contain live free blocks.
  pub unsafe fn len(
    &self,
    class: SizeClass,
  ) -> usize {
    let mut count = 0;
    let mut current = self.heads[class.index()];

    while !current.is_null() {
      count += 1;
      current = unsafe { (*current).next };
    }
    count
  }
}

impl Default for FreeLists {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[repr(C, align(16))]
  struct Slots([[u8; 16]; 4]);

  fn slot(
    slots: &mut Slots,
    i: usize,
  ) -> NonNull<u8> {
    NonNull::from(&mut slots.0[i]).cast()
  }

  #[test]
  fn test_starts_empty() {
    let lists = FreeLists::new();

    for class in SizeClass::all() {
      assert!(lists.get(class).is_none());
      assert_eq!(unsafe { lists.len(class) }, 0);
    }
  }

  #[test]
  fn test_push_pop_is_lifo() {
    let mut slots = Slots([[0; 16]; 4]);
    let mut lists = FreeLists::new();
    let class = SizeClass::SMALLEST;
    let addrs: Vec<_> = (0..3).map(|i| slot(&mut slots, i)).collect();

    unsafe {
      for &addr in &addrs {
        lists.push(class, addr);
      }
      assert_eq!(lists.len(class), 3);
      assert!(lists.contains(class, addrs[1]));
      assert!(!lists.contains(class, slot(&mut slots, 3)));

      assert_eq!(lists.pop(class), Some(addrs[2]));
      assert_eq!(lists.pop(class), Some(addrs[1]));
      assert_eq!(lists.pop(class), Some(addrs[0]));
      assert_eq!(lists.pop(class), None);
    }
  }

  #[test]
  fn test_classes_are_independent() {
    let mut slots = Slots([[0; 16]; 4]);
    let mut lists = FreeLists::new();
    let addr = slot(&mut slots, 0);

    unsafe {
      lists.push(SizeClass::SMALLEST, addr);

      assert!(lists.get(SizeClass::LARGEST).is_none());
      assert!(!lists.contains(SizeClass::LARGEST, addr));
      assert_eq!(lists.pop(SizeClass::LARGEST), None);
      assert_eq!(lists.pop(SizeClass::SMALLEST), Some(addr));
    }
  }

  #[test]
  fn test_put_replaces_head() {
    let mut slots = Slots([[0; 16]; 4]);
    let mut lists = FreeLists::new();
    let class = SizeClass::SMALLEST;

    unsafe {
      lists.push(class, slot(&mut slots, 0));
      lists.put(class, None);
      assert!(lists.get(class).is_none());
      assert_eq!(lists.pop(class), None);
    }
  }
}
