//! Power-of-two size classes.
//!
//! Every small request is rounded up to one rung of the ladder
//! `16, 32, 64, 128, 256, 512, 1024, 2048`. A block of class `c` always sits
//! at an offset that is a multiple of `c` inside a page-aligned page, so the
//! class size doubles as the block's natural alignment.

use crate::config::{CLASS_COUNT, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE};

/// Largest power of two representable in a `usize`.
const MAX_POWER: usize = 1 << (usize::BITS - 1);

/// Returns the smallest power of two that is `>= 16` and `>= size`, for any
/// `size` up to `1 << (usize::BITS - 1)`.
///
/// No upper bound is applied; callers cap to [`MAX_BLOCK_SIZE`] themselves.
/// Above `1 << (usize::BITS - 1)` no power of two fits, and the result
/// saturates to that value, which is then *smaller* than `size`. The large
/// path uses [`checked_round_up`] instead.
///
/// ```rust
/// use pagemalloc::round_up;
///
/// assert_eq!(round_up(7), 16);
/// assert_eq!(round_up(30), 32);
/// assert_eq!(round_up(2047), 2048);
/// ```
pub const fn round_up(size: usize) -> usize {
  match checked_round_up(size) {
    Some(rounded) => rounded,
    None => MAX_POWER,
  }
}

/// Like [`round_up`], returning `None` when the result does not fit a `usize`.
pub const fn checked_round_up(size: usize) -> Option<usize> {
  if size <= MIN_BLOCK_SIZE {
    return Some(MIN_BLOCK_SIZE);
  }
  size.checked_next_power_of_two()
}

/// One rung of the size-class ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SizeClass(u8);

impl SizeClass {
  pub const SMALLEST: SizeClass = SizeClass(0);
  pub const LARGEST: SizeClass = SizeClass(CLASS_COUNT as u8 - 1);

  /// Class serving a request of `size` bytes, or `None` above the ladder.
  pub const fn for_request(size: usize) -> Option<SizeClass> {
    if size > MAX_BLOCK_SIZE {
      return None;
    }
    Self::from_block_size(round_up(size))
  }

  /// Class whose blocks are exactly `block_size` bytes.
  ///
  /// Anything off the ladder, such as a size read from a corrupted header,
  /// yields `None`.
  pub const fn from_block_size(block_size: usize) -> Option<SizeClass> {
    if !block_size.is_power_of_two() || block_size < MIN_BLOCK_SIZE || block_size > MAX_BLOCK_SIZE
    {
      return None;
    }
    let index = block_size.trailing_zeros() - MIN_BLOCK_SIZE.trailing_zeros();
    Some(SizeClass(index as u8))
  }

  pub const fn index(self) -> usize {
    self.0 as usize
  }

  pub const fn block_size(self) -> usize {
    MIN_BLOCK_SIZE << self.0
  }

  /// Iterates the ladder from the smallest class up.
  pub fn all() -> impl Iterator<Item = SizeClass> {
    (0..CLASS_COUNT as u8).map(SizeClass)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_round_up_reference_sizes() {
    let cases = [
      (7, 16),
      (16, 16),
      (30, 32),
      (50, 64),
      (100, 128),
      (1000, 1024),
      (2047, 2048),
      (1999, 2048),
      (511, 512),
    ];

    for (size, expected) in cases {
      assert_eq!(expected, round_up(size), "round_up({size})");
    }
  }

  #[test]
  fn test_round_up_small_and_zero() {
    assert_eq!(round_up(0), 16);
    assert_eq!(round_up(1), 16);
    assert_eq!(round_up(17), 32);
  }

  #[test]
  fn test_round_up_idempotent_and_monotonic() {
    let mut previous = 0;

    for size in 0..=10_000 {
      let rounded = round_up(size);
      assert_eq!(rounded, round_up(rounded));
      assert!(rounded >= size);
      assert!(rounded >= previous);
      assert!(rounded.is_power_of_two());
      previous = rounded;
    }
  }

  #[test]
  fn test_round_up_is_unbounded() {
    assert_eq!(round_up(5000), 8192);
    assert_eq!(round_up(1 << 20), 1 << 20);
    assert_eq!(round_up((1 << 20) + 1), 1 << 21);
  }

  #[test]
  fn test_checked_round_up_overflow() {
    assert_eq!(checked_round_up(MAX_POWER), Some(MAX_POWER));
    assert_eq!(checked_round_up(MAX_POWER + 1), None);
    assert_eq!(checked_round_up(usize::MAX), None);
    assert_eq!(round_up(usize::MAX), MAX_POWER);
  }

  #[test]
  fn test_class_ladder() {
    let sizes: Vec<usize> = SizeClass::all().map(SizeClass::block_size).collect();

    assert_eq!(sizes, [16, 32, 64, 128, 256, 512, 1024, 2048]);
    assert_eq!(SizeClass::SMALLEST.block_size(), MIN_BLOCK_SIZE);
    assert_eq!(SizeClass::LARGEST.block_size(), MAX_BLOCK_SIZE);
  }

  #[test]
  fn test_class_for_request() {
    assert_eq!(SizeClass::for_request(0), Some(SizeClass::SMALLEST));
    assert_eq!(SizeClass::for_request(33).map(SizeClass::block_size), Some(64));
    assert_eq!(SizeClass::for_request(2048), Some(SizeClass::LARGEST));
    assert_eq!(SizeClass::for_request(2049), None);
  }

  #[test]
  fn test_class_from_block_size_rejects_off_ladder() {
    for bogus in [0, 8, 24, 100, 4096, usize::MAX] {
      assert_eq!(SizeClass::from_block_size(bogus), None, "{bogus}");
    }

    for class in SizeClass::all() {
      assert_eq!(SizeClass::from_block_size(class.block_size()), Some(class));
    }
  }
}
