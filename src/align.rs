/// Rounds `value` up to the next multiple of `align`.
///
/// `align` must be a power of two.
///
/// # Examples
///
/// ```rust
/// use pagemalloc::align_up;
///
/// assert_eq!(align_up!(13, 16), 16);
/// assert_eq!(align_up!(4096, 4096), 4096);
/// assert_eq!(align_up!(4097, 4096), 8192);
/// ```
#[macro_export]
macro_rules! align_up {
  ($value:expr, $align:expr) => {
    ($value + $align - 1) & !($align - 1)
  };
}

/// Rounds `value` down to the previous multiple of `align`.
///
/// This is how a block address is mapped back to the page that holds its
/// header. `align` must be a power of two.
///
/// # Examples
///
/// ```rust
/// use pagemalloc::align_down;
///
/// assert_eq!(align_down!(0x1234, 0x1000), 0x1000);
/// assert_eq!(align_down!(0x2000, 0x1000), 0x2000);
/// ```
#[macro_export]
macro_rules! align_down {
  ($value:expr, $align:expr) => {
    $value & !($align - 1)
  };
}
