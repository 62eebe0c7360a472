use thiserror::Error;

/// Failures of the OS page-mapping boundary.
///
/// These never reach callers of the public entry points: the heap turns them
/// into a fatal diagnostic. Every variant is `Copy` so reporting one needs no
/// heap memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapError {
  #[error("mmap of {len} bytes failed (errno {errno})")]
  Map { len: usize, errno: i32 },
  #[error("request of {size} bytes does not fit in the address space")]
  Overflow { size: usize },
}

/// Reads `errno` for the call that just failed.
pub(crate) fn last_errno() -> i32 {
  std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}
