//! Allocation-free diagnostics.
//!
//! The allocator may be in the middle of its own bookkeeping when something
//! goes wrong, so nothing here may touch the heap: messages are formatted into
//! a fixed stack buffer and written straight to stderr with `write(2)`.

use std::fmt::{self, Display, Write};

use crate::config::FATAL_EXIT_CODE;

const PREFIX: &[u8] = b"pagemalloc: ";
const LOGGING_FAILED: &[u8] = b"logging failed\n";

/// Fixed-capacity formatting target. Output past the capacity is dropped.
pub struct StackWriter<const N: usize> {
  buf: [u8; N],
  len: usize,
}

impl<const N: usize> StackWriter<N> {
  pub const fn new() -> Self {
    Self { buf: [0; N], len: 0 }
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.buf[..self.len]
  }
}

impl<const N: usize> Default for StackWriter<N> {
  fn default() -> Self {
    Self::new()
  }
}

impl<const N: usize> Write for StackWriter<N> {
  fn write_str(
    &mut self,
    s: &str,
  ) -> fmt::Result {
    let room = N - self.len;
    let take = s.len().min(room);
    self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
    self.len += take;
    Ok(())
  }
}

/// Writes all of `bytes` to stderr, retrying short writes.
pub fn write_stderr(mut bytes: &[u8]) -> Result<(), i32> {
  while !bytes.is_empty() {
    let written = unsafe { libc::write(libc::STDERR_FILENO, bytes.as_ptr().cast(), bytes.len()) };

    if written < 0 {
      let errno = crate::error::last_errno();
      if errno == libc::EINTR {
        continue;
      }
      return Err(errno);
    }
    if written == 0 {
      return Err(0);
    }

    bytes = &bytes[written as usize..];
  }
  Ok(())
}

/// Logs one line to stderr. A logging failure is itself fatal.
pub fn log(message: &dyn Display) {
  let mut line = StackWriter::<256>::new();
  let _ = line.write_fmt(format_args!("{message}"));

  let ok = write_stderr(PREFIX).is_ok()
    && write_stderr(line.as_bytes()).is_ok()
    && write_stderr(b"\n").is_ok();

  if !ok {
    let _ = write_stderr(LOGGING_FAILED);
    terminate();
  }
}

/// Logs `message` and terminates the process. Never returns.
#[cold]
pub fn fatal(message: &dyn Display) -> ! {
  log(message);
  terminate()
}

/// Exits without running atexit handlers, which could call back into the
/// allocator.
fn terminate() -> ! {
  unsafe { libc::_exit(FATAL_EXIT_CODE) }
}
