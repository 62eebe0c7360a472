//! # pagemalloc - A Segregated Free-List Allocator
//!
//! This crate implements a small **segregated free-list allocator** that gets
//! all of its memory straight from the operating system with `mmap(2)` and can
//! stand in for the C heap (`malloc`, `free`, `malloc_usable_size`).
//!
//! ## Overview
//!
//! Requests up to 2048 bytes are rounded to a power-of-two size class, and
//! every class keeps its own list of free blocks:
//!
//! ```text
//!   Free-List Registry:
//!
//!   class   head
//!   ┌──────┬──────┐     ┌─────┐   ┌─────┐   ┌─────┐
//!   │   16 │  ●───┼────►│     ├──►│     ├──►│     ├──► null
//!   ├──────┼──────┤     └─────┘   └─────┘   └─────┘
//!   │   32 │ null │
//!   ├──────┼──────┤     ┌─────────┐   ┌─────────┐
//!   │   64 │  ●───┼────►│         ├──►│         ├──► null
//!   ├──────┼──────┤     └─────────┘   └─────────┘
//!   │  ... │      │
//!   ├──────┼──────┤
//!   │ 2048 │ null │
//!   └──────┴──────┘
//!
//!   Allocation pops the head, release pushes a new head.
//!   Both are O(1).
//! ```
//!
//! When a class runs dry, one fresh page is mapped, a header is stamped at
//! its start, and the rest of the page is cut into equal blocks:
//!
//! ```text
//!   One 4096-byte page of class 256:
//!
//!   ┌────────┬───────┬───────┬───────┬─────┬────────┐
//!   │ header │ blk 1 │ blk 2 │ blk 3 │ ... │ blk 15 │
//!   │ magic  │       │       │       │     │        │
//!   │ 256    │       │       │       │     │        │
//!   └────────┴───────┴───────┴───────┴─────┴────────┘
//!   ▲
//!   └── any address & !(4096 - 1) lands here
//! ```
//!
//! The header is how [`release`] and [`usable_size`] recover the size class
//! of a bare pointer: mask it down to the page start and read the header. A
//! page without the sentinel is not ours and the call does nothing.
//!
//! Requests above 2048 bytes are mapped directly, with a header of their own.
//! Released large regions stay mapped and are reused by the next large
//! request of the same mapped length.
//!
//! ## Crate Structure
//!
//! ```text
//!   pagemalloc
//!   ├── align       - Alignment macros (align_up!, align_down!)
//!   ├── config      - Page size, class ladder and sentinels
//!   ├── size_class  - round_up and the SizeClass ladder
//!   ├── block       - Free block view (internal)
//!   ├── free_list   - Per-class free-list registry (internal)
//!   ├── header      - Page header stamping and lookup (internal)
//!   ├── large       - Direct mappings above the largest class (internal)
//!   ├── source      - PageSource trait and the mmap source
//!   ├── heap        - Heap: allocate / release / usable_size
//!   ├── global      - Process-wide heap and the C ABI (feature `c_api`)
//!   ├── diag        - Allocation-free stderr diagnostics (internal)
//!   └── error       - MapError
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use pagemalloc::Heap;
//!
//! let mut heap = Heap::new();
//!
//! let block = heap.allocate(100);
//! unsafe {
//!   block.as_ptr().write_bytes(0x2A, 100);
//!   assert_eq!(heap.usable_size(block.as_ptr()), 128);
//!
//!   heap.release(block.as_ptr());
//! }
//!
//! // The freed block is the first one handed out again.
//! assert_eq!(heap.allocate(120), block);
//! ```
//!
//! ## Failure Policy
//!
//! Running out of memory is not recoverable: the allocator writes one line to
//! stderr without allocating and exits with status 2. Null, foreign and
//! already-freed pointers are silently ignored.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: No synchronization primitives
//! - **No coalescing or splitting**: Blocks keep their class forever
//! - **Pages are never returned**: Nothing is ever unmapped
//! - **Alignment**: Only the natural alignment of each power-of-two class
//! - **Unix-only**: Requires `libc` and `mmap` (POSIX systems)
//!
//! ## Safety
//!
//! This crate is inherently unsafe as it deals with raw memory management.
//! Release and size queries read the header of whatever page an address falls
//! in, so the address must at least lie in mapped memory.
//!
//! ## C ABI
//!
//! With `--features c_api` the crate exports `malloc`, `free`, `calloc`,
//! `realloc` and `malloc_usable_size`, and the `cdylib` can be preloaded:
//!
//! ```text
//!   cargo build --release --features c_api
//!   LD_PRELOAD=target/release/libpagemalloc.so ./program
//! ```

pub mod align;
mod block;
pub mod config;
mod diag;
pub mod error;
mod free_list;
mod global;
mod header;
pub mod heap;
mod large;
pub mod size_class;
pub mod source;

pub use error::MapError;
pub use global::{allocate, release, usable_size};
pub use heap::{Heap, blocks_per_page};
pub use size_class::{SizeClass, checked_round_up, round_up};
pub use source::{Mmap, PageSource};
