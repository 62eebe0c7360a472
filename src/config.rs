//! Layout constants shared by every part of the allocator.
//!
//! The page size, the size-class ladder and the large-object threshold are
//! coupled: the carving arithmetic in [`crate::heap`] assumes that every class
//! divides the page evenly and that a header fits inside one block slot. The
//! assertions at the bottom of this file keep them honest.

use std::mem;

use crate::{block::FreeBlock, header::PageHeader};

/// Size of one mapping unit handed out by the OS.
pub const PAGE_SIZE: usize = 0x1000;

/// Smallest block ever returned for a small request.
pub const MIN_BLOCK_SIZE: usize = 16;

/// Largest size class. Requests above this take the large-object path.
pub const MAX_BLOCK_SIZE: usize = 2048;

/// Requests strictly larger than this bypass the free lists.
pub const LARGE_THRESHOLD: usize = MAX_BLOCK_SIZE;

/// Number of classes on the ladder `16, 32, .., 2048`.
pub const CLASS_COUNT: usize =
  (MAX_BLOCK_SIZE.trailing_zeros() - MIN_BLOCK_SIZE.trailing_zeros()) as usize + 1;

/// Bytes reserved at the start of every page or large region.
pub const HEADER_SIZE: usize = mem::size_of::<PageHeader>();

/// Sentinel of a page carved into small blocks.
pub const PAGE_MAGIC: u64 = 0x5041_4745_4D41_4C43; // "PAGEMALC"

/// Sentinel of a directly mapped large region.
pub const LARGE_MAGIC: u64 = 0x4C41_5247_4D41_4C43; // "LARGMALC"

/// Sentinel of a released large region waiting to be reused.
pub const RETIRED_MAGIC: u64 = 0x5245_5449_5245_4421; // "RETIRED!"

/// Mixed with a block's address to mark it as sitting on a free list.
pub const FREE_BLOCK_KEY: usize = 0x9E37_79B9_7F4A_7C15_u64 as usize;

/// Exit status used when the allocator gives up.
pub const FATAL_EXIT_CODE: i32 = 2;

const _: () = assert!(PAGE_SIZE.is_power_of_two());
const _: () = assert!(MIN_BLOCK_SIZE.is_power_of_two());
const _: () = assert!(MAX_BLOCK_SIZE.is_power_of_two());
const _: () = assert!(MAX_BLOCK_SIZE < PAGE_SIZE);
const _: () = assert!(CLASS_COUNT == 8);
const _: () = assert!(HEADER_SIZE <= MIN_BLOCK_SIZE);
const _: () = assert!(mem::size_of::<FreeBlock>() <= MIN_BLOCK_SIZE);
const _: () = assert!(PAGE_MAGIC != LARGE_MAGIC);
const _: () = assert!(RETIRED_MAGIC != PAGE_MAGIC && RETIRED_MAGIC != LARGE_MAGIC);
