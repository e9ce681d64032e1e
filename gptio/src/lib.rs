// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std)]

// Core modules
pub mod errors;
pub mod stats;

// Backend modules
#[cfg(feature = "mem")]
mod mem;

#[cfg(feature = "std")]
mod stdio;

// Prelude re-exports (central entrypoint)
pub mod prelude {
    pub use super::BlockIO;
    pub use super::errors::*;
    pub use super::stats::*;

    #[cfg(feature = "mem")]
    pub use super::mem::MemBlockIO;

    #[cfg(feature = "std")]
    pub use super::stdio::StdBlockIO;
}

// Internal use
use errors::*;

// Traits

/// Seekable block reader.
///
/// This is the only capability the partition code needs from a device:
/// position the cursor at an absolute byte offset, then fill a buffer.
/// Implementations may target RAM, files, raw block devices, etc.
///
/// Raw block devices on some systems reject reads that are not a whole
/// number of logical blocks, so callers are expected to read block-sized
/// buffers at block-aligned offsets.
pub trait BlockIO {
    /// Moves the cursor to `offset` (absolute) and returns the offset
    /// actually reached. Devices may clamp, so callers must compare.
    fn seek(&mut self, offset: u64) -> BlockIOResult<u64>;

    /// Fills `buf` from the current position and advances the cursor.
    ///
    /// Fails with [`BlockIOError::UnexpectedEof`] if fewer than
    /// `buf.len()` bytes remain.
    fn read_exact(&mut self, buf: &mut [u8]) -> BlockIOResult;

    /// Current absolute cursor position.
    fn position(&self) -> u64;
}

impl<T: BlockIO + ?Sized> BlockIO for &mut T {
    #[inline]
    fn seek(&mut self, offset: u64) -> BlockIOResult<u64> {
        (**self).seek(offset)
    }

    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> BlockIOResult {
        (**self).read_exact(buf)
    }

    #[inline]
    fn position(&self) -> u64 {
        (**self).position()
    }
}
