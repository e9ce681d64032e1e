// SPDX-License-Identifier: MIT

use crate::{BlockIO, BlockIOError, BlockIOResult};

/// In-memory implementation of `BlockIO`.
///
/// Useful for tests and disk images already loaded in RAM.
/// Seeking past the end clamps to the end, the way some block devices
/// silently clamp out-of-range seeks.
#[derive(Debug)]
pub struct MemBlockIO<'a> {
    buffer: &'a [u8],
    pos: u64,
}

impl<'a> MemBlockIO<'a> {
    #[inline]
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.buffer.len() as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl<'a> BlockIO for MemBlockIO<'a> {
    #[inline]
    fn seek(&mut self, offset: u64) -> BlockIOResult<u64> {
        self.pos = offset.min(self.len());
        Ok(self.pos)
    }

    #[inline(always)]
    fn read_exact(&mut self, buf: &mut [u8]) -> BlockIOResult {
        let end = self
            .pos
            .checked_add(buf.len() as u64)
            .ok_or(BlockIOError::OutOfBounds)?;
        if end > self.len() {
            return Err(BlockIOError::UnexpectedEof);
        }
        let start = self.pos as usize;
        buf.copy_from_slice(&self.buffer[start..start + buf.len()]);
        self.pos = end;
        Ok(())
    }

    #[inline]
    fn position(&self) -> u64 {
        self.pos
    }
}
