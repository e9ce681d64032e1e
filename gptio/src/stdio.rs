// SPDX-License-Identifier: MIT

use std::io::{Error, ErrorKind, Read, Seek, SeekFrom};

use crate::{BlockIO, BlockIOError, BlockIOResult};

/// `BlockIO` over anything `Read + Seek` (files, raw block devices).
#[derive(Debug)]
pub struct StdBlockIO<'a, T: Read + Seek> {
    io: &'a mut T,
    pos: u64,
}

impl<'a, T: Read + Seek> StdBlockIO<'a, T> {
    /// Wraps `io`, picking up its current position.
    #[inline]
    pub fn new(io: &'a mut T) -> BlockIOResult<Self> {
        let pos = io.stream_position()?;
        Ok(Self { io, pos })
    }
}

impl<'a, T: Read + Seek> BlockIO for StdBlockIO<'a, T> {
    fn seek(&mut self, offset: u64) -> BlockIOResult<u64> {
        self.pos = self.io.seek(SeekFrom::Start(offset))?;
        Ok(self.pos)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> BlockIOResult {
        match self.io.read_exact(buf) {
            Ok(()) => {
                self.pos += buf.len() as u64;
                Ok(())
            }
            Err(e) => {
                // a failed read may still have consumed part of the stream
                self.pos = self.io.stream_position().unwrap_or(self.pos);
                Err(e.into())
            }
        }
    }

    #[inline]
    fn position(&self) -> u64 {
        self.pos
    }
}

impl From<Error> for BlockIOError {
    #[cold]
    #[inline(never)]
    fn from(e: Error) -> Self {
        match e.kind() {
            ErrorKind::UnexpectedEof => BlockIOError::UnexpectedEof,
            ErrorKind::Unsupported => BlockIOError::Unsupported,
            kind => BlockIOError::Io(kind),
        }
    }
}
