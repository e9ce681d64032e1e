// SPDX-License-Identifier: MIT

//! "LBA-aware" BlockIO helpers to avoid `* block_size` everywhere,
//! with overflow-check and seek verification.

use gptio::prelude::*;

use crate::errors::*;

/// Offset = LBA * block_size (with overflow-check)
#[inline]
pub(crate) fn lba_offset(lba: u64, block_size: u64) -> Option<u64> {
    lba.checked_mul(block_size)
}

pub trait BlockIOLbaExt: BlockIO {
    /// Seeks to the first byte of `lba`.
    ///
    /// Fails with `SeekMismatch` when the device lands anywhere else
    /// (clamped seek past the end, or an offset that does not fit in u64).
    fn seek_lba(&mut self, lba: u64, block_size: u64) -> PartResult<()> {
        let Some(target) = lba_offset(lba, block_size) else {
            return Err(GptError::SeekMismatch {
                expected: u64::MAX,
                reached: self.position(),
            }
            .into());
        };
        let reached = self.seek(target)?;
        if reached != target {
            return Err(GptError::SeekMismatch {
                expected: target,
                reached,
            }
            .into());
        }
        Ok(())
    }

    /// Reads exactly one logical block (`buf.len()` bytes) at the current
    /// position. A short device is reported as `TruncatedRead`.
    #[inline]
    fn read_block(&mut self, buf: &mut [u8]) -> PartResult<()> {
        let needed = buf.len();
        self.read_exact(buf).map_err(|e| match e {
            BlockIOError::UnexpectedEof => GptError::TruncatedRead { needed }.into(),
            other => PartError::IO(other),
        })
    }
}

impl<T: BlockIO + ?Sized> BlockIOLbaExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_lba_detects_clamp() {
        let buf = [0u8; 512 * 2];
        let mut io = MemBlockIO::new(&buf);
        io.seek_lba(1, 512).unwrap();
        assert_eq!(io.position(), 512);

        let err = io.seek_lba(4, 512).unwrap_err();
        assert_eq!(
            err,
            PartError::Gpt(GptError::SeekMismatch {
                expected: 2048,
                reached: 1024
            })
        );
    }

    #[test]
    fn seek_lba_overflow() {
        let buf = [0u8; 512];
        let mut io = MemBlockIO::new(&buf);
        assert!(matches!(
            io.seek_lba(u64::MAX, 512),
            Err(PartError::Gpt(GptError::SeekMismatch { .. }))
        ));
    }

    #[test]
    fn short_block_is_truncated_read() {
        let buf = [0u8; 300];
        let mut io = MemBlockIO::new(&buf);
        let mut block = [0u8; 512];
        assert_eq!(
            io.read_block(&mut block),
            Err(PartError::Gpt(GptError::TruncatedRead { needed: 512 }))
        );
    }
}
