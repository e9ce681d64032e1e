// SPDX-License-Identifier: MIT

use crate::{BlockIO, BlockIOResult};

/// Simple counters, no_std friendly.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct IoStats {
    pub seeks: u64,
    pub reads: u64,
    pub read_bytes: u64,

    // Alignment (a raw device may refuse unaligned reads)
    pub aligned_reads: u64,
    pub unaligned_reads: u64,

    pub max_read: u64,
}

impl IoStats {
    #[inline]
    pub fn reset(&mut self) {
        *self = IoStats::default();
    }
}

/// Transparent instrumentation wrapper.
#[derive(Debug)]
pub struct IOCounter<'a, IO: BlockIO + ?Sized> {
    inner: &'a mut IO,
    pub stats: IoStats,
    /// Local "block" alignment (e.g. 512, 4096)
    pub align: u64,
}

impl<'a, IO: BlockIO + ?Sized> IOCounter<'a, IO> {
    #[inline]
    pub fn new(inner: &'a mut IO) -> Self {
        Self {
            inner,
            stats: IoStats::default(),
            align: 1,
        }
    }

    #[inline]
    pub fn with_align(inner: &'a mut IO, align: u64) -> Self {
        let align = if align == 0 { 1 } else { align };
        Self {
            inner,
            stats: IoStats::default(),
            align,
        }
    }

    #[inline]
    pub fn snapshot(&self) -> IoStats {
        self.stats
    }
}

impl<'a, IO: BlockIO + ?Sized> BlockIO for IOCounter<'a, IO> {
    #[inline]
    fn seek(&mut self, offset: u64) -> BlockIOResult<u64> {
        self.stats.seeks += 1;
        self.inner.seek(offset)
    }

    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> BlockIOResult {
        let len = buf.len() as u64;
        let aligned = self.inner.position() % self.align == 0 && len % self.align == 0;
        if aligned {
            self.stats.aligned_reads += 1;
        } else {
            self.stats.unaligned_reads += 1;
        }

        self.stats.reads += 1;
        self.stats.read_bytes += len;
        if self.stats.max_read < len {
            self.stats.max_read = len;
        }

        self.inner.read_exact(buf)
    }

    #[inline]
    fn position(&self) -> u64 {
        self.inner.position()
    }
}
