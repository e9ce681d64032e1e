// SPDX-License-Identifier: MIT

//! In-memory disk images for unit tests.

use alloc::vec;
use alloc::vec::Vec;

use crate::gpt::*;
use crate::guid::Guid;

pub(crate) struct ImageBuilder {
    block_size: u64,
    total_blocks: u64,
    num_entries: u32,
    entry_size: u32,
    entries: Vec<GptEntry>,
    protective_mbr: bool,
}

impl ImageBuilder {
    pub(crate) fn new(block_size: u64, total_blocks: u64) -> Self {
        Self {
            block_size,
            total_blocks,
            num_entries: 128,
            entry_size: GPT_ENTRY_SIZE as u32,
            entries: Vec::new(),
            protective_mbr: true,
        }
    }

    pub(crate) fn num_entries(mut self, n: u32) -> Self {
        self.num_entries = n;
        self
    }

    pub(crate) fn entry_size(mut self, size: u32) -> Self {
        self.entry_size = size;
        self
    }

    pub(crate) fn entry(mut self, e: GptEntry) -> Self {
        self.entries.push(e);
        self
    }

    pub(crate) fn without_mbr(mut self) -> Self {
        self.protective_mbr = false;
        self
    }

    fn array_blocks(&self) -> u64 {
        let bytes = self.num_entries as u64 * self.entry_size as u64;
        bytes.div_ceil(self.block_size)
    }

    fn header(&self, current: u64, backup: u64, entries_lba: u64, crc: u32) -> GptHeader {
        let array = self.array_blocks();
        let mut h = GptHeader {
            signature: *GPT_SIGNATURE,
            revision: GPT_REVISION,
            header_size: GPT_HEADER_SIZE as u32,
            header_crc32: 0,
            reserved: 0,
            current_lba: current,
            backup_lba: backup,
            first_usable_lba: 2 + array,
            last_usable_lba: self.total_blocks - 2 - array,
            disk_guid: Guid::from_bytes([0xAB; 16]),
            entries_lba,
            num_entries: self.num_entries,
            entry_size: self.entry_size,
            entries_crc32: crc,
            padding: vec![0u8; self.block_size as usize - GPT_HEADER_SIZE],
        };
        h.header_crc32 = h.compute_header_crc32();
        h
    }

    fn array_bytes(&self) -> Vec<u8> {
        let es = self.entry_size as usize;
        let mut out = vec![0u8; self.num_entries as usize * es];
        for (i, e) in self.entries.iter().enumerate() {
            out[i * es..i * es + GPT_ENTRY_SIZE].copy_from_slice(&e.to_bytes());
        }
        out
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let bs = self.block_size as usize;
        let mut img = vec![0u8; bs * self.total_blocks as usize];
        let last = self.total_blocks - 1;
        let backup_entries = last - self.array_blocks();

        if self.protective_mbr {
            // single 0xEE record covering the disk
            img[446 + 4] = 0xEE;
            img[446 + 8..446 + 12].copy_from_slice(&1u32.to_le_bytes());
            let len = (self.total_blocks - 1).min(u32::MAX as u64) as u32;
            img[446 + 12..446 + 16].copy_from_slice(&len.to_le_bytes());
            img[510] = 0x55;
            img[511] = 0xAA;
        }

        let array = self.array_bytes();
        let crc = compute_entries_crc32(
            &self.entries,
            self.num_entries as usize,
            self.entry_size as usize,
        );

        let primary = self.header(1, last, 2, crc);
        let backup = self.header(last, 1, backup_entries, crc);

        img[bs..2 * bs].copy_from_slice(&primary.to_block());
        img[2 * bs..2 * bs + array.len()].copy_from_slice(&array);
        let b = backup_entries as usize * bs;
        img[b..b + array.len()].copy_from_slice(&array);
        img[last as usize * bs..].copy_from_slice(&backup.to_block());
        img
    }
}
