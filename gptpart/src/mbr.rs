// SPDX-License-Identifier: MIT

//! Legacy boot sector at LBA 0, read only to tell protective MBRs apart
//! from legacy partitioned disks.

use alloc::vec;

use gptio::prelude::*;
use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::errors::*;
use crate::io_ext::BlockIOLbaExt;

pub const MBR_SIGNATURE: [u8; 2] = [0x55, 0xAA];
pub const MBR_SIZE: usize = 512;
pub const PROTECTIVE_GPT: u8 = 0xEE;

#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned, Copy, Clone, Debug)]
#[repr(C)]
pub struct MbrEntry {
    pub boot_flag: u8,
    pub starting_chs: [u8; 3],
    pub part_type: u8,
    pub end_chs: [u8; 3],
    pub start_lba: U32,
    pub sectors: U32,
}

impl MbrEntry {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.part_type == 0
    }

    #[inline]
    pub fn is_protective(&self) -> bool {
        self.part_type == PROTECTIVE_GPT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbrKind {
    /// No boot signature, or no record in use.
    Empty,
    /// At least one 0xEE record: the disk is GPT.
    Protective,
    Legacy,
}

impl core::fmt::Display for MbrKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            MbrKind::Empty => "empty",
            MbrKind::Protective => "protective",
            MbrKind::Legacy => "legacy",
        })
    }
}

#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned, Copy, Clone, Debug)]
#[repr(C)]
pub struct Mbr {
    pub boot_code: [u8; 446],
    pub entries: [MbrEntry; 4],
    pub signature: [u8; 2],
}

impl Mbr {
    #[inline]
    pub fn has_valid_signature(&self) -> bool {
        self.signature == MBR_SIGNATURE
    }

    pub fn validate(&self) -> PartResult<()> {
        if !self.has_valid_signature() {
            return Err(MbrError::InvalidSignature.into());
        }
        Ok(())
    }

    pub fn kind(&self) -> MbrKind {
        if !self.has_valid_signature() {
            MbrKind::Empty
        } else if self.entries.iter().any(MbrEntry::is_protective) {
            MbrKind::Protective
        } else if self.entries.iter().any(|e| !e.is_empty()) {
            MbrKind::Legacy
        } else {
            MbrKind::Empty
        }
    }
}

/// Reads LBA 0 as one logical block and decodes its first 512 bytes.
pub fn read_mbr<IO: BlockIO + ?Sized>(io: &mut IO, block_size: u64) -> PartResult<Mbr> {
    crate::gpt::check_block_size(block_size)?;
    io.seek_lba(0, block_size)?;
    let mut block = vec![0u8; block_size as usize];
    io.read_block(&mut block)?;
    let (mbr, _) = Mbr::read_from_prefix(&block)
        .map_err(|_| GptError::TruncatedRead { needed: MBR_SIZE })?;
    Ok(mbr)
}
