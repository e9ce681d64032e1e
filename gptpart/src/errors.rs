// SPDX-License-Identifier: MIT

use core::fmt;

use gptio::errors::*;

/// Which checksummed region failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcRegion {
    Header,
    PartitionArray,
}

impl fmt::Display for CrcRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrcRegion::Header => f.write_str("header"),
            CrcRegion::PartitionArray => f.write_str("partition entry array"),
        }
    }
}

/// GPT decoding and validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GptError {
    /// Not enough bytes on the device for a required structure.
    TruncatedRead { needed: usize },
    BadSignature { found: [u8; 8] },
    ReservedFieldNonZero { value: u32 },
    /// Non-zero byte in the header padding, at `offset` within the block.
    PaddingCorrupted { offset: usize },
    ChecksumMismatch {
        region: CrcRegion,
        expected: u32,
        found: u32,
    },
    /// Header or partition array outside the conventional LBA 1 / LBA 2 slots.
    UnsupportedLayout { my_lba: u64, entries_lba: u64 },
    SeekMismatch { expected: u64, reached: u64 },
    MisalignedEntrySize { entry_size: u32, block_size: u64 },
    EntryPaddingCorrupted { index: usize },
    BlockSizeTooSmall { block_size: u64 },
    /// Not a power of two, or above [`MAX_BLOCK_SIZE`](crate::gpt::MAX_BLOCK_SIZE).
    BlockSizeInvalid { block_size: u64 },
    /// The partition array runs into space it may not occupy (usable
    /// range, or the backup header).
    EntryArrayOutOfRange { entries_lba: u64, blocks: u64 },
    HeaderSizeOutOfRange { header_size: u32, block_size: u64 },
    EntrySizeInvalid { base: u32, got: u32 },
    /// Backup header disagrees with the primary on `field`.
    BackupMismatch { field: &'static str },
    EntryRangeInverted { index: usize },
    EntryOutOfBounds { index: usize },
    EntryOverlap { a: usize, b: usize },
}

impl GptError {
    pub fn msg(&self) -> &'static str {
        match self {
            GptError::TruncatedRead { .. } => "GPT: truncated read",
            GptError::BadSignature { .. } => "GPT: invalid signature",
            GptError::ReservedFieldNonZero { .. } => "GPT: reserved field not zero",
            GptError::PaddingCorrupted { .. } => "GPT: header not zero padded",
            GptError::ChecksumMismatch { .. } => "GPT: CRC32 mismatch",
            GptError::UnsupportedLayout { .. } => {
                "GPT: header or partition array in non-standard location"
            }
            GptError::SeekMismatch { .. } => "GPT: seek did not reach the requested offset",
            GptError::MisalignedEntrySize { .. } => {
                "GPT: partition entries must fit entirely in a single block"
            }
            GptError::EntryPaddingCorrupted { .. } => "GPT: invalid partition entry padding",
            GptError::BlockSizeTooSmall { .. } => "GPT: block size too small",
            GptError::BlockSizeInvalid { .. } => "GPT: unsupported block size",
            GptError::EntryArrayOutOfRange { .. } => "GPT: partition entry array out of range",
            GptError::HeaderSizeOutOfRange { .. } => "GPT: header_size out of range",
            GptError::EntrySizeInvalid { .. } => "GPT: invalid entry_size",
            GptError::BackupMismatch { .. } => "GPT: backup header does not match primary",
            GptError::EntryRangeInverted { .. } => "GPT: partition ends before it starts",
            GptError::EntryOutOfBounds { .. } => "GPT: partition outside usable LBA range",
            GptError::EntryOverlap { .. } => "GPT: partition overlap detected",
        }
    }
}

impl fmt::Display for GptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = self.msg();
        match *self {
            GptError::TruncatedRead { needed } => write!(f, "{msg} (needed {needed} bytes)"),
            GptError::BadSignature { found } => write!(f, "{msg} {:02X?}", found),
            GptError::ReservedFieldNonZero { value } => write!(f, "{msg} ({value:#010X})"),
            GptError::PaddingCorrupted { offset } => write!(f, "{msg} (byte {offset})"),
            GptError::ChecksumMismatch {
                region,
                expected,
                found,
            } => write!(
                f,
                "{msg} on {region} (expected {expected:#010X}, found {found:#010X})"
            ),
            GptError::UnsupportedLayout {
                my_lba,
                entries_lba,
            } => write!(f, "{msg} (header LBA {my_lba}, entries LBA {entries_lba})"),
            GptError::SeekMismatch { expected, reached } => {
                write!(f, "{msg} (wanted offset {expected}, reached {reached})")
            }
            GptError::MisalignedEntrySize {
                entry_size,
                block_size,
            } => write!(f, "{msg} (entry_size {entry_size}, block size {block_size})"),
            GptError::EntryPaddingCorrupted { index } => write!(f, "{msg} (entry {index})"),
            GptError::BlockSizeTooSmall { block_size }
            | GptError::BlockSizeInvalid { block_size } => write!(f, "{msg} ({block_size})"),
            GptError::EntryArrayOutOfRange {
                entries_lba,
                blocks,
            } => write!(f, "{msg} (LBA {entries_lba}, {blocks} block(s))"),
            GptError::HeaderSizeOutOfRange {
                header_size,
                block_size,
            } => write!(f, "{msg} ({header_size}, block size {block_size})"),
            GptError::EntrySizeInvalid { base, got } => {
                write!(f, "{msg} (got {got}, minimum {base})")
            }
            GptError::BackupMismatch { field } => write!(f, "{msg} ({field})"),
            GptError::EntryRangeInverted { index } | GptError::EntryOutOfBounds { index } => {
                write!(f, "{msg} (entry {index})")
            }
            GptError::EntryOverlap { a, b } => write!(f, "{msg} (entries {a} and {b})"),
        }
    }
}

/// Protective MBR errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbrError {
    InvalidSignature,
}

impl MbrError {
    pub fn msg(&self) -> &'static str {
        match self {
            MbrError::InvalidSignature => "MBR: invalid boot signature",
        }
    }
}

impl fmt::Display for MbrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.msg())
    }
}

/// Unified error type for partition tools (GPT, MBR, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartError {
    IO(BlockIOError),
    Gpt(GptError),
    Mbr(MbrError),
}

impl PartError {
    pub fn msg(&self) -> &'static str {
        match self {
            PartError::IO(e) => e.msg(),
            PartError::Gpt(e) => e.msg(),
            PartError::Mbr(e) => e.msg(),
        }
    }

    /// The GPT error, if this is one.
    pub fn gpt(&self) -> Option<&GptError> {
        match self {
            PartError::Gpt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BlockIOError> for PartError {
    fn from(e: BlockIOError) -> Self {
        PartError::IO(e)
    }
}

impl From<GptError> for PartError {
    fn from(e: GptError) -> Self {
        PartError::Gpt(e)
    }
}

impl From<MbrError> for PartError {
    fn from(e: MbrError) -> Self {
        PartError::Mbr(e)
    }
}

impl fmt::Display for PartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartError::IO(e) => write!(f, "{e}"),
            PartError::Gpt(e) => write!(f, "{e}"),
            PartError::Mbr(e) => write!(f, "{e}"),
        }
    }
}

impl core::error::Error for PartError {}

pub type PartResult<T = ()> = Result<T, PartError>;
