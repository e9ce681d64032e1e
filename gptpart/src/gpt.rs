// SPDX-License-Identifier: MIT
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crc32fast::Hasher;
use gptio::prelude::*;
use zerocopy::byteorder::little_endian::{U16, U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::attrs::GptAttributes;
use crate::guid::Guid;
use crate::guids::GptPartitionKind;
use crate::{errors::*, io_ext::BlockIOLbaExt};

pub const GPT_SIGNATURE: &[u8; 8] = b"EFI PART";
pub const GPT_REVISION: u32 = 0x00010000;
/// Bytes of the header that carry fields; the rest of the block is padding.
pub const GPT_HEADER_SIZE: usize = 92;
/// Bytes of an entry that carry fields; the rest of the slot is padding.
pub const GPT_ENTRY_SIZE: usize = 128;
pub const GPT_NAME_LEN: usize = 36;
pub const GPT_PRIMARY_HEADER_LBA: u64 = 1;
pub const GPT_PRIMARY_ENTRIES_LBA: u64 = 2;

/// Accepted logical block sizes: powers of two in this range.
pub const MIN_BLOCK_SIZE: u64 = 512;
pub const MAX_BLOCK_SIZE: u64 = 65536;

// Upper bound on the up-front allocation for the entry vector; a corrupt
// count still fails at the first short read.
const MAX_PREALLOC_ENTRIES: usize = 1024;

// Offset of `header_crc32` inside the header.
const HEADER_CRC_OFFSET: usize = 16;

/// On-disk header fields, little-endian.
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned, Clone, Copy)]
#[repr(C)]
struct RawGptHeader {
    signature: [u8; 8],
    revision: U32,
    header_size: U32,
    header_crc32: U32,
    reserved: U32,
    current_lba: U64,
    backup_lba: U64,
    first_usable_lba: U64,
    last_usable_lba: U64,
    disk_guid: [u8; 16],
    entries_lba: U64,
    num_entries: U32,
    entry_size: U32,
    entries_crc32: U32,
}

/// On-disk entry fields, little-endian.
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned, Clone, Copy)]
#[repr(C)]
struct RawGptEntry {
    type_guid: [u8; 16],
    unique_guid: [u8; 16],
    start_lba: U64,
    end_lba: U64,
    attributes: U64,
    name: [U16; GPT_NAME_LEN],
}

pub fn encode_gpt_name(name: &str) -> [u16; GPT_NAME_LEN] {
    let mut buf = [0u16; GPT_NAME_LEN];
    for (i, c) in name.encode_utf16().take(GPT_NAME_LEN).enumerate() {
        buf[i] = c;
    }
    buf
}

/// Decodes a GPT name up to the first NUL unit (all 36 units if there is
/// none). Unpaired surrogates become U+FFFD.
pub fn decode_gpt_name(name: &[u16; GPT_NAME_LEN]) -> String {
    let end = name.iter().position(|&c| c == 0).unwrap_or(GPT_NAME_LEN);
    String::from_utf16_lossy(&name[..end])
}

#[inline]
fn crc32(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

/// One partition slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GptEntry {
    pub type_guid: Guid,
    pub unique_guid: Guid,
    pub start_lba: u64,
    pub end_lba: u64,
    pub attributes: u64,
    pub name: [u16; GPT_NAME_LEN],
}

impl Default for GptEntry {
    fn default() -> Self {
        Self {
            type_guid: Guid::ZERO,
            unique_guid: Guid::ZERO,
            start_lba: 0,
            end_lba: 0,
            attributes: 0,
            name: [0u16; GPT_NAME_LEN],
        }
    }
}

impl GptEntry {
    pub fn new(
        type_guid: Guid,
        unique_guid: Guid,
        start_lba: u64,
        end_lba: u64,
        attributes: u64,
        name: &str,
    ) -> Self {
        Self {
            type_guid,
            unique_guid,
            start_lba,
            end_lba,
            attributes,
            name: encode_gpt_name(name),
        }
    }

    /// Decodes the fixed 128-byte part of a slot.
    pub fn from_bytes(bytes: &[u8; GPT_ENTRY_SIZE]) -> Self {
        let raw: RawGptEntry = zerocopy::transmute!(*bytes);
        Self {
            type_guid: Guid::from_bytes(raw.type_guid),
            unique_guid: Guid::from_bytes(raw.unique_guid),
            start_lba: raw.start_lba.get(),
            end_lba: raw.end_lba.get(),
            attributes: raw.attributes.get(),
            name: raw.name.map(|c| c.get()),
        }
    }

    pub fn to_bytes(&self) -> [u8; GPT_ENTRY_SIZE] {
        let raw = RawGptEntry {
            type_guid: self.type_guid.to_bytes(),
            unique_guid: self.unique_guid.to_bytes(),
            start_lba: U64::new(self.start_lba),
            end_lba: U64::new(self.end_lba),
            attributes: U64::new(self.attributes),
            name: self.name.map(U16::new),
        };
        let mut out = [0u8; GPT_ENTRY_SIZE];
        out.copy_from_slice(raw.as_bytes());
        out
    }

    /// Unused slot: the type GUID is nil.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.type_guid.is_zero()
    }

    #[inline]
    pub fn kind(&self) -> GptPartitionKind {
        GptPartitionKind::from_guid(&self.type_guid)
    }

    #[inline]
    pub fn attributes(&self) -> GptAttributes {
        GptAttributes::from_bits_retain(self.attributes)
    }

    pub fn name(&self) -> String {
        decode_gpt_name(&self.name)
    }

    /// `end_lba - start_lba` in blocks, `None` if the entry ends before it
    /// starts.
    #[inline]
    pub fn size(&self) -> Option<u64> {
        self.end_lba.checked_sub(self.start_lba)
    }
}

/// A decoded GPT header block.
///
/// `padding` holds everything after the 92 field bytes, so the header
/// always spans exactly one logical block of `92 + padding.len()` bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GptHeader {
    pub signature: [u8; 8],
    pub revision: u32,
    pub header_size: u32,
    pub header_crc32: u32,
    pub reserved: u32,
    pub current_lba: u64,
    pub backup_lba: u64,
    pub first_usable_lba: u64,
    pub last_usable_lba: u64,
    pub disk_guid: Guid,
    pub entries_lba: u64,
    pub num_entries: u32,
    pub entry_size: u32,
    pub entries_crc32: u32,
    pub padding: Vec<u8>,
}

impl GptHeader {
    /// Decodes one logical block. The block length is the block size.
    pub fn from_block(block: &[u8]) -> PartResult<Self> {
        let (raw, padding) = RawGptHeader::read_from_prefix(block).map_err(|_| {
            GptError::BlockSizeTooSmall {
                block_size: block.len() as u64,
            }
        })?;
        Ok(Self {
            signature: raw.signature,
            revision: raw.revision.get(),
            header_size: raw.header_size.get(),
            header_crc32: raw.header_crc32.get(),
            reserved: raw.reserved.get(),
            current_lba: raw.current_lba.get(),
            backup_lba: raw.backup_lba.get(),
            first_usable_lba: raw.first_usable_lba.get(),
            last_usable_lba: raw.last_usable_lba.get(),
            disk_guid: Guid::from_bytes(raw.disk_guid),
            entries_lba: raw.entries_lba.get(),
            num_entries: raw.num_entries.get(),
            entry_size: raw.entry_size.get(),
            entries_crc32: raw.entries_crc32.get(),
            padding: padding.to_vec(),
        })
    }

    /// Re-encodes the whole block, padding included.
    pub fn to_block(&self) -> Vec<u8> {
        let raw = RawGptHeader {
            signature: self.signature,
            revision: U32::new(self.revision),
            header_size: U32::new(self.header_size),
            header_crc32: U32::new(self.header_crc32),
            reserved: U32::new(self.reserved),
            current_lba: U64::new(self.current_lba),
            backup_lba: U64::new(self.backup_lba),
            first_usable_lba: U64::new(self.first_usable_lba),
            last_usable_lba: U64::new(self.last_usable_lba),
            disk_guid: self.disk_guid.to_bytes(),
            entries_lba: U64::new(self.entries_lba),
            num_entries: U32::new(self.num_entries),
            entry_size: U32::new(self.entry_size),
            entries_crc32: U32::new(self.entries_crc32),
        };
        let mut block = Vec::with_capacity(GPT_HEADER_SIZE + self.padding.len());
        block.extend_from_slice(raw.as_bytes());
        block.extend_from_slice(&self.padding);
        block
    }

    /// Logical block size this header was decoded from.
    #[inline]
    pub fn block_size(&self) -> u64 {
        (GPT_HEADER_SIZE + self.padding.len()) as u64
    }

    /// CRC32 over the first `header_size` bytes with `header_crc32` zeroed.
    /// `header_size` is clamped to the block.
    pub fn compute_header_crc32(&self) -> u32 {
        let mut block = self.to_block();
        block[HEADER_CRC_OFFSET..HEADER_CRC_OFFSET + 4].fill(0);
        let end = (self.header_size as usize).min(block.len());
        crc32(&block[..end])
    }

    /// Logical blocks covered by the partition entry array.
    pub fn entries_blocks(&self) -> u64 {
        (self.num_entries as u64 * self.entry_size as u64).div_ceil(self.block_size())
    }

    /// Full validation of a primary header: structure, placement, CRC,
    /// then the array must end before the first usable LBA.
    pub fn validate(&self) -> PartResult<()> {
        self.validate_fields()?;
        self.validate_layout()?;
        self.validate_crc()?;

        let blocks = self.entries_blocks();
        if self.entries_lba.saturating_add(blocks) > self.first_usable_lba {
            return Err(GptError::EntryArrayOutOfRange {
                entries_lba: self.entries_lba,
                blocks,
            }
            .into());
        }
        Ok(())
    }

    /// Same as [`validate`](Self::validate) without the placement rule, for
    /// headers that legitimately live elsewhere (the backup copy).
    pub fn validate_structure(&self) -> PartResult<()> {
        self.validate_fields()?;
        self.validate_crc()
    }

    fn validate_fields(&self) -> PartResult<()> {
        if &self.signature != GPT_SIGNATURE {
            return Err(GptError::BadSignature {
                found: self.signature,
            }
            .into());
        }
        if self.reserved != 0 {
            return Err(GptError::ReservedFieldNonZero {
                value: self.reserved,
            }
            .into());
        }
        if let Some(i) = self.padding.iter().position(|&b| b != 0) {
            return Err(GptError::PaddingCorrupted {
                offset: GPT_HEADER_SIZE + i,
            }
            .into());
        }
        Ok(())
    }

    // TODO: locate headers and arrays from their declared LBAs instead of
    // requiring the LBA 1 / LBA 2 placement.
    fn validate_layout(&self) -> PartResult<()> {
        if self.current_lba != GPT_PRIMARY_HEADER_LBA
            || self.entries_lba != GPT_PRIMARY_ENTRIES_LBA
        {
            return Err(GptError::UnsupportedLayout {
                my_lba: self.current_lba,
                entries_lba: self.entries_lba,
            }
            .into());
        }
        Ok(())
    }

    fn validate_crc(&self) -> PartResult<()> {
        if (self.header_size as usize) < GPT_HEADER_SIZE
            || self.header_size as u64 > self.block_size()
        {
            return Err(GptError::HeaderSizeOutOfRange {
                header_size: self.header_size,
                block_size: self.block_size(),
            }
            .into());
        }
        let found = self.compute_header_crc32();
        if found != self.header_crc32 {
            return Err(GptError::ChecksumMismatch {
                region: CrcRegion::Header,
                expected: self.header_crc32,
                found,
            }
            .into());
        }
        Ok(())
    }

    /// Bounds and overlap checks over decoded entries (empty slots skipped).
    /// Slot indices in errors are positions in `entries`.
    pub fn validate_entries(&self, entries: &[GptEntry]) -> PartResult<()> {
        for (index, e) in entries.iter().enumerate() {
            if e.is_empty() {
                continue;
            }
            if e.end_lba < e.start_lba {
                return Err(GptError::EntryRangeInverted { index }.into());
            }
            if e.start_lba < self.first_usable_lba || e.end_lba > self.last_usable_lba {
                return Err(GptError::EntryOutOfBounds { index }.into());
            }
        }
        check_overlaps(entries)
    }
}

#[inline]
pub(crate) fn overlaps_inclusive(a_start: u64, a_end: u64, b_start: u64, b_end: u64) -> bool {
    a_start <= b_end && b_start <= a_end
}

fn check_overlaps(entries: &[GptEntry]) -> PartResult<()> {
    let mut segs: Vec<(usize, u64, u64)> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.is_empty())
        .map(|(i, e)| (i, e.start_lba, e.end_lba))
        .collect();

    if segs.len() <= 1 {
        return Ok(());
    }

    segs.sort_unstable_by_key(|s| s.1);

    // the entry reaching furthest so far
    let mut reach = segs[0];
    for &curr in &segs[1..] {
        if overlaps_inclusive(reach.1, reach.2, curr.1, curr.2) {
            let (a, b) = (reach.0.min(curr.0), reach.0.max(curr.0));
            return Err(GptError::EntryOverlap { a, b }.into());
        }
        if curr.2 > reach.2 {
            reach = curr;
        }
    }
    Ok(())
}

/// CRC32 of a partition array holding `entries` in its first slots,
/// `num_entries` slots of `entry_size` bytes, zero padded.
pub fn compute_entries_crc32(entries: &[GptEntry], num_entries: usize, entry_size: usize) -> u32 {
    let mut hasher = Hasher::new();
    let mut slot = vec![0u8; entry_size.max(GPT_ENTRY_SIZE)];
    for i in 0..num_entries {
        slot.fill(0);
        if let Some(e) = entries.get(i) {
            slot[..GPT_ENTRY_SIZE].copy_from_slice(&e.to_bytes());
        }
        hasher.update(&slot[..entry_size]);
    }
    hasher.finalize()
}

fn check_entry_geometry(entry_size: u32, block_size: u64) -> PartResult<()> {
    if (entry_size as usize) < GPT_ENTRY_SIZE {
        return Err(GptError::EntrySizeInvalid {
            base: GPT_ENTRY_SIZE as u32,
            got: entry_size,
        }
        .into());
    }
    if block_size % entry_size as u64 != 0 {
        return Err(GptError::MisalignedEntrySize {
            entry_size,
            block_size,
        }
        .into());
    }
    Ok(())
}

/// Streams the partition array at `entries_lba` one logical block at a
/// time, calling `f` for every slot in order. Returns the CRC32 of the
/// `num_entries * entry_size` array bytes.
fn stream_entries<IO, F>(
    header: &GptHeader,
    entries_lba: u64,
    io: &mut IO,
    mut f: F,
) -> PartResult<u32>
where
    IO: BlockIO + ?Sized,
    F: FnMut(usize, GptEntry) -> PartResult<()>,
{
    let block_size = header.block_size();
    check_entry_geometry(header.entry_size, block_size)?;
    io.seek_lba(entries_lba, block_size)?;

    let entry_size = header.entry_size as usize;
    let total = header.num_entries as usize;
    let per_block = block_size as usize / entry_size;

    let mut hasher = Hasher::new();
    let mut block = vec![0u8; block_size as usize];
    let mut index = 0usize;

    while index < total {
        // Whole blocks only: raw devices may reject partial reads
        io.read_block(&mut block)?;

        let take = per_block.min(total - index);
        for slot in block.chunks_exact(entry_size).take(take) {
            hasher.update(slot);

            let (head, tail) = slot.split_at(GPT_ENTRY_SIZE);
            if tail.iter().any(|&b| b != 0) {
                return Err(GptError::EntryPaddingCorrupted { index }.into());
            }
            let mut fixed = [0u8; GPT_ENTRY_SIZE];
            fixed.copy_from_slice(head);
            f(index, GptEntry::from_bytes(&fixed))?;
            index += 1;
        }
    }

    Ok(hasher.finalize())
}

// ---------------------------------------------------------------------
// Read GPT
// ---------------------------------------------------------------------

/// Rejects block sizes outside `MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE` or not a
/// power of two, before anything is allocated for them.
pub fn check_block_size(block_size: u64) -> PartResult<()> {
    if block_size < MIN_BLOCK_SIZE {
        return Err(GptError::BlockSizeTooSmall { block_size }.into());
    }
    if block_size > MAX_BLOCK_SIZE || !block_size.is_power_of_two() {
        return Err(GptError::BlockSizeInvalid { block_size }.into());
    }
    Ok(())
}

/// Decodes the header block at the current position of `io`.
///
/// Exactly one logical block is consumed. The header is not validated.
pub fn read_header<IO: BlockIO + ?Sized>(io: &mut IO, block_size: u64) -> PartResult<GptHeader> {
    check_block_size(block_size)?;
    let at = io.position();
    let mut block = vec![0u8; block_size as usize];
    io.read_block(&mut block)?;
    log::debug!("GPT: header block read at offset {at} ({block_size} bytes)");
    GptHeader::from_block(&block)
}

/// Reads every slot of the partition array described by `header`, empty
/// slots included, and checks the array CRC32.
pub fn read_partitions<IO: BlockIO + ?Sized>(
    header: &GptHeader,
    io: &mut IO,
) -> PartResult<Vec<GptEntry>> {
    let mut out = Vec::with_capacity((header.num_entries as usize).min(MAX_PREALLOC_ENTRIES));
    let found = stream_entries(header, header.entries_lba, io, |_, e| {
        out.push(e);
        Ok(())
    })?;

    if found != header.entries_crc32 {
        return Err(GptError::ChecksumMismatch {
            region: CrcRegion::PartitionArray,
            expected: header.entries_crc32,
            found,
        }
        .into());
    }

    log::debug!(
        "GPT: {} slots decoded, {} in use",
        out.len(),
        out.iter().filter(|e| !e.is_empty()).count()
    );
    Ok(out)
}

/// Outcome of the backup header check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupStatus {
    Verified,
    /// The backup is missing, corrupt or disagrees with the primary. The
    /// primary table is still usable.
    Degraded(PartError),
    /// Not checked.
    Skipped,
}

impl BackupStatus {
    #[inline]
    pub fn is_degraded(&self) -> bool {
        matches!(self, BackupStatus::Degraded(_))
    }
}

/// Reads and checks the backup header at `primary.backup_lba` and its
/// partition array. The backup's own alternate is not followed.
///
/// Never fails: problems are reported as [`BackupStatus::Degraded`].
pub fn verify_backup<IO: BlockIO + ?Sized>(primary: &GptHeader, io: &mut IO) -> BackupStatus {
    match check_backup(primary, io) {
        Ok(()) => {
            log::debug!("GPT: backup header at LBA {} verified", primary.backup_lba);
            BackupStatus::Verified
        }
        Err(e) => {
            log::warn!(
                "GPT: backup header at LBA {} degraded: {e}",
                primary.backup_lba
            );
            BackupStatus::Degraded(e)
        }
    }
}

fn check_backup<IO: BlockIO + ?Sized>(primary: &GptHeader, io: &mut IO) -> PartResult<()> {
    let mismatch =
        |field: &'static str| -> PartResult<()> { Err(GptError::BackupMismatch { field }.into()) };

    // would re-read the primary as its own backup
    if primary.backup_lba == primary.current_lba {
        return mismatch("alternate_lba");
    }

    let block_size = primary.block_size();
    io.seek_lba(primary.backup_lba, block_size)?;
    let backup = read_header(io, block_size)?;
    backup.validate_structure()?;

    if backup.current_lba != primary.backup_lba {
        return mismatch("my_lba");
    }
    if backup.backup_lba != primary.current_lba {
        return mismatch("alternate_lba");
    }
    if backup.disk_guid != primary.disk_guid {
        return mismatch("disk_guid");
    }
    if backup.first_usable_lba != primary.first_usable_lba
        || backup.last_usable_lba != primary.last_usable_lba
    {
        return mismatch("usable_lba_range");
    }
    if backup.num_entries != primary.num_entries || backup.entry_size != primary.entry_size {
        return mismatch("entry_geometry");
    }
    if backup.entries_crc32 != primary.entries_crc32 {
        return mismatch("entries_crc32");
    }
    if backup.entries_lba == primary.entries_lba {
        return mismatch("entries_lba");
    }

    // between the usable range and the backup header
    let blocks = backup.entries_blocks();
    if backup.entries_lba <= backup.last_usable_lba
        || backup.entries_lba.saturating_add(blocks) > backup.current_lba
    {
        return Err(GptError::EntryArrayOutOfRange {
            entries_lba: backup.entries_lba,
            blocks,
        }
        .into());
    }

    let found = stream_entries(&backup, backup.entries_lba, io, |_, _| Ok(()))?;
    if found != backup.entries_crc32 {
        return Err(GptError::ChecksumMismatch {
            region: CrcRegion::PartitionArray,
            expected: backup.entries_crc32,
            found,
        }
        .into());
    }
    Ok(())
}

/// Seeks to LBA 1, decodes and validates the primary header, then reads
/// the partition array.
pub fn read_gpt_with_block_size<IO: BlockIO + ?Sized>(
    io: &mut IO,
    block_size: u64,
) -> PartResult<(GptHeader, Vec<GptEntry>)> {
    check_block_size(block_size)?;
    io.seek_lba(GPT_PRIMARY_HEADER_LBA, block_size)?;
    let header = read_header(io, block_size)?;
    header.validate()?;
    let entries = read_partitions(&header, io)?;
    Ok((header, entries))
}

pub fn read_gpt<IO: BlockIO + ?Sized>(io: &mut IO) -> PartResult<(GptHeader, Vec<GptEntry>)> {
    read_gpt_with_block_size(io, crate::DEFAULT_BLOCK_SIZE)
}
