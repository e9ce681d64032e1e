// SPDX-License-Identifier: MIT

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use gptio::prelude::*;

use crate::{
    DEFAULT_BLOCK_SIZE,
    attrs::GptAttributes,
    errors::*,
    gpt::{self, BackupStatus, GptEntry, GptHeader},
    guid::Guid,
    guids::GptPartitionKind,
    mbr::{self, MbrKind},
};

/// Disk scan options
#[derive(Clone, Copy, Debug)]
pub struct ScanOptions {
    /// Logical block size in bytes
    pub block_size: u64,
    /// Read and check the backup header and its partition array
    pub verify_backup: bool,
    /// Check partition ranges (usable LBA range, overlaps)
    pub validate_bounds: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            verify_backup: true,
            validate_bounds: true,
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block_size(mut self, block_size: u64) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn no_backup(mut self) -> Self {
        self.verify_backup = false;
        self
    }

    pub fn no_bounds(mut self) -> Self {
        self.validate_bounds = false;
        self
    }
}

/// One partition in use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionInfo {
    /// Slot index in the partition array
    pub index: usize,
    pub kind: GptPartitionKind,
    pub unique_guid: Guid,
    pub start_lba: u64,
    pub end_lba: u64,
    /// `end_lba - start_lba`
    pub size_blocks: u64,
    pub attributes: GptAttributes,
    pub name: String,
}

impl PartitionInfo {
    fn from_entry(index: usize, e: &GptEntry) -> PartResult<Self> {
        let size_blocks = e
            .size()
            .ok_or(GptError::EntryRangeInverted { index })?;
        Ok(Self {
            index,
            kind: e.kind(),
            unique_guid: e.unique_guid,
            start_lba: e.start_lba,
            end_lba: e.end_lba,
            size_blocks,
            attributes: e.attributes(),
            name: e.name(),
        })
    }
}

/// Scan result
#[derive(Debug, Clone)]
pub struct DiskInfo {
    pub mbr_kind: MbrKind,
    pub block_size: u64,
    pub header: GptHeader,
    pub backup: BackupStatus,
    pub partitions: Vec<PartitionInfo>,
}

/// Reads LBA 0, the primary GPT and its partitions, then (optionally) the
/// backup copy. A damaged backup does not fail the scan.
pub fn scan_disk<IO: BlockIO + ?Sized>(io: &mut IO, opts: ScanOptions) -> PartResult<DiskInfo> {
    let mbr_kind = mbr::read_mbr(io, opts.block_size)?.kind();
    if mbr_kind != MbrKind::Protective {
        log::warn!("GPT: no protective MBR at LBA 0 ({mbr_kind}), reading GPT anyway");
    }

    let (header, entries) = gpt::read_gpt_with_block_size(io, opts.block_size)?;
    if opts.validate_bounds {
        header.validate_entries(&entries)?;
    }

    let backup = if opts.verify_backup {
        gpt::verify_backup(&header, io)
    } else {
        BackupStatus::Skipped
    };

    let partitions = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.is_empty())
        .map(|(i, e)| PartitionInfo::from_entry(i, e))
        .collect::<PartResult<Vec<_>>>()?;

    log::info!(
        "GPT: disk {} • {} partition(s) • backup {}",
        header.disk_guid,
        partitions.len(),
        match &backup {
            BackupStatus::Verified => "ok",
            BackupStatus::Degraded(_) => "degraded",
            BackupStatus::Skipped => "skipped",
        }
    );

    Ok(DiskInfo {
        mbr_kind,
        block_size: opts.block_size,
        header,
        backup,
        partitions,
    })
}

impl core::fmt::Display for DiskInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let backup = match &self.backup {
            BackupStatus::Verified => String::from("verified"),
            BackupStatus::Degraded(e) => format!("degraded ({e})"),
            BackupStatus::Skipped => String::from("not checked"),
        };

        writeln!(
            f,
            "Disk layout • block: {} • MBR: {} • disk GUID: {}",
            sep_u64(self.block_size),
            self.mbr_kind,
            self.header.disk_guid,
        )?;
        writeln!(
            f,
            "  usable LBA {}..{} • {} slot(s) × {} bytes • backup: {}",
            sep_u64(self.header.first_usable_lba),
            sep_u64(self.header.last_usable_lba),
            self.header.num_entries,
            self.header.entry_size,
            backup,
        )?;

        writeln!(
            f,
            "  ┌─────┬──────────────────────────────┬──────────────────────────────┬────────────┬────────────┬───────────────┐"
        )?;
        writeln!(
            f,
            "  | Idx | Name                         | Type                         | Start LBA  | End LBA    | Size          |"
        )?;
        writeln!(
            f,
            "  ├─────┼──────────────────────────────┼──────────────────────────────┼────────────┼────────────┼───────────────┤"
        )?;

        for p in &self.partitions {
            writeln!(
                f,
                "  | {:>3} | {:<28} | {:<28} | {:>10} | {:>10} | {:>13} |",
                p.index,
                truncate(&p.name, 28),
                truncate(&p.kind.to_string(), 28),
                sep_u64(p.start_lba),
                sep_u64(p.end_lba),
                pretty_bytes(p.size_blocks.saturating_mul(self.block_size)),
            )?;
        }

        writeln!(
            f,
            "  └─────┴──────────────────────────────┴──────────────────────────────┴────────────┴────────────┴───────────────┘"
        )
    }
}

// Cuts on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

fn pretty_bytes(n: u64) -> String {
    const UNITS: [&str; 7] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
    let mut val = n as f64;
    let mut idx = 0usize;
    while val >= 1024.0 && idx + 1 < UNITS.len() {
        val /= 1024.0;
        idx += 1;
    }
    if idx == 0 {
        format!("{} {}", sep_u64(n), UNITS[idx])
    } else {
        format!("{:.1} {}", val, UNITS[idx])
    }
}

// 12345678 -> "12 345 678"
fn sep_u64(mut n: u64) -> String {
    if n < 1_000 {
        return n.to_string();
    }
    let mut parts: Vec<String> = Vec::new();
    while n >= 1_000 {
        parts.push(format!("{:03}", n % 1_000));
        n /= 1_000;
    }
    parts.push(n.to_string());
    parts.reverse();
    parts.join(" ")
}
