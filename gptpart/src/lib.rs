// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[macro_use]
mod macros;
mod io_ext;

#[cfg(test)]
mod testutil;

/// Partition attribute flags.
pub mod attrs;
pub mod errors;
/// GUID Partition Table (GPT) decoding and validation.
pub mod gpt;
pub mod guid;
/// Common Partition Type GUIDs.
pub mod guids;
/// Master Boot Record (MBR) detection.
pub mod mbr;
pub mod scanner;

pub use errors::{GptError, PartError, PartResult};
pub use gpt::{
    BackupStatus, GptEntry, GptHeader, read_gpt, read_gpt_with_block_size, read_header,
    read_partitions, verify_backup,
};
pub use guid::Guid;
pub use io_ext::BlockIOLbaExt;
pub use scanner::{DiskInfo, PartitionInfo, ScanOptions, scan_disk};

pub const DEFAULT_BLOCK_SIZE: u64 = 512;
