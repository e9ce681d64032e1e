// SPDX-License-Identifier: MIT

use std::io::{Seek, SeekFrom, Write};

use gptio::prelude::*;
use gptpart::gpt::{self, GPT_ENTRY_SIZE, GptEntry, GptHeader};
use gptpart::guids;
use gptpart::{BackupStatus, GptError, Guid, PartError, ScanOptions, scan_disk};

/// Disk image with a protective MBR, both headers and both arrays.
fn build_image(block: u64, total: u64, entries: &[GptEntry]) -> Vec<u8> {
    let bs = block as usize;
    let num_entries = 128usize;
    let array_blocks = (num_entries * GPT_ENTRY_SIZE) as u64 / block;
    let last = total - 1;
    let crc = gpt::compute_entries_crc32(entries, num_entries, GPT_ENTRY_SIZE);

    let header = |current: u64, backup: u64, entries_lba: u64| {
        let mut h = GptHeader {
            signature: *gpt::GPT_SIGNATURE,
            revision: gpt::GPT_REVISION,
            header_size: gpt::GPT_HEADER_SIZE as u32,
            header_crc32: 0,
            reserved: 0,
            current_lba: current,
            backup_lba: backup,
            first_usable_lba: 2 + array_blocks,
            last_usable_lba: last - 1 - array_blocks,
            disk_guid: "5A2B96F5-2E0C-4B3A-9D1E-6F7A8B9C0D1E".parse().unwrap(),
            entries_lba,
            num_entries: num_entries as u32,
            entry_size: GPT_ENTRY_SIZE as u32,
            entries_crc32: crc,
            padding: vec![0u8; bs - gpt::GPT_HEADER_SIZE],
        };
        h.header_crc32 = h.compute_header_crc32();
        h.to_block()
    };

    let mut array = vec![0u8; num_entries * GPT_ENTRY_SIZE];
    for (i, e) in entries.iter().enumerate() {
        array[i * GPT_ENTRY_SIZE..(i + 1) * GPT_ENTRY_SIZE].copy_from_slice(&e.to_bytes());
    }

    let mut img = vec![0u8; bs * total as usize];
    img[446 + 4] = 0xEE;
    img[446 + 8..446 + 12].copy_from_slice(&1u32.to_le_bytes());
    img[446 + 12..446 + 16].copy_from_slice(&(last as u32).to_le_bytes());
    img[510] = 0x55;
    img[511] = 0xAA;

    let backup_array = (last - array_blocks) as usize * bs;
    img[bs..2 * bs].copy_from_slice(&header(1, last, 2));
    img[2 * bs..2 * bs + array.len()].copy_from_slice(&array);
    img[backup_array..backup_array + array.len()].copy_from_slice(&array);
    img[last as usize * bs..].copy_from_slice(&header(last, 1, last - array_blocks));
    img
}

fn sample_entries() -> Vec<GptEntry> {
    vec![
        GptEntry::new(
            guids::GPT_PARTITION_TYPE_ESP,
            Guid::from_bytes([0x11; 16]),
            256,
            511,
            0,
            "EFI system",
        ),
        GptEntry::default(),
        GptEntry::new(
            guids::GPT_PARTITION_TYPE_LINUX_FS,
            Guid::from_bytes([0x22; 16]),
            512,
            1000,
            0,
            "root",
        ),
    ]
}

#[test]
fn scan_4k_image_from_file() {
    let img = build_image(4096, 1024, &sample_entries());

    let mut file = tempfile::tempfile().unwrap();
    file.write_all(&img).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let mut io = StdBlockIO::new(&mut file).unwrap();
    let info = scan_disk(&mut io, ScanOptions::new().with_block_size(4096)).unwrap();

    assert_eq!(info.block_size, 4096);
    assert_eq!(info.backup, BackupStatus::Verified);
    assert_eq!(
        info.header.disk_guid.to_string(),
        "5A2B96F5-2E0C-4B3A-9D1E-6F7A8B9C0D1E"
    );

    let listed: Vec<_> = info
        .partitions
        .iter()
        .map(|p| (p.index, p.kind.to_string(), p.name.as_str(), p.size_blocks))
        .collect();
    assert_eq!(
        listed,
        [
            (0, "EFI System Partition".to_string(), "EFI system", 255),
            (2, "Linux Filesystem".to_string(), "root", 488),
        ]
    );
}

#[test]
fn wrong_block_size_is_rejected() {
    let img = build_image(4096, 1024, &sample_entries());
    let mut io = MemBlockIO::new(&img);
    // at 512 bytes LBA 1 is inside the zeroed tail of the MBR block
    assert!(matches!(
        scan_disk(&mut io, ScanOptions::default()),
        Err(PartError::Gpt(GptError::BadSignature { .. }))
    ));
}

#[test]
fn corrupted_backup_is_reported_not_fatal() {
    let mut img = build_image(512, 8192, &sample_entries());
    // one byte of the backup array
    let backup_array = (8191 - 32) * 512;
    img[backup_array + 60] ^= 0x01;

    let mut io = MemBlockIO::new(&img);
    let info = scan_disk(&mut io, ScanOptions::default()).unwrap();

    assert_eq!(info.partitions.len(), 2);
    match info.backup {
        BackupStatus::Degraded(PartError::Gpt(GptError::ChecksumMismatch { .. })) => {}
        other => panic!("unexpected backup status: {other:?}"),
    }
}

#[test]
fn corrupted_primary_array_is_fatal() {
    let mut img = build_image(512, 8192, &sample_entries());
    img[2 * 512 + 60] ^= 0x01;

    let mut io = MemBlockIO::new(&img);
    let err = scan_disk(&mut io, ScanOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        PartError::Gpt(GptError::ChecksumMismatch { .. })
    ));
    assert!(err.to_string().contains("partition entry array"));
}

#[test]
fn truncated_device() {
    let img = build_image(512, 8192, &sample_entries());
    // header present, partition array cut short
    let mut io = MemBlockIO::new(&img[..512 * 10]);
    assert_eq!(
        scan_disk(&mut io, ScanOptions::default()).unwrap_err(),
        PartError::Gpt(GptError::TruncatedRead { needed: 512 })
    );
}
