// SPDX-License-Identifier: MIT

//! Well-known partition type GUIDs.
//!
//! The table is not exhaustive: types missing here are reported by their
//! canonical GUID string, which is not an error.

use alloc::string::{String, ToString};

use crate::guid::Guid;

define_partition_types! {
    Unused => "Unused", (0x00000000, 0x0000, 0x0000, [0x00, 0x00], [0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
    Esp => "EFI System Partition", (0xC12A7328, 0xF81F, 0x11D2, [0xBA, 0x4B], [0x00, 0xA0, 0xC9, 0x3E, 0xC9, 0x3B]),
    BiosBoot => "BIOS Boot Partition", (0x21686148, 0x6449, 0x6E6F, [0x74, 0x4E], [0x65, 0x65, 0x64, 0x45, 0x46, 0x49]),
    LinuxFs => "Linux Filesystem", (0x0FC63DAF, 0x8483, 0x4772, [0x8E, 0x79], [0x3D, 0x69, 0xD8, 0x47, 0x7D, 0xE4]),
    LinuxSwap => "Linux Swap", (0x0657FD6D, 0xA4AB, 0x43C4, [0x84, 0xE5], [0x09, 0x33, 0xC8, 0x4B, 0x4F, 0x4F]),
    LinuxRootX64 => "Linux Root (x86-64)", (0x4F68BCE3, 0xE8CD, 0x4DB1, [0x96, 0xE7], [0xFB, 0xCA, 0xF9, 0x84, 0xB7, 0x09]),
    LinuxHome => "Linux /home", (0x933AC7E1, 0x2EB4, 0x4F13, [0xB8, 0x44], [0x0E, 0x14, 0xE2, 0xAE, 0xF9, 0x15]),
    LinuxLvm => "Linux LVM", (0xE6D6D379, 0xF507, 0x44C2, [0xA2, 0x3C], [0x23, 0x8F, 0x2A, 0x3D, 0xF9, 0x28]),
    LinuxRaid => "Linux RAID", (0xA19D880F, 0x05FC, 0x4D3B, [0xA0, 0x06], [0x74, 0x3F, 0x0F, 0x84, 0x91, 0x1E]),
    MsBasicData => "Microsoft Basic Data", (0xEBD0A0A2, 0xB9E5, 0x4433, [0x87, 0xC0], [0x68, 0xB6, 0xB7, 0x26, 0x99, 0xC7]),
    MsReserved => "Microsoft Reserved", (0xE3C9E316, 0x0B5C, 0x4DB8, [0x81, 0x7D], [0xF9, 0x2D, 0xF0, 0x02, 0x15, 0xAE]),
    FreebsdUfs => "FreeBSD UFS", (0x516E7CB6, 0x6ECF, 0x11D6, [0x8F, 0xF8], [0x00, 0x02, 0x2D, 0x09, 0x71, 0x2B]),
    DragonflyUfs1 => "DragonFly UFS1", (0x9D94CE7C, 0x1CA5, 0x11DC, [0x88, 0x17], [0x01, 0x30, 0x1B, 0xB8, 0xA9, 0xF5]),
    OpenBsd => "OpenBSD", (0x824CC7A0, 0x36A8, 0x11E3, [0x89, 0x0A], [0x95, 0x25, 0x19, 0xAD, 0x3F, 0x61]),
    Plan9 => "Plan 9", (0xC91818F9, 0x8025, 0x47AF, [0x89, 0xD2], [0xF0, 0x30, 0xD7, 0x00, 0x0C, 0x2C]),
    AppleHfs => "Apple HFS+", (0x48465300, 0x0000, 0x11AA, [0xAA, 0x11], [0x00, 0x30, 0x65, 0x43, 0xEC, 0xAC]),
}

/// Human readable label for a partition type GUID, or its canonical
/// string when the type is not in the table.
pub fn classify(guid: &Guid) -> String {
    GptPartitionKind::from_guid(guid).to_string()
}
