// SPDX-License-Identifier: MIT

use bitflags::bitflags;

bitflags! {
    /// GPT partition attribute bits.
    ///
    /// Bits 3-47 are reserved, bits 48-63 belong to the partition type.
    /// Unknown bits are kept as-is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GptAttributes: u64 {
        /// Required for the platform to function ("system" partition).
        const REQUIRED_PARTITION = 1 << 0;
        /// Firmware must not produce a block I/O protocol for it.
        const NO_BLOCK_IO_PROTOCOL = 1 << 1;
        /// Legacy BIOS bootable.
        const LEGACY_BIOS_BOOTABLE = 1 << 2;

        const _ = !0;
    }
}

/// Display names of the defined attribute bits.
pub static ATTRIBUTE_NAMES: [(GptAttributes, &str); 3] = [
    (GptAttributes::REQUIRED_PARTITION, "system"),
    (GptAttributes::NO_BLOCK_IO_PROTOCOL, "no-block-io"),
    (GptAttributes::LEGACY_BIOS_BOOTABLE, "legacy-bios-bootable"),
];

/// Mask of the type-specific bits 48-63.
pub const TYPE_SPECIFIC_MASK: u64 = 0xFFFF_0000_0000_0000;

impl GptAttributes {
    /// Names of the defined bits that are set, in bit order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        ATTRIBUTE_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
    }

    /// Bits 48-63, shifted down.
    #[inline]
    pub fn type_specific(&self) -> u16 {
        ((self.bits() & TYPE_SPECIFIC_MASK) >> 48) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn names_in_bit_order() {
        let a = GptAttributes::from_bits_retain(0b101);
        let names: Vec<_> = a.names().collect();
        assert_eq!(names, ["system", "legacy-bios-bootable"]);
    }

    #[test]
    fn keeps_unknown_and_type_specific_bits() {
        let raw = 0x8000_0000_0000_0002u64 | (1 << 20);
        let a = GptAttributes::from_bits_retain(raw);
        assert_eq!(a.bits(), raw);
        assert!(a.contains(GptAttributes::NO_BLOCK_IO_PROTOCOL));
        assert_eq!(a.type_specific(), 0x8000);
        assert_eq!(a.names().count(), 1);
    }
}
