// SPDX-License-Identifier: MIT

use core::fmt;
use core::str::FromStr;

/// A mixed-endian RFC 4122 GUID as stored on disk.
///
/// The first three fields are little-endian on disk, the clock sequence
/// and node bytes are stored as-is.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Guid {
    pub time_low: u32,
    pub time_mid: u16,
    pub time_hi_and_version: u16,
    pub clock_seq_hi_and_reserved: u8,
    pub clock_seq_low: u8,
    pub node: [u8; 6],
}

impl Guid {
    /// Nil GUID, marks an unused partition slot.
    pub const ZERO: Guid = Guid::from_bytes([0u8; 16]);

    pub const fn from_fields(
        time_low: u32,
        time_mid: u16,
        time_hi_and_version: u16,
        clock_seq: [u8; 2],
        node: [u8; 6],
    ) -> Self {
        Self {
            time_low,
            time_mid,
            time_hi_and_version,
            clock_seq_hi_and_reserved: clock_seq[0],
            clock_seq_low: clock_seq[1],
            node,
        }
    }

    pub const fn from_bytes(b: [u8; 16]) -> Self {
        Self {
            time_low: u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            time_mid: u16::from_le_bytes([b[4], b[5]]),
            time_hi_and_version: u16::from_le_bytes([b[6], b[7]]),
            clock_seq_hi_and_reserved: b[8],
            clock_seq_low: b[9],
            node: [b[10], b[11], b[12], b[13], b[14], b[15]],
        }
    }

    pub fn to_bytes(&self) -> [u8; 16] {
        let mut b = [0u8; 16];
        b[0..4].copy_from_slice(&self.time_low.to_le_bytes());
        b[4..6].copy_from_slice(&self.time_mid.to_le_bytes());
        b[6..8].copy_from_slice(&self.time_hi_and_version.to_le_bytes());
        b[8] = self.clock_seq_hi_and_reserved;
        b[9] = self.clock_seq_low;
        b[10..16].copy_from_slice(&self.node);
        b
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl From<[u8; 16]> for Guid {
    #[inline]
    fn from(b: [u8; 16]) -> Self {
        Self::from_bytes(b)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-",
            self.time_low,
            self.time_mid,
            self.time_hi_and_version,
            self.clock_seq_hi_and_reserved,
            self.clock_seq_low
        )?;
        for b in self.node {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({self})")
    }
}

/// Error returned when a string is not a canonical GUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseGuidError;

impl fmt::Display for ParseGuidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid GUID string")
    }
}

impl core::error::Error for ParseGuidError {}

fn hex_nibble(c: u8) -> Result<u8, ParseGuidError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(ParseGuidError),
    }
}

impl FromStr for Guid {
    type Err = ParseGuidError;

    /// Parses `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.as_bytes();
        if s.len() != 36 {
            return Err(ParseGuidError);
        }
        // big-endian digits in text order, dashes skipped
        let mut raw = [0u8; 16];
        let mut n = 0;
        let mut i = 0;
        while i < s.len() {
            if matches!(i, 8 | 13 | 18 | 23) {
                if s[i] != b'-' {
                    return Err(ParseGuidError);
                }
                i += 1;
                continue;
            }
            raw[n] = (hex_nibble(s[i])? << 4) | hex_nibble(s[i + 1])?;
            n += 1;
            i += 2;
        }

        Ok(Self::from_fields(
            u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]),
            u16::from_be_bytes([raw[4], raw[5]]),
            u16::from_be_bytes([raw[6], raw[7]]),
            [raw[8], raw[9]],
            [raw[10], raw[11], raw[12], raw[13], raw[14], raw[15]],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    // EFI System Partition, as it sits on disk
    const ESP_BYTES: [u8; 16] = [
        0x28, 0x73, 0x2A, 0xC1, 0x1F, 0xF8, 0xD2, 0x11, 0xBA, 0x4B, 0x00, 0xA0, 0xC9, 0x3E, 0xC9,
        0x3B,
    ];

    #[test]
    fn decode_mixed_endian_fields() {
        let g = Guid::from_bytes(ESP_BYTES);
        assert_eq!(g.time_low, 0xC12A7328);
        assert_eq!(g.time_mid, 0xF81F);
        assert_eq!(g.time_hi_and_version, 0x11D2);
        assert_eq!(g.clock_seq_hi_and_reserved, 0xBA);
        assert_eq!(g.clock_seq_low, 0x4B);
        assert_eq!(g.node, [0x00, 0xA0, 0xC9, 0x3E, 0xC9, 0x3B]);
        assert_eq!(g.to_bytes(), ESP_BYTES);
    }

    #[test]
    fn canonical_string() {
        let g = Guid::from_bytes(ESP_BYTES);
        assert_eq!(g.to_string(), "C12A7328-F81F-11D2-BA4B-00A0C93EC93B");
    }

    #[test]
    fn zero_guid_string() {
        let s = Guid::ZERO.to_string();
        assert_eq!(s, "00000000-0000-0000-0000-000000000000");
        assert_eq!(s.len(), 36);
        assert!(Guid::ZERO.is_zero());
    }

    #[test]
    fn roundtrip_arbitrary_bytes() {
        for seed in [0u8, 0x01, 0x7F, 0x80, 0xFE] {
            let mut b = [0u8; 16];
            for (i, v) in b.iter_mut().enumerate() {
                *v = seed.wrapping_mul(31).wrapping_add(i as u8 * 17);
            }
            assert_eq!(Guid::from_bytes(b).to_bytes(), b);
        }
    }

    #[test]
    fn parse_canonical_string() {
        let g: Guid = "c12a7328-f81f-11d2-ba4b-00a0c93ec93b".parse().unwrap();
        assert_eq!(g.to_bytes(), ESP_BYTES);
        assert_eq!(
            g.to_string().parse::<Guid>().unwrap(),
            Guid::from_bytes(ESP_BYTES)
        );

        assert!("C12A7328F81F11D2BA4B00A0C93EC93B".parse::<Guid>().is_err());
        assert!("C12A7328-F81F-11D2-BA4B-00A0C93EC93G".parse::<Guid>().is_err());
        assert!("C12A7328-F81F-11D2+BA4B-00A0C93EC93B".parse::<Guid>().is_err());
    }
}
