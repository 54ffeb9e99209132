//! The undocumented "Rich" linker footprint hidden in the DOS stub (spec §4.3).
//!
//! Grounded on [`crate::pe::authenticode`]'s range-exclusion style: compute a handful of byte
//! positions first, then operate on the slices between them, rather than threading a cursor
//! through a single linear decode.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::pe::anomaly::Anomaly;

const DANS_MAGIC: u32 = 0x536e_6144; // "DanS", read as a little-endian u32
const RICH_MAGIC: &[u8; 4] = b"Rich";

/// One decoded `(product_id, minor_cv)` / use-count pair from the rich header.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RichHeaderEntry {
    /// The linker/compiler tool's product id (upper 16 bits of the masked comp-id DWORD).
    pub product_id: u16,
    /// The tool's minor compiler version (lower 16 bits of the masked comp-id DWORD).
    pub minor_cv: u16,
    /// Number of objects built with this tool/version pair.
    pub count: u32,
}

/// The decoded rich header: the XOR key and the `(product_id, minor_cv, count)` triples it
/// encrypts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichHeader {
    pub entries: Vec<RichHeaderEntry>,
    /// The 32-bit XOR key recovered from the bytes immediately following `Rich`.
    pub xor_key: u32,
    /// Byte offset of the `DanS` sentinel.
    pub dans_offset: usize,
    /// Byte offset of the `Rich` sentinel.
    pub rich_offset: usize,
}

impl RichHeader {
    /// Searches `bytes[..e_lfanew]` for a `Rich` sentinel and, if found, decrypts the
    /// `DanS`-delimited run preceding it. Returns `None` if the image carries no rich header
    /// at all (common for managed-only binaries) -- this is not itself an anomaly.
    pub fn parse(bytes: &[u8], e_lfanew: usize, anomalies: &mut Vec<Anomaly>) -> Option<Self> {
        let dos_region = bytes.get(..e_lfanew)?;
        let rich_offset = find_subslice(dos_region, RICH_MAGIC)?;

        let xor_key = u32::from_le_bytes(bytes.get(rich_offset + 4..rich_offset + 8)?.try_into().ok()?);

        let mut cursor = rich_offset;
        let mut dans_offset = None;
        while cursor >= 4 {
            cursor -= 4;
            let word = u32::from_le_bytes(bytes.get(cursor..cursor + 4)?.try_into().ok()?);
            if word ^ xor_key == DANS_MAGIC {
                dans_offset = Some(cursor);
                break;
            }
        }
        let dans_offset = match dans_offset {
            Some(offset) => offset,
            None => {
                anomalies.push(Anomaly::DansSigNotFound);
                return None;
            }
        };

        if dans_offset % 4 != 0 {
            anomalies.push(Anomaly::DanSMagicOffset);
        }

        for i in 0..3 {
            let start = dans_offset + 4 + i * 4;
            let word = match bytes.get(start..start + 4).and_then(|s| s.try_into().ok()) {
                Some(b) => u32::from_le_bytes(b),
                None => break,
            };
            if word ^ xor_key != 0 {
                anomalies.push(Anomaly::PaddingDwordNotZero);
                break;
            }
        }

        let mut entries = Vec::new();
        let mut offset = dans_offset + 16;
        while offset + 8 <= rich_offset {
            let comp_id = u32::from_le_bytes(bytes[offset..offset + 4].try_into().ok()?) ^ xor_key;
            let count = u32::from_le_bytes(bytes[offset + 4..offset + 8].try_into().ok()?) ^ xor_key;
            entries.push(RichHeaderEntry {
                product_id: (comp_id >> 16) as u16,
                minor_cv: comp_id as u16,
                count,
            });
            offset += 8;
        }

        let header = RichHeader {
            entries,
            xor_key,
            dans_offset,
            rich_offset,
        };

        if header.checksum(bytes) != Some(xor_key) {
            anomalies.push(Anomaly::InvalidRichHeaderChecksum);
        }

        Some(header)
    }

    /// Recomputes the rich-header checksum from the DOS header and the decrypted entries, per
    /// spec §4.14. Returns `None` if `bytes` is too short to contain the DOS header this
    /// header was parsed from.
    pub fn checksum(&self, bytes: &[u8]) -> Option<u32> {
        let mut checksum = self.dans_offset as u32;
        for (i, byte) in bytes.get(..self.dans_offset)?.iter().enumerate() {
            if i == 0x3c || i == 0x3d || i == 0x3e || i == 0x3f {
                // `e_lfanew` itself is excluded from the running checksum.
                continue;
            }
            checksum = checksum.wrapping_add((*byte as u32).rotate_left(i as u32 % 32));
        }
        for entry in &self.entries {
            let comp_id = ((entry.product_id as u32) << 16) | entry.minor_cv as u32;
            checksum = checksum.wrapping_add(comp_id.rotate_left(entry.count % 32));
        }
        Some(checksum)
    }

    /// MD5 of the raw (still-encrypted) rich header bytes from `DanS` up to (not including)
    /// `Rich`, after XOR-decrypting with [`Self::xor_key`] (spec §4.14).
    pub fn hash(&self, bytes: &[u8]) -> Option<String> {
        let raw = bytes.get(self.dans_offset..self.rich_offset)?;
        let mut decrypted = Vec::with_capacity(raw.len());
        for chunk in raw.chunks(4) {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            let decoded = u32::from_le_bytes(word) ^ self.xor_key;
            decrypted.extend_from_slice(&decoded.to_le_bytes()[..chunk.len()]);
        }
        let digest = md5::compute(&decrypted);
        Some(format!("{:x}", digest))
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8; 4]) -> Option<usize> {
    haystack.windows(4).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_fixture() -> Vec<u8> {
        let xor_key = 0xDEAD_BEEFu32;
        let mut bytes = alloc::vec![0u8; 0x80];
        let dans_offset = 0x20;
        bytes[dans_offset..dans_offset + 4]
            .copy_from_slice(&(DANS_MAGIC ^ xor_key).to_le_bytes());
        for i in 0..3 {
            let start = dans_offset + 4 + i * 4;
            bytes[start..start + 4].copy_from_slice(&(0u32 ^ xor_key).to_le_bytes());
        }
        let entry_start = dans_offset + 16;
        let comp_id = (0x0105u32 << 16) | 0x1234;
        bytes[entry_start..entry_start + 4].copy_from_slice(&(comp_id ^ xor_key).to_le_bytes());
        bytes[entry_start + 4..entry_start + 8].copy_from_slice(&(7u32 ^ xor_key).to_le_bytes());
        let rich_offset = entry_start + 8;
        bytes[rich_offset..rich_offset + 4].copy_from_slice(RICH_MAGIC);
        bytes[rich_offset + 4..rich_offset + 8].copy_from_slice(&xor_key.to_le_bytes());
        bytes
    }

    #[test]
    fn decodes_single_entry() {
        let bytes = build_fixture();
        let mut anomalies = Vec::new();
        let header = RichHeader::parse(&bytes, 0x40, &mut anomalies).expect("rich header present");
        assert_eq!(header.entries.len(), 1);
        assert_eq!(header.entries[0].product_id, 0x0105);
        assert_eq!(header.entries[0].minor_cv, 0x1234);
        assert_eq!(header.entries[0].count, 7);
        assert!(!anomalies.contains(&Anomaly::PaddingDwordNotZero));
    }

    #[test]
    fn absent_rich_header_returns_none() {
        let bytes = alloc::vec![0u8; 0x40];
        let mut anomalies = Vec::new();
        assert!(RichHeader::parse(&bytes, 0x3c, &mut anomalies).is_none());
        assert!(anomalies.is_empty());
    }
}
