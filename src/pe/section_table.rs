//! The PE/COFF section table (spec §4.4).
//!
//! Each 40-byte record is read as-is; anomaly detection, sorting by virtual address, and
//! (optionally) Shannon entropy of the raw section bytes all happen in [`parse_sections`],
//! which [`crate::pe::header::CoffHeader::sections`] calls once per image.

use alloc::vec::Vec;
use scroll::{Pread, Pwrite, SizeWith};

use crate::error;
use crate::pe::anomaly::Anomaly;
use crate::pe::utils;

#[repr(C)]
#[derive(Debug, PartialEq, Copy, Clone, Default)]
#[derive(Pread, Pwrite, SizeWith)]
pub struct SectionTable {
    pub name: [u8; 8],
    pub virtual_size: u32,
    pub virtual_address: u32,
    pub size_of_raw_data: u32,
    pub pointer_to_raw_data: u32,
    pub pointer_to_relocations: u32,
    pub pointer_to_linenumbers: u32,
    pub number_of_relocations: u16,
    pub number_of_linenumbers: u16,
    pub characteristics: u32,
}

pub const SIZEOF_SECTION_TABLE: usize = 40;

/// Max virtual size/address a section may declare before it's flagged implausible (spec §4.4).
pub const MAX_PLAUSIBLE_SIZE: u32 = 256 * 1024 * 1024;

/// A single section accumulating this many anomalies stops the whole table from being parsed
/// further (spec §4.4).
const MAX_ANOMALIES_PER_SECTION: usize = 3;

impl SectionTable {
    pub fn parse(
        bytes: &[u8],
        offset: &mut usize,
        string_table_offset: usize,
    ) -> error::Result<Self> {
        let mut table: Self = bytes.gread_with(offset, scroll::LE)?;
        table.name = resolve_long_name(bytes, table.name, string_table_offset);
        Ok(table)
    }

    /// The section name, stripping trailing NULs.
    pub fn name(&self) -> error::Result<&str> {
        let nul = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.name.len());
        core::str::from_utf8(&self.name[..nul])
            .map_err(|_| error::Error::Malformed("section name is not valid UTF-8".into()))
    }

    /// Shannon entropy (spec §4.4) over the section's raw on-disk bytes, or `None` if the raw
    /// span is empty or lies outside the image.
    pub fn entropy(&self, bytes: &[u8]) -> Option<f64> {
        let start = self.pointer_to_raw_data as usize;
        let size = self.size_of_raw_data as usize;
        let data = bytes.get(start..start.checked_add(size)?)?;
        if data.is_empty() {
            return None;
        }
        let mut counts = [0u64; 256];
        for &b in data {
            counts[b as usize] += 1;
        }
        let len = data.len() as f64;
        let mut entropy = 0.0f64;
        for &count in counts.iter() {
            if count == 0 {
                continue;
            }
            let p = count as f64 / len;
            entropy -= p * p.log2();
        }
        Some(entropy)
    }

    /// The adjusted raw file pointer (spec §3 invariant 3: sub-`0x200` pointers round to 0).
    pub fn adjusted_pointer_to_raw_data(&self, file_alignment: u32) -> u32 {
        if self.pointer_to_raw_data < utils::MIN_FILE_ALIGNMENT {
            0
        } else {
            utils::adjust_file_alignment(self.pointer_to_raw_data, file_alignment)
        }
    }
}

/// A long name is `/` followed by a decimal byte offset into the COFF string table. We leave
/// the 8-byte field as-is (callers resolve through [`SectionTable::name`] or the string table
/// directly) but probe the offset so a malformed one doesn't surface as a panic downstream.
fn resolve_long_name(bytes: &[u8], raw_name: [u8; 8], string_table_offset: usize) -> [u8; 8] {
    if raw_name[0] != b'/' || string_table_offset == 0 {
        return raw_name;
    }
    let digits_end = raw_name[1..]
        .iter()
        .position(|&b| b == 0)
        .map(|p| p + 1)
        .unwrap_or(8);
    if let Ok(digits) = core::str::from_utf8(&raw_name[1..digits_end]) {
        if let Ok(offset) = digits.parse::<usize>() {
            let _ = bytes.pread::<&str>(string_table_offset + offset);
        }
    }
    raw_name
}

/// Parses the section table and records the derived anomalies/sorting from spec §4.4.
pub fn parse_sections(
    bytes: &[u8],
    offset: &mut usize,
    nsections: usize,
    string_table_offset: usize,
    image_size: usize,
    file_alignment: u32,
    anomalies: &mut Vec<Anomaly>,
) -> error::Result<Vec<SectionTable>> {
    let mut sections = Vec::with_capacity(nsections);
    for i in 0..nsections {
        let section = SectionTable::parse(bytes, offset, string_table_offset)?;
        let mut section_anomalies = 0usize;

        let is_zero_record = section.name == [0u8; 8]
            && section.virtual_size == 0
            && section.virtual_address == 0
            && section.size_of_raw_data == 0
            && section.pointer_to_raw_data == 0;
        if is_zero_record {
            anomalies.push(Anomaly::section(i, "zero section record"));
            section_anomalies += 1;
        }
        if (section.pointer_to_raw_data as u64 + section.size_of_raw_data as u64) > image_size as u64 {
            anomalies.push(Anomaly::section(
                i,
                format!(
                    "raw data span [{:#x}, {:#x}) exceeds image size {:#x}",
                    section.pointer_to_raw_data,
                    section.pointer_to_raw_data as u64 + section.size_of_raw_data as u64,
                    image_size
                ),
            ));
            section_anomalies += 1;
        }
        if section.adjusted_pointer_to_raw_data(file_alignment) as usize > image_size {
            anomalies.push(Anomaly::section(i, "adjusted raw pointer lies beyond image"));
            section_anomalies += 1;
        }
        if section.virtual_size > MAX_PLAUSIBLE_SIZE {
            anomalies.push(Anomaly::section(i, "virtual size exceeds 256 MiB"));
            section_anomalies += 1;
        }
        if utils::adjust_section_alignment(
            section.virtual_address,
            section.virtual_size.max(0x1000),
            file_alignment,
        ) > MAX_PLAUSIBLE_SIZE
        {
            anomalies.push(Anomaly::section(i, "adjusted virtual address exceeds 256 MiB"));
            section_anomalies += 1;
        }
        if file_alignment != 0 && section.pointer_to_raw_data % file_alignment != 0 {
            anomalies.push(Anomaly::section(i, "raw pointer is not a multiple of FileAlignment"));
            section_anomalies += 1;
        }

        sections.push(section);
        if section_anomalies >= MAX_ANOMALIES_PER_SECTION {
            break;
        }
    }
    sections.sort_by_key(|s| s.virtual_address);
    Ok(sections)
}

/// The overlay is the region of the file past the highest `pointerToRawData + sizeOfRawData`
/// across all sections (spec §4.4).
pub fn overlay_offset(sections: &[SectionTable]) -> Option<usize> {
    sections
        .iter()
        .map(|s| s.pointer_to_raw_data as usize + s.size_of_raw_data as usize)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(va: u32, raw_ptr: u32, raw_size: u32) -> SectionTable {
        SectionTable {
            name: *b".text\0\0\0",
            virtual_size: raw_size,
            virtual_address: va,
            size_of_raw_data: raw_size,
            pointer_to_raw_data: raw_ptr,
            pointer_to_relocations: 0,
            pointer_to_linenumbers: 0,
            number_of_relocations: 0,
            number_of_linenumbers: 0,
            characteristics: 0,
        }
    }

    #[test]
    fn overlay_offset_is_the_max_span_end() {
        let sections = vec![section(0x1000, 0x400, 0x200), section(0x2000, 0x200, 0x100)];
        assert_eq!(overlay_offset(&sections), Some(0x600));
    }

    #[test]
    fn entropy_of_varied_bytes_is_near_maximal() {
        let mut data = vec![0u8; 0x400];
        for (i, b) in data.iter_mut().enumerate() {
            *b = (i % 256) as u8;
        }
        let section = section(0x1000, 0, 0x400);
        let entropy = section.entropy(&data).unwrap();
        assert!(entropy > 7.9 && entropy <= 8.0);
    }

    #[test]
    fn name_strips_trailing_nuls() {
        let section = section(0, 0, 0);
        assert_eq!(section.name().unwrap(), ".text");
    }
}
