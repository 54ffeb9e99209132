//! The classic base relocation directory (spec §4.10).
//!
//! Distinct from [`crate::pe::dynreloc`], which covers the newer Dynamic Value Relocation
//! Table reachable through Load Config; this module is the original
//! `IMAGE_DIRECTORY_ENTRY_BASERELOC` blocked-entry format every PE loader has understood since
//! Windows NT.

use alloc::vec::Vec;
use scroll::Pread;

use crate::error;
use crate::pe::data_directories::DataDirectory;
use crate::pe::options::ParseOptions;
use crate::pe::section_table::SectionTable;
use crate::pe::utils;

/// The base relocation is skipped; used as a padding entry.
pub const IMAGE_REL_BASED_ABSOLUTE: u8 = 0;
/// The base relocation adds the high 16 bits of the difference to the 16-bit field.
pub const IMAGE_REL_BASED_HIGH: u8 = 1;
/// The base relocation adds the low 16 bits of the difference to the 16-bit field.
pub const IMAGE_REL_BASED_LOW: u8 = 2;
/// The base relocation applies all 32 bits of the difference to the 32-bit field.
pub const IMAGE_REL_BASED_HIGHLOW: u8 = 3;
/// The base relocation adds the high 16 bits of the difference and adjusts for sign extension.
pub const IMAGE_REL_BASED_HIGHADJ: u8 = 4;
/// MIPS: the base relocation applies to a `JMP` instruction.
pub const IMAGE_REL_BASED_MIPS_JMPADDR: u8 = 5;
/// ARM: the base relocation applies to a `MOVW`/`MOVT` instruction pair.
pub const IMAGE_REL_BASED_ARM_MOV32: u8 = 5;
/// RISC-V: the base relocation applies to the high 20 bits of a 32-bit absolute address.
pub const IMAGE_REL_BASED_RISCV_HIGH20: u8 = 5;
/// Reserved, must be zero.
pub const IMAGE_REL_BASED_RESERVED: u8 = 6;
/// Thumb: the base relocation applies to a `MOVW`/`MOVT` instruction pair.
pub const IMAGE_REL_BASED_THUMB_MOV32: u8 = 7;
/// RISC-V: the base relocation applies to the low 12 bits of a 32-bit absolute address (I-type).
pub const IMAGE_REL_BASED_RISCV_LOW12I: u8 = 7;
/// RISC-V: the base relocation applies to the low 12 bits of a 32-bit absolute address (S-type).
pub const IMAGE_REL_BASED_RISCV_LOW12S: u8 = 8;
/// MIPS16: the base relocation applies to a `JMP` instruction.
pub const IMAGE_REL_BASED_MIPS_JMPADDR16: u8 = 9;
/// The base relocation applies the difference to the 64-bit field at offset.
pub const IMAGE_REL_BASED_DIR64: u8 = 10;

/// A single packed base-relocation word: `{type:4, offset:12}`, high nibble first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RelocationWord {
    pub value: u16,
}

impl RelocationWord {
    /// One of the `IMAGE_REL_BASED_*` constants, or an unrecognized numeric code.
    pub fn reloc_type(&self) -> u8 {
        (self.value >> 12) as u8
    }

    /// The 12-bit offset from the block's `virtual_address`.
    pub fn page_offset(&self) -> u16 {
        self.value & 0x0FFF
    }
}

/// One decoded entry of a [`RelocationBlock`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RelocationEntry {
    /// One of the `IMAGE_REL_BASED_*` constants, or an unrecognized numeric code preserved
    /// as-is (spec §4.10: "Types beyond the known set are preserved with their numeric code").
    pub typ: u8,
    /// The 12-bit offset from the block's `virtual_address`.
    pub offset: u16,
}

/// A single base-relocation block: a page `virtual_address` plus its packed entries.
#[derive(Debug, Clone, Default)]
pub struct RelocationBlock {
    pub virtual_address: u32,
    pub entries: Vec<RelocationEntry>,
}

/// The parsed base-relocation directory: a sequence of blocks until the directory size is
/// exhausted or a zero-sized block terminates early.
#[derive(Debug, Clone, Default)]
pub struct RelocationData {
    pub blocks: Vec<RelocationBlock>,
}

impl RelocationData {
    pub fn parse(
        bytes: &[u8],
        dd: &DataDirectory,
        sections: &[SectionTable],
        section_alignment: u32,
        file_alignment: u32,
        size_of_image: u64,
    ) -> error::Result<Self> {
        Self::parse_with_opts(
            bytes,
            dd,
            sections,
            section_alignment,
            file_alignment,
            size_of_image,
            &ParseOptions::default(),
        )
    }

    pub fn parse_with_opts(
        bytes: &[u8],
        dd: &DataDirectory,
        sections: &[SectionTable],
        section_alignment: u32,
        file_alignment: u32,
        size_of_image: u64,
        opts: &ParseOptions,
    ) -> error::Result<Self> {
        let mut offset = utils::find_offset(
            dd.virtual_address as usize,
            sections,
            section_alignment,
            file_alignment,
            bytes.len(),
            opts,
        )
        .ok_or(error::Error::OutsideBoundary)?;
        let end = offset + dd.size as usize;

        let mut blocks = Vec::new();
        let mut total_entries: u32 = 0;
        'blocks: while offset < end {
            let virtual_address: u32 = bytes.gread_with(&mut offset, scroll::LE)?;
            let size_of_block: u32 = bytes.gread_with(&mut offset, scroll::LE)?;
            if size_of_block == 0 {
                break;
            }
            if virtual_address as u64 > size_of_image {
                return Err(error::Error::InvalidBaseRelocVA);
            }
            if size_of_block as u64 > size_of_image {
                return Err(error::Error::InvalidBaseRelocBlockSize);
            }

            let entry_count = (size_of_block as usize).saturating_sub(8) / 2;
            let mut entries = Vec::with_capacity(entry_count);
            for _ in 0..entry_count {
                if total_entries >= opts.max_reloc_entries_count {
                    blocks.push(RelocationBlock {
                        virtual_address,
                        entries,
                    });
                    break 'blocks;
                }
                total_entries += 1;
                let word: u16 = bytes.gread_with(&mut offset, scroll::LE)?;
                let word = RelocationWord { value: word };
                entries.push(RelocationEntry {
                    typ: word.reloc_type(),
                    offset: word.page_offset(),
                });
            }
            blocks.push(RelocationBlock {
                virtual_address,
                entries,
            });
        }

        Ok(RelocationData { blocks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pe::section_table::SectionTable;

    #[test]
    fn parses_a_single_highlow_block() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x1000u32.to_le_bytes()); // virtual_address
        bytes.extend_from_slice(&12u32.to_le_bytes()); // size_of_block (8 + 2 entries)
        bytes.extend_from_slice(&RelocationWord {
            value: ((IMAGE_REL_BASED_HIGHLOW as u16) << 12) | 0x0ab,
        }
        .value
        .to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes()); // padding entry, type ABSOLUTE

        let dd = DataDirectory {
            virtual_address: 0,
            size: bytes.len() as u32,
        };
        let sections: [SectionTable; 0] = [];
        let data = RelocationData::parse(&bytes, &dd, &sections, 0x1000, 0x200, 0x10000).unwrap();
        assert_eq!(data.blocks.len(), 1);
        assert_eq!(data.blocks[0].virtual_address, 0x1000);
        assert_eq!(data.blocks[0].entries.len(), 2);
        assert_eq!(data.blocks[0].entries[0].typ, IMAGE_REL_BASED_HIGHLOW);
        assert_eq!(data.blocks[0].entries[0].offset, 0x0ab);
        assert_eq!(data.blocks[0].entries[1].typ, IMAGE_REL_BASED_ABSOLUTE);
    }

    #[test]
    fn zero_sized_block_terminates() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let dd = DataDirectory {
            virtual_address: 0,
            size: bytes.len() as u32,
        };
        let sections: [SectionTable; 0] = [];
        let data = RelocationData::parse(&bytes, &dd, &sections, 0x1000, 0x200, 0x10000).unwrap();
        assert!(data.blocks.is_empty());
    }
}
