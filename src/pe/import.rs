//! The import directory: the descriptor array, Import Lookup/Address Tables, and hint/name
//! entries (spec §4.6), plus the simpler Bound Import directory (spec §4.6 supplement).
//!
//! Each descriptor's INT (or, when the INT RVA is zero, its IAT) is walked as a null-terminated
//! array of 32- or 64-bit words, matching [`crate::pe::optional_header::OptionalHeader`]'s
//! bitness. Entry counts are capped by [`ParseOptions::max_export_entries_count`] (reused here
//! for imports too, since both are attacker-controlled unbounded walks over the same kind of
//! table).

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use scroll::{Pread, Pwrite, SizeWith};

use crate::error;
use crate::pe::data_directories;
use crate::pe::options::ParseOptions;
use crate::pe::section_table;
use crate::pe::utils;

/// Ordinal-import flag, bit 31, for a 32-bit Import Lookup/Address Table entry.
pub const IMPORT_BY_ORDINAL_32: u32 = 0x8000_0000;
/// Ordinal-import flag, bit 63, for a 64-bit Import Lookup/Address Table entry.
pub const IMPORT_BY_ORDINAL_64: u64 = 0x8000_0000_0000_0000;
/// Mask recovering the 31-bit RVA (or 16-bit ordinal) from a 32-bit entry.
pub const IMPORT_RVA_MASK_32: u32 = 0x7fff_ffff;
/// Mask recovering the 31-bit RVA (or 16-bit ordinal) from a 64-bit entry.
pub const IMPORT_RVA_MASK_64: u64 = 0x7fff_ffff;

#[derive(Debug, Clone)]
pub struct HintNameTableEntry {
    pub hint: u16,
    pub name: String,
}

impl HintNameTableEntry {
    fn parse(bytes: &[u8], offset: usize) -> error::Result<Self> {
        let mut offset = offset;
        let hint = bytes.gread_with(&mut offset, scroll::LE)?;
        let name = bytes.pread::<&str>(offset)?.to_string();
        Ok(HintNameTableEntry { hint, name })
    }
}

#[derive(Debug, Clone)]
pub enum SyntheticImportLookupTableEntry {
    OrdinalNumber(u16),
    HintNameTableRVA((u32, HintNameTableEntry)),
}

#[derive(Debug, Clone)]
pub struct ImportLookupTableEntry {
    pub bitfield: u64,
    pub synthetic: SyntheticImportLookupTableEntry,
}

pub type ImportLookupTable = Vec<ImportLookupTableEntry>;

impl ImportLookupTableEntry {
    /// Walks a null-terminated ILT/IAT, reading 32- or 64-bit words according to `is_64`.
    pub fn parse(
        bytes: &[u8],
        mut offset: usize,
        sections: &[section_table::SectionTable],
        section_alignment: u32,
        file_alignment: u32,
        opts: &ParseOptions,
        is_64: bool,
    ) -> error::Result<ImportLookupTable> {
        let mut table = Vec::new();
        loop {
            if table.len() >= opts.max_export_entries_count as usize {
                break;
            }
            let bitfield: u64 = if is_64 {
                bytes.gread_with::<u64>(&mut offset, scroll::LE)?
            } else {
                bytes.gread_with::<u32>(&mut offset, scroll::LE)? as u64
            };
            if bitfield == 0 {
                break;
            }

            let ordinal_flag = if is_64 {
                IMPORT_BY_ORDINAL_64
            } else {
                IMPORT_BY_ORDINAL_32 as u64
            };
            let rva_mask = if is_64 {
                IMPORT_RVA_MASK_64
            } else {
                IMPORT_RVA_MASK_32 as u64
            };

            let synthetic = if bitfield & ordinal_flag == ordinal_flag {
                SyntheticImportLookupTableEntry::OrdinalNumber((bitfield & 0xffff) as u16)
            } else {
                let rva = (bitfield & rva_mask) as u32;
                let hentry = match utils::find_offset(
                    rva as usize,
                    sections,
                    section_alignment,
                    file_alignment,
                    bytes.len(),
                    opts,
                ) {
                    Some(hint_offset) => HintNameTableEntry::parse(bytes, hint_offset)?,
                    None => HintNameTableEntry { hint: 0, name: String::new() },
                };
                SyntheticImportLookupTableEntry::HintNameTableRVA((rva, hentry))
            };
            table.push(ImportLookupTableEntry { bitfield, synthetic });
        }
        Ok(table)
    }
}

pub type ImportAddressTable = Vec<u64>;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
#[derive(Pread, Pwrite, SizeWith)]
pub struct ImportDirectoryEntry {
    pub import_lookup_table_rva: u32,
    pub time_date_stamp: u32,
    pub forwarder_chain: u32,
    pub name_rva: u32,
    pub import_address_table_rva: u32,
}

pub const SIZEOF_IMPORT_DIRECTORY_ENTRY: usize = 20;

impl ImportDirectoryEntry {
    pub fn is_null(&self) -> bool {
        self.import_lookup_table_rva == 0
            && self.time_date_stamp == 0
            && self.forwarder_chain == 0
            && self.name_rva == 0
            && self.import_address_table_rva == 0
    }
}

#[derive(Debug)]
pub struct SyntheticImportDirectoryEntry<'a> {
    pub import_directory_entry: ImportDirectoryEntry,
    pub name: &'a str,
    pub import_lookup_table: ImportLookupTable,
    pub import_address_table: ImportAddressTable,
}

impl<'a> SyntheticImportDirectoryEntry<'a> {
    fn parse(
        bytes: &'a [u8],
        import_directory_entry: ImportDirectoryEntry,
        sections: &[section_table::SectionTable],
        section_alignment: u32,
        file_alignment: u32,
        opts: &ParseOptions,
        is_64: bool,
    ) -> error::Result<Self> {
        let name = utils::try_name(
            bytes,
            import_directory_entry.name_rva as usize,
            sections,
            section_alignment,
            file_alignment,
            opts,
        )?;

        // Some linkers emit a zero ILT RVA and keep the lookup table only in the IAT; fall back
        // to it in that case.
        let ilt_rva = if import_directory_entry.import_lookup_table_rva != 0 {
            import_directory_entry.import_lookup_table_rva
        } else {
            import_directory_entry.import_address_table_rva
        };
        let import_lookup_table = match utils::find_offset(
            ilt_rva as usize,
            sections,
            section_alignment,
            file_alignment,
            bytes.len(),
            opts,
        ) {
            Some(offset) => ImportLookupTableEntry::parse(
                bytes,
                offset,
                sections,
                section_alignment,
                file_alignment,
                opts,
                is_64,
            )?,
            None => Vec::new(),
        };

        let mut import_address_table = Vec::new();
        if let Some(mut offset) = utils::find_offset(
            import_directory_entry.import_address_table_rva as usize,
            sections,
            section_alignment,
            file_alignment,
            bytes.len(),
            opts,
        ) {
            loop {
                if import_address_table.len() >= opts.max_export_entries_count as usize {
                    break;
                }
                let value: u64 = if is_64 {
                    bytes.gread_with::<u64>(&mut offset, scroll::LE)?
                } else {
                    bytes.gread_with::<u32>(&mut offset, scroll::LE)? as u64
                };
                if value == 0 {
                    break;
                }
                import_address_table.push(value);
            }
        }

        Ok(SyntheticImportDirectoryEntry {
            import_directory_entry,
            name,
            import_lookup_table,
            import_address_table,
        })
    }
}

#[derive(Debug)]
/// A list of synthesized import descriptors for this binary: which symbols, from which
/// libraries, it imports.
pub struct ImportData<'a> {
    pub import_data: Vec<SyntheticImportDirectoryEntry<'a>>,
}

impl<'a> ImportData<'a> {
    pub fn parse(
        bytes: &'a [u8],
        dd: data_directories::DataDirectory,
        sections: &[section_table::SectionTable],
        section_alignment: u32,
        file_alignment: u32,
        opts: &ParseOptions,
        is_64: bool,
    ) -> error::Result<Self> {
        let import_directory_table_rva = dd.virtual_address as usize;
        let mut offset = utils::find_offset(
            import_directory_table_rva,
            sections,
            section_alignment,
            file_alignment,
            bytes.len(),
            opts,
        )
        .ok_or(error::Error::OutsideBoundary)?;
        let mut import_data = Vec::new();
        loop {
            if import_data.len() >= opts.max_export_entries_count as usize {
                break;
            }
            let import_directory_entry: ImportDirectoryEntry = bytes.gread_with(&mut offset, scroll::LE)?;
            if import_directory_entry.is_null() {
                break;
            }
            let entry = SyntheticImportDirectoryEntry::parse(
                bytes,
                import_directory_entry,
                sections,
                section_alignment,
                file_alignment,
                opts,
                is_64,
            )?;
            import_data.push(entry);
        }
        Ok(ImportData { import_data })
    }
}

#[derive(Debug)]
/// A synthesized symbol import: name (or synthesized `ORDINAL n` label), owning DLL, and the
/// IAT slot it resolves into.
pub struct Import<'a> {
    pub name: String,
    pub dll: &'a str,
    pub ordinal: u16,
    pub offset: usize,
    pub rva: usize,
    pub size: usize,
}

impl<'a> Import<'a> {
    pub fn parse(import_data: &ImportData<'a>, entry_size: usize) -> Vec<Self> {
        let mut imports = Vec::new();
        for data in &import_data.import_data {
            let dll = data.name;
            let import_base = data.import_directory_entry.import_address_table_rva as usize;
            for (i, entry) in data.import_lookup_table.iter().enumerate() {
                let offset = import_base + i * entry_size;
                let (rva, name, ordinal) = match &entry.synthetic {
                    SyntheticImportLookupTableEntry::HintNameTableRVA((rva, hint_entry)) => {
                        (*rva, hint_entry.name.clone(), hint_entry.hint)
                    }
                    SyntheticImportLookupTableEntry::OrdinalNumber(ordinal) => {
                        (0, alloc::format!("ORDINAL {}", ordinal), *ordinal)
                    }
                };
                imports.push(Import {
                    name,
                    ordinal,
                    dll,
                    size: entry_size,
                    offset,
                    rva: rva as usize,
                });
            }
        }
        imports
    }
}

/// A single DLL entry in the Bound Import directory (spec §4.6 supplement): the declared
/// timestamp of the dependency at link time, plus the forwarder modules it carried along.
#[derive(Debug)]
pub struct BoundImportDescriptor<'a> {
    pub timestamp: u32,
    pub dll_name: &'a str,
    pub forwarder_refs: Vec<&'a str>,
}

/// Parses the Bound Import directory: a flat sequence of 8-byte descriptors
/// `{timestamp, offsetModuleName, numberOfModuleForwarderRefs}`, each immediately followed by
/// that many 8-byte forwarder records `{timestamp, offsetModuleName, reserved}`. Names are
/// relative to the start of the directory rather than image RVAs.
pub fn parse_bound_imports<'a>(
    bytes: &'a [u8],
    dd: data_directories::DataDirectory,
    opts: &ParseOptions,
) -> error::Result<Vec<BoundImportDescriptor<'a>>> {
    let base = dd.virtual_address as usize;
    let mut offset = base;
    let mut descriptors = Vec::new();
    loop {
        if descriptors.len() >= opts.max_export_entries_count as usize {
            break;
        }
        let timestamp: u32 = bytes.gread_with(&mut offset, scroll::LE)?;
        let name_offset: u16 = bytes.gread_with(&mut offset, scroll::LE)?;
        let num_forwarders: u16 = bytes.gread_with(&mut offset, scroll::LE)?;
        if timestamp == 0 && name_offset == 0 && num_forwarders == 0 {
            break;
        }
        let dll_name = bytes.pread::<&str>(base + name_offset as usize)?;
        let mut forwarder_refs = Vec::with_capacity(num_forwarders as usize);
        for _ in 0..num_forwarders {
            let _forwarder_timestamp: u32 = bytes.gread_with(&mut offset, scroll::LE)?;
            let forwarder_name_offset: u16 = bytes.gread_with(&mut offset, scroll::LE)?;
            let _reserved: u16 = bytes.gread_with(&mut offset, scroll::LE)?;
            forwarder_refs.push(bytes.pread::<&str>(base + forwarder_name_offset as usize)?);
        }
        descriptors.push(BoundImportDescriptor {
            timestamp,
            dll_name,
            forwarder_refs,
        });
    }
    Ok(descriptors)
}
