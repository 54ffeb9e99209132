//! The export directory: `ImageExportDirectory`, its three parallel arrays, and the synthesized
//! per-symbol [`Export`] records, including forwarder detection (spec §4.6).

use alloc::vec::Vec;
use scroll::{Pread, Pwrite, SizeWith};

use crate::error;
use crate::pe::data_directories::DataDirectory;
use crate::pe::options::ParseOptions;
use crate::pe::section_table::SectionTable;
use crate::pe::utils;

#[repr(C)]
#[derive(Debug, PartialEq, Copy, Clone, Default)]
#[derive(Pread, Pwrite, SizeWith)]
pub struct ExportDirectoryTable {
    pub export_flags: u32,
    pub time_date_stamp: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub name_rva: u32,
    pub ordinal_base: u32,
    pub address_table_entries: u32,
    pub number_of_name_pointers: u32,
    pub export_address_table_rva: u32,
    pub name_pointer_rva: u32,
    pub ordinal_table_rva: u32,
}

pub const SIZEOF_EXPORT_DIRECTORY_TABLE: usize = 40;

impl ExportDirectoryTable {
    pub fn parse(bytes: &[u8], offset: usize) -> error::Result<Self> {
        Ok(bytes.pread_with(offset, scroll::LE)?)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ExportAddressTableEntry {
    ExportRVA(u32),
    ForwarderRVA(u32),
}

pub const SIZEOF_EXPORT_ADDRESS_TABLE_ENTRY: usize = 4;

pub type ExportAddressTable = Vec<ExportAddressTableEntry>;
/// Array of RVAs into the export name table; a name is only defined for ordinals present here.
pub type ExportNamePointerTable = Vec<u32>;
/// Array of indexes into the export address table; `idx = ordinal - ordinal_base`.
pub type ExportOrdinalTable = Vec<u16>;

#[derive(Debug)]
pub struct ExportData<'a> {
    pub export_directory_table: ExportDirectoryTable,
    pub export_name_pointer_table: ExportNamePointerTable,
    pub export_ordinal_table: ExportOrdinalTable,
    pub export_address_table: ExportAddressTable,
    pub name: Option<&'a str>,
}

impl<'a> ExportData<'a> {
    pub fn parse(
        bytes: &'a [u8],
        dd: DataDirectory,
        sections: &[SectionTable],
        section_alignment: u32,
        file_alignment: u32,
        opts: &ParseOptions,
    ) -> error::Result<Self> {
        let export_rva = dd.virtual_address as usize;
        let export_size = dd.size as usize;
        let export_offset = utils::find_offset(
            export_rva,
            sections,
            section_alignment,
            file_alignment,
            bytes.len(),
            opts,
        )
        .ok_or(error::Error::OutsideBoundary)?;
        let export_directory_table = ExportDirectoryTable::parse(bytes, export_offset)?;

        let max_entries = opts.max_export_entries_count as usize;
        let number_of_name_pointers =
            (export_directory_table.number_of_name_pointers as usize).min(max_entries);
        let address_table_entries =
            (export_directory_table.address_table_entries as usize).min(max_entries);

        let mut export_name_pointer_table = Vec::with_capacity(number_of_name_pointers);
        if let Some(mut offset) = utils::find_offset(
            export_directory_table.name_pointer_rva as usize,
            sections,
            section_alignment,
            file_alignment,
            bytes.len(),
            opts,
        ) {
            for _ in 0..number_of_name_pointers {
                export_name_pointer_table.push(bytes.gread_with(&mut offset, scroll::LE)?);
            }
        }

        let mut export_ordinal_table = Vec::with_capacity(number_of_name_pointers);
        if let Some(mut offset) = utils::find_offset(
            export_directory_table.ordinal_table_rva as usize,
            sections,
            section_alignment,
            file_alignment,
            bytes.len(),
            opts,
        ) {
            for _ in 0..number_of_name_pointers {
                export_ordinal_table.push(bytes.gread_with(&mut offset, scroll::LE)?);
            }
        }

        // An export address table entry is a forwarder iff its RVA falls within the export
        // directory's own span (spec §4.6): it points at a "DLL.Symbol" string instead of code.
        let mut export_address_table = Vec::with_capacity(address_table_entries);
        if let Some(mut offset) = utils::find_offset(
            export_directory_table.export_address_table_rva as usize,
            sections,
            section_alignment,
            file_alignment,
            bytes.len(),
            opts,
        ) {
            for _ in 0..address_table_entries {
                let rva: u32 = bytes.gread_with(&mut offset, scroll::LE)?;
                let entry = if utils::is_in_range(rva as usize, export_rva, export_rva + export_size) {
                    ExportAddressTableEntry::ForwarderRVA(rva)
                } else {
                    ExportAddressTableEntry::ExportRVA(rva)
                };
                export_address_table.push(entry);
            }
        }

        let name = utils::try_name(
            bytes,
            export_directory_table.name_rva as usize,
            sections,
            section_alignment,
            file_alignment,
            opts,
        )
        .ok();

        Ok(ExportData {
            export_directory_table,
            export_name_pointer_table,
            export_ordinal_table,
            export_address_table,
            name,
        })
    }
}

#[derive(Debug, Clone)]
pub enum Reexport<'a> {
    DllName { export: &'a str, lib: &'a str },
    DllOrdinal { export: u16, lib: &'a str },
}

#[derive(Debug, Clone)]
pub struct Export<'a> {
    pub name: Option<&'a str>,
    pub offset: Option<usize>,
    pub rva: usize,
    pub size: usize,
    pub ordinal: u16,
    pub reexport: Option<Reexport<'a>>,
}

impl<'a> Export<'a> {
    /// Resolves every entry in the address table to a name (via the ordinal/name-pointer
    /// tables, when available) and, for forwarders, splits the `DLL.Symbol` forwarder string.
    pub fn parse(
        bytes: &'a [u8],
        export_data: &ExportData<'a>,
        sections: &[SectionTable],
        section_alignment: u32,
        file_alignment: u32,
        opts: &ParseOptions,
    ) -> error::Result<Vec<Self>> {
        let dt = &export_data.export_directory_table;
        let ordinal_base = dt.ordinal_base;

        let mut exports = Vec::with_capacity(export_data.export_address_table.len());
        for (idx, entry) in export_data.export_address_table.iter().enumerate() {
            let ordinal = ordinal_base as usize + idx;
            let name = export_data
                .export_ordinal_table
                .iter()
                .position(|&o| o as usize == idx)
                .and_then(|name_idx| export_data.export_name_pointer_table.get(name_idx))
                .and_then(|&name_rva| {
                    utils::try_name(bytes, name_rva as usize, sections, section_alignment, file_alignment, opts)
                        .ok()
                });

            let (rva, reexport, offset) = match *entry {
                ExportAddressTableEntry::ExportRVA(rva) => {
                    let offset = utils::find_offset(
                        rva as usize,
                        sections,
                        section_alignment,
                        file_alignment,
                        bytes.len(),
                        opts,
                    );
                    (rva as usize, None, offset)
                }
                ExportAddressTableEntry::ForwarderRVA(rva) => {
                    let offset = utils::find_offset(
                        rva as usize,
                        sections,
                        section_alignment,
                        file_alignment,
                        bytes.len(),
                        opts,
                    );
                    let forwarder = offset.and_then(|off| bytes.pread::<&str>(off).ok());
                    let reexport = forwarder.and_then(|s| {
                        s.split_once('.').map(|(lib, export)| {
                            if let Ok(export_ordinal) = export.parse::<u16>() {
                                Reexport::DllOrdinal { export: export_ordinal, lib }
                            } else {
                                Reexport::DllName { export, lib }
                            }
                        })
                    });
                    (rva as usize, reexport, offset)
                }
            };

            exports.push(Export {
                name,
                offset,
                rva,
                size: 0,
                ordinal: ordinal as u16,
                reexport,
            });
        }
        Ok(exports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizeof_export_directory_table() {
        assert_eq!(
            ::core::mem::size_of::<ExportDirectoryTable>(),
            SIZEOF_EXPORT_DIRECTORY_TABLE
        );
    }
}
