//! The NT optional header: standard (COFF) fields, Windows-specific fields, and the data
//! directory array (spec §4.2). PE32 and PE32+ share the same field set but diverge in width
//! (`ImageBase`/stack/heap sizes) and in whether `BaseOfData` is present at all; we read the
//! on-disk layout for whichever magic is found and normalize both into one widened struct.

use crate::container;
use crate::error;
use crate::pe::data_directories;

use scroll::{ctx, Pread, LE};

pub const SIZEOF_STANDARD_FIELDS_32: usize = 28;
pub const SIZEOF_STANDARD_FIELDS_64: usize = 24;

/// Standard fields magic number for 32-bit binary
pub const MAGIC_32: u16 = 0x10b;
/// Standard fields magic number for 64-bit binary
pub const MAGIC_64: u16 = 0x20b;

pub const SIZEOF_WINDOWS_FIELDS_32: usize = 68;
pub const SIZEOF_WINDOWS_FIELDS_64: usize = 88;

/// Unified 32/64-bit COFF "standard fields".
#[derive(Debug, PartialEq, Copy, Clone, Default)]
pub struct StandardFields {
    pub magic: u16,
    pub major_linker_version: u8,
    pub minor_linker_version: u8,
    pub size_of_code: u64,
    pub size_of_initialized_data: u64,
    pub size_of_uninitialized_data: u64,
    pub address_of_entry_point: u64,
    pub base_of_code: u64,
    /// absent in 64-bit PE32+
    pub base_of_data: u32,
}

impl StandardFields {
    fn parse(bytes: &[u8], offset: &mut usize, is_64: bool) -> error::Result<Self> {
        let magic = bytes.gread_with(offset, LE)?;
        let major_linker_version = bytes.gread_with(offset, LE)?;
        let minor_linker_version = bytes.gread_with(offset, LE)?;
        let size_of_code: u32 = bytes.gread_with(offset, LE)?;
        let size_of_initialized_data: u32 = bytes.gread_with(offset, LE)?;
        let size_of_uninitialized_data: u32 = bytes.gread_with(offset, LE)?;
        let address_of_entry_point: u32 = bytes.gread_with(offset, LE)?;
        let base_of_code: u32 = bytes.gread_with(offset, LE)?;
        let base_of_data = if is_64 {
            0
        } else {
            bytes.gread_with::<u32>(offset, LE)?
        };
        Ok(StandardFields {
            magic,
            major_linker_version,
            minor_linker_version,
            size_of_code: size_of_code as u64,
            size_of_initialized_data: size_of_initialized_data as u64,
            size_of_uninitialized_data: size_of_uninitialized_data as u64,
            address_of_entry_point: address_of_entry_point as u64,
            base_of_code: base_of_code as u64,
            base_of_data,
        })
    }
}

/// Unified 32/64-bit "Windows-specific fields", widened to `u64` for the fields that differ.
#[derive(Debug, PartialEq, Copy, Clone, Default)]
pub struct WindowsFields {
    pub image_base: u64,
    pub section_alignment: u32,
    pub file_alignment: u32,
    pub major_operating_system_version: u16,
    pub minor_operating_system_version: u16,
    pub major_image_version: u16,
    pub minor_image_version: u16,
    pub major_subsystem_version: u16,
    pub minor_subsystem_version: u16,
    pub win32_version_value: u32,
    pub size_of_image: u32,
    pub size_of_headers: u32,
    pub check_sum: u32,
    pub subsystem: u16,
    pub dll_characteristics: u16,
    pub size_of_stack_reserve: u64,
    pub size_of_stack_commit: u64,
    pub size_of_heap_reserve: u64,
    pub size_of_heap_commit: u64,
    pub loader_flags: u32,
    pub number_of_rva_and_sizes: u32,
}

impl WindowsFields {
    fn parse(bytes: &[u8], offset: &mut usize, is_64: bool) -> error::Result<Self> {
        let image_base = if is_64 {
            bytes.gread_with::<u64>(offset, LE)?
        } else {
            bytes.gread_with::<u32>(offset, LE)? as u64
        };
        let section_alignment = bytes.gread_with(offset, LE)?;
        let file_alignment = bytes.gread_with(offset, LE)?;
        let major_operating_system_version = bytes.gread_with(offset, LE)?;
        let minor_operating_system_version = bytes.gread_with(offset, LE)?;
        let major_image_version = bytes.gread_with(offset, LE)?;
        let minor_image_version = bytes.gread_with(offset, LE)?;
        let major_subsystem_version = bytes.gread_with(offset, LE)?;
        let minor_subsystem_version = bytes.gread_with(offset, LE)?;
        let win32_version_value = bytes.gread_with(offset, LE)?;
        let size_of_image = bytes.gread_with(offset, LE)?;
        let size_of_headers = bytes.gread_with(offset, LE)?;
        let check_sum = bytes.gread_with(offset, LE)?;
        let subsystem = bytes.gread_with(offset, LE)?;
        let dll_characteristics = bytes.gread_with(offset, LE)?;
        let (size_of_stack_reserve, size_of_stack_commit, size_of_heap_reserve, size_of_heap_commit) =
            if is_64 {
                (
                    bytes.gread_with::<u64>(offset, LE)?,
                    bytes.gread_with::<u64>(offset, LE)?,
                    bytes.gread_with::<u64>(offset, LE)?,
                    bytes.gread_with::<u64>(offset, LE)?,
                )
            } else {
                (
                    bytes.gread_with::<u32>(offset, LE)? as u64,
                    bytes.gread_with::<u32>(offset, LE)? as u64,
                    bytes.gread_with::<u32>(offset, LE)? as u64,
                    bytes.gread_with::<u32>(offset, LE)? as u64,
                )
            };
        let loader_flags = bytes.gread_with(offset, LE)?;
        let number_of_rva_and_sizes = bytes.gread_with(offset, LE)?;
        Ok(WindowsFields {
            image_base,
            section_alignment,
            file_alignment,
            major_operating_system_version,
            minor_operating_system_version,
            major_image_version,
            minor_image_version,
            major_subsystem_version,
            minor_subsystem_version,
            win32_version_value,
            size_of_image,
            size_of_headers,
            check_sum,
            subsystem,
            dll_characteristics,
            size_of_stack_reserve,
            size_of_stack_commit,
            size_of_heap_reserve,
            size_of_heap_commit,
            loader_flags,
            number_of_rva_and_sizes,
        })
    }
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct OptionalHeader {
    pub standard_fields: StandardFields,
    pub windows_fields: WindowsFields,
    pub data_directories: data_directories::DataDirectories,
}

impl OptionalHeader {
    pub fn container(&self) -> error::Result<container::Container> {
        match self.standard_fields.magic {
            MAGIC_32 => Ok(container::Container::Little),
            MAGIC_64 => Ok(container::Container::Big),
            _ => Err(error::Error::NtOptionalHeaderMagicNotFound),
        }
    }

    /// `ImageBase` must be a multiple of 0x10000 (spec §4.2).
    pub fn validate_image_base(&self) -> error::Result<()> {
        if self.windows_fields.image_base % 0x1_0000 != 0 {
            return Err(error::Error::ImageBaseNotAligned);
        }
        Ok(())
    }

    /// `true` iff `ImageBase + SizeOfImage` overflows the architecture-specific upper bound
    /// (spec §4.2: `0x8000_0000` for PE32, `0xFFFF_0800_0000_0000` for PE32+).
    pub fn image_base_overflows(&self) -> bool {
        let limit: u64 = if self.standard_fields.magic == MAGIC_64 {
            0xFFFF_0800_0000_0000
        } else {
            0x8000_0000
        };
        self.windows_fields
            .image_base
            .checked_add(self.windows_fields.size_of_image as u64)
            .map(|sum| sum > limit)
            .unwrap_or(true)
    }
}

impl<'a> ctx::TryFromCtx<'a, scroll::Endian> for OptionalHeader {
    type Error = error::Error;

    fn try_from_ctx(bytes: &'a [u8], _ctx: scroll::Endian) -> error::Result<(Self, usize)> {
        let mut offset = 0usize;
        let magic: u16 = bytes.pread_with(offset, LE)?;
        let is_64 = match magic {
            MAGIC_32 => false,
            MAGIC_64 => true,
            _ => return Err(error::Error::NtOptionalHeaderMagicNotFound),
        };

        let standard_fields = StandardFields::parse(bytes, &mut offset, is_64)?;
        let windows_fields = WindowsFields::parse(bytes, &mut offset, is_64)?;
        let data_directories = data_directories::DataDirectories::parse(
            bytes,
            windows_fields.number_of_rva_and_sizes as usize,
            &mut offset,
        )?;

        Ok((
            OptionalHeader {
                standard_fields,
                windows_fields,
                data_directories,
            },
            offset,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pe32_optional_header_bytes() -> Vec<u8> {
        let mut bytes = alloc::vec![0u8; SIZEOF_STANDARD_FIELDS_32 + SIZEOF_WINDOWS_FIELDS_32];
        bytes[0..2].copy_from_slice(&MAGIC_32.to_le_bytes());
        // ImageBase at offset 28, aligned to 0x10000
        bytes[28..32].copy_from_slice(&0x0040_0000u32.to_le_bytes());
        // SectionAlignment / FileAlignment
        bytes[32..36].copy_from_slice(&0x1000u32.to_le_bytes());
        bytes[36..40].copy_from_slice(&0x200u32.to_le_bytes());
        bytes
    }

    #[test]
    fn parses_pe32_optional_header_with_no_data_directories() {
        let bytes = pe32_optional_header_bytes();
        let header: OptionalHeader = bytes.pread(0).unwrap();
        assert_eq!(header.standard_fields.magic, MAGIC_32);
        assert_eq!(header.container().unwrap(), container::Container::Little);
        assert_eq!(header.windows_fields.image_base, 0x0040_0000);
        assert!(header.validate_image_base().is_ok());
    }

    #[test]
    fn unrecognized_magic_is_rejected() {
        let mut bytes = pe32_optional_header_bytes();
        bytes[0..2].copy_from_slice(&0xBEEFu16.to_le_bytes());
        let err = bytes.pread::<OptionalHeader>(0).unwrap_err();
        assert!(matches!(err, error::Error::NtOptionalHeaderMagicNotFound));
    }
}
