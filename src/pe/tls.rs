use crate::error;
use alloc::vec::Vec;
use scroll::{Pread, Pwrite, SizeWith};

use crate::pe::data_directories;
use crate::pe::options;
use crate::pe::section_table;
use crate::pe::utils;

/// Indicates 1-byte alignment for Thread Local Storage (TLS) characteristics field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_1BYTES: u32 = 0x00100000;
/// Indicates 2-byte alignment for Thread Local Storage (TLS) characteristics field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_2BYTES: u32 = 0x00200000;
/// Indicates 4-byte alignment for Thread Local Storage (TLS) characteristics field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_4BYTES: u32 = 0x00300000;
/// Indicates 8-byte alignment for Thread Local Storage (TLS) characteristics field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_8BYTES: u32 = 0x00400000;
/// Indicates 16-byte alignment for Thread Local Storage (TLS) characteristics field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_16BYTES: u32 = 0x00500000;
/// Indicates 32-byte alignment for Thread Local Storage (TLS) characteristics field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_32BYTES: u32 = 0x00600000;
/// Indicates 64-byte alignment for Thread Local Storage (TLS) characteristics field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_64BYTES: u32 = 0x00700000;
/// Indicates 128-byte alignment for Thread Local Storage (TLS) characteristics field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_128BYTES: u32 = 0x00800000;
/// Indicates 256-byte alignment for Thread Local Storage (TLS) characteristics field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_256BYTES: u32 = 0x00900000;
/// Indicates 512-byte alignment for Thread Local Storage (TLS) characteristics field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_512BYTES: u32 = 0x00A00000;
/// Indicates 1024-byte alignment for Thread Local Storage (TLS) characteristics field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_1024BYTES: u32 = 0x00B00000;
/// Indicates 2048-byte alignment for Thread Local Storage (TLS) characteristics field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_2048BYTES: u32 = 0x00D00000;
/// Indicates 4096-byte alignment for Thread Local Storage (TLS) dacharacteristicsta field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_4096BYTES: u32 = 0x00C00000;
/// Indicates 8192-byte alignment for Thread Local Storage (TLS) characteristics field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_8192BYTES: u32 = 0x00E00000;
/// Mask for isolating alignment information from the characteristics field in [`ImageTlsDirectory::characteristics`]
pub const TLS_CHARACTERISTICS_ALIGN_MASK: u32 = 0x00F00000;

/// Represents the TLS directory `IMAGE_TLS_DIRECTORY64`.
#[repr(C)]
#[derive(Debug, PartialEq, Copy, Clone, Default, Pread, Pwrite, SizeWith)]
pub struct ImageTlsDirectory {
    /// The starting address of the TLS raw data.
    // NOTE: `u32` for 32-bit binaries, `u64` for 64-bit binaries.
    pub start_address_of_raw_data: u64,
    /// The ending address of the TLS raw data.
    // NOTE: `u32` for 32-bit binaries, `u64` for 64-bit binaries.
    pub end_address_of_raw_data: u64,
    /// The address of the TLS index.
    // NOTE: `u32` for 32-bit binaries, `u64` for 64-bit binaries.
    pub address_of_index: u64,
    /// The address of the TLS callback functions.
    ///
    /// Terminated by a null pointer.
    // NOTE: `u32` for 32-bit binaries, `u64` for 64-bit binaries.
    pub address_of_callbacks: u64,
    /// The size of the zero fill.
    pub size_of_zero_fill: u32,
    /// The characteristics of the TLS.
    ///
    /// Contains one or more bitflags of:
    ///
    /// - [`TLS_CHARACTERISTICS_ALIGN_1BYTES`]
    /// - [`TLS_CHARACTERISTICS_ALIGN_2BYTES`]
    /// - [`TLS_CHARACTERISTICS_ALIGN_4BYTES`]
    /// - [`TLS_CHARACTERISTICS_ALIGN_8BYTES`]
    /// - [`TLS_CHARACTERISTICS_ALIGN_16BYTES`]
    /// - [`TLS_CHARACTERISTICS_ALIGN_32BYTES`]
    /// - [`TLS_CHARACTERISTICS_ALIGN_64BYTES`]
    /// - [`TLS_CHARACTERISTICS_ALIGN_128BYTES`]
    /// - [`TLS_CHARACTERISTICS_ALIGN_256BYTES`]
    /// - [`TLS_CHARACTERISTICS_ALIGN_512BYTES`]
    /// - [`TLS_CHARACTERISTICS_ALIGN_1024BYTES`]
    /// - [`TLS_CHARACTERISTICS_ALIGN_2048BYTES`]
    /// - [`TLS_CHARACTERISTICS_ALIGN_4096BYTES`]
    /// - [`TLS_CHARACTERISTICS_ALIGN_8192BYTES`]
    /// - [`TLS_CHARACTERISTICS_ALIGN_MASK`]
    pub characteristics: u32,
}

/// TLS information.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TlsData<'a> {
    /// TLS directory.
    pub image_tls_directory: ImageTlsDirectory,
    /// Raw data of the TLS.
    pub raw_data: Option<&'a [u8]>,
    /// TLS index.
    pub slot: Option<u32>,
    /// TLS callbacks.
    pub callbacks: Vec<u64>,
}

impl ImageTlsDirectory {
    pub fn parse<T: Sized>(
        bytes: &[u8],
        dd: data_directories::DataDirectory,
        sections: &[section_table::SectionTable],
        section_alignment: u32,
        file_alignment: u32,
    ) -> error::Result<Self> {
        Self::parse_with_opts::<T>(
            bytes,
            dd,
            sections,
            section_alignment,
            file_alignment,
            &options::ParseOptions::default(),
        )
    }

    pub fn parse_with_opts<T: Sized>(
        bytes: &[u8],
        dd: data_directories::DataDirectory,
        sections: &[section_table::SectionTable],
        section_alignment: u32,
        file_alignment: u32,
        opts: &options::ParseOptions,
    ) -> error::Result<Self> {
        let rva = dd.virtual_address as usize;
        let mut offset = utils::find_offset(
            rva,
            sections,
            section_alignment,
            file_alignment,
            bytes.len(),
            opts,
        )
        .ok_or_else(|| {
            error::Error::Malformed(format!(
                "Cannot map ImageTlsDirectory rva {:#x} into offset",
                rva
            ))
        })?;

        let is_64 = core::mem::size_of::<T>() == 8;

        let start_address_of_raw_data = if is_64 {
            bytes.gread_with::<u64>(&mut offset, scroll::LE)?
        } else {
            bytes.gread_with::<u32>(&mut offset, scroll::LE)? as u64
        };
        let end_address_of_raw_data = if is_64 {
            bytes.gread_with::<u64>(&mut offset, scroll::LE)?
        } else {
            bytes.gread_with::<u32>(&mut offset, scroll::LE)? as u64
        };
        let address_of_index = if is_64 {
            bytes.gread_with::<u64>(&mut offset, scroll::LE)?
        } else {
            bytes.gread_with::<u32>(&mut offset, scroll::LE)? as u64
        };
        let address_of_callbacks = if is_64 {
            bytes.gread_with::<u64>(&mut offset, scroll::LE)?
        } else {
            bytes.gread_with::<u32>(&mut offset, scroll::LE)? as u64
        };
        let size_of_zero_fill = bytes.gread_with::<u32>(&mut offset, scroll::LE)?;
        let characteristics = bytes.gread_with::<u32>(&mut offset, scroll::LE)?;

        let itd = Self {
            start_address_of_raw_data,
            end_address_of_raw_data,
            address_of_index,
            address_of_callbacks,
            size_of_zero_fill,
            characteristics,
        };

        Ok(itd)
    }
}

impl<'a> TlsData<'a> {
    pub fn parse<T: Sized>(
        bytes: &'a [u8],
        image_base: usize,
        dd: &data_directories::DataDirectory,
        sections: &[section_table::SectionTable],
        section_alignment: u32,
        file_alignment: u32,
    ) -> error::Result<Option<Self>> {
        Self::parse_with_opts::<T>(
            bytes,
            image_base,
            dd,
            sections,
            section_alignment,
            file_alignment,
            &options::ParseOptions::default(),
        )
    }

    pub fn parse_with_opts<T: Sized>(
        bytes: &'a [u8],
        image_base: usize,
        dd: &data_directories::DataDirectory,
        sections: &[section_table::SectionTable],
        section_alignment: u32,
        file_alignment: u32,
        opts: &options::ParseOptions,
    ) -> error::Result<Option<Self>> {
        let mut raw_data = None;
        let mut slot = None;
        let mut callbacks = Vec::new();

        let is_64 = core::mem::size_of::<T>() == 8;

        let itd = ImageTlsDirectory::parse_with_opts::<T>(
            bytes,
            *dd,
            sections,
            section_alignment,
            file_alignment,
            opts,
        )?;

        // Parse the raw data if any
        if itd.end_address_of_raw_data != 0 && itd.start_address_of_raw_data != 0 {
            if itd.start_address_of_raw_data > itd.end_address_of_raw_data {
                return Err(error::Error::Malformed(format!(
                    "tls start_address_of_raw_data ({:#x}) is greater than end_address_of_raw_data ({:#x})",
                    itd.start_address_of_raw_data,
                    itd.end_address_of_raw_data
                )));
            }

            if (itd.start_address_of_raw_data as usize) < image_base {
                return Err(error::Error::Malformed(format!(
                    "tls start_address_of_raw_data ({:#x}) is less than image base ({:#x})",
                    itd.start_address_of_raw_data, image_base
                )));
            }

            // VA to RVA
            let rva = itd.start_address_of_raw_data as usize - image_base;
            let size = itd.end_address_of_raw_data - itd.start_address_of_raw_data;
            let offset = utils::find_offset(
                rva,
                sections,
                section_alignment,
                file_alignment,
                bytes.len(),
                opts,
            )
            .ok_or_else(|| {
                error::Error::Malformed(format!(
                    "cannot map tls start_address_of_raw_data rva ({:#x}) into offset",
                    rva
                ))
            })?;
            raw_data = Some(&bytes[offset..offset + size as usize]);
        }

        // Parse the index if any
        if itd.address_of_index != 0 {
            if (itd.address_of_index as usize) < image_base {
                return Err(error::Error::Malformed(format!(
                    "tls address_of_index ({:#x}) is less than image base ({:#x})",
                    itd.address_of_index, image_base
                )));
            }

            // VA to RVA
            let rva = itd.address_of_index as usize - image_base;
            let offset = utils::find_offset(
                rva,
                sections,
                section_alignment,
                file_alignment,
                bytes.len(),
                opts,
            );
            slot = offset.and_then(|x| bytes.pread_with::<u32>(x, scroll::LE).ok());
        }

        // Parse the callbacks if any
        if itd.address_of_callbacks != 0 {
            if (itd.address_of_callbacks as usize) < image_base {
                return Err(error::Error::Malformed(format!(
                    "tls address_of_callbacks ({:#x}) is less than image base ({:#x})",
                    itd.address_of_callbacks, image_base
                )));
            }

            // VA to RVA
            let rva = itd.address_of_callbacks as usize - image_base;
            let offset = utils::find_offset(
                rva,
                sections,
                section_alignment,
                file_alignment,
                bytes.len(),
                opts,
            )
            .ok_or_else(|| {
                error::Error::Malformed(format!(
                    "cannot map tls address_of_callbacks rva ({:#x}) into offset",
                    rva
                ))
            })?;
            let mut i = 0;
            // Read the callbacks until we find a null terminator
            loop {
                let callback: u64 = if is_64 {
                    bytes.pread_with::<u64>(offset + i * 8, scroll::LE)?
                } else {
                    bytes.pread_with::<u32>(offset + i * 4, scroll::LE)? as u64
                };
                if callback == 0 {
                    break;
                }
                // Each callback is an VA so convert it to RVA
                let callback_rva = callback as usize - image_base;
                // Check if the callback is in the image
                if utils::find_offset(
                    callback_rva,
                    sections,
                    section_alignment,
                    file_alignment,
                    bytes.len(),
                    opts,
                )
                .is_none()
                {
                    return Err(error::Error::Malformed(format!(
                        "cannot map tls callback ({:#x})",
                        callback
                    )));
                }
                callbacks.push(callback);
                i += 1;
            }
        }

        Ok(Some(TlsData {
            image_tls_directory: itd,
            raw_data,
            slot,
            callbacks,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE_BASE: usize = 0x400000;

    fn tls_dir64(
        start: u64,
        end: u64,
        index: u64,
        callbacks: u64,
        zero_fill: u32,
        characteristics: u32,
    ) -> Vec<u8> {
        let mut buf = vec![0u8; 40];
        buf.pwrite_with(start, 0, scroll::LE).unwrap();
        buf.pwrite_with(end, 8, scroll::LE).unwrap();
        buf.pwrite_with(index, 16, scroll::LE).unwrap();
        buf.pwrite_with(callbacks, 24, scroll::LE).unwrap();
        buf.pwrite_with(zero_fill, 32, scroll::LE).unwrap();
        buf.pwrite_with(characteristics, 36, scroll::LE).unwrap();
        buf
    }

    #[test]
    fn image_tls_directory_reads_32bit_fields() {
        let mut file = vec![0u8; 24];
        file.pwrite_with(0x1000u32, 0, scroll::LE).unwrap();
        file.pwrite_with(0x1010u32, 4, scroll::LE).unwrap();
        file.pwrite_with(0x2000u32, 8, scroll::LE).unwrap();
        file.pwrite_with(0u32, 12, scroll::LE).unwrap();
        file.pwrite_with(0u32, 16, scroll::LE).unwrap();
        file.pwrite_with(TLS_CHARACTERISTICS_ALIGN_4BYTES, 20, scroll::LE)
            .unwrap();

        let dd = data_directories::DataDirectory {
            virtual_address: 0,
            size: 24,
        };
        let itd =
            ImageTlsDirectory::parse::<u32>(&file, dd, &[], 0x1000, 0x200)
                .expect("parses 32-bit tls dir");
        assert_eq!(itd.start_address_of_raw_data, 0x1000);
        assert_eq!(itd.end_address_of_raw_data, 0x1010);
        assert_eq!(itd.address_of_index, 0x2000);
        assert_eq!(itd.characteristics, TLS_CHARACTERISTICS_ALIGN_4BYTES);
    }

    #[test]
    fn tls_data_with_callbacks_and_raw_data() {
        // Layout (identity rva->offset mapping, no sections):
        //   0x10: TLS directory (40 bytes, 64-bit fields)
        //   0x40: raw data (0x10 bytes)
        //   0x60: slot (u32)
        //   0x70: callback array, two entries + null terminator
        let dir_off = 0x10u64;
        let raw_off = 0x40u64;
        let slot_off = 0x60u64;
        let cb_off = 0x70u64;

        let dir = tls_dir64(
            IMAGE_BASE as u64 + raw_off,
            IMAGE_BASE as u64 + raw_off + 0x10,
            IMAGE_BASE as u64 + slot_off,
            IMAGE_BASE as u64 + cb_off,
            0,
            TLS_CHARACTERISTICS_ALIGN_8BYTES,
        );

        // The callback array stores VAs (converted to RVAs 0x9000/0x9100) that are validated
        // against the image size, so the buffer must extend past them even though nothing
        // is read from out there.
        let mut file = vec![0u8; 0x9200];
        file[dir_off as usize..dir_off as usize + 40].copy_from_slice(&dir);
        file.pwrite_with(0xABu32, slot_off as usize, scroll::LE)
            .unwrap();
        file.pwrite_with(
            IMAGE_BASE as u64 + 0x9000,
            cb_off as usize,
            scroll::LE,
        )
        .unwrap();
        file.pwrite_with(
            IMAGE_BASE as u64 + 0x9100,
            cb_off as usize + 8,
            scroll::LE,
        )
        .unwrap();
        file.pwrite_with(0u64, cb_off as usize + 16, scroll::LE)
            .unwrap();

        let dd = data_directories::DataDirectory {
            virtual_address: dir_off as u32,
            size: 40,
        };
        let tls = TlsData::parse::<u64>(&file, IMAGE_BASE, &dd, &[], 0x1000, 0x200)
            .expect("parses tls data")
            .expect("tls data present");

        assert_eq!(
            tls.callbacks,
            vec![IMAGE_BASE as u64 + 0x9000, IMAGE_BASE as u64 + 0x9100]
        );
        assert_eq!(tls.raw_data.map(|d| d.len()), Some(0x10));
        assert_eq!(tls.slot, Some(0xAB));
        assert_eq!(tls.image_tls_directory.characteristics, TLS_CHARACTERISTICS_ALIGN_8BYTES);
    }

    #[test]
    fn tls_data_rejects_raw_data_start_past_end() {
        let dir_off = 0x10u64;
        let dir = tls_dir64(
            IMAGE_BASE as u64 + 0x100,
            IMAGE_BASE as u64 + 0x80,
            0,
            0,
            0,
            0,
        );
        let mut file = vec![0u8; dir_off as usize + 40];
        file[dir_off as usize..dir_off as usize + 40].copy_from_slice(&dir);

        let dd = data_directories::DataDirectory {
            virtual_address: dir_off as u32,
            size: 40,
        };
        let err = TlsData::parse::<u64>(&file, IMAGE_BASE, &dd, &[], 0x1000, 0x200).unwrap_err();
        assert!(matches!(err, error::Error::Malformed(_)));
    }

    #[test]
    fn tls_data_slot_unreadable_returns_none() {
        let dir_off = 0x10u64;
        let dir = tls_dir64(0, 0, IMAGE_BASE as u64 + 0x9000, 0, 0, 0);
        let mut file = vec![0u8; dir_off as usize + 40];
        file[dir_off as usize..dir_off as usize + 40].copy_from_slice(&dir);

        let dd = data_directories::DataDirectory {
            virtual_address: dir_off as u32,
            size: 40,
        };
        // address_of_index maps (via identity rva fallback) past the end of `file`, so the
        // pread of the slot value fails and is swallowed into `None`.
        let tls = TlsData::parse::<u64>(&file, IMAGE_BASE, &dd, &[], 0x1000, 0x200)
            .expect("parses tls data")
            .expect("tls data present");
        assert_eq!(tls.slot, None);
    }
}
