//! RVA↔file-offset translation and small byte-range helpers (spec §4.1).
//!
//! `find_offset` is the crux of the whole crate: every directory parser reaches into the
//! image through it, so its alignment handling has to match the substrate spec exactly,
//! including the header-region fallback and the sub-0x200 `pointerToRawData` rounding.

use alloc::vec::Vec;
use scroll::Pread;

use crate::error;
use crate::pe::options::ParseOptions;
use crate::pe::section_table::SectionTable;

/// `file_alignment` values below this are normalized to this value when adjusting pointers.
pub const MIN_FILE_ALIGNMENT: u32 = 0x200;

/// Rounds `va` down to `0x200` when `file_alignment` is at least `0x200`; returns `va`
/// unchanged otherwise (spec §4.1 `adjust_file_alignment`).
pub fn adjust_file_alignment(va: u32, file_alignment: u32) -> u32 {
    if file_alignment < MIN_FILE_ALIGNMENT {
        return va;
    }
    va - (va % MIN_FILE_ALIGNMENT)
}

/// Rounds `va` down to `section_alignment`, falling back to `file_alignment` when the former
/// is below the page size (spec §4.1 `adjust_section_alignment`).
pub fn adjust_section_alignment(va: u32, section_alignment: u32, file_alignment: u32) -> u32 {
    let alignment = if section_alignment < 0x1000 {
        file_alignment
    } else {
        section_alignment
    };
    if alignment == 0 {
        va
    } else {
        va - (va % alignment)
    }
}

/// Returns `true` iff `val` lies in `[min, max)`.
pub fn is_in_range(val: usize, min: usize, max: usize) -> bool {
    val >= min && val < max
}

/// Rounds `size` up to a multiple of `alignment` (`alignment` must be a power of two).
pub fn round_size(size: usize, alignment: usize) -> usize {
    if alignment == 0 {
        size
    } else {
        (size + alignment - 1) & !(alignment - 1)
    }
}

/// Rounds `value` up to a multiple of `alignment` (`alignment` must be a power of two).
pub fn align_to(value: usize, alignment: usize) -> usize {
    round_size(value, alignment)
}

/// Returns zero-padding needed to align `len` up to `alignment`, or `None` if already aligned.
pub fn pad(len: usize, alignment: Option<usize>) -> Option<Vec<u8>> {
    let alignment = alignment?;
    let padded = align_to(len, alignment);
    if padded == len {
        None
    } else {
        Some(alloc::vec![0u8; padded - len])
    }
}

fn section_span(section: &SectionTable, section_alignment: u32, file_alignment: u32) -> (u32, u32) {
    let va = adjust_section_alignment(section.virtual_address, section_alignment, file_alignment);
    let size = section.virtual_size.max(section.size_of_raw_data);
    (va, size)
}

fn section_contains(
    section: &SectionTable,
    rva: u32,
    section_alignment: u32,
    file_alignment: u32,
) -> Option<u32> {
    let (va, size) = section_span(section, section_alignment, file_alignment);
    if is_in_range(rva as usize, va as usize, va as usize + size as usize) {
        Some(rva - va)
    } else {
        None
    }
}

/// `true` iff some section's adjusted VA span contains `rva` (spec §3 global invariant 2).
pub fn is_in_section(
    rva: u32,
    sections: &[SectionTable],
    section_alignment: u32,
    file_alignment: u32,
) -> bool {
    sections
        .iter()
        .any(|s| section_contains(s, rva, section_alignment, file_alignment).is_some())
}

fn raw_pointer_of(section: &SectionTable, file_alignment: u32) -> u32 {
    if section.pointer_to_raw_data < MIN_FILE_ALIGNMENT {
        0
    } else {
        adjust_file_alignment(section.pointer_to_raw_data, file_alignment)
    }
}

/// Translates `rva` to a file offset (spec §4.1 `rva_to_offset`).
///
/// Finds the section whose adjusted VA span contains `rva`; returns
/// `rva - adjusted_va + adjusted_raw_pointer`. If no section contains it but `rva < image_size`,
/// the RVA is assumed to fall in the header region and is returned unchanged (the header prefix
/// is not backed by any section). Otherwise returns `None` (spec §3 global invariant 1,
/// "unreachable"). A sub-`0x200` `pointerToRawData` is rounded to zero, per spec §3 invariant 3.
pub fn find_offset(
    rva: usize,
    sections: &[SectionTable],
    section_alignment: u32,
    file_alignment: u32,
    image_size: usize,
    _opts: &ParseOptions,
) -> Option<usize> {
    let rva_u32 = rva as u32;
    for section in sections {
        if let Some(delta) = section_contains(section, rva_u32, section_alignment, file_alignment)
        {
            return Some((raw_pointer_of(section, file_alignment) + delta) as usize);
        }
    }
    if rva < image_size { Some(rva) } else { None }
}

/// Like [`find_offset`], but returns `default` rather than `None` on failure.
pub fn find_offset_or(
    rva: usize,
    sections: &[SectionTable],
    section_alignment: u32,
    file_alignment: u32,
    image_size: usize,
    opts: &ParseOptions,
    default: usize,
) -> usize {
    find_offset(rva, sections, section_alignment, file_alignment, image_size, opts)
        .unwrap_or(default)
}

/// Inverse of [`find_offset`]: translates a file offset back to an RVA (spec §4.1
/// `offset_to_rva`).
pub fn offset_to_rva(
    offset: usize,
    sections: &[SectionTable],
    section_alignment: u32,
    file_alignment: u32,
) -> usize {
    let offset_u32 = offset as u32;
    for section in sections {
        let raw_pointer = raw_pointer_of(section, file_alignment);
        let raw_size = section.size_of_raw_data;
        if is_in_range(offset, raw_pointer as usize, raw_pointer as usize + raw_size as usize) {
            let (va, _) = section_span(section, section_alignment, file_alignment);
            return (va + (offset_u32 - raw_pointer)) as usize;
        }
    }
    offset
}

/// Reads the NUL-terminated ASCII/UTF-8 name at RVA `rva`, resolving through the section
/// table first.
pub fn try_name<'a>(
    bytes: &'a [u8],
    rva: usize,
    sections: &[SectionTable],
    section_alignment: u32,
    file_alignment: u32,
    opts: &ParseOptions,
) -> error::Result<&'a str> {
    let offset = find_offset(rva, sections, section_alignment, file_alignment, bytes.len(), opts)
        .ok_or(error::Error::OutsideBoundary)?;
    Ok(bytes.pread::<&str>(offset)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_alignment_below_0x200_leaves_va_unchanged() {
        assert_eq!(adjust_file_alignment(0x123, 0x80), 0x123);
    }

    #[test]
    fn file_alignment_at_or_above_0x200_rounds_to_0x200() {
        assert_eq!(adjust_file_alignment(0x1234, 0x1000), 0x1200);
    }

    #[test]
    fn round_size_rounds_up() {
        assert_eq!(round_size(1, 0x1000), 0x1000);
        assert_eq!(round_size(0x1000, 0x1000), 0x1000);
    }

    #[test]
    fn pad_returns_none_when_aligned() {
        assert!(pad(8, Some(8)).is_none());
        assert_eq!(pad(5, Some(8)).unwrap().len(), 3);
    }

    #[test]
    fn header_rva_falls_back_to_identity() {
        let opts = ParseOptions::default();
        assert_eq!(find_offset(0x80, &[], 0x1000, 0x200, 0x1000, &opts), Some(0x80));
    }

    #[test]
    fn header_rva_beyond_image_size_is_unreachable() {
        let opts = ParseOptions::default();
        assert_eq!(find_offset(0x2000, &[], 0x1000, 0x200, 0x1000, &opts), None);
    }

    #[test]
    fn section_span_uses_section_alignment_not_virtual_size() {
        let section = SectionTable {
            virtual_address: 0xD2000,
            virtual_size: 0x5A00,
            ..Default::default()
        };
        let (va, _) = section_span(&section, 0x1000, 0x200);
        assert_eq!(va, 0xD2000);
    }
}
