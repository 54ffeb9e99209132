//! A byte-offset based string table.
//!
//! Used by the COFF symbol table (§4.15): the string table follows the symbol array and is
//! indexed by byte offset rather than by member index.

use core::fmt;
use core::ops::Index;
use core::slice;
use core::str;
use scroll::{ctx, Pread};

#[cfg(feature = "alloc")]
use alloc::{string::String, vec::Vec};

#[cfg(feature = "std")]
use crate::error;

/// A string table indexed by byte offset. Constructed via [`Strtab::new`]/[`Strtab::parse`]
/// with your choice of delimiter.
pub struct Strtab<'a> {
    bytes: &'a [u8],
    delim: ctx::StrCtx,
}

#[inline(always)]
fn get_str(idx: usize, bytes: &[u8], delim: ctx::StrCtx) -> &str {
    bytes.pread_with::<&str>(idx, delim).unwrap_or("")
}

impl<'a> Strtab<'a> {
    pub fn new(bytes: &'a [u8], delim: u8) -> Self {
        Strtab {
            delim: ctx::StrCtx::from(delim),
            bytes,
        }
    }

    /// # Safety
    /// `bytes_ptr` must point to `size` valid, initialized bytes that outlive `'a`.
    pub unsafe fn from_raw(bytes_ptr: *const u8, size: usize, delim: u8) -> Strtab<'a> {
        Strtab {
            delim: ctx::StrCtx::from(delim),
            bytes: slice::from_raw_parts(bytes_ptr, size),
        }
    }

    #[cfg(feature = "std")]
    pub fn parse(bytes: &'a [u8], offset: usize, len: usize, delim: u8) -> error::Result<Strtab<'a>> {
        let end = offset
            .checked_add(len)
            .ok_or(error::Error::OutsideBoundary)?;
        let bytes = bytes.get(offset..end).ok_or(error::Error::OutsideBoundary)?;
        Ok(Strtab {
            bytes,
            delim: ctx::StrCtx::from(delim),
        })
    }

    #[cfg(feature = "alloc")]
    pub fn to_vec(self) -> Vec<String> {
        let len = self.bytes.len();
        let mut strings = Vec::new();
        let mut i = 0;
        while i < len {
            let string = self.get(i);
            i += string.len() + 1;
            strings.push(String::from(string));
        }
        strings
    }

    pub fn get(&'a self, idx: usize) -> &'a str {
        get_str(idx, self.bytes, self.delim)
    }
}

impl fmt::Debug for Strtab<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "delim: {:?} {:?}", self.delim, str::from_utf8(self.bytes))
    }
}

impl Default for Strtab<'_> {
    fn default() -> Self {
        Strtab {
            bytes: &[],
            delim: ctx::StrCtx::default(),
        }
    }
}

impl Index<usize> for Strtab<'_> {
    type Output = str;

    fn index(&self, idx: usize) -> &Self::Output {
        get_str(idx, self.bytes, self.delim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_vec_no_final_null() {
        let bytes = b"\0printf\0memmove\0busta";
        let strtab = unsafe { Strtab::from_raw(bytes.as_ptr(), bytes.len(), 0x0) };
        let vec = strtab.to_vec();
        assert_eq!(vec.len(), 4);
        assert_eq!(vec, vec!["", "printf", "memmove", "busta"]);
    }

    #[test]
    fn as_vec_no_first_null_no_final_null() {
        let bytes = b"printf\0memmove\0busta";
        let strtab = unsafe { Strtab::from_raw(bytes.as_ptr(), bytes.len(), 0x0) };
        let vec = strtab.to_vec();
        assert_eq!(vec.len(), 3);
        assert_eq!(vec, vec!["printf", "memmove", "busta"]);
    }

    #[test]
    fn to_vec_final_null() {
        let bytes = b"\0printf\0memmove\0busta\0";
        let strtab = unsafe { Strtab::from_raw(bytes.as_ptr(), bytes.len(), 0x0) };
        let vec = strtab.to_vec();
        assert_eq!(vec.len(), 4);
        assert_eq!(vec, vec!["", "printf", "memmove", "busta"]);
    }

    #[test]
    fn to_vec_newline_delim() {
        let bytes = b"\nprintf\nmemmove\nbusta\n";
        let strtab = unsafe { Strtab::from_raw(bytes.as_ptr(), bytes.len(), b'\n') };
        let vec = strtab.to_vec();
        assert_eq!(vec.len(), 4);
        assert_eq!(vec, vec!["", "printf", "memmove", "busta"]);
    }
}
