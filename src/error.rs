//! The crate's single closed error type.
//!
//! Variants split into three groups, matching the propagation policy: the PE/COFF-specific
//! fatal variants that abort `Image::parse`, the per-directory/anomaly catch-alls
//! (`Malformed`), and the two conversions every `scroll`/`std::io` call site relies on.

use alloc::string::String;
use core::fmt;
use core::result;

#[derive(Debug)]
pub enum Error {
    #[cfg(feature = "std")]
    Io(std::io::Error),
    Scroll(scroll::Error),
    /// Catch-all for violations that don't warrant their own variant.
    Malformed(String),
    /// The `MZ`/`ZM` signature is absent at the start of the image.
    DosMagicNotFound,
    /// The image is too short to contain even a DOS header and stub.
    TinyPe,
    /// `e_lfanew` is zero, or otherwise out of `[4, image_size]`.
    InvalidElfanewValue,
    /// The 4-byte value at `e_lfanew` is not `PE\0\0`.
    NtSignatureNotFound,
    /// The low word at `e_lfanew` is the OS/2 NE signature.
    Os2Signature,
    /// The low word at `e_lfanew` is the OS/2 LE signature.
    Os2LeSignature,
    /// The low word at `e_lfanew` is the VXD LX signature.
    VxdSignature,
    /// The low word at `e_lfanew` is the Terse Executable (TE) signature.
    TeSignature,
    /// Neither `0x10b` (PE32) nor `0x20b` (PE32+).
    NtOptionalHeaderMagicNotFound,
    /// `ImageBase` is not a multiple of 0x10000.
    ImageBaseNotAligned,
    /// `FileAlignment` is not a power of two in the accepted range.
    InvalidSectionFileAlignment,
    /// A computed read would end past the end of the image.
    OutsideBoundary,
    /// `NumberOfSymbols` exceeds the configured bound.
    TooManyCoffSymbols,
    /// A base relocation block's virtual address exceeds `SizeOfImage`.
    InvalidBaseRelocVA,
    /// A base relocation block's declared size exceeds `SizeOfImage`.
    InvalidBaseRelocBlockSize,
    /// The Security data directory entry's header could not be read.
    InvalidSecurityDataDirHeader,
    /// This is not a PE/COFF image at all (e.g. not a container this crate understands).
    NotPeFile,
    /// A length-prefixed table declares more entries than the remaining buffer can hold.
    BufferTooShort(usize, &'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "std")]
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::Scroll(err) => write!(f, "scroll error: {}", err),
            Error::Malformed(msg) => write!(f, "malformed entity: {}", msg),
            Error::DosMagicNotFound => write!(f, "DOS magic (MZ/ZM) not found"),
            Error::TinyPe => write!(f, "image is too small to be a PE file"),
            Error::InvalidElfanewValue => write!(f, "e_lfanew is out of bounds"),
            Error::NtSignatureNotFound => write!(f, "PE signature (PE\\0\\0) not found"),
            Error::Os2Signature => write!(f, "found an OS/2 NE signature instead of a PE one"),
            Error::Os2LeSignature => write!(f, "found an OS/2 LE signature instead of a PE one"),
            Error::VxdSignature => write!(f, "found a VXD LX signature instead of a PE one"),
            Error::TeSignature => write!(f, "found a Terse Executable signature instead of a PE one"),
            Error::NtOptionalHeaderMagicNotFound => {
                write!(f, "optional header magic is neither PE32 nor PE32+")
            }
            Error::ImageBaseNotAligned => write!(f, "ImageBase is not aligned to 0x10000"),
            Error::InvalidSectionFileAlignment => write!(f, "FileAlignment is invalid"),
            Error::OutsideBoundary => write!(f, "read would end outside the image"),
            Error::TooManyCoffSymbols => write!(f, "NumberOfSymbols exceeds the configured bound"),
            Error::InvalidBaseRelocVA => write!(f, "base relocation block VA exceeds SizeOfImage"),
            Error::InvalidBaseRelocBlockSize => {
                write!(f, "base relocation block size exceeds SizeOfImage")
            }
            Error::InvalidSecurityDataDirHeader => {
                write!(f, "security data directory entry header could not be read")
            }
            Error::NotPeFile => write!(f, "not a PE/COFF file"),
            Error::BufferTooShort(n, what) => {
                write!(f, "buffer is too short for {} {}", n, what)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<scroll::Error> for Error {
    fn from(err: scroll::Error) -> Self {
        Error::Scroll(err)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

pub type Result<T> = result::Result<T, Error>;
