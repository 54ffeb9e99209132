//! A PE/COFF parser and structural analyzer.
//!
//! Given a byte blob (file or in-memory), [`pe::image::Image`] materializes a typed tree of
//! the image's headers, sections, data directories, embedded metadata, and signatures, plus
//! derived quantities such as the Authenticode hash, the image checksum, and the rich-header
//! hash. Parsing never panics on adversarial input: failures are reported as a
//! [`error::Error`], and soft violations are recorded as anomalies rather than aborting.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod container;
pub mod error;
pub mod pe;
pub mod strtab;
