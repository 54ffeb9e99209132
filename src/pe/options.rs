//! Parsing options structure for the PE parser.

/// Knobs controlling how much of an [`Image`](crate::pe::image::Image) gets parsed, and how
/// strictly, matching the keys recognized by `Image::parse`.
#[derive(Debug, Copy, Clone)]
pub struct ParseOptions {
    /// Wether the parser should resolve rvas or not. Default: true
    pub resolve_rva: bool,
    /// Skip certificate parsing and other deep, rarely-needed structures. Default: false
    pub fast: bool,
    /// Compute per-section Shannon entropy. Default: false
    pub section_entropy: bool,
    /// Skip PKCS#7 chain verification of attribute certificates. Default: false
    pub disable_cert_validation: bool,
    /// Skip the authentihash-vs-`SpcIndirectDataContent` comparison. Default: false
    pub disable_signature_validation: bool,
    /// Parse only the CLR header and metadata root, not the `#~`/`#-` tables stream.
    /// Default: false
    pub omit_clr_metadata: bool,
    /// Skip the resource directory tree entirely. Default: false
    pub omit_resource_directory: bool,
    /// Upper bound on `NumberOfSymbols` before the COFF symbol table is rejected.
    /// Default: 0x10000
    pub max_coff_symbols_count: u32,
    /// Upper bound on the total number of base-relocation entries. Default: 0x1000
    pub max_reloc_entries_count: u32,
    /// Upper bound on the number of export/import entries walked per table.
    /// Default: 0x1000
    pub max_export_entries_count: u32,
    /// Whether or not to parse attribute certificates.
    /// Set to false for in-memory representation, as the [loader does not map this info into
    /// memory](https://learn.microsoft.com/en-us/windows/win32/debug/pe-format#other-contents-of-the-file).
    /// For on-disk representations, leave as true.
    /// Default: true
    #[cfg(feature = "in_memory")]
    pub parse_attribute_certificates: bool,
}

impl ParseOptions {
    /// Returns a parse options structure with default values
    pub fn default() -> Self {
        ParseOptions {
            resolve_rva: true,
            fast: false,
            section_entropy: false,
            disable_cert_validation: false,
            disable_signature_validation: false,
            omit_clr_metadata: false,
            omit_resource_directory: false,
            max_coff_symbols_count: 0x10000,
            max_reloc_entries_count: 0x1000,
            max_export_entries_count: 0x1000,
            #[cfg(feature = "in_memory")]
            parse_attribute_certificates: true,
        }
    }
}
