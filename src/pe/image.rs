//! The `Image` aggregate and its `parse` orchestrator (spec §3, §6).
//!
//! Parses the header, then the section table, then walks all 16 data directories, isolating
//! each directory's failures (spec §7) rather than propagating them with `?`.

use alloc::string::String;
use alloc::vec::Vec;
use alloc::collections::BTreeMap;
use alloc::format;
use log::{debug, warn};

use crate::container;
use crate::error;
use crate::strtab::Strtab;

use super::anomaly::Anomaly;
use super::certificate_table::{self, CertificateDirectoryTable};
use super::characteristic;
use super::clr::{self, ClrData, TablesStream};
use super::data_directories::DataDirectory;
use super::debug::DebugData;
use super::delay_import::DelayImportData;
use super::dynreloc::DynRelocData;
use super::exception::ExceptionData;
use super::export::{Export, ExportData};
use super::header::{self, CoffHeader, DosHeader, DosStub, Header};
use super::import::{self, BoundImportDescriptor, Import, ImportData};
use super::load_config::LoadConfigData;
use super::optional_header::OptionalHeader;
use super::options::ParseOptions;
use super::relocation::RelocationData;
use super::resource::ResourceData;
use super::rich_header::RichHeader;
use super::section_table::{self, SectionTable};
use super::symbol::SymbolTable;
use super::tls::TlsData;
use super::utils;

/// `IMAGE_DIRECTORY_ENTRY_SECURITY`'s `virtual_address` is a file offset, not an RVA (spec
/// §4.13); everything else in [`super::data_directories::DataDirectories`] is RVA-addressed.
const SIZEOF_DATA_DIRECTORY_ENTRY: usize = 8;
const SECURITY_DIRECTORY_INDEX: usize = 4;

/// Per-directory parse results, named rather than type-erased so each accessor is statically
/// typed; [`Image::directories`] additionally exposes them through the closed
/// [`DirectoryValue`] sum type for exhaustive matching (spec §9 "Polymorphic directory values").
#[derive(Debug, Default)]
pub struct Directories<'a> {
    pub export: Option<ExportData<'a>>,
    pub exports: Vec<Export<'a>>,
    pub name: Option<&'a str>,
    pub import: Option<ImportData<'a>>,
    pub imports: Vec<Import<'a>>,
    pub libraries: Vec<&'a str>,
    pub bound_import: Vec<BoundImportDescriptor<'a>>,
    pub resource: Option<ResourceData<'a>>,
    pub exception: Option<ExceptionData<'a>>,
    pub certificates: Option<CertificateDirectoryTable<'a>>,
    pub base_relocations: Option<RelocationData>,
    pub debug: Option<DebugData<'a>>,
    pub architecture_reserved: Option<DataDirectory>,
    pub global_ptr_reserved: Option<DataDirectory>,
    pub tls: Option<TlsData<'a>>,
    pub load_config: Option<LoadConfigData<'a>>,
    pub dynamic_relocations: Option<DynRelocData<'a>>,
    pub delay_import: Option<DelayImportData<'a>>,
    pub clr: Option<ClrData<'a>>,
    pub clr_tables: Option<TablesStream<'a>>,
}

/// A directory's parsed payload, erased to a single closed sum type for callers that want to
/// iterate "every present directory" without naming each one (spec §9).
#[derive(Debug)]
#[non_exhaustive]
pub enum DirectoryValue<'a, 'b> {
    Export(&'b ExportData<'a>),
    Import(&'b ImportData<'a>),
    Resource(&'b ResourceData<'a>),
    Exception(&'b ExceptionData<'a>),
    Security(&'b CertificateDirectoryTable<'a>),
    BaseReloc(&'b RelocationData),
    Debug(&'b DebugData<'a>),
    Tls(&'b TlsData<'a>),
    LoadConfig(&'b LoadConfigData<'a>),
    BoundImport(&'b [BoundImportDescriptor<'a>]),
    DelayImport(&'b DelayImportData<'a>),
    Clr(&'b ClrData<'a>),
    ComDescriptor(&'b ClrData<'a>),
}

/// The parsed PE/COFF image: the root aggregate of spec §3's data model.
///
/// Construct with [`Image::new_from_bytes`] (or, with the `std` feature,
/// [`Image::new_from_path`]), then call [`Image::parse`]. The four `parse_*_header` steps are
/// individually callable and idempotent, in case a caller wants the headers without paying for
/// directory parsing.
#[derive(Debug)]
pub struct Image<'a> {
    bytes: &'a [u8],
    opts: ParseOptions,

    /// Total size of the underlying byte source.
    pub size: usize,
    /// `true` for PE32+ (64-bit), `false` for PE32.
    pub is_64: bool,

    pub dos_header: Option<DosHeader>,
    pub dos_stub: Option<DosStub>,
    pub signature: Option<u32>,
    pub coff_header: Option<CoffHeader>,
    pub optional_header: Option<OptionalHeader>,
    pub rich_header: Option<RichHeader>,

    pub sections: Vec<SectionTable>,
    pub coff_symbols: Option<SymbolTable<'a>>,
    pub coff_strings: Option<Strtab<'a>>,

    /// Byte offset of `SizeOfRawData`'s successor past every section -- the start of the
    /// overlay, if any (spec §4.4).
    pub overlay_offset: Option<usize>,

    pub anomalies: Vec<Anomaly>,
    pub directories: Directories<'a>,
}

impl<'a> Image<'a> {
    /// Borrows `bytes`; nothing is parsed until [`Image::parse`] (or one of the `parse_*`
    /// steps) is called.
    pub fn new_from_bytes(bytes: &'a [u8], opts: ParseOptions) -> Self {
        Image {
            bytes,
            opts,
            size: bytes.len(),
            is_64: false,
            dos_header: None,
            dos_stub: None,
            signature: None,
            coff_header: None,
            optional_header: None,
            rich_header: None,
            sections: Vec::new(),
            coff_symbols: None,
            coff_strings: None,
            overlay_offset: None,
            anomalies: Vec::new(),
            directories: Directories::default(),
        }
    }

    /// Parses the DOS header (spec §4.2 `parse_dos_header`). Idempotent.
    pub fn parse_dos_header(&mut self) -> error::Result<()> {
        if self.dos_header.is_some() {
            return Ok(());
        }
        let dos_header = DosHeader::parse(self.bytes, &mut self.anomalies)?;
        self.dos_stub = self
            .bytes
            .pread_with(header::DOS_STUB_OFFSET as usize, scroll::LE)
            .ok();
        debug!("{:#?}", dos_header);
        self.dos_header = Some(dos_header);
        Ok(())
    }

    /// Parses the NT headers (COFF + optional header, spec §4.2 `parse_nt_header`) and, unless
    /// the `in_memory` feature says otherwise, the rich header sitting in the DOS stub region.
    /// Idempotent; calls [`Image::parse_dos_header`] first if needed.
    pub fn parse_nt_header(&mut self) -> error::Result<()> {
        self.parse_dos_header()?;
        if self.coff_header.is_some() {
            return Ok(());
        }

        let header = Header::parse_with_anomalies(self.bytes, &mut self.anomalies)?;
        self.signature = Some(header.signature);
        self.coff_header = Some(header.coff_header);
        self.is_64 = header
            .optional_header
            .map(|oh| oh.container() == Ok(container::Container::Big))
            .unwrap_or(false);
        self.optional_header = header.optional_header;

        #[cfg(not(feature = "in_memory"))]
        let should_parse_rich_header = true;
        #[cfg(feature = "in_memory")]
        let should_parse_rich_header = self.opts.parse_attribute_certificates;

        if should_parse_rich_header {
            let e_lfanew = self.dos_header.map(|d| d.pe_pointer as usize).unwrap_or(0);
            self.rich_header = RichHeader::parse(self.bytes, e_lfanew, &mut self.anomalies);
        }

        Ok(())
    }

    /// Parses the section table (spec §4.4 `parse_section_header`) plus the COFF symbol and
    /// string tables that hang off the same header. Idempotent; calls
    /// [`Image::parse_nt_header`] first if needed.
    pub fn parse_section_header(&mut self) -> error::Result<()> {
        self.parse_nt_header()?;
        if !self.sections.is_empty() || self.coff_header.map(|c| c.number_of_sections) == Some(0)
        {
            return Ok(());
        }

        let coff_header = self.coff_header.ok_or(error::Error::NotPeFile)?;
        let file_alignment = self
            .optional_header
            .map(|oh| oh.windows_fields.file_alignment)
            .unwrap_or(0x200);
        let e_lfanew = self.dos_header.map(|d| d.pe_pointer as usize).unwrap_or(0);
        let mut offset = e_lfanew
            + header::SIZEOF_PE_MAGIC
            + header::SIZEOF_COFF_HEADER
            + coff_header.size_of_optional_header as usize;

        self.sections = coff_header.sections(
            self.bytes,
            &mut offset,
            file_alignment,
            &mut self.anomalies,
        )?;
        self.sections.sort_by_key(|s| s.virtual_address);
        self.overlay_offset = section_table::overlay_offset(&self.sections);

        if coff_header.number_of_symbol_table > self.opts.max_coff_symbols_count {
            self.anomalies.push(Anomaly::CoffSymbolsCount);
        } else {
            self.coff_symbols = coff_header.symbols(self.bytes)?;
            self.coff_strings = coff_header.strings(self.bytes)?;
        }

        Ok(())
    }

    /// Dispatches every non-zero data-directory slot to its parser (spec §4.5 and onward).
    /// Each directory is isolated: a failure is logged and recorded, but does not stop the
    /// others from being attempted (spec §7 "per-directory" tier). Idempotent; calls
    /// [`Image::parse_section_header`] first if needed.
    pub fn parse_data_directories(&mut self) -> error::Result<()> {
        self.parse_section_header()?;

        let Some(optional_header) = self.optional_header else {
            return Ok(());
        };
        let dd = optional_header.data_directories;
        let section_alignment = optional_header.windows_fields.section_alignment;
        let file_alignment = optional_header.windows_fields.file_alignment;
        let image_base = optional_header.windows_fields.image_base as usize;
        let size_of_image = optional_header.windows_fields.size_of_image as u64;
        let sections = &self.sections;
        let opts = &self.opts;
        let is_64 = self.is_64;

        if let Some(export_table) = *dd.get_export_table() {
            match ExportData::parse(
                self.bytes,
                export_table,
                sections,
                section_alignment,
                file_alignment,
                opts,
            ) {
                Ok(ed) => {
                    match Export::parse(
                        self.bytes,
                        &ed,
                        sections,
                        section_alignment,
                        file_alignment,
                        opts,
                    ) {
                        Ok(exports) => self.directories.exports = exports,
                        Err(err) => warn!("failed to synthesize exports: {}", err),
                    }
                    self.directories.name = ed.name;
                    self.directories.export = Some(ed);
                }
                Err(err) => warn!("failed to parse export directory: {}", err),
            }
        }

        if let Some(import_table) = *dd.get_import_table() {
            match ImportData::parse(
                self.bytes,
                import_table,
                sections,
                section_alignment,
                file_alignment,
                opts,
                is_64,
            ) {
                Ok(id) => {
                    let entry_size = if is_64 { 8 } else { 4 };
                    self.directories.imports = Import::parse(&id, entry_size);
                    let mut libraries = id
                        .import_data
                        .iter()
                        .map(|entry| entry.name)
                        .collect::<Vec<&'a str>>();
                    libraries.sort_unstable();
                    libraries.dedup();
                    self.directories.libraries = libraries;
                    self.directories.import = Some(id);
                }
                Err(err) => warn!("failed to parse import directory: {}", err),
            }
        }

        if let Some(resource_table) = *dd.get_resource_table() {
            if !opts.omit_resource_directory {
                match ResourceData::parse_with_opts(
                    self.bytes,
                    resource_table,
                    sections,
                    section_alignment,
                    file_alignment,
                    opts,
                ) {
                    Ok(rd) => self.directories.resource = Some(rd),
                    Err(err) => warn!("failed to parse resource directory: {}", err),
                }
            }
        }

        if let Some(exception_table) = *dd.get_exception_table() {
            match ExceptionData::parse_with_opts(
                self.bytes,
                exception_table,
                sections,
                section_alignment,
                file_alignment,
                opts,
            ) {
                Ok(ed) => self.directories.exception = Some(ed),
                Err(err) => warn!("failed to parse exception directory: {}", err),
            }
        }

        if let Some(certificate_table) = *dd.get_certificate_table() {
            #[cfg(feature = "in_memory")]
            let should_parse = opts.parse_attribute_certificates;
            #[cfg(not(feature = "in_memory"))]
            let should_parse = true;

            if should_parse && certificate_table.size > 0 {
                match certificate_table::enumerate_certificates(
                    self.bytes,
                    certificate_table.virtual_address,
                    certificate_table.size,
                ) {
                    Ok(certs) => self.directories.certificates = Some(certs),
                    Err(err) => warn!("failed to parse certificate table: {}", err),
                }
            }
        }

        if let Some(base_reloc_table) = *dd.get_base_relocation_table() {
            match RelocationData::parse_with_opts(
                self.bytes,
                &base_reloc_table,
                sections,
                section_alignment,
                file_alignment,
                size_of_image,
                opts,
            ) {
                Ok(rd) => self.directories.base_relocations = Some(rd),
                Err(err) => warn!("failed to parse base relocation directory: {}", err),
            }
        }

        if let Some(debug_table) = *dd.get_debug_table() {
            match DebugData::parse_with_opts(
                self.bytes,
                debug_table,
                sections,
                section_alignment,
                file_alignment,
                opts,
            ) {
                Ok(dd) => {
                    // spec §9 Open Questions: a POGO sub-signature of 0 is tolerated (observed on
                    // at least one real binary) but flagged rather than silently accepted.
                    if let Some(pogo) = dd.pogo_info.as_ref() {
                        if pogo.signature == 0 {
                            self.anomalies
                                .push(Anomaly::other("POGO debug entry has a zero sub-signature"));
                        }
                    }
                    self.directories.debug = Some(dd);
                }
                Err(err) => warn!("failed to parse debug directory: {}", err),
            }
        }

        self.directories.architecture_reserved = *dd.get_architecture();
        self.directories.global_ptr_reserved = *dd.get_global_ptr();
        for reserved in [
            self.directories.architecture_reserved,
            self.directories.global_ptr_reserved,
        ] {
            if let Some(reserved) = reserved {
                if reserved.virtual_address != 0 || reserved.size != 0 {
                    self.anomalies.push(Anomaly::ReservedDataDirectoryEntry);
                }
            }
        }

        if let Some(tls_table) = *dd.get_tls_table() {
            let tls_result = if is_64 {
                TlsData::parse_with_opts::<u64>(
                    self.bytes,
                    image_base,
                    &tls_table,
                    sections,
                    section_alignment,
                    file_alignment,
                    opts,
                )
            } else {
                TlsData::parse_with_opts::<u32>(
                    self.bytes,
                    image_base,
                    &tls_table,
                    sections,
                    section_alignment,
                    file_alignment,
                    opts,
                )
            };
            match tls_result {
                Ok(tls) => self.directories.tls = tls,
                Err(err) => warn!("failed to parse TLS directory: {}", err),
            }
        }

        if let Some(load_config_table) = *dd.get_load_config_table() {
            match LoadConfigData::parse_with_opts(
                self.bytes,
                load_config_table,
                sections,
                section_alignment,
                file_alignment,
                opts,
                is_64,
            ) {
                Ok(lc) => {
                    if let (Some(section), Some(offset)) = (
                        lc.dynamic_value_reloc_table_section(),
                        lc.dynamic_value_reloc_table_offset(),
                    ) {
                        if section > 0 {
                            if let Some(sect) = sections.get(section as usize - 1) {
                                let rva = sect.virtual_address + offset;
                                if let Some(file_offset) = utils::find_offset(
                                    rva as usize,
                                    sections,
                                    section_alignment,
                                    file_alignment,
                                    self.bytes.len(),
                                    opts,
                                ) {
                                    match DynRelocData::parse(self.bytes, is_64, file_offset) {
                                        Ok(dyn_relocs) => {
                                            self.directories.dynamic_relocations = Some(dyn_relocs)
                                        }
                                        Err(err) => {
                                            warn!("failed to parse dynamic relocations: {}", err)
                                        }
                                    }
                                }
                            }
                        }
                    }
                    self.directories.load_config = Some(lc);
                }
                Err(err) => warn!("failed to parse load config directory: {}", err),
            }
        }

        if let Some(bound_import_table) = *dd.get_bound_import_table() {
            match import::parse_bound_imports(self.bytes, bound_import_table, opts) {
                Ok(descriptors) => self.directories.bound_import = descriptors,
                Err(err) => warn!("failed to parse bound import directory: {}", err),
            }
        }

        // IAT (slot 12) carries no independent structure beyond what import parsing already
        // walks; it exists so the loader can find the thunk array to patch in place.

        if let Some(delay_import_table) = *dd.get_delay_import_descriptor() {
            match DelayImportData::parse_with_opts(
                self.bytes,
                delay_import_table,
                sections,
                section_alignment,
                file_alignment,
                opts,
                is_64,
            ) {
                Ok(did) => self.directories.delay_import = Some(did),
                Err(err) => warn!("failed to parse delay import directory: {}", err),
            }
        }

        if let Some(clr_header) = *dd.get_clr_runtime_header() {
            match ClrData::parse_with_opts(
                self.bytes,
                &clr_header,
                sections,
                section_alignment,
                file_alignment,
                opts,
            ) {
                Ok(clr_data) => {
                    if !opts.omit_clr_metadata {
                        match clr_data.tables(opts) {
                            Ok(tables) => self.directories.clr_tables = tables,
                            Err(err) => warn!("failed to parse CLR metadata tables: {}", err),
                        }
                    }
                    self.directories.clr = Some(clr_data);
                }
                Err(err) => warn!("failed to parse CLR runtime header: {}", err),
            }
        }

        Ok(())
    }

    /// Runs every parse step in order: DOS header, NT header (+ rich header), section header
    /// (+ COFF symbols), then every data directory. Idempotent as a whole, since each step is.
    pub fn parse(&mut self) -> error::Result<()> {
        self.parse_data_directories()
    }

    /// `true` iff [`super::characteristic::IMAGE_FILE_EXECUTABLE_IMAGE`] is set and the image
    /// is not a DLL.
    pub fn is_exe(&self) -> bool {
        self.coff_header
            .map(|c| characteristic::is_exe(c.characteristics))
            .unwrap_or(false)
    }

    /// `true` iff [`super::characteristic::IMAGE_FILE_DLL`] is set.
    pub fn is_dll(&self) -> bool {
        self.coff_header
            .map(|c| characteristic::is_dll(c.characteristics))
            .unwrap_or(false)
    }

    /// `true` iff [`super::characteristic::IMAGE_FILE_SYSTEM`] is set (kernel-mode drivers).
    pub fn is_driver(&self) -> bool {
        self.coff_header
            .map(|c| characteristic::is_driver(c.characteristics))
            .unwrap_or(false)
    }

    /// The region of the file past the highest `pointerToRawData + sizeOfRawData` across
    /// sections -- data appended after the mapped image (spec §4.4).
    pub fn overlay(&self) -> &'a [u8] {
        match self.overlay_offset {
            Some(offset) if offset < self.bytes.len() => &self.bytes[offset..],
            _ => &[],
        }
    }

    /// Byte offset of the overlay, or `-1` if the image has none.
    pub fn overlay_offset_signed(&self) -> i64 {
        self.overlay_offset.map(|o| o as i64).unwrap_or(-1)
    }

    /// Length in bytes of the overlay.
    pub fn overlay_length(&self) -> u64 {
        self.overlay().len() as u64
    }

    /// Recomputes the PE checksum (spec §4.14) over the whole image.
    pub fn checksum(&self) -> Option<u32> {
        let offset = self.checksum_field_offset()?;
        Some(super::checksum::compute(self.bytes, offset))
    }

    /// MD5 over the decrypted rich-header bytes (spec §4.14), if the image carries one.
    pub fn rich_header_hash(&self) -> Option<String> {
        self.rich_header.as_ref()?.hash(self.bytes)
    }

    /// Reads every known `StringFileInfo` field out of the `RT_VERSION` resource, if present
    /// (spec §6 `parse_version_resources`).
    pub fn parse_version_resources(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        let Some(resource) = self.directories.resource.as_ref() else {
            return map;
        };
        let Some(version) = resource.version_info.as_ref() else {
            return map;
        };
        let info = &version.string_info;
        let fields: [(&str, Option<String>); 12] = [
            ("Comments", info.comments()),
            ("CompanyName", info.company_name()),
            ("FileDescription", info.file_description()),
            ("FileVersion", info.file_version()),
            ("InternalName", info.internal_name()),
            ("LegalCopyright", info.legal_copyright()),
            ("LegalTrademarks", info.legal_trademarks()),
            ("OriginalFilename", info.original_filename()),
            ("PrivateBuild", info.private_build()),
            ("ProductName", info.product_name()),
            ("ProductVersion", info.product_version()),
            ("SpecialBuild", info.special_build()),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                map.insert(String::from(key), value);
            }
        }
        map
    }

    /// Byte ranges excluded from the Authenticode digest: the checksum DWORD, the certificate
    /// data-directory entry, and the certificate table region itself (spec §4.14).
    fn authenticode_ranges(&self) -> Vec<core::ops::Range<usize>> {
        let mut ranges = Vec::new();
        if let Some(offset) = self.checksum_field_offset() {
            ranges.push(offset..offset + 4);
        }
        if let Some(offset) = self.certificate_datadir_entry_offset() {
            ranges.push(offset..offset + SIZEOF_DATA_DIRECTORY_ENTRY);
        }
        if let Some(certificate_table) = self
            .optional_header
            .and_then(|oh| *oh.data_directories.get_certificate_table())
        {
            if certificate_table.size > 0 {
                let start = certificate_table.virtual_address as usize;
                let end = start + certificate_table.size as usize;
                if end <= self.bytes.len() {
                    ranges.push(start..end);
                }
            }
        }
        ranges.sort_by_key(|r| r.start);
        ranges
    }

    /// Hashes every byte of the image *not* covered by [`Image::authenticode_ranges`], in
    /// ascending order, with the given `Digest` implementation.
    #[cfg(feature = "codesign")]
    pub fn authentihash_with<D: sha2::Digest>(&self) -> Vec<u8> {
        let mut hasher = D::new();
        let mut cursor = 0usize;
        for range in self.authenticode_ranges() {
            if range.start > cursor {
                hasher.update(&self.bytes[cursor..range.start]);
            }
            cursor = core::cmp::max(cursor, range.end);
        }
        if cursor < self.bytes.len() {
            hasher.update(&self.bytes[cursor..]);
        }
        hasher.finalize().to_vec()
    }

    /// The standard Authenticode hash: SHA-256 over [`Image::authentihash_with`]'s complement
    /// ranges.
    #[cfg(feature = "codesign")]
    pub fn authentihash(&self) -> Vec<u8> {
        self.authentihash_with::<sha2::Sha256>()
    }

    /// Computes the Authentihash under every algorithm in `hashers`, in the same order, for
    /// comparison against a PKCS#7 `SignedData`'s declared digest algorithm (spec §6
    /// `authentihash_ext`).
    #[cfg(feature = "codesign")]
    pub fn authentihash_ext(&self, hashers: &[DigestAlgorithm]) -> Vec<Vec<u8>> {
        hashers
            .iter()
            .map(|algorithm| match algorithm {
                DigestAlgorithm::Sha256 => self.authentihash_with::<sha2::Sha256>(),
                DigestAlgorithm::Sha384 => self.authentihash_with::<sha2::Sha384>(),
                DigestAlgorithm::Sha512 => self.authentihash_with::<sha2::Sha512>(),
            })
            .collect()
    }

    /// Decodes and checks every `PkcsSignedData` attribute certificate against this image's
    /// Authentihash (spec §4.13). `decoder` is required (no PKCS#7 implementation ships with
    /// this crate, spec §1/§9); `chain` is optional and skipped entirely when `None` or when
    /// `disable_cert_validation` is set, per the "optional collaborator" design in §9.
    ///
    /// Nested signatures (the unsigned attribute named by
    /// [`certificate_table::NESTED_SIGNATURE_OID`]) are expected to already be linked into
    /// `SignedData::nested` by `decoder`; this method does not itself walk that attribute since
    /// doing so requires the same delegated ASN.1 decoding.
    #[cfg(feature = "codesign")]
    pub fn verify_signatures(
        &mut self,
        decoder: &dyn certificate_table::Pkcs7Decoder,
        chain: Option<&dyn certificate_table::ChainVerifier>,
    ) -> Vec<error::Result<certificate_table::SignatureVerification>> {
        let Some(certs) = self.directories.certificates.clone() else {
            return Vec::new();
        };
        let disable_chain = self.opts.disable_cert_validation;
        let disable_sig = self.opts.disable_signature_validation;
        let mut anomalies = Vec::new();
        let results = certs
            .iter()
            .filter(|cert| {
                cert.certificate_type == certificate_table::AttributeCertificateType::PkcsSignedData
            })
            .map(|cert| {
                let signed_data = cert.decode_signed_data(decoder)?;
                let signature_valid = if disable_sig {
                    None
                } else {
                    signed_data
                        .digest_algorithm
                        .to_authentihash_algorithm()
                        .map(|algorithm| {
                            self.authentihash_ext(&[algorithm])
                                .into_iter()
                                .next()
                                .map(|computed| computed == signed_data.message_digest)
                                .unwrap_or(false)
                        })
                };
                let chain_verified = if disable_chain {
                    None
                } else {
                    chain.and_then(|verifier| {
                        match verifier.verify_chain(&signed_data.signer, &signed_data.chain) {
                            Ok(verified) => Some(verified),
                            Err(err) => {
                                anomalies.push(Anomaly::other(format!(
                                    "certificate chain verification failed: {}",
                                    err
                                )));
                                None
                            }
                        }
                    })
                };
                Ok(certificate_table::SignatureVerification {
                    signed_data,
                    signature_valid,
                    chain_verified,
                })
            })
            .collect();
        self.anomalies.extend(anomalies);
        results
    }

    /// Absolute file offset of `IMAGE_OPTIONAL_HEADER::CheckSum`.
    fn checksum_field_offset(&self) -> Option<usize> {
        let dos_header = self.dos_header?;
        let standard_size = if self.is_64 {
            super::optional_header::SIZEOF_STANDARD_FIELDS_64
        } else {
            super::optional_header::SIZEOF_STANDARD_FIELDS_32
        };
        let windows_checksum_offset = if self.is_64 { 40 } else { 36 };
        Some(
            dos_header.pe_pointer as usize
                + header::SIZEOF_PE_MAGIC
                + header::SIZEOF_COFF_HEADER
                + standard_size
                + windows_checksum_offset,
        )
    }

    /// Absolute file offset of the Security data directory's own `{rva, size}` entry.
    fn certificate_datadir_entry_offset(&self) -> Option<usize> {
        let dos_header = self.dos_header?;
        let standard_size = if self.is_64 {
            super::optional_header::SIZEOF_STANDARD_FIELDS_64
        } else {
            super::optional_header::SIZEOF_STANDARD_FIELDS_32
        };
        let windows_size = if self.is_64 {
            super::optional_header::SIZEOF_WINDOWS_FIELDS_64
        } else {
            super::optional_header::SIZEOF_WINDOWS_FIELDS_32
        };
        Some(
            dos_header.pe_pointer as usize
                + header::SIZEOF_PE_MAGIC
                + header::SIZEOF_COFF_HEADER
                + standard_size
                + windows_size
                + SECURITY_DIRECTORY_INDEX * SIZEOF_DATA_DIRECTORY_ENTRY,
        )
    }

    /// Every present directory, erased to [`DirectoryValue`] for exhaustive matching (spec §9).
    pub fn directories<'b>(&'b self) -> Vec<DirectoryValue<'a, 'b>> {
        let d = &self.directories;
        let mut out = Vec::new();
        if let Some(v) = d.export.as_ref() {
            out.push(DirectoryValue::Export(v));
        }
        if let Some(v) = d.import.as_ref() {
            out.push(DirectoryValue::Import(v));
        }
        if let Some(v) = d.resource.as_ref() {
            out.push(DirectoryValue::Resource(v));
        }
        if let Some(v) = d.exception.as_ref() {
            out.push(DirectoryValue::Exception(v));
        }
        if let Some(v) = d.certificates.as_ref() {
            out.push(DirectoryValue::Security(v));
        }
        if let Some(v) = d.base_relocations.as_ref() {
            out.push(DirectoryValue::BaseReloc(v));
        }
        if let Some(v) = d.debug.as_ref() {
            out.push(DirectoryValue::Debug(v));
        }
        if let Some(v) = d.tls.as_ref() {
            out.push(DirectoryValue::Tls(v));
        }
        if let Some(v) = d.load_config.as_ref() {
            out.push(DirectoryValue::LoadConfig(v));
        }
        if !d.bound_import.is_empty() {
            out.push(DirectoryValue::BoundImport(&d.bound_import));
        }
        if let Some(v) = d.delay_import.as_ref() {
            out.push(DirectoryValue::DelayImport(v));
        }
        if let Some(v) = d.clr.as_ref() {
            out.push(DirectoryValue::Clr(v));
            out.push(DirectoryValue::ComDescriptor(v));
        }
        out
    }
}

/// A digest algorithm selectable for [`Image::authentihash_ext`]; PKCS#7 `SignedData` names
/// one of these in `DigestInfo.DigestAlgorithm` (spec §4.14).
#[cfg(feature = "codesign")]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

#[cfg(feature = "std")]
impl Image<'static> {
    /// Reads `path` into an owned, leaked buffer and parses it as an [`Image`] (spec §6
    /// `new_from_path`). Thin convenience over [`std::fs::read`] + [`Image::new_from_bytes`];
    /// callers who want to manage the buffer's lifetime themselves should read the file and
    /// call [`Image::new_from_bytes`] directly.
    pub fn new_from_path(
        path: impl AsRef<std::path::Path>,
        opts: ParseOptions,
    ) -> error::Result<Self> {
        let bytes: &'static [u8] = Vec::leak(std::fs::read(path)?);
        Ok(Image::new_from_bytes(bytes, opts))
    }
}

use scroll::Pread;
