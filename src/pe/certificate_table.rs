/// Implements parsing of pe32's Attribute Certificate Table
/// See reference:
/// https://learn.microsoft.com/en-us/windows/win32/debug/pe-format#the-attribute-certificate-table-image-only
/// https://learn.microsoft.com/en-us/windows/win32/api/wintrust/ns-wintrust-win_certificate
use crate::error;
use log::debug;
use scroll::{ctx, Pread, Pwrite, SizeWith};

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::utils::{align_to, pad};

#[repr(u16)]
#[non_exhaustive]
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum AttributeCertificateRevision {
    /// WIN_CERT_REVISION_1_0
    Revision1_0 = 0x0100,
    /// WIN_CERT_REVISION_2_0
    Revision2_0 = 0x0200,
}

impl TryFrom<u16> for AttributeCertificateRevision {
    type Error = error::Error;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Ok(match value {
            x if x == AttributeCertificateRevision::Revision1_0 as u16 => {
                AttributeCertificateRevision::Revision1_0
            }
            x if x == AttributeCertificateRevision::Revision2_0 as u16 => {
                AttributeCertificateRevision::Revision2_0
            }
            _ => {
                return Err(error::Error::Malformed(
                    "Invalid certificate attribute revision".to_string(),
                ))
            }
        })
    }
}

#[repr(u16)]
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum AttributeCertificateType {
    /// WIN_CERT_TYPE_X509
    X509 = 0x0001,
    /// WIN_CERT_TYPE_PKCS_SIGNED_DATA
    PkcsSignedData = 0x0002,
    /// WIN_CERT_TYPE_RESERVED_1
    Reserved1 = 0x0003,
    /// WIN_CERT_TYPE_TS_STACK_SIGNED
    TsStackSigned = 0x0004,
    /// WIN_CERT_TYPE_EFI_PKCS115
    EfiPkcs115 = 0xEF0,
    /// WIN_CERT_TYPE_EFI_GUID
    EfiGuid = 0x0EF1,
}

impl TryFrom<u16> for AttributeCertificateType {
    type Error = error::Error;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Ok(match value {
            x if x == AttributeCertificateType::X509 as u16 => AttributeCertificateType::X509,
            x if x == AttributeCertificateType::PkcsSignedData as u16 => {
                AttributeCertificateType::PkcsSignedData
            }
            x if x == AttributeCertificateType::Reserved1 as u16 => {
                AttributeCertificateType::Reserved1
            }
            x if x == AttributeCertificateType::TsStackSigned as u16 => {
                AttributeCertificateType::TsStackSigned
            }
            _ => {
                return Err(error::Error::Malformed(
                    "Invalid attribute certificate type".to_string(),
                ))
            }
        })
    }
}

/// WIN_CERTIFICATE header structure
/// It's useful beyond only parsing PE certificates
/// This can be used to parse EFI variable structures containing certificates for example.
/// Example: https://dox.ipxe.org/structWIN__CERTIFICATE__UEFI__GUID.html
#[derive(Debug, Clone, Pread, Pwrite, SizeWith)]
pub struct AttributeCertificateHeader {
    /// dwLength
    pub length: u32,
    /// wRevision
    pub revision: u16,
    /// wCertificateType
    pub certificate_type: u16,
}

/// An alternative name for the WIN_CERTIFICATE header structure.
pub type WindowsCertificateHeader = AttributeCertificateHeader;

/// Static size of the [`AttributeCertificateHeader`] structure
/// Also known under the name WIN_CERTIFICATE header structure.
pub const ATTRIBUTE_CERTIFICATE_HEADER_SIZEOF: usize =
    core::mem::size_of::<AttributeCertificateHeader>();

/// PE-specific structure to hold certificates to associate verifiable statements about this image.
/// The header [`AttributeCertificateHeader`] is inlined in there.
#[derive(Debug, Clone)]
pub struct AttributeCertificate<'a> {
    pub length: u32,
    pub revision: AttributeCertificateRevision,
    pub certificate_type: AttributeCertificateType,
    pub certificate: &'a [u8],
}

impl<'a> AttributeCertificate<'a> {
    /// Takes the raw bytes constituting a certificate
    /// and wrap it into an AttributeCertificate.
    /// Caller is responsible for ensuring the consistency between
    /// the certificate type and what is in the certificate (DER, etc.).
    pub fn from_bytes(
        certificate: &'a [u8],
        revision: AttributeCertificateRevision,
        certificate_type: AttributeCertificateType,
    ) -> error::Result<Self> {
        // SAFETY: `ATTRIBUTE_CERTIFICATE_HEADER_SIZEOF` should always fit in a
        // `u32`
        // as its value fits in a `u8`.
        let length = (align_to(certificate.len(), 8usize) + ATTRIBUTE_CERTIFICATE_HEADER_SIZEOF)
            .try_into()
            .map_err(|_| {
                error::Error::Malformed(
                    "Attribute certificate length does not fit in a `u32`".to_string(),
                )
            })?;

        debug_assert!(length as usize >= certificate.len(), "Attribute certificate length cannot be smaller than the actual certificate contents length (potentially unaligned)");

        Ok(Self {
            length,
            revision,
            certificate_type,
            certificate,
        })
    }

    pub fn parse(
        bytes: &'a [u8],
        current_offset: &mut usize,
    ) -> Result<AttributeCertificate<'a>, error::Error> {
        debug!("reading certificate header at {current_offset}");
        // `current_offset` is moved sizeof(AttributeCertificateHeader) = 8 bytes further.
        let header: AttributeCertificateHeader = bytes.gread_with(current_offset, scroll::LE)?;
        let cert_size = usize::try_from(
            header
                .length
                .saturating_sub(ATTRIBUTE_CERTIFICATE_HEADER_SIZEOF as u32),
        )
        .map_err(|_err| {
            error::Error::Malformed("Attribute certificate size do not fit in usize".to_string())
        })?;

        debug!(
            "parsing certificate header {:#?}, predicted certificate size: {}",
            header, cert_size
        );

        if let Some(bytes) = bytes.get(*current_offset..(*current_offset + cert_size)) {
            let attr = Self {
                length: header.length,
                revision: header.revision.try_into()?,
                certificate_type: header.certificate_type.try_into()?,
                certificate: bytes,
            };
            // Moving past the certificate data.
            // Prevent the current_offset to wrap and ensure current_offset is strictly increasing.
            *current_offset = current_offset.saturating_add(cert_size);
            // Round to the next 8-bytes.
            *current_offset = (*current_offset + 7) & !7;
            Ok(attr)
        } else {
            Err(error::Error::Malformed(format!(
                "Unable to extract certificate. Probably cert_size:{} is malformed",
                cert_size
            )))
        }
    }
}

impl<'a> ctx::TryIntoCtx<scroll::Endian> for &AttributeCertificate<'a> {
    type Error = error::Error;

    /// Writes an aligned attribute certificate in the buffer.
    fn try_into_ctx(self, bytes: &mut [u8], ctx: scroll::Endian) -> Result<usize, Self::Error> {
        let offset = &mut 0;
        debug_assert!(
            (self.length - ATTRIBUTE_CERTIFICATE_HEADER_SIZEOF as u32) % 8 == 0,
            "Attribute certificate's length field is unaligned"
        );
        debug_assert!(
            bytes.len() >= self.length as usize,
            "Insufficient buffer to write an aligned certificate"
        );
        bytes.gwrite_with(self.length, offset, ctx)?;
        bytes.gwrite_with(self.revision as u16, offset, ctx)?;
        bytes.gwrite_with(self.certificate_type as u16, offset, ctx)?;
        // Extend by zero the buffer until it is aligned on a quadword (16 bytes), according to
        // spec:
        // > If the bCertificate content does not end on a quadword boundary, the attribute
        // > certificate entry is padded with zeros, from the end of bCertificate to the next
        // > quadword boundary.
        let maybe_certificate_padding = pad(self.certificate.len(), Some(8usize));
        bytes.gwrite(self.certificate, offset)?;
        if let Some(cert_padding) = maybe_certificate_padding {
            debug!(
                "Extending the buffer ({}) at offset {} with {} extra bytes for quadword alignment",
                bytes.len(),
                *offset,
                cert_padding.len()
            );

            bytes.gwrite(&cert_padding[..], offset)?;
        }

        Ok(*offset)
    }
}

pub type CertificateDirectoryTable<'a> = Vec<AttributeCertificate<'a>>;

/// Identity of a certificate's issuer or subject, and the bounds of its validity period, as
/// extracted from an X.509 certificate embedded in a PKCS#7 `SignedData` (spec §4.13).
///
/// Field values are caller-supplied strings/timestamps, not parsed by this crate: producing one
/// of these requires decoding DER, which is delegated to a [`Pkcs7Decoder`] (spec §9 "Expose it
/// behind a trait").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertInfo {
    pub issuer: String,
    pub subject: String,
    pub serial_number: Vec<u8>,
    /// Start of the certificate's validity period, as seconds since the Unix epoch.
    pub not_before: i64,
    /// End of the certificate's validity period, as seconds since the Unix epoch.
    pub not_after: i64,
    /// Dotted-decimal OID of the certificate's signature algorithm.
    pub signature_algorithm: String,
    /// Dotted-decimal OID of the certificate's public key algorithm.
    pub public_key_algorithm: String,
}

/// The hash algorithm named by a `SignedData`'s `DigestInfo.DigestAlgorithm` (spec §4.13,
/// §4.14). Only the variants [`Image::authentihash_ext`](crate::pe::image::Image::authentihash_ext)
/// can compute are distinguished from "declared but unsupported here".
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    /// An OID this crate doesn't recognize; carried through rather than rejected.
    Unknown,
}

#[cfg(feature = "codesign")]
impl DigestAlgorithm {
    /// Maps to [`crate::pe::image::DigestAlgorithm`], the subset
    /// [`Image::authentihash_ext`](crate::pe::image::Image::authentihash_ext) can actually
    /// compute. `None` for algorithms this crate has no hasher for (spec §4.14 only wires
    /// SHA-256/384/512 via `sha2`).
    pub fn to_authentihash_algorithm(self) -> Option<super::image::DigestAlgorithm> {
        match self {
            DigestAlgorithm::Sha256 => Some(super::image::DigestAlgorithm::Sha256),
            DigestAlgorithm::Sha384 => Some(super::image::DigestAlgorithm::Sha384),
            DigestAlgorithm::Sha512 => Some(super::image::DigestAlgorithm::Sha512),
            DigestAlgorithm::Md5 | DigestAlgorithm::Sha1 | DigestAlgorithm::Unknown => None,
        }
    }
}

/// The `SpcIndirectDataContent` digest and the signer's certificate, decoded out of a PKCS#7
/// `SignedData` (spec §4.13). Nested (counter-)signatures are linked through `nested`, recursed
/// from the unsigned attribute with OID `1.3.6.1.4.1.311.2.4.1`.
#[derive(Debug, Clone)]
pub struct SignedData {
    pub digest_algorithm: DigestAlgorithm,
    /// `SpcIndirectDataContent.messageDigest`, to compare against an independently computed
    /// Authentihash.
    pub message_digest: Vec<u8>,
    pub signer: CertInfo,
    /// The certificate chain presented alongside the signer, in the order the signer supplied
    /// them (not necessarily root-to-leaf).
    pub chain: Vec<CertInfo>,
    pub nested: Option<Box<SignedData>>,
}

/// The OID Microsoft uses for a nested (counter-)signature, carried as an unsigned PKCS#7
/// attribute (spec §4.13 "Nested signatures").
pub const NESTED_SIGNATURE_OID: &str = "1.3.6.1.4.1.311.2.4.1";

/// Decodes the DER payload of a `type == PkcsSignedData` [`AttributeCertificate`] into a
/// [`SignedData`] (spec §4.13, §9). No implementation ships with this crate: ASN.1/PKCS#7/X.509
/// parsing is out of scope (spec §1 Non-goals), so callers plug in a decoder built on whatever
/// ASN.1 stack they already trust.
pub trait Pkcs7Decoder {
    fn decode_signed_data(&self, der: &[u8]) -> error::Result<SignedData>;
}

/// Verifies a signer's certificate chain against a trust root store (spec §4.13 "Chain
/// validity", §9 "Certificate refresh side-effect"). Optional and disableable
/// (`disable_cert_validation`); its absence does not prevent parsing, and a failure should be
/// surfaced as an anomaly rather than a parse error.
pub trait ChainVerifier {
    fn verify_chain(&self, signer: &CertInfo, chain: &[CertInfo]) -> error::Result<bool>;
}

/// The outcome of checking one [`AttributeCertificate`] against an [`Image`](crate::pe::image::Image)'s
/// computed Authentihash (spec §4.13).
#[derive(Debug, Clone)]
pub struct SignatureVerification {
    pub signed_data: SignedData,
    /// `Some(true)` iff the Authentihash computed under `signed_data.digest_algorithm` matches
    /// `signed_data.message_digest`. `None` when that algorithm isn't one this crate can hash
    /// (spec §4.14 only wires SHA-256/384/512; MD5/SHA-1/unrecognized OIDs report `None` here
    /// rather than a false verdict).
    pub signature_valid: Option<bool>,
    /// Result of an optional [`ChainVerifier`]; `None` when no verifier was supplied or chain
    /// validation was disabled.
    pub chain_verified: Option<bool>,
}

impl<'a> AttributeCertificate<'a> {
    /// Decodes this entry's payload as a PKCS#7 `SignedData`, delegating to `decoder`.
    /// Returns `Err` if this entry isn't `AttributeCertificateType::PkcsSignedData`.
    pub fn decode_signed_data(&self, decoder: &dyn Pkcs7Decoder) -> error::Result<SignedData> {
        if self.certificate_type != AttributeCertificateType::PkcsSignedData {
            return Err(error::Error::Malformed(
                "attribute certificate is not PKCS#7 SignedData".to_string(),
            ));
        }
        decoder.decode_signed_data(self.certificate)
    }
}

pub(crate) fn enumerate_certificates(
    bytes: &[u8],
    table_virtual_address: u32,
    table_size: u32,
) -> Result<CertificateDirectoryTable, error::Error> {
    let table_start_offset = usize::try_from(table_virtual_address).map_err(|_err| {
        error::Error::Malformed("Certificate table RVA do not fit in a usize".to_string())
    })?;
    // Here, we do not want wrapping semantics as it means that a too big table size or table start
    // offset will provide table_end_offset such that table_end_offset < table_start_offset, which
    // is not desirable at all.
    let table_end_offset =
        table_start_offset.saturating_add(usize::try_from(table_size).map_err(|_err| {
            error::Error::Malformed("Certificate table size do not fit in a usize".to_string())
        })?);
    let mut current_offset = table_start_offset;
    let mut attrs = vec![];

    // End offset cannot be further than the binary we have at hand.
    if table_end_offset > bytes.len() {
        return Err(error::Error::Malformed(
            "End of attribute certificates table is after the end of the PE binary".to_string(),
        ));
    }

    // This is guaranteed to terminate, either by a malformed error being returned
    // or because current_offset >= table_end_offset by virtue of current_offset being strictly
    // increasing through `AttributeCertificate::parse`.
    while current_offset < table_end_offset {
        attrs.push(AttributeCertificate::parse(bytes, &mut current_offset)?);
    }

    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds one attribute certificate entry, with `dwLength` set to the *unpadded* size
    /// (header + payload, matching what `AttributeCertificate::parse` expects) but the
    /// backing buffer itself rounded up to the next 8-byte boundary, so entries built by this
    /// helper can be concatenated back-to-back.
    fn win_certificate(payload: &[u8], certificate_type: u16) -> Vec<u8> {
        let unpadded_len = 8 + payload.len();
        let padded_len = (unpadded_len + 7) / 8 * 8;
        let mut buf = vec![0u8; padded_len];
        buf.pwrite_with(unpadded_len as u32, 0, scroll::LE).unwrap();
        buf.pwrite_with(
            AttributeCertificateRevision::Revision2_0 as u16,
            4,
            scroll::LE,
        )
        .unwrap();
        buf.pwrite_with(certificate_type, 6, scroll::LE).unwrap();
        buf[8..8 + payload.len()].copy_from_slice(payload);
        buf
    }

    #[test]
    fn enumerate_certificates_reads_single_entry() {
        let payload = [0xAAu8; 5];
        let buf = win_certificate(&payload, AttributeCertificateType::X509 as u16);

        let certs = enumerate_certificates(&buf, 0, buf.len() as u32).unwrap();
        assert_eq!(certs.len(), 1);
        assert_eq!(certs[0].certificate_type, AttributeCertificateType::X509);
        assert_eq!(certs[0].certificate, &payload[..]);
    }

    #[test]
    fn enumerate_certificates_reads_back_to_back_entries() {
        let mut buf = win_certificate(&[1u8, 2, 3], AttributeCertificateType::X509 as u16);
        buf.extend(win_certificate(
            &[4u8, 5, 6, 7],
            AttributeCertificateType::PkcsSignedData as u16,
        ));

        let certs = enumerate_certificates(&buf, 0, buf.len() as u32).unwrap();
        assert_eq!(certs.len(), 2);
        assert_eq!(certs[0].certificate, &[1u8, 2, 3][..]);
        assert_eq!(
            certs[1].certificate_type,
            AttributeCertificateType::PkcsSignedData
        );
        assert_eq!(certs[1].certificate, &[4u8, 5, 6, 7][..]);
    }

    #[test]
    fn enumerate_certificates_rejects_table_past_end_of_image() {
        let buf = vec![0u8; 4];
        let err = enumerate_certificates(&buf, 0, 100).unwrap_err();
        assert!(matches!(err, error::Error::Malformed(_)));
    }

    struct StubDecoder(SignedData);

    impl Pkcs7Decoder for StubDecoder {
        fn decode_signed_data(&self, _der: &[u8]) -> error::Result<SignedData> {
            Ok(self.0.clone())
        }
    }

    fn sample_cert_info() -> CertInfo {
        CertInfo {
            issuer: "CN=Test Root".to_string(),
            subject: "CN=Test Leaf".to_string(),
            serial_number: vec![1, 2, 3],
            not_before: 0,
            not_after: 1_893_456_000,
            signature_algorithm: "1.2.840.113549.1.1.11".to_string(),
            public_key_algorithm: "1.2.840.113549.1.1.1".to_string(),
        }
    }

    #[test]
    fn decode_signed_data_delegates_to_decoder() {
        let payload = [0u8; 16];
        let cert = AttributeCertificate::from_bytes(
            &payload,
            AttributeCertificateRevision::Revision2_0,
            AttributeCertificateType::PkcsSignedData,
        )
        .unwrap();

        let stub = StubDecoder(SignedData {
            digest_algorithm: DigestAlgorithm::Sha256,
            message_digest: vec![0xAB; 32],
            signer: sample_cert_info(),
            chain: Vec::new(),
            nested: None,
        });

        let signed = cert.decode_signed_data(&stub).unwrap();
        assert_eq!(signed.digest_algorithm, DigestAlgorithm::Sha256);
        assert_eq!(signed.signer.subject, "CN=Test Leaf");
    }

    #[test]
    fn decode_signed_data_rejects_non_pkcs7_entries() {
        let payload = [0u8; 16];
        let cert = AttributeCertificate::from_bytes(
            &payload,
            AttributeCertificateRevision::Revision2_0,
            AttributeCertificateType::X509,
        )
        .unwrap();

        let stub = StubDecoder(SignedData {
            digest_algorithm: DigestAlgorithm::Sha256,
            message_digest: Vec::new(),
            signer: sample_cert_info(),
            chain: Vec::new(),
            nested: None,
        });

        let err = cert.decode_signed_data(&stub).unwrap_err();
        assert!(matches!(err, error::Error::Malformed(_)));
    }

    #[cfg(feature = "codesign")]
    #[test]
    fn digest_algorithm_maps_only_sha2_family_to_authentihash() {
        assert!(DigestAlgorithm::Sha256.to_authentihash_algorithm().is_some());
        assert!(DigestAlgorithm::Sha384.to_authentihash_algorithm().is_some());
        assert!(DigestAlgorithm::Sha512.to_authentihash_algorithm().is_some());
        assert!(DigestAlgorithm::Md5.to_authentihash_algorithm().is_none());
        assert!(DigestAlgorithm::Sha1.to_authentihash_algorithm().is_none());
        assert!(DigestAlgorithm::Unknown.to_authentihash_algorithm().is_none());
    }
}
