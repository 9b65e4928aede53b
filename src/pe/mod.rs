//! Authenticode-relevant facts of a Portable Executable image.
//!
//! [`PeInfo::parse`] walks the structure once and returns everything a
//! code-signing verifier needs before any cryptography happens: whether a
//! signature is attached, the raw PKCS#7 blob when asked for it, the
//! digest range plan, and the identity fields of the file and optional
//! headers.

use log::debug;
use scroll::Pread;

pub mod authenticode;
pub mod certificate_table;
pub mod data_directories;
pub mod header;
pub mod optional_header;
pub mod options;
pub mod section_table;
pub(crate) mod utils;

use crate::error::{Error, Result};
use crate::range::{HashRanges, StreamRange};
use self::data_directories::SIZEOF_DATA_DIRECTORY;
use self::options::ParseOptions;

/// Immutable signing-relevant view of one PE image.
#[derive(Debug, PartialEq, Clone)]
pub struct PeInfo<'a> {
    /// Target architecture code from the file header.
    pub machine: u16,
    /// Flag set from the file header.
    pub characteristics: u16,
    /// Windows subsystem code from the optional header.
    pub subsystem: u16,
    /// Flag set from the optional header.
    pub dll_characteristics: u16,
    /// A non-empty, in-bounds certificate table directory exists.
    pub has_signature: bool,
    /// The PKCS#7 SignedData attached to the first certificate entry.
    /// Populated only under [`ParseOptions::read_code_signature`].
    pub cms_signature_blob: Option<&'a [u8]>,
    /// The CLR runtime header directory resolves to a non-zero file
    /// offset; the image is managed.
    pub has_metadata: bool,
    /// Where the 8-byte SECURITY directory entry itself sits on disk, for
    /// verifiers that re-serialise the image without its signature.
    pub security_data_directory_range: StreamRange,
    /// The digest plan.
    pub hash_ranges: HashRanges,
}

impl<'a> PeInfo<'a> {
    /// Parses the image and plans its digest ranges.
    ///
    /// Structural failures (bad magic, short reads, unsupported optional
    /// header) surface as errors. Semantic anomalies such as out-of-file
    /// directories or zero-size sections do not; the range plan absorbs
    /// them so the digest deterministically mismatches every signer.
    pub fn parse(bytes: &'a [u8], opts: &ParseOptions) -> Result<Self> {
        let header = header::Header::parse(bytes)?;
        let optional_header = header
            .optional_header
            .ok_or(Error::Truncated("optional header"))?;

        let optional_header_offset = header.dos_header.pe_pointer as usize
            + header::SIZEOF_PE_MAGIC
            + header::SIZEOF_COFF_HEADER;
        let checksum_range = StreamRange::new(
            (optional_header_offset + optional_header::OFFSET_OF_CHECKSUM) as u64,
            optional_header::SIZEOF_CHECKSUM as u64,
        );
        let data_directory_offset =
            optional_header_offset + optional_header.sizeof_fixed_fields();
        let security_data_directory_range = StreamRange::new(
            (data_directory_offset
                + data_directories::IMAGE_DIRECTORY_ENTRY_SECURITY * SIZEOF_DATA_DIRECTORY)
                as u64,
            SIZEOF_DATA_DIRECTORY as u64,
        );

        // section headers follow the declared optional-header size, which
        // may exceed the portion parsed above
        let mut offset =
            optional_header_offset + header.coff_header.size_of_optional_header as usize;
        let sections = header.coff_header.sections(bytes, &mut offset)?;

        let file_size = bytes.len() as u64;
        let certtable = *optional_header.data_directories.get_certificate_table();
        debug!(
            "machine {} certtable {:?}",
            header::machine_to_str(header.coff_header.machine),
            certtable
        );

        let hash_ranges = authenticode::hash_ranges(
            file_size,
            u64::from(optional_header.windows_fields.size_of_headers),
            checksum_range,
            security_data_directory_range,
            certtable,
            &sections,
        );

        let has_signature = matches!(
            certtable,
            Some(ct)
                if ct.virtual_address != 0
                    && ct.size != 0
                    && u64::from(ct.virtual_address) + u64::from(ct.size) <= file_size
        );

        let mut has_metadata = false;
        if let Some(clr) = optional_header.data_directories.get_clr_runtime_header() {
            has_metadata =
                utils::find_offset(clr.virtual_address as usize, clr.size as usize, &sections)
                    .map_or(false, |offset| offset != 0);
        }

        let mut cms_signature_blob = None;
        if opts.read_code_signature && has_signature {
            if let Some(ct) = certtable.as_ref() {
                let entry = certificate_table::first_certificate(bytes, ct)?;
                cms_signature_blob = Some(entry.certificate);
            }
        }

        Ok(PeInfo {
            machine: header.coff_header.machine,
            characteristics: header.coff_header.characteristics,
            subsystem: optional_header.windows_fields.subsystem,
            dll_characteristics: optional_header.windows_fields.dll_characteristics,
            has_signature,
            cms_signature_blob,
            has_metadata,
            security_data_directory_range,
            hash_ranges,
        })
    }
}

/// True iff the DOS and PE signatures are both in place. Anything short
/// or mismatched is simply not a PE; this never errors.
pub fn is_pe(bytes: &[u8]) -> bool {
    if !matches!(
        bytes.pread_with::<u16>(0, scroll::LE),
        Ok(header::DOS_MAGIC)
    ) {
        return false;
    }
    let pe_pointer = match bytes.pread_with::<u32>(header::PE_POINTER_OFFSET as usize, scroll::LE)
    {
        Ok(pointer) => pointer as usize,
        Err(_) => return false,
    };
    matches!(
        bytes.pread_with::<u32>(pe_pointer, scroll::LE),
        Ok(header::PE_MAGIC)
    )
}
