//! Authenticode signing-info extraction for Portable Executable images.
//!
//! A code-signing verifier needs three things from a Windows binary before
//! any cryptography happens: whether a signature is attached, the raw
//! PKCS#7 SignedData blob when one is, and the exact byte ranges the
//! signer digested. This crate parses the PE structure once and answers
//! all three, reproducing the Authenticode hashing recipe to the byte:
//! headers minus the CheckSum field and the SECURITY directory entry,
//! section bodies ordered by file offset, then any trailing data minus the
//! attribute certificate table itself.
//!
//! Malformed input is expected, not exceptional. Broken structure fails
//! with a typed error; semantically odd but parseable images (directories
//! pointing past end-of-file, zero-size sections) produce a plan whose
//! digest simply matches no signer.
//!
//! ```
//! use pe_authenticode::{is_pe, ParseOptions, PeInfo};
//!
//! # fn digest(bytes: &[u8]) -> pe_authenticode::Result<()> {
//! if is_pe(bytes) {
//!     let info = PeInfo::parse(bytes, &ParseOptions::default().with_code_signature())?;
//!     for range in &info.hash_ranges.ranges {
//!         // feed bytes[range.position..][..range.size] to the digest
//!     }
//!     if let Some(blob) = info.cms_signature_blob {
//!         // hand the SignedData to a CMS parser
//!         let _ = blob;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod pe;
pub mod range;

pub use crate::error::{Error, Result};
pub use crate::pe::options::ParseOptions;
pub use crate::pe::{is_pe, PeInfo};
pub use crate::range::{HashRanges, StreamRange};
