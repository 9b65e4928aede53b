use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The DOS or PE signature is missing; the input is not a PE image.
    #[error("not a PE image")]
    NotPe,
    /// The stream ended before the named structure was complete.
    #[error("truncated image: {0}")]
    Truncated(&'static str),
    /// The optional-header magic is neither PE32 nor PE32+.
    #[error("unsupported optional header magic {0:#06x}")]
    UnsupportedOptionalHeader(u16),
    /// The attribute certificate does not wrap PKCS#7 signed data.
    #[error("unsupported attribute certificate type {0:#06x}")]
    UnsupportedCertType(u16),
}

impl From<scroll::Error> for Error {
    fn from(_: scroll::Error) -> Error {
        Error::Truncated("unexpected end of stream")
    }
}

pub type Result<T> = core::result::Result<T, Error>;
