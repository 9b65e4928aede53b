/// Parsing options for [`crate::pe::PeInfo::parse`].
#[derive(Debug, Copy, Clone, Default)]
pub struct ParseOptions {
    /// Whether to pull the CMS SignedData blob out of the attribute
    /// certificate table. Off by default; structure and digest ranges are
    /// computed either way.
    pub read_code_signature: bool,
}

impl ParseOptions {
    /// Enables extraction of the signature blob.
    pub fn with_code_signature(mut self) -> Self {
        self.read_code_signature = true;
        self
    }
}
