//! Document parsers.

mod pdf;

pub use pdf::PdfParser;

use crate::error::IngestResult;

/// Text pulled out of one document.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Page texts joined with `--- Page N ---` markers.
    pub content: String,
    pub pages: usize,
    /// Pages that had any text; scanned pages have none.
    pub pages_with_text: usize,
}

/// Turns uploaded bytes into text.
pub trait DocumentParser: Send + Sync {
    /// `name` is the uploaded file name and only appears in errors.
    fn parse_bytes(&self, name: &str, bytes: &[u8]) -> IngestResult<ParsedDocument>;

    /// Lowercase file extensions this parser accepts.
    fn extensions(&self) -> &[&str];

    fn supports(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}
