//! PDF document parser.

use super::{DocumentParser, ParsedDocument};
use crate::error::{IngestError, IngestResult};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Parser for PDF files.
pub struct PdfParser;

impl PdfParser {
    /// Create a new PDF parser.
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser for PdfParser {
    fn parse_bytes(&self, name: &str, bytes: &[u8]) -> IngestResult<ParsedDocument> {
        debug!("Parsing PDF: {} ({} bytes)", name, bytes.len());

        let pages = extract_pages(name, bytes)?;
        if pages.is_empty() {
            return Err(IngestError::EmptyDocument(name.to_string()));
        }

        let (content, pages_with_text) = assemble_pages(&pages);
        if pages_with_text == 0 {
            warn!("No extractable text in {}", name);
            return Err(IngestError::NoExtractableText(name.to_string()));
        }

        debug!(
            "Extracted {} characters from {} of {} pages of {}",
            content.len(),
            pages_with_text,
            pages.len(),
            name
        );

        Ok(ParsedDocument {
            content,
            pages: pages.len(),
            pages_with_text,
        })
    }

    fn extensions(&self) -> &[&str] {
        &["pdf"]
    }
}

/// Extract one string per page. `pdf_extract` panics on some malformed
/// input, so the call runs behind `catch_unwind`.
fn extract_pages(name: &str, bytes: &[u8]) -> IngestResult<Vec<String>> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(IngestError::ParseError {
            name: name.to_string(),
            message: format!("Failed to extract text from PDF: {}", e),
        }),
        Err(_) => Err(IngestError::ParseError {
            name: name.to_string(),
            message: "PDF extraction panicked (malformed document)".to_string(),
        }),
    }
}

/// Join non-blank pages, each preceded by a `--- Page N ---` marker.
///
/// Returns the text and the number of pages that contributed to it.
fn assemble_pages(pages: &[String]) -> (String, usize) {
    let mut text = String::new();
    let mut used = 0;

    for (index, page) in pages.iter().enumerate() {
        let cleaned = clean_pdf_text(page);
        if cleaned.trim().is_empty() {
            continue;
        }
        text.push_str(&format!("\n--- Page {} ---\n{}\n", index + 1, cleaned));
        used += 1;
    }

    (text, used)
}

/// Clean up extracted PDF text.
fn clean_pdf_text(text: &str) -> String {
    text.lines()
        // Remove trailing whitespace
        .map(|line| line.trim_end())
        // Collapse runs of empty lines into one
        .fold(Vec::new(), |mut acc: Vec<&str>, line| {
            let last_was_empty = acc.last().map(|s| s.is_empty()).unwrap_or(false);
            if !(line.is_empty() && last_was_empty) {
                acc.push(line);
            }
            acc
        })
        .join("\n")
        .trim_matches('\n')
        // Form feeds mark page breaks; pages are already separated
        .replace('\x0C', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINEMATICS_PDF: &[u8] = include_bytes!("../../tests/fixtures/kinematics.pdf");

    #[test]
    fn test_parse_one_page_pdf() {
        let parser = PdfParser::new();
        let parsed = parser.parse_bytes("kinematics.pdf", KINEMATICS_PDF).unwrap();

        assert_eq!(parsed.content, "\n--- Page 1 ---\nKinematics\n");
        assert_eq!(parsed.pages, 1);
        assert_eq!(parsed.pages_with_text, 1);
    }

    #[test]
    fn test_clean_pdf_text() {
        let messy = "  Hello  \n\n\n\nWorld  \n\nTest\x0C";
        let cleaned = clean_pdf_text(messy);
        assert!(!cleaned.contains("\n\n\n"));
        assert!(cleaned.starts_with("  Hello"));
        assert!(!cleaned.contains('\x0C'));
    }

    #[test]
    fn test_assemble_pages_numbers_from_one_and_skips_blank() {
        let pages = vec![
            "Newton's laws".to_string(),
            "   \n  ".to_string(),
            "Work and energy".to_string(),
        ];

        let (text, used) = assemble_pages(&pages);

        assert_eq!(used, 2);
        assert_eq!(
            text,
            "\n--- Page 1 ---\nNewton's laws\n\n--- Page 3 ---\nWork and energy\n"
        );
    }

    #[test]
    fn test_assemble_all_blank() {
        let pages = vec![String::new(), "\n\n".to_string()];
        let (text, used) = assemble_pages(&pages);
        assert_eq!(used, 0);
        assert!(text.is_empty());
    }

    #[test]
    fn test_garbage_bytes_are_an_error() {
        let parser = PdfParser::new();
        let result = parser.parse_bytes("broken.pdf", b"definitely not a pdf");
        assert!(matches!(result, Err(IngestError::ParseError { .. })));
    }

    #[test]
    fn test_pdf_parser_extensions() {
        let parser = PdfParser::new();
        assert!(parser.supports("pdf"));
        assert!(parser.supports("PDF"));
        assert!(!parser.supports("txt"));
    }
}
