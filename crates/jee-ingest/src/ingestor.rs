//! Batch ingestion of uploaded documents.

use crate::error::{IngestError, IngestResult};
use crate::parsers::{DocumentParser, PdfParser};
use crate::validate::{validate_upload, UploadLimits};
use jee_core::Document;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A file received from the browser or read from disk.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Text extracted from one upload.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub name: String,
    pub text: String,
    pub pages: usize,
    pub content_hash: String,
}

impl ExtractedDocument {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn into_document(self) -> Document {
        Document::new(self.name, self.text)
            .with_pages(self.pages)
            .with_content_hash(self.content_hash)
    }
}

/// An upload that could not be processed.
#[derive(Debug)]
pub struct IngestFailure {
    pub name: String,
    pub error: IngestError,
}

/// Outcome of a batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub documents: Vec<ExtractedDocument>,
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.documents.len() + self.failures.len()
    }

    pub fn succeeded(&self) -> usize {
        self.documents.len()
    }

    pub fn is_success(&self) -> bool {
        !self.documents.is_empty()
    }
}

/// Validates and extracts uploaded PDFs.
pub struct Ingestor {
    limits: UploadLimits,
    parser: PdfParser,
}

impl Ingestor {
    /// Create a new ingestor.
    pub fn new(limits: UploadLimits) -> Self {
        Self {
            limits,
            parser: PdfParser::new(),
        }
    }

    /// Create an ingestor with default limits.
    pub fn with_defaults() -> Self {
        Self::new(UploadLimits::default())
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Validate and extract a single upload.
    pub fn ingest_upload(&self, upload: &Upload) -> IngestResult<ExtractedDocument> {
        validate_upload(&upload.name, upload.size(), &self.limits)?;

        let parsed = self.parser.parse_bytes(&upload.name, &upload.bytes)?;

        Ok(ExtractedDocument {
            name: upload.name.clone(),
            text: parsed.content,
            pages: parsed.pages,
            content_hash: hash_bytes(&upload.bytes),
        })
    }

    /// Process every upload, reporting progress before each one.
    ///
    /// A failing file is recorded and the batch continues.
    pub fn ingest_batch<F>(&self, uploads: &[Upload], mut progress: F) -> IngestReport
    where
        F: FnMut(usize, usize, &str),
    {
        let total = uploads.len();
        let mut report = IngestReport::default();

        for (index, upload) in uploads.iter().enumerate() {
            progress(index, total, &upload.name);

            match self.ingest_upload(upload) {
                Ok(doc) => {
                    debug!("Ingested {} ({} pages)", doc.name, doc.pages);
                    report.documents.push(doc);
                }
                Err(error) => {
                    warn!("Failed to ingest {}: {}", upload.name, error);
                    report.failures.push(IngestFailure {
                        name: upload.name.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            "Processed {} out of {} PDF(s)",
            report.succeeded(),
            report.total()
        );

        report
    }

    /// Read a PDF, or every PDF below a directory, from disk.
    pub fn collect_uploads(&self, path: &Path) -> IngestResult<Vec<Upload>> {
        if !path.exists() {
            return Err(IngestError::FileNotFound(path.to_path_buf()));
        }

        let mut uploads = Vec::new();

        if path.is_file() {
            uploads.push(read_upload(path)?);
            return Ok(uploads);
        }

        for entry in WalkDir::new(path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            let is_pdf = entry_path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| self.parser.supports(e))
                .unwrap_or(false);

            if entry.file_type().is_file() && is_pdf {
                uploads.push(read_upload(entry_path)?);
            }
        }

        Ok(uploads)
    }

    /// Ingest a PDF or a directory of PDFs from disk.
    pub fn ingest_path<F>(&self, path: &Path, progress: F) -> IngestResult<IngestReport>
    where
        F: FnMut(usize, usize, &str),
    {
        let uploads = self.collect_uploads(path)?;
        info!("Found {} PDF(s) under {}", uploads.len(), path.display());
        Ok(self.ingest_batch(&uploads, progress))
    }
}

fn read_upload(path: &Path) -> IngestResult<Upload> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document.pdf")
        .to_string();
    let bytes = std::fs::read(path)?;
    Ok(Upload::new(name, bytes))
}

/// SHA-256 of the raw upload, hex encoded.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINEMATICS_PDF: &[u8] = include_bytes!("../tests/fixtures/kinematics.pdf");

    #[test]
    fn test_batch_extracts_real_pdf_next_to_a_broken_one() {
        let ingestor = Ingestor::with_defaults();
        let uploads = vec![
            Upload::new("Kinematics.PDF", KINEMATICS_PDF.to_vec()),
            Upload::new("broken.pdf", b"%PDF-1".to_vec()),
        ];

        let report = ingestor.ingest_batch(&uploads, |_, _, _| {});

        assert!(report.is_success());
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failures.len(), 1);

        let doc = &report.documents[0];
        assert_eq!(doc.name, "Kinematics.PDF");
        assert_eq!(doc.pages, 1);
        assert_eq!(doc.text, "\n--- Page 1 ---\nKinematics\n");
        assert_eq!(doc.content_hash, hash_bytes(KINEMATICS_PDF));
        assert_eq!(doc.char_count(), doc.text.chars().count());
    }

    #[test]
    fn test_ingest_path_reads_pdfs_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kinematics.pdf"), KINEMATICS_PDF).unwrap();

        let ingestor = Ingestor::with_defaults();
        let report = ingestor.ingest_path(dir.path(), |_, _, _| {}).unwrap();

        assert_eq!(report.total(), 1);
        assert_eq!(report.documents[0].name, "kinematics.pdf");
        assert!(report.documents[0].text.contains("Kinematics"));
    }

    #[test]
    fn test_hash_bytes() {
        assert_eq!(
            hash_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_batch_continues_after_failures() {
        let ingestor = Ingestor::new(UploadLimits { max_file_bytes: 8 });
        let uploads = vec![
            Upload::new("notes.txt", b"hello".to_vec()),
            Upload::new("huge.pdf", vec![0; 9]),
            Upload::new("broken.pdf", b"%PDF-1".to_vec()),
        ];

        let mut seen = Vec::new();
        let report = ingestor.ingest_batch(&uploads, |i, total, name| {
            seen.push((i, total, name.to_string()));
        });

        assert_eq!(report.total(), 3);
        assert!(!report.is_success());
        assert!(matches!(report.failures[0].error, IngestError::NotPdf(_)));
        assert!(matches!(
            report.failures[1].error,
            IngestError::FileTooLarge { .. }
        ));
        assert!(matches!(
            report.failures[2].error,
            IngestError::ParseError { .. }
        ));
        assert_eq!(
            seen,
            vec![
                (0, 3, "notes.txt".to_string()),
                (1, 3, "huge.pdf".to_string()),
                (2, 3, "broken.pdf".to_string()),
            ]
        );
    }

    #[test]
    fn test_collect_uploads_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"%PDF-b").unwrap();
        std::fs::write(dir.path().join("a.PDF"), b"%PDF-a").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"skip").unwrap();

        let ingestor = Ingestor::with_defaults();
        let uploads = ingestor.collect_uploads(dir.path()).unwrap();

        let names: Vec<&str> = uploads.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_collect_uploads_missing_path() {
        let ingestor = Ingestor::with_defaults();
        let result = ingestor.collect_uploads(Path::new("/definitely/not/here.pdf"));
        assert!(matches!(result, Err(IngestError::FileNotFound(_))));
    }

    #[test]
    fn test_into_document_keeps_metadata() {
        let extracted = ExtractedDocument {
            name: "a.pdf".to_string(),
            text: "text".to_string(),
            pages: 4,
            content_hash: "abc".to_string(),
        };
        let doc = extracted.into_document();
        assert_eq!(doc.pages, 4);
        assert_eq!(doc.content_hash.as_deref(), Some("abc"));
    }
}
