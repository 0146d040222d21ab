//! Jee Ingest - turns uploaded PDFs into study material text.
//!
//! This crate provides:
//! - Upload validation (size and file type)
//! - PDF text extraction with per-page markers
//! - Batch ingestion that reports failures without aborting

mod error;
mod ingestor;
mod parsers;
mod validate;

pub use error::{IngestError, IngestResult};
pub use ingestor::{hash_bytes, ExtractedDocument, IngestFailure, IngestReport, Ingestor, Upload};
pub use parsers::{DocumentParser, ParsedDocument, PdfParser};
pub use validate::{validate_upload, UploadLimits};
