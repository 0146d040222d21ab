//! Error types for the ingestion pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur during ingestion.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("File size too large: {name} is {size} bytes, the limit is {limit} bytes")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    #[error("Invalid file format: {0} is not a PDF")]
    NotPdf(String),

    #[error("{0} appears to be empty or corrupted")]
    EmptyDocument(String),

    #[error("No text could be extracted from {0}. It might be image-based.")]
    NoExtractableText(String),

    #[error("Parse error for {name}: {message}")]
    ParseError { name: String, message: String },
}
