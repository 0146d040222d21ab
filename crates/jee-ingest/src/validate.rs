//! Upload validation.

use crate::error::{IngestError, IngestResult};
use jee_config::IngestConfig;

/// Limits applied to each uploaded file.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_file_bytes: u64,
}

impl UploadLimits {
    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            max_file_bytes: config.max_file_bytes,
        }
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self::from_config(&IngestConfig::default())
    }
}

/// Check an upload before any parsing happens.
pub fn validate_upload(name: &str, size: u64, limits: &UploadLimits) -> IngestResult<()> {
    if size > limits.max_file_bytes {
        return Err(IngestError::FileTooLarge {
            name: name.to_string(),
            size,
            limit: limits.max_file_bytes,
        });
    }

    if !name.to_lowercase().ends_with(".pdf") {
        return Err(IngestError::NotPdf(name.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_pdf_within_limit() {
        let limits = UploadLimits::default();
        assert!(validate_upload("Notes.PDF", 1024, &limits).is_ok());
        assert!(validate_upload("a.pdf", 10 * 1024 * 1024, &limits).is_ok());
    }

    #[test]
    fn test_rejects_oversized_file() {
        let limits = UploadLimits::default();
        let err = validate_upload("big.pdf", 10 * 1024 * 1024 + 1, &limits).unwrap_err();
        assert!(matches!(err, IngestError::FileTooLarge { .. }));
    }

    #[test]
    fn test_rejects_other_extensions() {
        let limits = UploadLimits::default();
        assert!(matches!(
            validate_upload("notes.docx", 10, &limits),
            Err(IngestError::NotPdf(_))
        ));
        assert!(matches!(
            validate_upload("pdf", 10, &limits),
            Err(IngestError::NotPdf(_))
        ));
    }

    #[test]
    fn test_size_checked_before_type() {
        let limits = UploadLimits { max_file_bytes: 5 };
        assert!(matches!(
            validate_upload("huge.txt", 6, &limits),
            Err(IngestError::FileTooLarge { .. })
        ));
    }
}
