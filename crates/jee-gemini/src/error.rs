//! Error types for Gemini operations.

use thiserror::Error;

/// Errors that can occur when talking to Gemini.
#[derive(Error, Debug)]
pub enum GeminiError {
    /// No API key was configured.
    #[error("Gemini is not configured. Set GEMINI_API_KEY or gemini.api_key in the config file.")]
    NotConfigured,

    /// Request timeout.
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// The endpoint could not be reached.
    #[error("Unable to reach Gemini at {base_url}")]
    Unreachable { base_url: String },

    /// The requested model does not exist.
    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    /// API returned an error response.
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The prompt or every candidate was blocked.
    #[error("Response blocked: {reason}")]
    Blocked { reason: String },

    /// The model returned no text.
    #[error("The model returned an empty response")]
    EmptyResponse,

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for Gemini operations.
pub type GeminiResult<T> = Result<T, GeminiError>;
