//! Error types for authentication.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while signing a user in.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("OAuth client secrets not found at {0}. Download credentials.json from the Google Cloud console.")]
    SecretsNotFound(PathBuf),

    #[error("Invalid client secrets: {0}")]
    InvalidSecrets(String),

    #[error("Token endpoint returned {status}: {message}")]
    TokenEndpoint { status: u16, message: String },

    #[error("Userinfo request failed with {status}: {message}")]
    Userinfo { status: u16, message: String },

    #[error("Authorization was denied: {0}")]
    Denied(String),

    #[error("Login state did not match; start the sign-in again")]
    StateMismatch,

    #[error("Invalid OAuth callback: {0}")]
    Callback(String),

    #[error("Invalid redirect URI: {0}")]
    InvalidRedirect(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] jee_db::DbError),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
