//! Application paths management.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Manages all application paths following platform conventions.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    pub database_file: PathBuf,
    /// Credentials saved by `chatjee login`.
    pub token_file: PathBuf,
    /// Per-session credentials saved by the web server.
    pub credentials_dir: PathBuf,
    /// Default location of the OAuth client secrets downloaded from Google.
    pub client_secrets_file: PathBuf,
}

impl AppPaths {
    /// Create paths using platform-specific directories.
    pub fn new() -> Option<Self> {
        let proj_dirs = ProjectDirs::from("com", "chatjee", "chatjee")?;

        Some(Self::from_dirs(
            proj_dirs.config_dir().to_path_buf(),
            proj_dirs.data_dir().to_path_buf(),
        ))
    }

    /// Create paths rooted at explicit directories.
    pub fn from_dirs(config_dir: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            config_file: config_dir.join("config.toml"),
            client_secrets_file: config_dir.join("credentials.json"),
            database_file: data_dir.join("chatjee.db"),
            token_file: data_dir.join("token.json"),
            credentials_dir: data_dir.join("credentials"),
            config_dir,
            data_dir,
        }
    }

    /// Re-root the data paths under `data_dir`, keeping the config paths.
    pub fn with_data_dir(self, data_dir: impl AsRef<Path>) -> Self {
        Self::from_dirs(self.config_dir, data_dir.as_ref().to_path_buf())
    }

    /// Create all necessary directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.credentials_dir)?;
        Ok(())
    }

    /// Check if Chat Jee has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists() && self.database_file.exists()
    }
}
