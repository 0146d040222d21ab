//! CLI command implementations.

pub mod chat;
pub mod config;
pub mod ingest;
pub mod init;
pub mod login;
pub mod serve;
pub mod status;
pub mod users;

use anyhow::{Context, Result};
use jee_auth::{Authenticator, ClientSecrets, OAuthClient};
use jee_config::{AppPaths, Config};
use jee_db::Database;

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Load the configuration with environment overrides applied, and the paths
/// it resolves to.
pub fn load_config() -> Result<(Config, AppPaths)> {
    let defaults = get_paths()?;
    let mut config =
        Config::load_from(&defaults.config_file).context("Failed to load configuration")?;
    config.apply_env();
    let paths = config.resolve_paths(defaults);
    Ok((config, paths))
}

/// Get a database connection, ensuring Chat Jee is initialized.
pub fn get_database(paths: &AppPaths) -> Result<Database> {
    if !paths.database_file.exists() {
        anyhow::bail!("Chat Jee is not initialized. Run 'chatjee init' first.");
    }

    Database::open(&paths.database_file).context("Failed to open database")
}

/// Build the Google authenticator from the configured client secrets.
pub fn load_authenticator(config: &Config, paths: &AppPaths) -> Result<Authenticator> {
    let secrets_path = config.client_secrets_path(paths);
    let secrets = ClientSecrets::load(&secrets_path)?;
    let oauth = OAuthClient::new(secrets).context("Failed to create OAuth client")?;
    Ok(Authenticator::new(oauth))
}

/// Format a file size in human-readable form.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
