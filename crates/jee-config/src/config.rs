//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable holding the Gemini API key.
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Environment variable overriding the server bind address.
pub const ENV_BIND: &str = "CHATJEE_BIND";
/// Environment variable pointing at the OAuth client secrets file.
pub const ENV_CLIENT_SECRETS: &str = "GOOGLE_CLIENT_SECRETS";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Read `config.toml`. A missing file means every default applies.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        write_file(path, &toml::to_string_pretty(self)?)
    }

    /// Write the commented template used by `chatjee init`.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        write_file(path, &Self::default_config_string())
    }

    /// Apply overrides from environment variables.
    ///
    /// Call after loading `.env` so that values from it are visible.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides using a custom variable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_GEMINI_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.gemini.api_key = Some(key);
        }
        if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.trim().is_empty()) {
            self.server.bind = bind;
        }
        if let Some(secrets) = lookup(ENV_CLIENT_SECRETS).filter(|v| !v.trim().is_empty()) {
            self.auth.client_secrets = Some(secrets);
        }
    }

    /// Resolve the data directory, honouring `general.data_dir`.
    pub fn resolve_paths(&self, defaults: AppPaths) -> AppPaths {
        match &self.general.data_dir {
            Some(dir) => defaults.with_data_dir(expand_home(dir)),
            None => defaults,
        }
    }

    /// Resolve the client secrets file, falling back to the config directory.
    pub fn client_secrets_path(&self, paths: &AppPaths) -> PathBuf {
        self.auth
            .client_secrets
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| paths.client_secrets_file.clone())
    }

    /// Set a single value addressed by a dotted key such as `gemini.model`.
    pub fn set(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["general", "data_dir"] => self.general.data_dir = Some(value.to_string()),
            ["gemini", "base_url"] => self.gemini.base_url = value.to_string(),
            ["gemini", "model"] => self.gemini.model = value.to_string(),
            ["gemini", "api_key"] => self.gemini.api_key = Some(value.to_string()),
            ["gemini", "timeout_seconds"] => {
                self.gemini.timeout_seconds = parse_value(key, value)?;
            }
            ["gemini", "temperature"] => self.gemini.temperature = Some(parse_value(key, value)?),
            ["auth", "required"] => self.auth.required = parse_value(key, value)?,
            ["auth", "client_secrets"] => self.auth.client_secrets = Some(value.to_string()),
            ["auth", "redirect_uri"] => self.auth.redirect_uri = value.to_string(),
            ["auth", "loopback_port"] => self.auth.loopback_port = parse_value(key, value)?,
            ["ingest", "max_file_bytes"] => self.ingest.max_file_bytes = parse_value(key, value)?,
            ["ingest", "max_upload_bytes"] => {
                self.ingest.max_upload_bytes = parse_value(key, value)?;
            }
            ["chat", "history_capacity"] => self.chat.history_capacity = parse_value(key, value)?,
            ["chat", "prompt_history"] => self.chat.prompt_history = parse_value(key, value)?,
            ["chat", "max_input_chars"] => self.chat.max_input_chars = parse_value(key, value)?,
            ["chat", "max_material_chars"] => {
                self.chat.max_material_chars = parse_value(key, value)?;
            }
            ["server", "bind"] => self.server.bind = value.to_string(),
            ["server", "session_idle_minutes"] => {
                self.server.session_idle_minutes = parse_value(key, value)?;
            }
            ["server", "max_sessions"] => self.server.max_sessions = parse_value(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }

        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Chat Jee Configuration
# Your AI-powered JEE preparation assistant

[general]
# Data directory for database and stored credentials
# data_dir = "~/.local/share/chatjee"

[gemini]
# Gemini REST endpoint
base_url = "https://generativelanguage.googleapis.com"

# Model used for answers
model = "models/gemini-1.5-pro"

# API key. Prefer the GEMINI_API_KEY environment variable or a .env file.
# api_key = "..."

# Request timeout in seconds
timeout_seconds = 120

# Sampling temperature (omit to use the model default)
# temperature = 0.7

[auth]
# Require Google sign-in. Set to false for local development.
required = true

# OAuth client secrets downloaded from the Google Cloud console.
# Defaults to credentials.json next to this file.
# client_secrets = "~/.config/chatjee/credentials.json"

# Redirect URI registered for the web client
redirect_uri = "http://localhost:8501/oauth2/callback"

# Port for `chatjee login` (0 picks a free port)
loopback_port = 0

[ingest]
# Largest accepted PDF, in bytes
max_file_bytes = 10485760

# Largest accepted upload request, in bytes
max_upload_bytes = 52428800

[chat]
# Conversation lines kept per session (two per exchange)
history_capacity = 40

# Conversation lines included in each prompt
prompt_history = 8

# Longest accepted question, in characters
max_input_chars = 5000

# Characters of study material included in each prompt
max_material_chars = 10000

[server]
# Address the web server listens on
bind = "127.0.0.1:8501"

# Browser sessions unused for this long are forgotten
session_idle_minutes = 120

# Most browser sessions kept in memory; the least recently used goes first
max_sessions = 1000
"#
        .to_string()
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{} = {:?}", key, value)))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = directories::BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(path)
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub data_dir: Option<String>,
}

/// Gemini generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    pub temperature: Option<f32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "models/gemini-1.5-pro".to_string(),
            api_key: None,
            timeout_seconds: 120,
            temperature: None,
        }
    }
}

/// Sign-in settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub required: bool,
    pub client_secrets: Option<String>,
    pub redirect_uri: String,
    pub loopback_port: u16,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            required: true,
            client_secrets: None,
            redirect_uri: "http://localhost:8501/oauth2/callback".to_string(),
            loopback_port: 0,
        }
    }
}

/// Document upload limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub max_file_bytes: u64,
    pub max_upload_bytes: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 10 * 1024 * 1024,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Conversation and prompt sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub history_capacity: usize,
    pub prompt_history: usize,
    pub max_input_chars: usize,
    pub max_material_chars: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_capacity: 40,
            prompt_history: 8,
            max_input_chars: 5000,
            max_material_chars: 10_000,
        }
    }
}

/// Web server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub session_idle_minutes: u64,
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".to_string(),
            session_idle_minutes: 120,
            max_sessions: 1000,
        }
    }
}

fn write_file(path: &Path, contents: &str) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}
