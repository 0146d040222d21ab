//! Configuration errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("config.toml is not valid: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot write configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown configuration key: {0} (try gemini.model, auth.required, server.bind, ...)")]
    UnknownKey(String),

    #[error("Invalid value for {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
