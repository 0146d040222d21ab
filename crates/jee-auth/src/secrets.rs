//! OAuth client secrets (`credentials.json` from the Google Cloud console).

use crate::error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scopes requested at sign-in.
pub const SCOPES: &[&str] = &[
    "openid",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Client registration details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Load the `installed` or `web` section of a downloaded secrets file.
    pub fn load(path: &Path) -> AuthResult<Self> {
        if !path.exists() {
            return Err(AuthError::SecretsNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> AuthResult<Self> {
        let file: SecretsFile = serde_json::from_str(content)
            .map_err(|e| AuthError::InvalidSecrets(e.to_string()))?;

        let secrets = file.web.or(file.installed).ok_or_else(|| {
            AuthError::InvalidSecrets("expected an \"installed\" or \"web\" section".to_string())
        })?;

        if secrets.client_id.trim().is_empty() {
            return Err(AuthError::InvalidSecrets("client_id is empty".to_string()));
        }

        Ok(secrets)
    }

    /// Build secrets directly, using Google's default endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            auth_uri: default_auth_uri(),
            token_uri: default_token_uri(),
            redirect_uris: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_installed() {
        let json = r#"{"installed": {
            "client_id": "123.apps.googleusercontent.com",
            "client_secret": "shh",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token",
            "redirect_uris": ["http://localhost"]
        }}"#;

        let secrets = ClientSecrets::parse(json).unwrap();
        assert_eq!(secrets.client_id, "123.apps.googleusercontent.com");
        assert_eq!(secrets.client_secret.as_deref(), Some("shh"));
        assert_eq!(secrets.redirect_uris, vec!["http://localhost"]);
    }

    #[test]
    fn test_parse_web_with_defaults() {
        let json = r#"{"web": {"client_id": "abc"}}"#;
        let secrets = ClientSecrets::parse(json).unwrap();
        assert_eq!(secrets.token_uri, DEFAULT_TOKEN_URI);
        assert!(secrets.client_secret.is_none());
    }

    #[test]
    fn test_rejects_unknown_layout() {
        assert!(matches!(
            ClientSecrets::parse(r#"{"other": {}}"#),
            Err(AuthError::InvalidSecrets(_))
        ));
        assert!(matches!(
            ClientSecrets::parse("not json"),
            Err(AuthError::InvalidSecrets(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClientSecrets::load(&dir.path().join("credentials.json"));
        assert!(matches!(result, Err(AuthError::SecretsNotFound(_))));
    }
}
