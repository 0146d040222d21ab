//! Persisted OAuth tokens.

use crate::client::TokenResponse;
use crate::error::AuthResult;
use crate::secrets::{ClientSecrets, SCOPES};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Tokens are treated as expired this long before their real expiry.
const EXPIRY_SKEW_SECONDS: i64 = 60;

/// Contents of a token file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredCredentials {
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredCredentials {
    /// Credentials from a fresh token response.
    pub fn from_response(secrets: &ClientSecrets, response: TokenResponse) -> Self {
        Self::from_response_at(secrets, response, Utc::now())
    }

    pub fn from_response_at(
        secrets: &ClientSecrets,
        response: TokenResponse,
        now: DateTime<Utc>,
    ) -> Self {
        let scopes = response
            .scope
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_else(|| SCOPES.iter().map(|s| s.to_string()).collect());

        Self {
            token: Some(response.access_token),
            refresh_token: response.refresh_token,
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes,
            expiry: response
                .expires_in
                .map(|secs| now + Duration::seconds(secs as i64)),
        }
    }

    /// Fold a refresh response in, keeping the refresh token if none was sent.
    pub fn apply_refresh(&mut self, response: TokenResponse, now: DateTime<Utc>) {
        self.token = Some(response.access_token);
        if response.refresh_token.is_some() {
            self.refresh_token = response.refresh_token;
        }
        self.expiry = response
            .expires_in
            .map(|secs| now + Duration::seconds(secs as i64));
    }

    pub fn access_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// A token is present and, if an expiry is known, not within the skew of it.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.token.as_deref().map_or(true, str::is_empty) {
            return false;
        }
        match self.expiry {
            Some(expiry) => now + Duration::seconds(EXPIRY_SKEW_SECONDS) < expiry,
            None => true,
        }
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .map_or(false, |t| !t.is_empty())
    }
}

/// A single token file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read stored credentials. A file that cannot be parsed is deleted.
    pub fn load(&self) -> Option<StoredCredentials> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Cannot read {}: {}", self.path.display(), e);
                }
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                warn!(
                    "Discarding corrupt token file {}: {}",
                    self.path.display(),
                    e
                );
                if let Err(e) = std::fs::remove_file(&self.path) {
                    warn!("Failed to remove {}: {}", self.path.display(), e);
                }
                None
            }
        }
    }

    pub fn save(&self, credentials: &StoredCredentials) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(credentials)?;
        std::fs::write(&self.path, data)?;
        debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }

    /// Delete the file. Returns whether anything was removed.
    pub fn remove(&self) -> AuthResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// A directory holding one token file per key.
#[derive(Debug, Clone)]
pub struct CredentialVault {
    dir: PathBuf,
}

impl CredentialVault {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The token store for `key`; the key never appears in the file name.
    pub fn store(&self, key: &str) -> TokenStore {
        let digest = Sha256::digest(key.as_bytes());
        TokenStore::new(self.dir.join(format!("{:x}.json", digest)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(expiry: Option<DateTime<Utc>>) -> StoredCredentials {
        StoredCredentials {
            token: Some("ya29.token".to_string()),
            refresh_token: Some("1//refresh".to_string()),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            client_id: "client".to_string(),
            client_secret: None,
            scopes: vec!["openid".to_string()],
            expiry,
        }
    }

    #[test]
    fn test_validity_uses_skew() {
        let now = Utc::now();
        assert!(sample(None).is_valid_at(now));
        assert!(sample(Some(now + Duration::minutes(10))).is_valid_at(now));
        assert!(!sample(Some(now + Duration::seconds(30))).is_valid_at(now));
        assert!(!sample(Some(now - Duration::minutes(1))).is_valid_at(now));

        let mut missing = sample(None);
        missing.token = None;
        assert!(!missing.is_valid_at(now));
    }

    #[test]
    fn test_apply_refresh_keeps_refresh_token() {
        let now = Utc::now();
        let mut creds = sample(Some(now - Duration::minutes(5)));
        creds.apply_refresh(
            TokenResponse {
                access_token: "new".to_string(),
                expires_in: Some(3600),
                refresh_token: None,
                scope: None,
                id_token: None,
            },
            now,
        );

        assert_eq!(creds.access_token(), Some("new"));
        assert_eq!(creds.refresh_token.as_deref(), Some("1//refresh"));
        assert!(creds.is_valid_at(now));
    }

    #[test]
    fn test_store_round_trip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("token.json"));

        assert!(store.load().is_none());
        store.save(&sample(None)).unwrap();
        assert_eq!(store.load(), Some(sample(None)));

        assert!(store.remove().unwrap());
        assert!(!store.remove().unwrap());
    }

    #[test]
    fn test_corrupt_file_is_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = TokenStore::new(&path);
        assert!(store.load().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_reads_google_auth_token_file() {
        let json = r#"{"token": "ya29.a0", "refresh_token": "1//0g", "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "id", "client_secret": "secret", "scopes": ["openid"],
            "expiry": "2030-01-01T10:00:00.123456Z"}"#;
        let creds: StoredCredentials = serde_json::from_str(json).unwrap();
        assert!(creds.can_refresh());
        assert!(creds.expiry.is_some());
    }

    #[test]
    fn test_vault_hashes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let vault = CredentialVault::new(dir.path());

        let a = vault.store("session-a");
        let b = vault.store("session-b");
        assert_ne!(a.path(), b.path());
        assert_eq!(a.path(), vault.store("session-a").path());

        let name = a.path().file_name().unwrap().to_str().unwrap();
        assert!(!name.contains("session"));
        assert_eq!(name.len(), 64 + ".json".len());
    }
}
