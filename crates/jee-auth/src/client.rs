//! Calls to Google's authorization, token and userinfo endpoints.

use crate::credentials::StoredCredentials;
use crate::error::{AuthError, AuthResult};
use crate::secrets::{ClientSecrets, SCOPES};
use jee_core::UserInfo;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Profile endpoint queried after sign-in.
pub const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Successful reply from the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserinfoResponse {
    #[serde(default)]
    id: Option<String>,
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// OAuth 2.0 client for one registered application.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    secrets: ClientSecrets,
    userinfo_url: String,
}

impl OAuthClient {
    pub fn new(secrets: ClientSecrets) -> AuthResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            secrets,
            userinfo_url: USERINFO_URL.to_string(),
        })
    }

    /// Point profile lookups somewhere else.
    pub fn with_userinfo_url(mut self, url: impl Into<String>) -> Self {
        self.userinfo_url = url.into();
        self
    }

    pub fn secrets(&self) -> &ClientSecrets {
        &self.secrets
    }

    /// URL the browser is sent to for consent.
    pub fn authorization_url(
        &self,
        state: &str,
        challenge: &str,
        redirect_uri: &str,
    ) -> AuthResult<String> {
        let mut url = Url::parse(&self.secrets.auth_uri)
            .map_err(|e| AuthError::InvalidSecrets(format!("invalid auth_uri: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.secrets.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("state", state)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("code_challenge", challenge)
            .append_pair("code_challenge_method", "S256");
        Ok(url.into())
    }

    async fn token_request(&self, mut form: Vec<(&str, String)>) -> AuthResult<TokenResponse> {
        form.push(("client_id", self.secrets.client_id.clone()));
        if let Some(secret) = &self.secrets.client_secret {
            form.push(("client_secret", secret.clone()));
        }

        let response = self
            .http
            .post(&self.secrets.token_uri)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AuthError::TokenEndpoint {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<TokenResponse>().await?)
    }

    /// Trade an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> AuthResult<StoredCredentials> {
        debug!("Exchanging authorization code");
        let response = self
            .token_request(vec![
                ("code", code.to_string()),
                ("code_verifier", code_verifier.to_string()),
                ("redirect_uri", redirect_uri.to_string()),
                ("grant_type", "authorization_code".to_string()),
            ])
            .await?;
        Ok(StoredCredentials::from_response(&self.secrets, response))
    }

    /// Obtain a new access token; `credentials` is updated in place.
    pub async fn refresh(&self, credentials: &mut StoredCredentials) -> AuthResult<()> {
        let refresh_token = credentials
            .refresh_token
            .clone()
            .ok_or_else(|| AuthError::Denied("no refresh token stored".to_string()))?;

        debug!("Refreshing access token");
        let response = self
            .token_request(vec![
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token".to_string()),
            ])
            .await?;
        credentials.apply_refresh(response, chrono::Utc::now());
        info!("Access token refreshed");
        Ok(())
    }

    /// The signed-in user's profile.
    pub async fn fetch_userinfo(&self, credentials: &StoredCredentials) -> AuthResult<UserInfo> {
        let token = credentials
            .access_token()
            .ok_or_else(|| AuthError::Denied("no access token stored".to_string()))?;

        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Userinfo {
                status: status.as_u16(),
                message,
            });
        }

        let profile: UserinfoResponse = response.json().await?;
        let name = profile.name.unwrap_or_else(|| "User".to_string());
        let mut user = UserInfo::new(profile.email, name);
        user.id = profile.id;
        user.picture = profile.picture;
        Ok(user)
    }
}
