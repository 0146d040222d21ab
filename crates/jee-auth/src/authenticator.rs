//! Sign-in state machine.

use crate::client::OAuthClient;
use crate::credentials::{StoredCredentials, TokenStore};
use crate::error::AuthResult;
use crate::loopback::LoopbackReceiver;
use crate::pkce::{new_state, Pkce};
use jee_core::UserInfo;
use jee_db::Database;
use tracing::{info, warn};

/// Result of trying to reuse stored credentials.
#[derive(Debug, Clone)]
pub enum AuthState {
    /// Usable credentials, possibly just refreshed.
    Authorized(StoredCredentials),
    /// The user has to go through the consent screen.
    ConsentRequired,
}

impl AuthState {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized(_))
    }
}

/// Drives sign-in against one OAuth client.
#[derive(Debug, Clone)]
pub struct Authenticator {
    oauth: OAuthClient,
}

impl Authenticator {
    pub fn new(oauth: OAuthClient) -> Self {
        Self { oauth }
    }

    pub fn oauth(&self) -> &OAuthClient {
        &self.oauth
    }

    /// Reuse what is on disk: a valid token as is, an expired one through
    /// its refresh token. Anything else needs consent.
    pub async fn resume(&self, store: &TokenStore) -> AuthResult<AuthState> {
        let Some(mut credentials) = store.load() else {
            return Ok(AuthState::ConsentRequired);
        };

        if credentials.is_valid() {
            return Ok(AuthState::Authorized(credentials));
        }

        if !credentials.can_refresh() {
            info!("Stored token expired and cannot be refreshed");
            return Ok(AuthState::ConsentRequired);
        }

        match self.oauth.refresh(&mut credentials).await {
            Ok(()) => {
                store.save(&credentials)?;
                Ok(AuthState::Authorized(credentials))
            }
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                Ok(AuthState::ConsentRequired)
            }
        }
    }

    /// Finish a consent round trip and persist the tokens.
    pub async fn complete(
        &self,
        store: &TokenStore,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> AuthResult<StoredCredentials> {
        let credentials = self.oauth.exchange_code(code, verifier, redirect_uri).await?;
        store.save(&credentials)?;
        Ok(credentials)
    }

    /// Look up the profile and make sure the user is registered.
    pub async fn identify(
        &self,
        credentials: &StoredCredentials,
        db: &Database,
    ) -> AuthResult<UserInfo> {
        let user = self.oauth.fetch_userinfo(credentials).await?;
        if db.register_user(&user)? {
            info!("Registered new user {}", user.email);
        } else {
            info!("Welcome back {}", user.email);
        }
        Ok(user)
    }

    /// Full installed-app flow: reuse stored tokens or run consent through a
    /// loopback redirect. `open` receives the URL to show the user.
    pub async fn login_interactive<F>(
        &self,
        store: &TokenStore,
        receiver: LoopbackReceiver,
        open: F,
    ) -> AuthResult<StoredCredentials>
    where
        F: FnOnce(&str),
    {
        if let AuthState::Authorized(credentials) = self.resume(store).await? {
            return Ok(credentials);
        }

        let pkce = Pkce::generate();
        let state = new_state();
        let redirect_uri = receiver.redirect_uri()?;
        let url = self
            .oauth
            .authorization_url(&state, &pkce.challenge, &redirect_uri)?;

        open(&url);

        let code = receiver.receive(&state).await?;
        self.complete(store, &code, &pkce.verifier, &redirect_uri)
            .await
    }
}
