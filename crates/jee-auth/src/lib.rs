//! Jee Auth - Google sign-in for Chat Jee.
//!
//! Loads OAuth client secrets, drives the authorization-code flow with PKCE,
//! persists tokens as JSON files and resolves the signed-in user's profile.

mod authenticator;
mod client;
mod credentials;
mod error;
mod loopback;
mod pending;
mod pkce;
mod secrets;
#[cfg(test)]
mod test_support;

pub use authenticator::{AuthState, Authenticator};
pub use client::{OAuthClient, TokenResponse, USERINFO_URL};
pub use credentials::{CredentialVault, StoredCredentials, TokenStore};
pub use error::{AuthError, AuthResult};
pub use loopback::{parse_callback, LoopbackReceiver};
pub use pending::{PendingLogin, PendingLogins};
pub use pkce::{new_state, Pkce};
pub use secrets::{ClientSecrets, SCOPES};
