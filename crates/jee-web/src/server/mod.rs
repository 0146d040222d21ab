//! Axum web server: chat page, sign-in flow, uploads and a small JSON API.
//!
//! ```text
//! GET  /                    chat page (redirects to /login when signed out)
//! GET  /login               sign-in page
//! GET  /login/google        start the OAuth consent flow
//! GET  /oauth2/callback     finish the OAuth flow
//! POST /logout
//! POST /chat                form field `message`
//! POST /documents           multipart PDF upload
//! POST /documents/clear
//! POST /history/clear
//! GET  /api/health
//! GET  /api/stats
//! POST /api/message         {"message": "..."}
//! GET  /assets/style.css
//! GET  /assets/app.js
//! ```

mod api;
mod auth;
mod content;
mod pages;
mod render;
mod session;

pub use session::{SessionHandle, SessionStore, SESSION_COOKIE};

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use jee_auth::{Authenticator, CredentialVault, PendingLogins};
use jee_config::{AppPaths, Config};
use jee_core::UserInfo;
use jee_db::Database;
use jee_gemini::Tutor;
use jee_ingest::{Ingestor, UploadLimits};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Shared state handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    db: Database,
    tutor: Tutor,
    ingestor: Ingestor,
    sessions: SessionStore,
    authenticator: Option<Authenticator>,
    vault: CredentialVault,
    pending: PendingLogins,
}

impl AppState {
    pub fn new(
        config: Config,
        paths: AppPaths,
        db: Database,
        authenticator: Option<Authenticator>,
    ) -> Self {
        let tutor = Tutor::from_config(&config.gemini, &config.chat);
        Self::with_tutor(config, paths, db, authenticator, tutor)
    }

    pub fn with_tutor(
        config: Config,
        paths: AppPaths,
        db: Database,
        authenticator: Option<Authenticator>,
        tutor: Tutor,
    ) -> Self {
        let ingestor = Ingestor::new(UploadLimits::from_config(&config.ingest));
        let sessions = SessionStore::new(config.chat.history_capacity).with_limits(
            Duration::from_secs(config.server.session_idle_minutes.saturating_mul(60)),
            config.server.max_sessions,
        );
        Self {
            inner: Arc::new(Inner {
                vault: CredentialVault::new(paths.credentials_dir),
                pending: PendingLogins::new(),
                config,
                db,
                tutor,
                ingestor,
                sessions,
                authenticator,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn tutor(&self) -> &Tutor {
        &self.inner.tutor
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.inner.ingestor
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    pub fn authenticator(&self) -> Option<&Authenticator> {
        self.inner.authenticator.as_ref()
    }

    pub fn vault(&self) -> &CredentialVault {
        &self.inner.vault
    }

    pub fn pending(&self) -> &PendingLogins {
        &self.inner.pending
    }

    pub fn auth_required(&self) -> bool {
        self.inner.config.auth.required
    }

    pub fn sign_in_available(&self) -> bool {
        self.inner.authenticator.is_some()
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config().ingest.max_upload_bytes;

    Router::new()
        .route("/", get(pages::index))
        .route("/chat", post(pages::chat))
        .route(
            "/documents",
            post(pages::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/documents/clear", post(pages::clear_documents))
        .route("/history/clear", post(pages::clear_history))
        .route("/login", get(auth::login_page))
        .route("/login/google", get(auth::start_login))
        .route("/oauth2/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
        .route("/api/health", get(api::health))
        .route("/api/stats", get(api::stats))
        .route("/api/message", post(api::message))
        .route("/assets/style.css", get(content::stylesheet))
        .route("/assets/app.js", get(content::script))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let router = build_router(state);

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    info!("Chat Jee listening on http://{}", bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
        .context("Server error")?;

    info!("Chat Jee shut down");
    Ok(())
}

/// The caller's session plus the cookie to send back when it is new.
pub(crate) struct Visit {
    pub id: String,
    pub session: SessionHandle,
    pub set_cookie: Option<String>,
}

impl Visit {
    /// Attach the session cookie to `response` when needed.
    pub fn respond(&self, response: impl IntoResponse) -> Response {
        with_cookie(response, self.set_cookie.clone())
    }
}

/// Resolve the session and, when possible, sign it in.
pub(crate) async fn visit(state: &AppState, headers: &HeaderMap) -> Visit {
    let cookie = session::session_id_from_headers(headers);
    let (id, session) = state.sessions().get_or_create(cookie.as_deref());
    let set_cookie = (cookie.as_deref() != Some(id.as_str())).then(|| session::session_cookie(&id));

    ensure_user(state, &id, &session).await;

    Visit {
        id,
        session,
        set_cookie,
    }
}

/// Bind a user to the session: the guest in open mode, otherwise whoever
/// the stored credentials for this session belong to.
async fn ensure_user(state: &AppState, id: &str, session: &SessionHandle) {
    let mut session = session.lock().await;
    if session.is_authenticated() {
        return;
    }

    if !state.auth_required() {
        session.user = Some(UserInfo::guest());
        return;
    }

    let Some(authenticator) = state.authenticator() else {
        return;
    };

    let store = state.vault().store(id);
    if !store.exists() {
        return;
    }

    match authenticator.resume(&store).await {
        Ok(jee_auth::AuthState::Authorized(credentials)) => {
            match authenticator.identify(&credentials, state.db()).await {
                Ok(user) => {
                    info!("Restored sign-in for {}", user.email);
                    session.user = Some(user);
                }
                Err(e) => warn!("Could not identify stored credentials: {}", e),
            }
        }
        Ok(jee_auth::AuthState::ConsentRequired) => {}
        Err(e) => warn!("Could not resume sign-in: {}", e),
    }
}

pub(crate) fn with_cookie(response: impl IntoResponse, cookie: Option<String>) -> Response {
    let mut response = response.into_response();
    if let Some(cookie) = cookie {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!("Invalid cookie header: {}", e),
        }
    }
    response
}

/// 303 to the chat page.
pub(crate) fn back_home() -> Redirect {
    Redirect::to("/")
}
