//! Google sign-in for browser sessions.

use super::render;
use super::session::{expired_session_cookie, session_id_from_headers};
use super::{visit, with_cookie, AppState};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use jee_auth::{new_state, Pkce};
use jee_core::Notice;
use serde::Deserialize;
use tracing::{info, warn};

pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let visit = visit(&state, &headers).await;
    let mut session = visit.session.lock().await;

    if session.is_authenticated() {
        return visit.respond(Redirect::to("/"));
    }

    let notices = session.drain_notices();
    visit.respond(Html(render::login_page(
        state.sign_in_available(),
        &notices,
    )))
}

/// Send the browser to the consent screen.
pub async fn start_login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let visit = visit(&state, &headers).await;

    if visit.session.lock().await.is_authenticated() {
        return visit.respond(Redirect::to("/"));
    }

    let Some(authenticator) = state.authenticator() else {
        return visit.respond(Redirect::to("/login"));
    };

    let pkce = Pkce::generate();
    let oauth_state = new_state();
    let redirect_uri = &state.config().auth.redirect_uri;

    match authenticator
        .oauth()
        .authorization_url(&oauth_state, &pkce.challenge, redirect_uri)
    {
        Ok(url) => {
            state
                .pending()
                .insert(oauth_state, pkce.verifier, visit.id.as_str());
            visit.respond(Redirect::to(&url))
        }
        Err(e) => {
            warn!("Could not build authorization URL: {}", e);
            visit.session.lock().await.push_notice(Notice::error(
                "❌ Authentication setup failed. Please check the OAuth client configuration.",
            ));
            visit.respond(Redirect::to("/login"))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn invalid_callback(state: &AppState, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Html(render::login_page(
            state.sign_in_available(),
            &[Notice::error(message)],
        )),
    )
        .into_response()
}

/// Finish the consent round trip. Only the browser that started it, as
/// identified by its own session cookie, can complete it; no cookie is
/// ever issued here.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(pending) = params
        .state
        .as_deref()
        .and_then(|oauth_state| state.pending().take(oauth_state))
    else {
        return invalid_callback(
            &state,
            "❌ This sign-in link is invalid or has expired. Please try again.",
        );
    };

    if session_id_from_headers(&headers).as_deref() != Some(pending.session_id.as_str()) {
        warn!("Sign-in callback arrived from a different browser session");
        return invalid_callback(
            &state,
            "❌ This sign-in was started in another browser session. Please try again.",
        );
    }

    let (id, session) = state.sessions().get_or_create(Some(&pending.session_id));

    if let Some(error) = params.error {
        info!("Sign-in was not completed: {}", error);
        session
            .lock()
            .await
            .push_notice(Notice::warning(format!("Sign-in was cancelled ({}).", error)));
        return Redirect::to("/login").into_response();
    }

    let (Some(code), Some(authenticator)) = (params.code, state.authenticator()) else {
        return invalid_callback(&state, "❌ Sign-in response did not include a code.");
    };

    let store = state.vault().store(&id);
    let redirect_uri = &state.config().auth.redirect_uri;

    let result = match authenticator
        .complete(&store, &code, &pending.verifier, redirect_uri)
        .await
    {
        Ok(credentials) => authenticator.identify(&credentials, state.db()).await,
        Err(e) => Err(e),
    };

    let mut session = session.lock().await;
    match result {
        Ok(user) => {
            info!("Signed in {}", user.email);
            session.push_notice(Notice::success(format!(
                "👋 Welcome, {}!",
                user.display_name()
            )));
            session.user = Some(user);
            Redirect::to("/").into_response()
        }
        Err(e) => {
            warn!("Sign-in failed: {}", e);
            session.push_notice(Notice::error(format!("❌ Sign-in failed: {}", e)));
            Redirect::to("/login").into_response()
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id_from_headers(&headers) {
        state.sessions().remove(&id);
        match state.vault().store(&id).remove() {
            Ok(true) => info!("Removed stored credentials for a signed-out session"),
            Ok(false) => {}
            Err(e) => warn!("Failed to remove stored credentials: {}", e),
        }
    }

    with_cookie(Redirect::to("/login"), Some(expired_session_cookie()))
}
