//! JSON handlers for `/api/*` routes.
//!
//! They share the browser session cookie, so a signed-in page can call them
//! directly.

use super::{visit, AppState};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    message: String,
}

fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Response {
    let body = json!({
        "status": "ok",
        "ai_ready": state.tutor().is_ready(),
        "auth_required": state.auth_required(),
        "sign_in_available": state.sign_in_available(),
        "active_sessions": state.sessions().len(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let visit = visit(&state, &headers).await;
    let session = visit.session.lock().await;

    if !session.is_authenticated() {
        return visit.respond((
            StatusCode::UNAUTHORIZED,
            json_error("unauthorized", "Please sign in first"),
        ));
    }

    visit.respond((StatusCode::OK, Json(session.stats())))
}

/// POST /api/message
pub async fn message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<MessageRequest>,
) -> Response {
    let visit = visit(&state, &headers).await;
    let mut session = visit.session.lock().await;

    if !session.is_authenticated() {
        return visit.respond((
            StatusCode::UNAUTHORIZED,
            json_error("unauthorized", "Please sign in first"),
        ));
    }

    if !state.tutor().is_ready() {
        return visit.respond((
            StatusCode::SERVICE_UNAVAILABLE,
            json_error(
                "ai_unavailable",
                "Cannot send message. Please fix the Gemini AI configuration first.",
            ),
        ));
    }

    if req.message.trim().is_empty() {
        return visit.respond((
            StatusCode::BAD_REQUEST,
            json_error("empty_message", "Please enter a question or message."),
        ));
    }

    let outcome = state.tutor().chat(&mut session, &req.message).await;
    let body = json!({
        "answered": outcome.is_answered(),
        "reply": outcome.text(),
        "stats": session.stats(),
    });
    visit.respond((StatusCode::OK, Json(body)))
}

#[cfg(test)]
mod tests {
    use super::super::build_router;
    use super::super::test_support::guest_state;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_configuration() {
        let (state, _dir) = guest_state();
        let response = build_router(state)
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["ai_ready"], false);
        assert_eq!(body["auth_required"], false);
        assert_eq!(body["sign_in_available"], false);
    }

    #[tokio::test]
    async fn test_stats_for_guest_session() {
        let (state, _dir) = guest_state();
        let response = build_router(state)
            .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["messages"], 0);
        assert_eq!(body["pdfs_processed"], 0);
        assert_eq!(body["has_materials"], false);
        assert!(body["duration"].as_str().unwrap().starts_with("0:00:"));
    }

    #[tokio::test]
    async fn test_message_without_ai_is_unavailable() {
        let (state, _dir) = guest_state();
        let response = build_router(state)
            .oneshot(
                Request::post("/api/message")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"message":"What is entropy?"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["error"], "ai_unavailable");
    }
}
