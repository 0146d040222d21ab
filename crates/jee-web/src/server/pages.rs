//! Browser-facing handlers. Every form post redirects back to `/`.

use super::render::{self, PageContext};
use super::{back_home, visit, AppState};
use axum::extract::{Form, Multipart, State};
use axum::http::HeaderMap;
use axum::response::{Html, Redirect, Response};
use jee_core::Notice;
use jee_db::IngestRecord;
use jee_ingest::{IngestError, IngestFailure, IngestReport, Upload};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

fn page_context(state: &AppState) -> PageContext {
    PageContext {
        ai_ready: state.tutor().is_ready(),
        auth_required: state.auth_required(),
        max_input_chars: state.config().chat.max_input_chars,
    }
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let visit = visit(&state, &headers).await;
    let mut session = visit.session.lock().await;

    if !session.is_authenticated() {
        return visit.respond(Redirect::to("/login"));
    }

    let notices = session.drain_notices();
    let page = render::chat_page(&session, &notices, &page_context(&state));
    visit.respond(Html(page))
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ChatForm>,
) -> Response {
    let visit = visit(&state, &headers).await;
    let mut session = visit.session.lock().await;

    if !session.is_authenticated() {
        return visit.respond(Redirect::to("/login"));
    }

    if form.message.trim().is_empty() {
        return visit.respond(back_home());
    }

    if !state.tutor().is_ready() {
        session.push_notice(Notice::error(
            "❌ Cannot send message. Please fix the Gemini AI configuration first.",
        ));
        return visit.respond(back_home());
    }

    let outcome = state.tutor().chat(&mut session, &form.message).await;
    debug!("Chat turn finished (answered: {})", outcome.is_answered());

    visit.respond(back_home())
}

/// User-facing text for a file that could not be processed.
fn failure_notice(failure: &IngestFailure, max_file_bytes: u64) -> Notice {
    match &failure.error {
        IngestError::FileTooLarge { .. } => Notice::error(format!(
            "❌ {}: File size too large. Please upload files smaller than {}MB.",
            failure.name,
            max_file_bytes / (1024 * 1024)
        )),
        IngestError::NotPdf(_) => Notice::error(format!(
            "❌ {}: Invalid file format. Please upload only PDF files.",
            failure.name
        )),
        other => Notice::warning(format!("⚠️ {}", other)),
    }
}

/// Notices summarising a processed batch.
fn report_notices(report: &IngestReport, max_file_bytes: u64) -> Vec<Notice> {
    let mut notices: Vec<Notice> = report
        .failures
        .iter()
        .map(|failure| failure_notice(failure, max_file_bytes))
        .collect();

    if report.is_success() {
        notices.push(Notice::success(format!(
            "✅ Successfully processed {} out of {} PDF(s)",
            report.succeeded(),
            report.total()
        )));
    } else {
        notices.push(Notice::error("❌ No PDFs could be processed successfully."));
    }
    notices
}

pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let visit = visit(&state, &headers).await;
    if !visit.session.lock().await.is_authenticated() {
        return visit.respond(Redirect::to("/login"));
    }

    let mut uploads = Vec::new();
    let mut read_error = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let Some(name) = field.file_name().map(str::to_string) else {
                    continue;
                };
                if name.is_empty() {
                    continue;
                }
                match field.bytes().await {
                    Ok(bytes) => uploads.push(Upload::new(name, bytes.to_vec())),
                    Err(e) => {
                        read_error = Some(e.body_text());
                        break;
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                read_error = Some(e.body_text());
                break;
            }
        }
    }

    let max_file_bytes = state.config().ingest.max_file_bytes;

    if let Some(e) = read_error {
        warn!("Upload could not be read: {}", e);
        visit.session.lock().await.push_notice(Notice::error(format!(
            "❌ Upload failed: {}. Please upload files smaller than {}MB.",
            e,
            max_file_bytes / (1024 * 1024)
        )));
        return visit.respond(back_home());
    }

    if uploads.is_empty() {
        visit
            .session
            .lock()
            .await
            .push_notice(Notice::warning("Please choose at least one PDF file."));
        return visit.respond(back_home());
    }

    info!("Processing {} uploaded file(s)", uploads.len());
    let worker = state.clone();
    let report = match tokio::task::spawn_blocking(move || {
        worker.ingestor().ingest_batch(&uploads, |index, total, name| {
            debug!("Processing {} ({}/{})", name, index + 1, total);
        })
    })
    .await
    {
        Ok(report) => report,
        Err(e) => {
            error!("PDF processing task failed: {}", e);
            visit
                .session
                .lock()
                .await
                .push_notice(Notice::error("❌ Error processing PDFs. Please try again."));
            return visit.respond(back_home());
        }
    };

    let mut session = visit.session.lock().await;
    let email = session
        .user
        .as_ref()
        .map(|user| user.email.clone())
        .unwrap_or_default();

    for doc in &report.documents {
        let record = IngestRecord::new(
            email.as_str(),
            doc.name.as_str(),
            doc.content_hash.as_str(),
            doc.pages,
            doc.char_count(),
        );
        if let Err(e) = state.db().record_ingest(&record) {
            warn!("Failed to record ingest of {}: {}", doc.name, e);
        }
    }

    for notice in report_notices(&report, max_file_bytes) {
        session.push_notice(notice);
    }

    // Earlier materials stay loaded when the whole batch failed.
    if report.is_success() {
        session.load_materials(
            report
                .documents
                .into_iter()
                .map(|doc| doc.into_document())
                .collect(),
        );
    }

    visit.respond(back_home())
}

pub async fn clear_documents(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let visit = visit(&state, &headers).await;
    let mut session = visit.session.lock().await;
    if !session.is_authenticated() {
        return visit.respond(Redirect::to("/login"));
    }

    session.clear_materials();
    session.push_notice(Notice::success("PDF materials cleared!"));
    visit.respond(back_home())
}

pub async fn clear_history(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let visit = visit(&state, &headers).await;
    let mut session = visit.session.lock().await;
    if !session.is_authenticated() {
        return visit.respond(Redirect::to("/login"));
    }

    session.clear_history();
    session.push_notice(Notice::success("Chat history cleared!"));
    visit.respond(back_home())
}
