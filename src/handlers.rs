//! HTTP route handlers for the web application.
//!
//! HTML pages for the filtered list, the note form and the note view, plus a
//! small JSON API over the same cache.

use crate::api::ApiError;
use crate::cache::QueryKey;
use crate::form::{NoteForm, NoteFormValues, SubmitOutcome};
use crate::models::{Note, NotesPage, NotesQuery};
use crate::notify::{set_flash, take_flash, FlashNotifier, Toast};
use crate::prefetch::{prefetch_notes, resolve_tag_filter};
use crate::templates::{
    base_html, filter_path, html_escape, nav_bar, render_note_form, render_note_view,
    render_notes_list,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[cfg(test)]
#[path = "handlers_test.rs"]
mod handlers_test;

// ============================================================================
// Router
// ============================================================================

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/notes/filter/{*slug}", get(notes_by_filter))
        .route("/notes/new", get(new_note_page).post(create_note))
        .route("/notes/{id}", get(view_note))
        .route("/api/notes", get(api_list_notes).post(api_create_note))
        .route("/api/notes/state", get(api_query_state))
        .with_state(state)
}

// ============================================================================
// Errors
// ============================================================================

/// Failures that end a page render. Rendered as the error page.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Api(ref err) = self;
        let (status, message) = if err.is_not_found() {
            (StatusCode::NOT_FOUND, "Note not found".to_string())
        } else {
            warn!(error = %err, "Request failed");
            (StatusCode::BAD_GATEWAY, err.to_string())
        };

        let html = format!(
            r#"<div class="message error">{}</div>
            <a href="{}">Back to notes</a>"#,
            html_escape(&message),
            filter_path(None)
        );
        (status, Html(base_html("Error", &html, &nav_bar(None, None), &[]))).into_response()
    }
}

// ============================================================================
// Index Handler
// ============================================================================

pub async fn index() -> Redirect {
    Redirect::to(&filter_path(None))
}

// ============================================================================
// Filtered List Handler
// ============================================================================

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub search: Option<String>,
}

pub async fn notes_by_filter(
    Path(slug): Path<String>,
    Query(params): Query<ListParams>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let segments: Vec<&str> = slug.split('/').filter(|s| !s.is_empty()).collect();
    let tag = resolve_tag_filter(&segments);

    // Server side: fresh cache, one fetch, serialized for the page.
    let prefetched = prefetch_notes(state.api.as_ref(), tag.clone()).await?;

    // Client side: take in the server's state before rendering the list.
    state.cache.hydrate(&prefetched);

    let query = NotesQuery::new(
        params.page.unwrap_or(1),
        params.search.unwrap_or_default().trim(),
        tag,
    );
    let page: NotesPage = state
        .cache
        .fetch_query(QueryKey::notes(&query), || state.api.fetch_notes(&query))
        .await?;
    debug!(tag = ?query.tag, page = query.page, count = page.notes.len(), "Rendering notes list");

    let (jar, toasts) = take_flash(jar);
    let search = (!query.search.is_empty()).then_some(query.search.as_str());
    let title = query.tag.as_deref().unwrap_or("All notes");
    let html = base_html(
        title,
        &render_notes_list(&page, &query, &prefetched),
        &nav_bar(query.tag.as_deref(), search),
        &toasts,
    );

    Ok((jar, Html(html)).into_response())
}

// ============================================================================
// Note Form Handlers
// ============================================================================

pub async fn new_note_page(jar: CookieJar) -> Response {
    let (jar, toasts) = take_flash(jar);
    let form = NoteForm::new();
    let html = base_html("New Note", &render_note_form(&form), &nav_bar(None, None), &toasts);
    (jar, Html(html)).into_response()
}

#[derive(Deserialize)]
pub struct NoteFormSubmission {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tag: String,
    pub action: Option<String>,
}

pub async fn create_note(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    axum::Form(submission): axum::Form<NoteFormSubmission>,
) -> Response {
    let mut form = NoteForm::with_values(NoteFormValues {
        title: submission.title,
        content: submission.content,
        tag: submission.tag,
    });

    // Closing the form is the redirect below.
    if submission.action.as_deref() == Some("cancel") {
        form.cancel(|| debug!("Note form cancelled"));
        return Redirect::to(&filter_path(None)).into_response();
    }

    let notifier = FlashNotifier::new();
    let outcome = form
        .submit(state.api.as_ref(), &state.cache, &notifier, || debug!("Note form closed"))
        .await;

    match outcome {
        SubmitOutcome::Created(note) => {
            let jar = set_flash(jar, &notifier.take());
            (jar, Redirect::to(&filter_path(Some(note.tag.as_str())))).into_response()
        }
        // A form built for this request is never mid-submit, so Pending
        // cannot come back here.
        SubmitOutcome::Invalid(_) | SubmitOutcome::Pending => {
            render_form_page(&form, &[], StatusCode::UNPROCESSABLE_ENTITY)
        }
        SubmitOutcome::Failed(_) => {
            render_form_page(&form, &notifier.take(), StatusCode::BAD_GATEWAY)
        }
    }
}

fn render_form_page(form: &NoteForm, toasts: &[Toast], status: StatusCode) -> Response {
    let html = base_html("New Note", &render_note_form(form), &nav_bar(None, None), toasts);
    (status, Html(html)).into_response()
}

// ============================================================================
// Note View Handler
// ============================================================================

pub async fn view_note(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let note: Note = state
        .cache
        .fetch_query(QueryKey::note(&id), || state.api.fetch_note_by_id(&id))
        .await?;

    let (jar, toasts) = take_flash(jar);
    let html = base_html(
        &note.title,
        &render_note_view(&note),
        &nav_bar(Some(note.tag.as_str()), None),
        &toasts,
    );
    Ok((jar, Html(html)).into_response())
}

// ============================================================================
// JSON API Handlers
// ============================================================================

#[derive(Deserialize)]
pub struct ApiListParams {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub tag: Option<String>,
}

pub async fn api_list_notes(
    Query(params): Query<ApiListParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<NotesPage>, AppError> {
    let tag = params.tag.filter(|t| !t.is_empty() && t != crate::prefetch::ALL_SEGMENT);
    let query = NotesQuery::new(
        params.page.unwrap_or(1),
        params.search.unwrap_or_default().trim(),
        tag,
    );
    let page = state
        .cache
        .fetch_query(QueryKey::notes(&query), || state.api.fetch_notes(&query))
        .await?;
    Ok(Json(page))
}

pub async fn api_create_note(
    State(state): State<Arc<AppState>>,
    Json(values): Json<NoteFormValues>,
) -> Response {
    let mut form = NoteForm::with_values(values);
    let notifier = FlashNotifier::new();
    let outcome = form
        .submit(state.api.as_ref(), &state.cache, &notifier, || {})
        .await;

    match outcome {
        SubmitOutcome::Created(note) => {
            info!(id = %note.id, "Note created through JSON API");
            (StatusCode::CREATED, Json(note)).into_response()
        }
        SubmitOutcome::Invalid(_) | SubmitOutcome::Pending => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "errors": form.errors() })),
        )
            .into_response(),
        SubmitOutcome::Failed(message) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response(),
    }
}

/// The client cache as it would be shipped to a browser.
pub async fn api_query_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.cache.dehydrate())
}
