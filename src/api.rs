//! Client for the remote NoteHub API.
//!
//! The API owns note identity and persistence. This module only knows how to
//! list, create and read notes over HTTP; everything above it talks to the
//! [`NotesApi`] trait so handlers and tests can swap the transport.

use crate::models::{NewNote, Note, NotesPage, NotesQuery};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to NoteHub failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("NoteHub returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected NoteHub response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid NoteHub URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

/// Error body the API sends with non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

// ============================================================================
// Trait
// ============================================================================

#[async_trait]
pub trait NotesApi: Send + Sync {
    /// List one page of notes. Empty search text and `None` tag mean "no filter".
    async fn fetch_notes(&self, query: &NotesQuery) -> Result<NotesPage, ApiError>;

    async fn create_note(&self, note: &NewNote) -> Result<Note, ApiError>;

    async fn fetch_note_by_id(&self, id: &str) -> Result<Note, ApiError>;
}

// ============================================================================
// HTTP Implementation
// ============================================================================

#[derive(Clone)]
pub struct HttpNotesApi {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    per_page: u32,
}

impl HttpNotesApi {
    pub fn new(base_url: Url, token: Option<String>, per_page: u32) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
            per_page,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}/{}", base, path))?)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or_else(|_| {
                    if text.trim().is_empty() {
                        status.canonical_reason().unwrap_or("request failed").to_string()
                    } else {
                        text.trim().to_string()
                    }
                });
            warn!(status = status.as_u16(), %message, "NoteHub request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn fetch_notes(&self, query: &NotesQuery) -> Result<NotesPage, ApiError> {
        let mut url = self.endpoint("notes")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &query.page.to_string());
            pairs.append_pair("perPage", &self.per_page.to_string());
            if !query.search.is_empty() {
                pairs.append_pair("search", &query.search);
            }
            if let Some(ref tag) = query.tag {
                pairs.append_pair("tag", tag);
            }
        }

        debug!(%url, "Fetching notes");
        let response = self.authorize(self.client.get(url)).send().await?;
        Self::read_json(response).await
    }

    async fn create_note(&self, note: &NewNote) -> Result<Note, ApiError> {
        let url = self.endpoint("notes")?;
        debug!(%url, title = %note.title, tag = %note.tag, "Creating note");
        let response = self
            .authorize(self.client.post(url))
            .json(note)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn fetch_note_by_id(&self, id: &str) -> Result<Note, ApiError> {
        let url = self.endpoint(&format!("notes/{}", urlencoding::encode(id)))?;
        debug!(%url, "Fetching note");
        let response = self.authorize(self.client.get(url)).send().await?;
        Self::read_json(response).await
    }
}

// ============================================================================
// In-memory Fake (tests)
// ============================================================================
