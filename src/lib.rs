//! NoteHub front end library - re-exports for testing and external use.
//!
//! This module provides public access to all the application's modules
//! for testing purposes and potential library use.

use std::sync::Arc;

pub mod api;
pub mod cache;
pub mod config;
pub mod form;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod prefetch;
pub mod templates;

use api::{ApiError, HttpNotesApi, NotesApi};
use cache::QueryCache;
use config::Config;

// ============================================================================
// Application State
// ============================================================================

/// Everything a request handler needs: the remote API and the client query
/// cache that list views read through and the form invalidates.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn NotesApi>,
    pub cache: QueryCache,
}

impl AppState {
    pub fn new(api: Arc<dyn NotesApi>) -> Self {
        Self {
            api,
            cache: QueryCache::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let api = HttpNotesApi::new(
            config.api_url.clone(),
            config.api_token.clone(),
            config.per_page,
        )?;
        Ok(Self::new(Arc::new(api)))
    }
}

// Re-export commonly used types
pub use models::{NewNote, Note, NoteTag, NotesPage, NotesQuery};

pub use cache::{DehydratedQuery, DehydratedState, KeySegment, QueryKey};

pub use form::{
    validate_note_form, FormField, FormStatus, NoteForm, NoteFormValues, SubmitOutcome,
    ValidationErrors,
};

pub use notify::{FlashNotifier, Notifier, Toast, ToastKind};

pub use prefetch::{prefetch_notes, resolve_tag_filter};

pub use handlers::app;
