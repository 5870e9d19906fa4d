//! Data models for the notes front end.
//!
//! Notes, tags and list pages as exchanged with the remote NoteHub API, plus
//! the list query parameters shared by the cache and the handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Tags
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum NoteTag {
    #[default]
    Todo,
    Personal,
    Work,
    Meeting,
    Shopping,
}

impl NoteTag {
    /// Every tag, in the order the form's select lists them.
    pub const ALL: [NoteTag; 5] = [
        NoteTag::Todo,
        NoteTag::Work,
        NoteTag::Personal,
        NoteTag::Meeting,
        NoteTag::Shopping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteTag::Todo => "Todo",
            NoteTag::Personal => "Personal",
            NoteTag::Work => "Work",
            NoteTag::Meeting => "Meeting",
            NoteTag::Shopping => "Shopping",
        }
    }
}

impl fmt::Display for NoteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTag(pub String);

impl fmt::Display for UnknownTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tag: {}", self.0)
    }
}

impl std::error::Error for UnknownTag {}

impl FromStr for NoteTag {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NoteTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

// ============================================================================
// Notes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub tag: NoteTag,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request. Only produced by form validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub tag: NoteTag,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotesPage {
    pub notes: Vec<Note>,
    pub total_pages: u32,
}

// ============================================================================
// List Queries
// ============================================================================

/// Parameters of one notes list request.
///
/// `tag` is kept as the raw filter string: the URL may carry any segment and
/// the remote API decides what an unknown tag means.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotesQuery {
    pub page: u32,
    pub search: String,
    pub tag: Option<String>,
}

impl NotesQuery {
    pub fn new(page: u32, search: impl Into<String>, tag: Option<String>) -> Self {
        Self {
            page: page.max(1),
            search: search.into(),
            tag,
        }
    }

    /// The query the list page prefetches: page 1, no search text.
    pub fn first_page(tag: Option<String>) -> Self {
        Self::new(1, "", tag)
    }
}
