//! Server-side prefetch for the filtered notes list.
//!
//! `/notes/filter/{*slug}` resolves its tag from the first slug segment,
//! fetches page 1 into a fresh cache and ships the dehydrated cache with the
//! page. The client cache hydrates it before the list is rendered, so the
//! first render needs no second request.

use crate::api::{ApiError, NotesApi};
use crate::cache::{DehydratedState, QueryCache, QueryKey};
use crate::models::{NotesPage, NotesQuery};
use tracing::debug;

/// Slug segment meaning "no tag filter".
pub const ALL_SEGMENT: &str = "all";

/// The tag filter for a slug: its first segment, unless that is `"all"` or
/// there is none.
pub fn resolve_tag_filter<S: AsRef<str>>(slug: &[S]) -> Option<String> {
    slug.first()
        .map(|segment| segment.as_ref())
        .filter(|segment| *segment != ALL_SEGMENT)
        .map(str::to_string)
}

/// Fetch the first page for `tag` into a fresh cache and serialize it.
///
/// Exactly one read-only request is made. A failed fetch is returned as is.
pub async fn prefetch_notes<A>(api: &A, tag: Option<String>) -> Result<DehydratedState, ApiError>
where
    A: NotesApi + ?Sized,
{
    let cache = QueryCache::new();
    let query = NotesQuery::first_page(tag);
    let key = QueryKey::notes(&query);

    debug!(key = %key, "Prefetching notes");
    cache
        .prefetch_query::<NotesPage, ApiError, _, _>(key, || api.fetch_notes(&query))
        .await?;

    Ok(cache.dehydrate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{sample_note, FakeNotesApi};
    use crate::models::NoteTag;

    #[test]
    fn test_all_means_no_filter() {
        assert_eq!(resolve_tag_filter(&["all"]), None);
        assert_eq!(resolve_tag_filter(&["all", "Work"]), None);
    }

    #[test]
    fn test_other_segments_pass_through() {
        for v in ["Work", "Todo", "Shopping", "whatever", "ALL"] {
            assert_eq!(resolve_tag_filter(&[v]), Some(v.to_string()));
        }
        assert_eq!(resolve_tag_filter(&["Meeting", "all"]), Some("Meeting".to_string()));
    }

    #[test]
    fn test_empty_slug_is_no_filter() {
        let empty: [&str; 0] = [];
        assert_eq!(resolve_tag_filter(&empty), None);
    }

    #[tokio::test]
    async fn test_prefetch_makes_one_call_and_stores_first_page() {
        let api = FakeNotesApi::with_notes(vec![
            sample_note("1", "Standup", NoteTag::Meeting),
            sample_note("2", "Milk", NoteTag::Shopping),
        ]);

        let state = prefetch_notes(&api, Some("Meeting".to_string())).await.unwrap();

        assert_eq!(api.list_call_count(), 1);
        assert_eq!(
            api.list_calls.lock().unwrap()[0],
            NotesQuery::new(1, "", Some("Meeting".to_string()))
        );
        assert_eq!(state.queries.len(), 1);
        assert_eq!(
            serde_json::to_string(&state.queries[0].query_key).unwrap(),
            r#"["notes",1,"","Meeting"]"#
        );
        let page: NotesPage = serde_json::from_value(state.queries[0].data.clone()).unwrap();
        assert_eq!(page.notes.len(), 1);
        assert_eq!(page.notes[0].title, "Standup");
    }

    #[tokio::test]
    async fn test_prefetch_failure_propagates() {
        let api = FakeNotesApi::default();
        api.set_fail_list(true);

        let err = prefetch_notes(&api, None).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
    }
}
