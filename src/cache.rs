//! Query cache shared between the list views and the note form.
//!
//! Entries are keyed by a [`QueryKey`], an ordered list of segments such as
//! `["notes", 1, "", null]`. Creating a note invalidates every key under the
//! `"notes"` prefix; invalidated entries keep their data for display but are
//! refetched the next time [`QueryCache::fetch_query`] asks for them.
//!
//! The cache is an explicit handle: clone it to share it, pass it to whatever
//! needs it. The server builds a throwaway cache per request for prefetching,
//! serializes it with [`QueryCache::dehydrate`], and the long-lived client
//! cache takes it in with [`QueryCache::hydrate`].
//!
//! The cache holds at most [`DEFAULT_MAX_ENTRIES`] entries (configurable with
//! [`QueryCache::with_max_entries`]). When a write goes over the limit,
//! invalidated entries are dropped first, oldest first, then the oldest fresh
//! ones.

use crate::models::NotesQuery;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub const NOTES_NAMESPACE: &str = "notes";
pub const NOTE_NAMESPACE: &str = "note";

pub const DEFAULT_MAX_ENTRIES: usize = 256;

// ============================================================================
// Keys
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeySegment {
    Text(String),
    Number(u64),
    Null,
}

impl From<&str> for KeySegment {
    fn from(s: &str) -> Self {
        KeySegment::Text(s.to_string())
    }
}

impl From<u32> for KeySegment {
    fn from(n: u32) -> Self {
        KeySegment::Number(n as u64)
    }
}

impl From<Option<&str>> for KeySegment {
    fn from(value: Option<&str>) -> Self {
        value.map_or(KeySegment::Null, KeySegment::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    pub fn new(segments: Vec<KeySegment>) -> Self {
        Self(segments)
    }

    /// A one-segment key, used as an invalidation prefix.
    pub fn namespace(name: &str) -> Self {
        Self(vec![name.into()])
    }

    /// `["notes", page, search, tag]`, with a null tag for "no filter".
    pub fn notes(query: &NotesQuery) -> Self {
        Self(vec![
            NOTES_NAMESPACE.into(),
            query.page.into(),
            query.search.as_str().into(),
            query.tag.as_deref().into(),
        ])
    }

    pub fn note(id: &str) -> Self {
        Self(vec![NOTE_NAMESPACE.into(), id.into()])
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => write!(f, "{}", s),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

// ============================================================================
// Entries
// ============================================================================

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Value,
    updated_at: DateTime<Utc>,
    invalidated: bool,
}

/// Serializable snapshot of the fresh entries of a cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DehydratedState {
    pub queries: Vec<DehydratedQuery>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DehydratedQuery {
    pub query_key: QueryKey,
    pub data: Value,
    pub data_updated_at: DateTime<Utc>,
}

// ============================================================================
// Cache
// ============================================================================

#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<QueryKey, CacheEntry>>>,
    max_entries: usize,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache that keeps at most `max_entries` entries (at least one).
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            max_entries: max_entries.max(1),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        // A panic while holding the lock cannot leave an entry half-written.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Cached data for `key`, stale or not.
    pub fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let data = self.entries().get(key).map(|entry| entry.data.clone())?;
        serde_json::from_value(data).ok()
    }

    pub fn set_query_data<T: Serialize>(&self, key: QueryKey, data: &T) -> Result<(), serde_json::Error> {
        let data = serde_json::to_value(data)?;
        let mut entries = self.entries();
        self.store(
            &mut entries,
            key,
            CacheEntry {
                data,
                updated_at: Utc::now(),
                invalidated: false,
            },
        );
        Ok(())
    }

    /// Insert `entry`, then evict until the cache is back under its limit.
    /// The entry just written is never the one evicted.
    fn store(&self, entries: &mut HashMap<QueryKey, CacheEntry>, key: QueryKey, entry: CacheEntry) {
        entries.insert(key.clone(), entry);
        while entries.len() > self.max_entries {
            let victim = entries
                .iter()
                .filter(|(k, _)| **k != key)
                .min_by_key(|(_, e)| (!e.invalidated, e.updated_at))
                .map(|(k, _)| k.clone());
            match victim {
                Some(victim) => {
                    debug!(key = %victim, "Evicted query");
                    entries.remove(&victim);
                }
                None => break,
            }
        }
    }

    /// True when there is nothing cached for `key` or the entry was invalidated.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries().get(key).map_or(true, |entry| entry.invalidated)
    }

    /// Mark every entry under `prefix` stale. Returns how many were marked.
    pub fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries();
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                count += 1;
            }
        }
        debug!(prefix = %prefix, count, "Invalidated queries");
        count
    }

    /// Return the cached data for `key` if it is fresh, otherwise run
    /// `fetcher`, store its result and return it.
    ///
    /// The lock is released before `fetcher` runs; two concurrent misses on
    /// the same key both fetch and the later write wins.
    pub async fn fetch_query<T, E, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<serde_json::Error>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let cached = self
            .entries()
            .get(&key)
            .filter(|entry| !entry.invalidated)
            .map(|entry| entry.data.clone());

        if let Some(data) = cached {
            match serde_json::from_value(data) {
                Ok(value) => {
                    debug!(key = %key, "Query cache hit");
                    return Ok(value);
                }
                Err(e) => debug!(key = %key, error = %e, "Cached data has the wrong shape, refetching"),
            }
        }

        debug!(key = %key, "Query cache miss");
        let value = fetcher().await?;
        self.set_query_data(key, &value)?;
        Ok(value)
    }

    /// Fill the cache for `key` without handing the data back. Errors are
    /// returned to the caller rather than swallowed.
    pub async fn prefetch_query<T, E, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<(), E>
    where
        T: Serialize + DeserializeOwned,
        E: From<serde_json::Error>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.fetch_query::<T, E, F, Fut>(key, fetcher).await.map(|_| ())
    }

    /// Snapshot the fresh entries, ordered by key.
    pub fn dehydrate(&self) -> DehydratedState {
        let mut queries: Vec<DehydratedQuery> = self
            .entries()
            .iter()
            .filter(|(_, entry)| !entry.invalidated)
            .map(|(key, entry)| DehydratedQuery {
                query_key: key.clone(),
                data: entry.data.clone(),
                data_updated_at: entry.updated_at,
            })
            .collect();
        queries.sort_by(|a, b| a.query_key.cmp(&b.query_key));
        DehydratedState { queries }
    }

    /// Load a snapshot. An entry already in the cache is only replaced when
    /// the snapshot's data is newer. Returns how many entries were written.
    pub fn hydrate(&self, state: &DehydratedState) -> usize {
        let mut entries = self.entries();
        let mut written = 0;
        for query in &state.queries {
            let newer = entries
                .get(&query.query_key)
                .map_or(true, |existing| existing.updated_at < query.data_updated_at);
            if newer {
                self.store(
                    &mut entries,
                    query.query_key.clone(),
                    CacheEntry {
                        data: query.data.clone(),
                        updated_at: query.data_updated_at,
                        invalidated: false,
                    },
                );
                written += 1;
            }
        }
        debug!(written, total = state.queries.len(), "Hydrated query cache");
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{sample_note, FakeNotesApi};
    use crate::api::{ApiError, NotesApi};
    use crate::models::{NoteTag, NotesPage};
    use chrono::Duration;

    fn notes_key(page: u32, tag: Option<&str>) -> QueryKey {
        QueryKey::notes(&NotesQuery::new(page, "", tag.map(String::from)))
    }

    fn search_key(search: &str) -> QueryKey {
        QueryKey::notes(&NotesQuery::new(1, search, None))
    }

    #[test]
    fn test_notes_key_shape() {
        let key = notes_key(1, None);
        assert_eq!(serde_json::to_string(&key).unwrap(), r#"["notes",1,"",null]"#);

        let key = notes_key(2, Some("Work"));
        assert_eq!(serde_json::to_string(&key).unwrap(), r#"["notes",2,"","Work"]"#);
    }

    #[test]
    fn test_key_deserializes_from_json() {
        let key: QueryKey = serde_json::from_str(r#"["notes",1,"",null]"#).unwrap();
        assert_eq!(key, notes_key(1, None));
    }

    #[test]
    fn test_distinct_params_are_distinct_entries() {
        let cache = QueryCache::new();
        cache.set_query_data(notes_key(1, None), &1u32).unwrap();
        cache.set_query_data(notes_key(1, Some("Work")), &2u32).unwrap();
        cache.set_query_data(notes_key(2, None), &3u32).unwrap();

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get_query_data::<u32>(&notes_key(1, Some("Work"))), Some(2));
    }

    #[test]
    fn test_invalidate_marks_whole_namespace_only() {
        let cache = QueryCache::new();
        cache.set_query_data(notes_key(1, None), &1u32).unwrap();
        cache.set_query_data(notes_key(3, Some("Todo")), &2u32).unwrap();
        cache.set_query_data(QueryKey::note("abc"), &3u32).unwrap();

        let count = cache.invalidate_queries(&QueryKey::namespace(NOTES_NAMESPACE));

        assert_eq!(count, 2);
        assert!(cache.is_stale(&notes_key(1, None)));
        assert!(cache.is_stale(&notes_key(3, Some("Todo"))));
        assert!(!cache.is_stale(&QueryKey::note("abc")));
        // Stale data is still readable.
        assert_eq!(cache.get_query_data::<u32>(&notes_key(1, None)), Some(1));
    }

    #[tokio::test]
    async fn test_fetch_query_hits_then_refetches_after_invalidation() {
        let api = FakeNotesApi::with_notes(vec![sample_note("1", "First", NoteTag::Todo)]);
        let cache = QueryCache::new();
        let query = NotesQuery::first_page(None);

        for _ in 0..2 {
            let page: NotesPage = cache
                .fetch_query(QueryKey::notes(&query), || api.fetch_notes(&query))
                .await
                .unwrap();
            assert_eq!(page.notes.len(), 1);
        }
        assert_eq!(api.list_call_count(), 1);

        cache.invalidate_queries(&QueryKey::namespace(NOTES_NAMESPACE));
        let _: NotesPage = cache
            .fetch_query(QueryKey::notes(&query), || api.fetch_notes(&query))
            .await
            .unwrap();
        assert_eq!(api.list_call_count(), 2);
        assert!(!cache.is_stale(&QueryKey::notes(&query)));
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_cache_untouched() {
        let api = FakeNotesApi::default();
        api.set_fail_list(true);
        let cache = QueryCache::new();
        let query = NotesQuery::first_page(None);

        let result: Result<NotesPage, ApiError> = cache
            .fetch_query(QueryKey::notes(&query), || api.fetch_notes(&query))
            .await;

        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_distinct_searches_stay_within_limit() {
        let cache = QueryCache::new();
        for i in 0..10_000 {
            cache.set_query_data(search_key(&format!("q{i}")), &i).unwrap();
        }
        cache.invalidate_queries(&QueryKey::namespace(NOTES_NAMESPACE));

        assert_eq!(cache.len(), DEFAULT_MAX_ENTRIES);
        assert_eq!(cache.get_query_data::<u32>(&search_key("q9999")), Some(9999));
        assert_eq!(cache.get_query_data::<u32>(&search_key("q0")), None);
    }

    #[test]
    fn test_eviction_prefers_invalidated_entries() {
        let cache = QueryCache::with_max_entries(2);
        cache.set_query_data(QueryKey::note("kept"), &1u32).unwrap();
        cache.set_query_data(notes_key(1, None), &2u32).unwrap();
        cache.invalidate_queries(&QueryKey::namespace(NOTES_NAMESPACE));

        cache.set_query_data(QueryKey::note("new"), &3u32).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_query_data::<u32>(&notes_key(1, None)), None);
        assert_eq!(cache.get_query_data::<u32>(&QueryKey::note("kept")), Some(1));
        assert_eq!(cache.get_query_data::<u32>(&QueryKey::note("new")), Some(3));
    }

    #[test]
    fn test_hydrate_respects_limit() {
        let client = QueryCache::with_max_entries(1);
        client.set_query_data(QueryKey::note("a"), &1u32).unwrap();

        let state = DehydratedState {
            queries: vec![DehydratedQuery {
                query_key: notes_key(1, None),
                data: serde_json::json!(2),
                data_updated_at: Utc::now(),
            }],
        };
        assert_eq!(client.hydrate(&state), 1);
        assert_eq!(client.len(), 1);
        assert_eq!(client.get_query_data::<u32>(&notes_key(1, None)), Some(2));
    }

    #[test]
    fn test_dehydrate_skips_invalidated_entries() {
        let cache = QueryCache::new();
        cache.set_query_data(notes_key(1, None), &1u32).unwrap();
        cache.set_query_data(QueryKey::note("a"), &2u32).unwrap();
        cache.invalidate_queries(&QueryKey::namespace(NOTES_NAMESPACE));

        let state = cache.dehydrate();
        assert_eq!(state.queries.len(), 1);
        assert_eq!(state.queries[0].query_key, QueryKey::note("a"));
    }

    #[tokio::test]
    async fn test_hydrated_entry_serves_without_fetch() {
        let server = QueryCache::new();
        let page = NotesPage {
            notes: vec![sample_note("1", "Hydrated", NoteTag::Work)],
            total_pages: 1,
        };
        server.set_query_data(notes_key(1, None), &page).unwrap();

        let json = serde_json::to_string(&server.dehydrate()).unwrap();
        let state: DehydratedState = serde_json::from_str(&json).unwrap();

        let client = QueryCache::new();
        assert_eq!(client.hydrate(&state), 1);

        let api = FakeNotesApi::default();
        let query = NotesQuery::first_page(None);
        let served: NotesPage = client
            .fetch_query(QueryKey::notes(&query), || api.fetch_notes(&query))
            .await
            .unwrap();

        assert_eq!(served, page);
        assert_eq!(api.list_call_count(), 0);
    }

    #[test]
    fn test_hydrate_keeps_newer_local_entry() {
        let client = QueryCache::new();
        client.set_query_data(notes_key(1, None), &"local").unwrap();

        let older = DehydratedState {
            queries: vec![DehydratedQuery {
                query_key: notes_key(1, None),
                data: serde_json::json!("server"),
                data_updated_at: Utc::now() - Duration::minutes(5),
            }],
        };
        assert_eq!(client.hydrate(&older), 0);
        assert_eq!(client.get_query_data::<String>(&notes_key(1, None)).as_deref(), Some("local"));

        let newer = DehydratedState {
            queries: vec![DehydratedQuery {
                query_key: notes_key(1, None),
                data: serde_json::json!("server"),
                data_updated_at: Utc::now() + Duration::minutes(5),
            }],
        };
        assert_eq!(client.hydrate(&newer), 1);
        assert_eq!(client.get_query_data::<String>(&notes_key(1, None)).as_deref(), Some("server"));
    }
}
