//! Note creation form: validation and submit state machine.
//!
//! A [`NoteForm`] moves through
//! `Idle -> (validate) -> Invalid | Submitting -> Success | Failed`.
//! `Invalid` and `Failed` are editable again; a successful submit resets the
//! values and closes the form. The submit control is disabled while a
//! submission is in flight and a second submit is refused.

use crate::api::NotesApi;
use crate::cache::{QueryCache, QueryKey, NOTES_NAMESPACE};
use crate::models::{NewNote, Note, NoteTag};
use crate::notify::{Notifier, Toast};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 50;
pub const CONTENT_MAX_CHARS: usize = 500;

pub const CREATED_MESSAGE: &str = "Note created successfully!";

pub const TITLE_REQUIRED_MESSAGE: &str = "Title is required";
pub const TITLE_TOO_SHORT_MESSAGE: &str = "Title must have at least 3 characters.";
pub const TITLE_TOO_LONG_MESSAGE: &str = "Title must have less then 50 characters.";
pub const CONTENT_TOO_LONG_MESSAGE: &str = "Max limit 500 characters is reached!";
pub const TAG_REQUIRED_MESSAGE: &str = "Tag is required";
pub const TAG_INVALID_MESSAGE: &str = "Invalid tag selected";

// ============================================================================
// Values and Errors
// ============================================================================

/// Raw field values as typed by the user. The tag stays a string until
/// validation so an unknown value can be reported inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFormValues {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tag: String,
}

impl Default for NoteFormValues {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            tag: NoteTag::default().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Title,
    Content,
    Tag,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Content => "content",
            FormField::Tag => "tag",
        }
    }
}

/// Field -> message pairs. Empty means the values are valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<FormField, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Check every field and collect all problems.
///
/// Lengths are counted in characters. The title is measured after trimming
/// but submitted as entered.
pub fn validate_note_form(values: &NoteFormValues) -> Result<NewNote, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let title_len = values.title.trim().chars().count();
    if title_len == 0 {
        errors.insert(FormField::Title, TITLE_REQUIRED_MESSAGE);
    } else if title_len < TITLE_MIN_CHARS {
        errors.insert(FormField::Title, TITLE_TOO_SHORT_MESSAGE);
    } else if title_len > TITLE_MAX_CHARS {
        errors.insert(FormField::Title, TITLE_TOO_LONG_MESSAGE);
    }

    if values.content.chars().count() > CONTENT_MAX_CHARS {
        errors.insert(FormField::Content, CONTENT_TOO_LONG_MESSAGE);
    }

    let tag = if values.tag.trim().is_empty() {
        errors.insert(FormField::Tag, TAG_REQUIRED_MESSAGE);
        None
    } else {
        match values.tag.parse::<NoteTag>() {
            Ok(tag) => Some(tag),
            Err(_) => {
                errors.insert(FormField::Tag, TAG_INVALID_MESSAGE);
                None
            }
        }
    };

    match tag {
        Some(tag) if errors.is_empty() => Ok(NewNote {
            title: values.title.clone(),
            content: values.content.clone(),
            tag,
        }),
        _ => Err(errors),
    }
}

// ============================================================================
// Form State Machine
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    Idle,
    Invalid,
    Submitting,
    Success,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid(ValidationErrors),
    /// A submission is already in flight; nothing was sent.
    Pending,
    Created(Note),
    Failed(String),
}

pub struct NoteForm {
    field_id: String,
    values: NoteFormValues,
    errors: ValidationErrors,
    status: FormStatus,
}

impl Default for NoteForm {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteForm {
    pub fn new() -> Self {
        Self::with_values(NoteFormValues::default())
    }

    pub fn with_values(values: NoteFormValues) -> Self {
        let field_id = format!("note-form-{:08x}", rand::thread_rng().gen::<u32>());
        Self {
            field_id,
            values,
            errors: ValidationErrors::default(),
            status: FormStatus::Idle,
        }
    }

    /// Prefix for the label/input ids of this form instance.
    pub fn field_id(&self) -> &str {
        &self.field_id
    }

    pub fn values(&self) -> &NoteFormValues {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut NoteFormValues {
        &mut self.values
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn is_submit_disabled(&self) -> bool {
        self.status == FormStatus::Submitting
    }

    pub fn reset(&mut self) {
        self.values = NoteFormValues::default();
        self.errors = ValidationErrors::default();
    }

    /// Validate and, if valid, enter `Submitting`.
    ///
    /// Returns the request to send, or the outcome that ends this submit
    /// without touching the network.
    pub fn begin_submit(&mut self) -> Result<NewNote, SubmitOutcome> {
        if self.status == FormStatus::Submitting {
            return Err(SubmitOutcome::Pending);
        }

        match validate_note_form(&self.values) {
            Ok(new_note) => {
                self.errors = ValidationErrors::default();
                self.status = FormStatus::Submitting;
                Ok(new_note)
            }
            Err(errors) => {
                self.errors = errors.clone();
                self.status = FormStatus::Invalid;
                Err(SubmitOutcome::Invalid(errors))
            }
        }
    }

    /// Apply the result of the create request started by [`begin_submit`].
    ///
    /// On success every `notes` query is invalidated, a success toast is
    /// shown, the values are reset and `on_close` runs once. On failure an
    /// error toast is shown and the entered values are kept.
    ///
    /// [`begin_submit`]: NoteForm::begin_submit
    pub fn finish_submit<N, F, E>(
        &mut self,
        result: Result<Note, E>,
        cache: &QueryCache,
        notifier: &N,
        on_close: F,
    ) -> SubmitOutcome
    where
        N: Notifier + ?Sized,
        F: FnOnce(),
        E: std::fmt::Display,
    {
        match result {
            Ok(note) => {
                info!(id = %note.id, tag = %note.tag, "Note created");
                cache.invalidate_queries(&QueryKey::namespace(NOTES_NAMESPACE));
                notifier.notify(Toast::success(CREATED_MESSAGE));
                self.reset();
                self.status = FormStatus::Success;
                on_close();
                SubmitOutcome::Created(note)
            }
            Err(e) => {
                let message = format!("Could not create note: {}", e);
                warn!(error = %e, "Note creation failed");
                notifier.notify(Toast::error(message.clone()));
                self.status = FormStatus::Failed(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Validate, send the create request and apply its result.
    pub async fn submit<A, N, F>(
        &mut self,
        api: &A,
        cache: &QueryCache,
        notifier: &N,
        on_close: F,
    ) -> SubmitOutcome
    where
        A: NotesApi + ?Sized,
        N: Notifier + ?Sized,
        F: FnOnce(),
    {
        let new_note = match self.begin_submit() {
            Ok(new_note) => new_note,
            Err(outcome) => return outcome,
        };
        let result = api.create_note(&new_note).await;
        self.finish_submit(result, cache, notifier, on_close)
    }

    /// Close without submitting. Values, cache and status are left alone.
    pub fn cancel<F: FnOnce()>(&self, on_close: F) {
        on_close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{sample_note, FakeNotesApi};
    use crate::models::{NotesPage, NotesQuery};
    use crate::notify::{FlashNotifier, ToastKind};
    use std::cell::Cell;

    fn values(title: &str, content: &str, tag: &str) -> NoteFormValues {
        NoteFormValues {
            title: title.to_string(),
            content: content.to_string(),
            tag: tag.to_string(),
        }
    }

    // ---- validation ----

    #[test]
    fn test_title_length_bounds() {
        assert!(validate_note_form(&values(&"a".repeat(2), "", "Todo")).is_err());
        assert!(validate_note_form(&values(&"a".repeat(3), "", "Todo")).is_ok());
        assert!(validate_note_form(&values(&"a".repeat(50), "", "Todo")).is_ok());

        let errors = validate_note_form(&values(&"a".repeat(2), "", "Todo")).unwrap_err();
        assert_eq!(
            errors.get(FormField::Title),
            Some("Title must have at least 3 characters.")
        );

        let errors = validate_note_form(&values(&"a".repeat(51), "", "Todo")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(FormField::Title),
            Some("Title must have less then 50 characters.")
        );
    }

    #[test]
    fn test_title_is_trimmed_for_length_only() {
        let errors = validate_note_form(&values("  ab  ", "", "Todo")).unwrap_err();
        assert_eq!(errors.get(FormField::Title), Some(TITLE_TOO_SHORT_MESSAGE));

        let errors = validate_note_form(&values("   ", "", "Todo")).unwrap_err();
        assert_eq!(errors.get(FormField::Title), Some("Title is required"));

        let note = validate_note_form(&values("  abc ", "", "Todo")).unwrap();
        assert_eq!(note.title, "  abc ");
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        assert!(validate_note_form(&values(&"é".repeat(50), "", "Todo")).is_ok());
        assert!(validate_note_form(&values("abc", &"ü".repeat(500), "Todo")).is_ok());
    }

    #[test]
    fn test_content_length_bound() {
        assert!(validate_note_form(&values("abc", &"x".repeat(500), "Todo")).is_ok());
        let errors = validate_note_form(&values("abc", &"x".repeat(501), "Todo")).unwrap_err();
        assert_eq!(
            errors.get(FormField::Content),
            Some("Max limit 500 characters is reached!")
        );
        assert!(errors.get(FormField::Title).is_none());
    }

    #[test]
    fn test_tag_must_be_known() {
        for tag in NoteTag::ALL {
            assert!(validate_note_form(&values("abc", "", tag.as_str())).is_ok());
        }
        let errors = validate_note_form(&values("abc", "", "Groceries")).unwrap_err();
        assert_eq!(errors.get(FormField::Tag), Some("Invalid tag selected"));

        let errors = validate_note_form(&values("abc", "", "")).unwrap_err();
        assert_eq!(errors.get(FormField::Tag), Some("Tag is required"));
    }

    #[test]
    fn test_all_field_errors_are_reported() {
        let errors = validate_note_form(&values("", &"x".repeat(600), "Nope")).unwrap_err();
        assert_eq!(errors.len(), 3);
        let json = serde_json::to_value(&errors).unwrap();
        assert!(json.get("title").is_some());
        assert!(json.get("content").is_some());
        assert!(json.get("tag").is_some());
    }

    #[test]
    fn test_initial_values() {
        let form = NoteForm::new();
        assert_eq!(form.values(), &values("", "", "Todo"));
        assert_eq!(form.status(), &FormStatus::Idle);
        assert!(!form.is_submit_disabled());
        assert!(form.field_id().starts_with("note-form-"));
    }

    // ---- submit ----

    #[tokio::test]
    async fn test_short_title_is_rejected_without_network_call() {
        let api = FakeNotesApi::default();
        let cache = QueryCache::new();
        let notifier = FlashNotifier::new();
        let closed = Cell::new(0);

        let mut form = NoteForm::with_values(values("Hi", "", "Todo"));
        let outcome = form
            .submit(&api, &cache, &notifier, || closed.set(closed.get() + 1))
            .await;

        match outcome {
            SubmitOutcome::Invalid(errors) => assert!(errors.get(FormField::Title).is_some()),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(api.created().is_empty());
        assert_eq!(closed.get(), 0);
        assert_eq!(form.status(), &FormStatus::Invalid);
        assert!(form.errors().get(FormField::Title).is_some());
        assert_eq!(form.values().title, "Hi");
    }

    #[tokio::test]
    async fn test_valid_submit_creates_invalidates_resets_and_closes_once() {
        let api = FakeNotesApi::default();
        let cache = QueryCache::new();
        let notifier = FlashNotifier::new();
        let closed = Cell::new(0);

        let list_key = QueryKey::notes(&NotesQuery::first_page(None));
        let work_key = QueryKey::notes(&NotesQuery::new(2, "x", Some("Work".into())));
        cache.set_query_data(list_key.clone(), &NotesPage::default()).unwrap();
        cache.set_query_data(work_key.clone(), &NotesPage::default()).unwrap();

        let mut form = NoteForm::with_values(values("Buy milk", "2 liters", "Shopping"));
        let outcome = form
            .submit(&api, &cache, &notifier, || closed.set(closed.get() + 1))
            .await;

        assert!(matches!(outcome, SubmitOutcome::Created(ref n) if n.title == "Buy milk"));
        assert_eq!(
            api.created(),
            vec![NewNote {
                title: "Buy milk".into(),
                content: "2 liters".into(),
                tag: NoteTag::Shopping,
            }]
        );
        assert!(cache.is_stale(&list_key));
        assert!(cache.is_stale(&work_key));
        assert_eq!(notifier.take(), vec![Toast::success(CREATED_MESSAGE)]);
        assert_eq!(form.values(), &NoteFormValues::default());
        assert_eq!(form.status(), &FormStatus::Success);
        assert_eq!(closed.get(), 1);
    }

    #[tokio::test]
    async fn test_failed_create_keeps_values_and_notifies_error() {
        let api = FakeNotesApi::default();
        api.set_fail_create(true);
        let cache = QueryCache::new();
        let key = QueryKey::notes(&NotesQuery::first_page(None));
        cache.set_query_data(key.clone(), &NotesPage::default()).unwrap();
        let notifier = FlashNotifier::new();
        let closed = Cell::new(false);

        let mut form = NoteForm::with_values(values("Buy milk", "", "Shopping"));
        let outcome = form.submit(&api, &cache, &notifier, || closed.set(true)).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert!(matches!(form.status(), FormStatus::Failed(_)));
        assert!(!form.is_submit_disabled());
        assert_eq!(form.values().title, "Buy milk");
        assert!(!cache.is_stale(&key));
        assert!(!closed.get());

        let toasts = notifier.take();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Error);
    }

    #[test]
    fn test_second_submit_while_pending_is_refused() {
        let mut form = NoteForm::with_values(values("Buy milk", "", "Shopping"));

        assert!(form.begin_submit().is_ok());
        assert!(form.is_submit_disabled());
        assert_eq!(form.begin_submit(), Err(SubmitOutcome::Pending));

        let cache = QueryCache::new();
        let notifier = FlashNotifier::new();
        let note = sample_note("n1", "Buy milk", NoteTag::Shopping);
        let outcome = form.finish_submit::<_, _, String>(Ok(note), &cache, &notifier, || {});
        assert!(matches!(outcome, SubmitOutcome::Created(_)));
        assert!(!form.is_submit_disabled());
    }

    #[test]
    fn test_cancel_only_closes() {
        let cache = QueryCache::new();
        let key = QueryKey::notes(&NotesQuery::first_page(None));
        cache.set_query_data(key.clone(), &NotesPage::default()).unwrap();

        let form = NoteForm::with_values(values("Draft", "", "Work"));
        let closed = Cell::new(0);
        form.cancel(|| closed.set(closed.get() + 1));

        assert_eq!(closed.get(), 1);
        assert_eq!(form.status(), &FormStatus::Idle);
        assert_eq!(form.values().title, "Draft");
        assert!(!cache.is_stale(&key));
    }
}
