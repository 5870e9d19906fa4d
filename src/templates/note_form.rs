//! Note creation form.

use crate::form::{FormField, NoteForm, CONTENT_MAX_CHARS};
use crate::models::NoteTag;

use super::components::html_escape;

fn field_error(form: &NoteForm, field: FormField) -> String {
    match form.errors().get(field) {
        Some(message) => format!(
            r#"<span class="field-error" id="{}-{}-error">{}</span>"#,
            form.field_id(),
            field.as_str(),
            html_escape(message)
        ),
        None => String::new(),
    }
}

pub fn render_note_form(form: &NoteForm) -> String {
    let id = form.field_id();
    let values = form.values();

    let mut options = String::new();
    for tag in NoteTag::ALL {
        let selected = if values.tag == tag.as_str() { " selected" } else { "" };
        options.push_str(&format!(
            r#"<option value="{tag}"{selected}>{tag}</option>"#,
            tag = tag,
            selected = selected
        ));
    }

    let disabled = if form.is_submit_disabled() { " disabled" } else { "" };

    format!(
        r##"
        <h1>New Note</h1>
        <form method="POST" action="/notes/new" class="note-form" id="{id}">
            <div class="form-group">
                <label for="{id}-title">Title</label>
                <input type="text" id="{id}-title" name="title" value="{title}" autofocus>
                {title_error}
            </div>

            <div class="form-group">
                <label for="{id}-content">Content</label>
                <textarea id="{id}-content" name="content" rows="8" maxlength="{content_max}">{content}</textarea>
                {content_error}
            </div>

            <div class="form-group">
                <label for="{id}-tag">Tag</label>
                <select id="{id}-tag" name="tag">
                    {options}
                </select>
                {tag_error}
            </div>

            <div class="form-actions">
                <button type="submit" name="action" value="cancel" class="btn secondary" formnovalidate>Cancel</button>
                <button type="submit" name="action" value="create" class="btn" id="{id}-submit"{disabled}>Create note</button>
            </div>
        </form>

        <script>
            document.getElementById('{id}').addEventListener('submit', function(event) {{
                if (event.submitter && event.submitter.value === 'create') {{
                    const button = document.getElementById('{id}-submit');
                    // Submitting a disabled button drops its name/value, so keep the action.
                    const action = document.createElement('input');
                    action.type = 'hidden';
                    action.name = 'action';
                    action.value = 'create';
                    this.appendChild(action);
                    button.disabled = true;
                }}
            }});
        </script>
        "##,
        id = id,
        title = html_escape(&values.title),
        title_error = field_error(form, FormField::Title),
        content_max = CONTENT_MAX_CHARS,
        content = html_escape(&values.content),
        content_error = field_error(form, FormField::Content),
        options = options,
        tag_error = field_error(form, FormField::Tag),
        disabled = disabled,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::NoteFormValues;

    #[test]
    fn test_initial_form_selects_todo() {
        let form = NoteForm::new();
        let html = render_note_form(&form);
        assert!(html.contains(r#"<option value="Todo" selected>Todo</option>"#));
        assert!(html.contains(&format!(r#"<label for="{}-title">"#, form.field_id())));
        assert!(!html.contains("field-error"));
    }

    #[test]
    fn test_errors_render_inline_and_values_are_kept() {
        let mut form = NoteForm::with_values(NoteFormValues {
            title: "Hi".into(),
            content: "<b>".into(),
            tag: "Work".into(),
        });
        assert!(form.begin_submit().is_err());

        let html = render_note_form(&form);
        assert!(html.contains("Title must have at least 3 characters.</span>"));
        assert!(html.contains(r#"value="Hi""#));
        assert!(html.contains("&lt;b&gt;</textarea>"));
        assert!(html.contains(r#"<option value="Work" selected>Work</option>"#));
    }

    #[test]
    fn test_submit_disabled_while_pending() {
        let mut form = NoteForm::with_values(NoteFormValues {
            title: "Buy milk".into(),
            content: String::new(),
            tag: "Shopping".into(),
        });
        assert!(form.begin_submit().is_ok());

        let html = render_note_form(&form);
        assert!(html.contains(&format!(r#"id="{}-submit" disabled>"#, form.field_id())));
    }
}
