//! Filtered notes list page.

use crate::cache::DehydratedState;
use crate::models::{NotesPage, NotesQuery};

use super::components::{filter_path, html_escape};

/// Element id of the embedded dehydrated cache.
pub const STATE_SCRIPT_ID: &str = "notes-query-state";

const EXCERPT_CHARS: usize = 80;

/// Serialize `state` for a `<script type="application/json">` block.
///
/// `<`, `>` and `&` are written as JSON unicode escapes so note content can
/// never close the script element.
pub fn state_script_json(state: &DehydratedState) -> String {
    serde_json::to_string(state)
        .unwrap_or_else(|_| "{\"queries\":[]}".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn excerpt(content: &str) -> String {
    if content.chars().count() > EXCERPT_CHARS {
        let cut: String = content.chars().take(EXCERPT_CHARS).collect();
        format!("{}...", cut)
    } else {
        content.to_string()
    }
}

fn page_link(query: &NotesQuery, page: u32) -> String {
    let mut href = format!("{}?page={}", filter_path(query.tag.as_deref()), page);
    if !query.search.is_empty() {
        href.push_str(&format!("&search={}", urlencoding::encode(&query.search)));
    }
    href
}

fn pagination_html(query: &NotesQuery, total_pages: u32) -> String {
    if total_pages <= 1 {
        return String::new();
    }

    let mut html = String::from("<nav class=\"pagination\">");
    for page in 1..=total_pages {
        if page == query.page {
            html.push_str(&format!("<span class=\"current\">{}</span>", page));
        } else {
            html.push_str(&format!(
                "<a href=\"{}\">{}</a>",
                html_escape(&page_link(query, page)),
                page
            ));
        }
    }
    html.push_str("</nav>");
    html
}

/// Body of the list page: header, notes, pagination and the cache state the
/// page was rendered from.
pub fn render_notes_list(page: &NotesPage, query: &NotesQuery, state: &DehydratedState) -> String {
    let heading = match query.tag {
        Some(ref tag) => format!("Notes: {}", html_escape(tag)),
        None => "All notes".to_string(),
    };

    let mut list_html = String::new();
    if page.notes.is_empty() {
        list_html.push_str("<p class=\"empty\">No notes found.</p>");
    } else {
        list_html.push_str("<ul class=\"note-list\">");
        for note in &page.notes {
            list_html.push_str(&format!(
                r#"<li class="note-item">
                <span>
                    <span class="tag-badge">{tag}</span>
                    <a href="/notes/{id}" class="title">{title}</a>
                    <span class="excerpt">{excerpt}</span>
                </span>
                <span class="meta">{created}</span>
            </li>"#,
                tag = note.tag,
                id = urlencoding::encode(&note.id),
                title = html_escape(&note.title),
                excerpt = html_escape(&excerpt(&note.content)),
                created = note.created_at.format("%Y-%m-%d %H:%M"),
            ));
        }
        list_html.push_str("</ul>");
    }

    format!(
        r#"<div class="list-header">
            <h1>{heading}</h1>
            <a href="/notes/new" class="btn">Create note +</a>
        </div>
        {list}
        {pagination}
        <script type="application/json" id="{script_id}">{state}</script>"#,
        heading = heading,
        list = list_html,
        pagination = pagination_html(query, page.total_pages),
        script_id = STATE_SCRIPT_ID,
        state = state_script_json(state),
    )
}
