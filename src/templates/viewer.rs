//! Single note view.

use crate::models::Note;
use pulldown_cmark::Parser;

use super::components::{filter_path, html_escape};

pub fn render_markdown(content: &str) -> String {
    let parser = Parser::new(content);
    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, parser);
    // Raw HTML in markdown is allowed through the parser, so sanitize after.
    ammonia::clean(&html_output)
}

pub fn render_note_view(note: &Note) -> String {
    let body = if note.content.trim().is_empty() {
        "<p class=\"empty\">No content.</p>".to_string()
    } else {
        render_markdown(&note.content)
    };

    format!(
        r#"<article class="note-view">
            <a href="{back}" class="back-link">&larr; {tag} notes</a>
            <h1>{title}</h1>
            <div class="meta">
                <span class="tag-badge">{tag}</span>
                Created {created} &middot; Updated {updated}
            </div>
            <div class="content">{body}</div>
        </article>"#,
        back = filter_path(Some(note.tag.as_str())),
        tag = note.tag,
        title = html_escape(&note.title),
        created = note.created_at.format("%Y-%m-%d %H:%M"),
        updated = note.updated_at.format("%Y-%m-%d %H:%M"),
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::sample_note;
    use crate::models::NoteTag;

    #[test]
    fn test_markdown_is_rendered_and_sanitized() {
        let html = render_markdown("**bold** <script>alert(1)</script>");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_view_links_back_to_tag_list() {
        let mut note = sample_note("1", "Plan <week>", NoteTag::Work);
        note.content = String::new();
        let html = render_note_view(&note);
        assert!(html.contains(r#"href="/notes/filter/Work""#));
        assert!(html.contains("Plan &lt;week&gt;"));
        assert!(html.contains("No content."));
    }
}
