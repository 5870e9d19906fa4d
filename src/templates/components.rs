//! Shared HTML components for the notes front end.
//!
//! Contains the navigation bar, toast rendering and the base HTML template.

use crate::models::NoteTag;
use crate::notify::{Toast, ToastKind};
use crate::prefetch::ALL_SEGMENT;

use super::styles::STYLE;

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Path of the filtered list page for `tag` (`None` is "all").
pub fn filter_path(tag: Option<&str>) -> String {
    format!(
        "/notes/filter/{}",
        urlencoding::encode(tag.unwrap_or(ALL_SEGMENT))
    )
}

// ============================================================================
// Navigation Bar
// ============================================================================

pub fn nav_bar(active_tag: Option<&str>, search_query: Option<&str>) -> String {
    let query_val = search_query.unwrap_or("");

    let mut links = format!(
        r#"<a href="{}"{}>All</a>"#,
        filter_path(None),
        if active_tag.is_none() { r#" class="active""# } else { "" }
    );
    for tag in NoteTag::ALL {
        let active = active_tag == Some(tag.as_str());
        links.push_str(&format!(
            r#"<a href="{}"{}>{}</a>"#,
            filter_path(Some(tag.as_str())),
            if active { r#" class="active""# } else { "" },
            tag
        ));
    }

    format!(
        r#"<nav class="nav-bar">
            {links}
            <span class="spacer"></span>
            <form class="search-box" action="{action}" method="get">
                <input type="text" name="search" placeholder="Search..." value="{query}">
                <button type="submit">Go</button>
            </form>
            <a href="/notes/new">New note</a>
        </nav>"#,
        links = links,
        action = html_escape(&filter_path(active_tag)),
        query = html_escape(query_val),
    )
}

// ============================================================================
// Toasts
// ============================================================================

pub fn toasts_html(toasts: &[Toast]) -> String {
    toasts
        .iter()
        .map(|toast| {
            let class = match toast.kind {
                ToastKind::Success => "success",
                ToastKind::Error => "error",
            };
            format!(
                r#"<div class="message {}" role="status">{}</div>"#,
                class,
                html_escape(&toast.message)
            )
        })
        .collect()
}

// ============================================================================
// Base HTML Template
// ============================================================================

pub fn base_html(title: &str, content: &str, nav: &str, toasts: &[Toast]) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - NoteHub</title>
    <style>{STYLE}</style>
</head>
<body>
    {nav}
    <div class="container">
        {toasts}
        {content}
    </div>
</body>
</html>"#,
        title = html_escape(title),
        nav = nav,
        toasts = toasts_html(toasts),
        content = content,
    )
}
