//! HTML templates and styling for the notes front end.
//!
//! ## Module Structure
//!
//! - `styles` - CSS constants and theme definitions
//! - `components` - Shared HTML components (nav bar, toasts, base template)
//! - `list` - Filtered notes list with the embedded cache state
//! - `note_form` - Note creation form
//! - `viewer` - Single note view

mod components;
mod list;
mod note_form;
mod styles;
mod viewer;

pub use components::{base_html, filter_path, html_escape, nav_bar, toasts_html};
pub use list::{render_notes_list, state_script_json, STATE_SCRIPT_ID};
pub use note_form::render_note_form;
pub use styles::STYLE;
pub use viewer::{render_markdown, render_note_view};
