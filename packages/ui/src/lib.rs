//! Server-rendered pages.
//!
//! Every page is a dioxus component rendered once to an HTML string with
//! `dioxus-ssr`; there is no client-side framework. The only script is the
//! direct-to-storage upload handler on the dashboard.

use dioxus::prelude::*;

mod auth;
mod dashboard;
mod error_page;
mod layout;
mod note_editor;

pub use auth::{LoginPage, LoginPageProps, RegisterPage, RegisterPageProps};
pub use dashboard::{DashboardPage, DashboardPageProps};
pub use error_page::{ErrorPage, ErrorPageProps};
pub use note_editor::{NoteEditorPage, NoteEditorPageProps};

/// Render `page` with `props` into a complete HTML document.
pub fn render<P: Clone + 'static>(page: fn(P) -> Element, props: P) -> String {
    let mut dom = VirtualDom::new_with_props(page, props);
    dom.rebuild_in_place();
    format!(
        "<!DOCTYPE html><html lang=\"en\">{}</html>",
        dioxus_ssr::render(&dom)
    )
}

/// Escape user data placed in an attribute value; the SSR renderer only
/// escapes text nodes.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Human-readable byte count, e.g. `1.5 MiB`.
pub fn format_size(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
