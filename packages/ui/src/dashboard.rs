//! The dashboard: a user's notes, their files, and the upload form.

use api::dashboard::Dashboard;
use api::UserInfo;
use dioxus::prelude::*;

use crate::format_size;
use crate::layout::page;

const UPLOAD_JS: &str = include_str!("../assets/upload.js");
const PREVIEW_CHARS: usize = 140;

#[derive(Props, Clone, PartialEq)]
pub struct DashboardPageProps {
    pub user: UserInfo,
    pub dashboard: Dashboard,
    pub flash: Option<String>,
    /// Advertised to the upload script so oversized files fail fast.
    pub max_upload_bytes: u64,
}

fn preview(body: &str) -> String {
    let mut preview: String = body.chars().take(PREVIEW_CHARS).collect();
    if body.chars().nth(PREVIEW_CHARS).is_some() {
        preview.push('…');
    }
    preview
}

#[component]
pub fn DashboardPage(props: DashboardPageProps) -> Element {
    let DashboardPageProps {
        user,
        dashboard,
        flash,
        max_upload_bytes,
    } = props;
    let Dashboard { notes, files } = dashboard;

    let notes = if notes.is_empty() {
        rsx! { p { class: "muted", "No notes yet." } }
    } else {
        let rows = notes.into_iter().map(|note| {
            let id = note.id;
            let title = note.title;
            let preview = preview(&note.body);
            let updated = note.updated_at.format("%Y-%m-%d %H:%M UTC").to_string();
            rsx! {
                tr {
                    key: "{id}",
                    td {
                        a { href: "/notes/{id}/edit", "{title}" }
                        div { class: "muted", "{preview}" }
                    }
                    td { class: "muted", "{updated}" }
                    td {
                        form {
                            method: "post",
                            action: "/notes/{id}/delete",
                            button { class: "btn danger", r#type: "submit", "Delete" }
                        }
                    }
                }
            }
        });
        rsx! {
            table { tbody { {rows} } }
        }
    };

    let files = if files.is_empty() {
        rsx! { p { class: "muted", "No files uploaded." } }
    } else {
        let rows = files.into_iter().map(|file| {
            let id = file.id;
            let filename = file.filename;
            let size = format_size(file.size_bytes);
            let uploaded = file.uploaded_at.format("%Y-%m-%d %H:%M UTC").to_string();
            rsx! {
                tr {
                    key: "{id}",
                    td {
                        a { href: "/files/{id}/download", "{filename}" }
                    }
                    td { class: "muted", "{size}" }
                    td { class: "muted", "{uploaded}" }
                    td {
                        form {
                            method: "post",
                            action: "/files/{id}/delete",
                            button { class: "btn danger", r#type: "submit", "Delete" }
                        }
                    }
                }
            }
        });
        rsx! {
            table { tbody { {rows} } }
        }
    };

    page(
        "Dashboard",
        Some(&user),
        flash.as_deref(),
        rsx! {
            section {
                div {
                    class: "section-header",
                    h2 { "Notes" }
                    a { class: "btn", href: "/notes/new", "New note" }
                }
                {notes}
            }
            section {
                h2 { "Files" }
                {files}
                form {
                    id: "upload-form",
                    "data-max-bytes": "{max_upload_bytes}",
                    input { id: "upload-file", r#type: "file", name: "file" }
                    " "
                    button { id: "upload-button", class: "btn", r#type: "submit", "Upload" }
                    p { id: "upload-status", class: "muted" }
                }
                noscript { p { class: "muted", "Uploading requires JavaScript." } }
            }
            script { dangerous_inner_html: UPLOAD_JS }
        },
    )
}
