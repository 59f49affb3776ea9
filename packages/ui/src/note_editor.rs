//! Create/edit form for a single note.

use api::UserInfo;
use dioxus::prelude::*;
use uuid::Uuid;

use crate::html_escape;
use crate::layout::{form_error, page};

#[derive(Props, Clone, PartialEq)]
pub struct NoteEditorPageProps {
    pub user: UserInfo,
    /// `None` when creating a new note.
    pub note_id: Option<Uuid>,
    pub title: String,
    pub body: String,
    pub error: Option<String>,
}

#[component]
pub fn NoteEditorPage(props: NoteEditorPageProps) -> Element {
    let NoteEditorPageProps {
        user,
        note_id,
        title,
        body,
        error,
    } = props;

    let (heading, action, submit) = match note_id {
        Some(id) => ("Edit note", format!("/notes/{id}"), "Save"),
        None => ("New note", "/notes".to_string(), "Create"),
    };
    let error = form_error(error.as_deref());
    let title = html_escape(&title);

    page(
        heading,
        Some(&user),
        None,
        rsx! {
            h1 { "{heading}" }
            {error}
            form {
                method: "post",
                action: "{action}",
                p {
                    label { r#for: "title", "Title" }
                    br {}
                    input {
                        id: "title",
                        r#type: "text",
                        name: "title",
                        value: "{title}",
                        maxlength: "200",
                        required: true,
                    }
                }
                p {
                    label { r#for: "body", "Body" }
                    br {}
                    textarea { id: "body", name: "body", "{body}" }
                }
                button { class: "btn", r#type: "submit", "{submit}" }
                " "
                a { class: "btn secondary", href: "/dashboard", "Cancel" }
            }
        },
    )
}
