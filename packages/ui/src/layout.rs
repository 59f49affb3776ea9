use api::UserInfo;
use dioxus::prelude::*;

const STYLE_CSS: &str = include_str!("../assets/style.css");

/// Page chrome shared by every view: head, navbar, flash message.
///
/// The `<html>` element itself is added by [`crate::render`].
pub(crate) fn page(
    title: &str,
    user: Option<&UserInfo>,
    flash: Option<&str>,
    content: Element,
) -> Element {
    let document_title = format!("{title} · Student Notes");
    let nav = match user {
        Some(user) => {
            let username = user.username.clone();
            rsx! {
                span {
                    span { class: "muted", "Signed in as {username} " }
                    form {
                        method: "post",
                        action: "/logout",
                        button { class: "btn secondary", r#type: "submit", "Log out" }
                    }
                }
            }
        }
        None => rsx! {
            span {
                a { href: "/login", "Log in" }
                " · "
                a { href: "/register", "Register" }
            }
        },
    };
    let flash = flash.map(|message| {
        rsx! {
            div { class: "flash", role: "status", "{message}" }
        }
    });

    rsx! {
        head {
            meta { charset: "utf-8" }
            meta { name: "viewport", content: "width=device-width, initial-scale=1" }
            title { "{document_title}" }
            style { dangerous_inner_html: STYLE_CSS }
        }
        body {
            header {
                class: "navbar",
                a { href: "/", "Student Notes" }
                {nav}
            }
            main {
                {flash}
                {content}
            }
        }
    }
}

/// An inline error above a form.
pub(crate) fn form_error(error: Option<&str>) -> Option<Element> {
    error.map(|message| {
        rsx! {
            div { class: "flash error", role: "alert", "{message}" }
        }
    })
}
