use api::UserInfo;
use dioxus::prelude::*;

use crate::layout::page;

#[derive(Props, Clone, PartialEq)]
pub struct ErrorPageProps {
    pub status: u16,
    pub message: String,
    pub user: Option<UserInfo>,
}

#[component]
pub fn ErrorPage(props: ErrorPageProps) -> Element {
    let ErrorPageProps {
        status,
        message,
        user,
    } = props;
    page(
        "Error",
        user.as_ref(),
        None,
        rsx! {
            h1 { "Something went wrong" }
            p { "{message}" }
            p { class: "muted", "Error {status}" }
            a { class: "btn secondary", href: "/dashboard", "Back to dashboard" }
        },
    )
}
