//! Login and registration forms.

use dioxus::prelude::*;

use crate::html_escape;
use crate::layout::{form_error, page};

#[derive(Props, Clone, PartialEq, Default)]
pub struct LoginPageProps {
    /// Pre-filled after a failed attempt.
    pub username: String,
    pub error: Option<String>,
    pub flash: Option<String>,
}

#[component]
pub fn LoginPage(props: LoginPageProps) -> Element {
    let LoginPageProps {
        username,
        error,
        flash,
    } = props;
    let error = form_error(error.as_deref());
    let username = html_escape(&username);

    page(
        "Log in",
        None,
        flash.as_deref(),
        rsx! {
            form {
                class: "auth-form",
                method: "post",
                action: "/login",
                h1 { "Log in" }
                {error}
                label { r#for: "username", "Username" }
                input {
                    id: "username",
                    r#type: "text",
                    name: "username",
                    value: "{username}",
                    autocomplete: "username",
                    required: true,
                }
                label { r#for: "password", "Password" }
                input {
                    id: "password",
                    r#type: "password",
                    name: "password",
                    autocomplete: "current-password",
                    required: true,
                }
                button { class: "btn", r#type: "submit", "Log in" }
                p {
                    class: "muted",
                    "No account yet? "
                    a { href: "/register", "Register" }
                }
            }
        },
    )
}

#[derive(Props, Clone, PartialEq, Default)]
pub struct RegisterPageProps {
    pub username: String,
    pub error: Option<String>,
}

#[component]
pub fn RegisterPage(props: RegisterPageProps) -> Element {
    let RegisterPageProps { username, error } = props;
    let error = form_error(error.as_deref());
    let username = html_escape(&username);

    page(
        "Register",
        None,
        None,
        rsx! {
            form {
                class: "auth-form",
                method: "post",
                action: "/register",
                h1 { "Create an account" }
                {error}
                label { r#for: "username", "Username" }
                input {
                    id: "username",
                    r#type: "text",
                    name: "username",
                    value: "{username}",
                    autocomplete: "username",
                    minlength: "3",
                    maxlength: "32",
                    required: true,
                }
                label { r#for: "password", "Password" }
                input {
                    id: "password",
                    r#type: "password",
                    name: "password",
                    autocomplete: "new-password",
                    minlength: "8",
                    required: true,
                }
                button { class: "btn", r#type: "submit", "Register" }
                p {
                    class: "muted",
                    "Already registered? "
                    a { href: "/login", "Log in" }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render;

    #[test]
    fn test_login_page_escapes_username() {
        let html = render(
            LoginPage,
            LoginPageProps {
                username: "<script>".to_string(),
                error: Some("invalid username or password".to_string()),
                flash: None,
            },
        );

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("action=\"/login\""));
        assert!(html.contains("invalid username or password"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_username_cannot_break_out_of_value() {
        let html = render(
            LoginPage,
            LoginPageProps {
                username: "x\" autofocus onfocus=\"alert(1)".to_string(),
                ..Default::default()
            },
        );
        assert!(html.contains("value=\"x&quot; autofocus onfocus=&quot;alert(1)\""));
        assert!(!html.contains("onfocus=\"alert(1)\""));

        let html = render(
            RegisterPage,
            RegisterPageProps {
                username: "<b>\"bob\"".to_string(),
                error: None,
            },
        );
        assert!(html.contains("value=\"&lt;b&gt;&quot;bob&quot;\""));
    }

    #[test]
    fn test_register_page_posts_to_register() {
        let html = render(RegisterPage, RegisterPageProps::default());
        assert!(html.contains("action=\"/register\""));
        assert!(html.contains("name=\"password\""));
    }
}
