//! Turning [`AppError`] into HTTP responses.
//!
//! Page handlers deal with user-facing errors themselves (flash + redirect or a
//! re-rendered form); what reaches [`PageError`] is mostly upstream failure.
//! JSON endpoints use [`JsonError`], which answers `{"error": "..."}`, including
//! for request bodies that fail to parse.

use api::{AppError, ErrorKind};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;

fn status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log(error: &AppError) {
    if error.kind() == ErrorKind::Upstream {
        tracing::error!(error = %error, "request failed");
    }
}

#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(error: AppError) -> Self {
        Self(error)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let error = self.0;
        log(&error);
        if error.kind() == ErrorKind::Authentication {
            return Redirect::to("/login").into_response();
        }
        let status = status(error.kind());
        let html = ui::render(
            ui::ErrorPage,
            ui::ErrorPageProps {
                status: status.as_u16(),
                message: error.user_message(),
                user: None,
            },
        );
        (status, Html(html)).into_response()
    }
}

#[derive(Debug)]
pub struct JsonError(pub AppError);

impl From<AppError> for JsonError {
    fn from(error: AppError) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for JsonError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::validation(rejection.body_text()))
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let error = self.0;
        log(&error);
        let body = serde_json::json!({ "error": error.user_message() });
        (status(error.kind()), Json(body)).into_response()
    }
}
