use api::auth::session;
use api::UserInfo;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

use crate::error::PageError;

/// The logged-in user. Requests without one are redirected to `/login`.
pub struct RequireUser(pub UserInfo);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match session::current_user(&session).await {
            Ok(Some(user)) => Ok(RequireUser(user)),
            Ok(None) => Err(Redirect::to("/login").into_response()),
            Err(error) => Err(PageError(error).into_response()),
        }
    }
}
