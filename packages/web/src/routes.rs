//! HTTP routes.
//!
//! Pages follow POST-redirect-GET: a successful form post answers `303 See Other`
//! and leaves a flash message in the session for the next page. The two upload
//! endpoints speak JSON because they are driven by the dashboard script.

use api::auth::{self, session};
use api::models::{FileRef, NoteInput, UploadConfirmation, UploadRequest, UploadTicket, UserInfo};
use api::{dashboard, files, notes, AppContext, AppError, ErrorKind};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::{JsonError, PageError};
use crate::extract::RequireUser;

type PageResult<T = Response> = Result<T, PageError>;

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout).post(logout))
        .route("/dashboard", get(dashboard_page))
        .route("/notes/new", get(new_note))
        .route("/notes", post(create_note))
        .route("/notes/{id}/edit", get(edit_note))
        .route("/notes/{id}", post(update_note))
        .route("/notes/{id}/delete", post(delete_note))
        .route("/files/upload-request", post(request_upload))
        .route("/files/confirm", post(confirm_upload))
        .route("/files/{id}/download", get(download_file))
        .route("/files/{id}/delete", post(delete_file))
        .route("/healthz", get(healthz))
        .with_state(ctx)
}

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn redirect_with_flash(
    session: &Session,
    to: &str,
    message: impl Into<String>,
) -> PageResult<Redirect> {
    session::set_flash(session, message).await?;
    Ok(Redirect::to(to))
}

/// Back to the dashboard with the error as a flash message, unless it is an
/// upstream failure.
async fn flash_error(session: &Session, error: AppError) -> PageResult<Redirect> {
    if !error.is_user_facing() {
        return Err(error.into());
    }
    redirect_with_flash(session, "/dashboard", error.user_message()).await
}

async fn index(session: Session) -> PageResult<Redirect> {
    let target = match session::current_user(&session).await? {
        Some(_) => "/dashboard",
        None => "/login",
    };
    Ok(Redirect::to(target))
}

// ---- accounts ----

async fn register_form(session: Session) -> PageResult {
    if session::current_user(&session).await?.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let html = ui::render(ui::RegisterPage, ui::RegisterPageProps::default());
    Ok(Html(html).into_response())
}

async fn register(
    State(ctx): State<AppContext>,
    session: Session,
    Form(form): Form<Credentials>,
) -> PageResult {
    match auth::register(&ctx, &form.username, &form.password).await {
        Ok(user) => {
            session::establish(&session, &user).await?;
            let welcome = format!("Welcome, {}!", user.username);
            Ok(redirect_with_flash(&session, "/dashboard", welcome)
                .await?
                .into_response())
        }
        Err(error) if error.kind() == ErrorKind::Validation => {
            let html = ui::render(
                ui::RegisterPage,
                ui::RegisterPageProps {
                    username: form.username,
                    error: Some(error.user_message()),
                },
            );
            Ok((StatusCode::BAD_REQUEST, Html(html)).into_response())
        }
        Err(error) => Err(error.into()),
    }
}

async fn login_form(session: Session) -> PageResult {
    if session::current_user(&session).await?.is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }
    let flash = session::take_flash(&session).await?;
    let html = ui::render(
        ui::LoginPage,
        ui::LoginPageProps {
            flash,
            ..Default::default()
        },
    );
    Ok(Html(html).into_response())
}

async fn login(
    State(ctx): State<AppContext>,
    session: Session,
    Form(form): Form<Credentials>,
) -> PageResult {
    match auth::login(&ctx, &form.username, &form.password).await {
        Ok(user) => {
            session::establish(&session, &user).await?;
            Ok(Redirect::to("/dashboard").into_response())
        }
        Err(error) if error.kind() == ErrorKind::Authentication => {
            let html = ui::render(
                ui::LoginPage,
                ui::LoginPageProps {
                    username: form.username,
                    error: Some(error.user_message()),
                    flash: None,
                },
            );
            Ok((StatusCode::UNAUTHORIZED, Html(html)).into_response())
        }
        Err(error) => Err(error.into()),
    }
}

async fn logout(session: Session) -> PageResult<Redirect> {
    if let Some(user) = session::current_user(&session).await? {
        tracing::info!(user_id = %user.id, "user logged out");
    }
    session::end(&session).await?;
    Ok(Redirect::to("/login"))
}

// ---- dashboard & notes ----

async fn dashboard_page(
    State(ctx): State<AppContext>,
    RequireUser(user): RequireUser,
    session: Session,
) -> PageResult<Html<String>> {
    let flash = session::take_flash(&session).await?;
    let dashboard = dashboard::load(&ctx, &user).await?;
    Ok(Html(ui::render(
        ui::DashboardPage,
        ui::DashboardPageProps {
            user,
            dashboard,
            flash,
            max_upload_bytes: ctx.uploads.max_bytes,
        },
    )))
}

fn editor(
    user: UserInfo,
    note_id: Option<Uuid>,
    input: NoteInput,
    error: Option<String>,
) -> Html<String> {
    Html(ui::render(
        ui::NoteEditorPage,
        ui::NoteEditorPageProps {
            user,
            note_id,
            title: input.title,
            body: input.body,
            error,
        },
    ))
}

async fn new_note(RequireUser(user): RequireUser) -> Html<String> {
    editor(user, None, NoteInput::default(), None)
}

async fn create_note(
    State(ctx): State<AppContext>,
    RequireUser(user): RequireUser,
    session: Session,
    Form(input): Form<NoteInput>,
) -> PageResult {
    match notes::create(&ctx, &user, input.clone()).await {
        Ok(_) => Ok(redirect_with_flash(&session, "/dashboard", "Note created")
            .await?
            .into_response()),
        Err(error) if error.kind() == ErrorKind::Validation => {
            let page = editor(user, None, input, Some(error.user_message()));
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(error) => Err(error.into()),
    }
}

async fn edit_note(
    State(ctx): State<AppContext>,
    RequireUser(user): RequireUser,
    session: Session,
    Path(id): Path<Uuid>,
) -> PageResult {
    match notes::get(&ctx, &user, id).await {
        Ok(note) => {
            let input = NoteInput {
                title: note.title,
                body: note.body,
            };
            Ok(editor(user, Some(note.id), input, None).into_response())
        }
        Err(error) => Ok(flash_error(&session, error).await?.into_response()),
    }
}

async fn update_note(
    State(ctx): State<AppContext>,
    RequireUser(user): RequireUser,
    session: Session,
    Path(id): Path<Uuid>,
    Form(input): Form<NoteInput>,
) -> PageResult {
    match notes::update(&ctx, &user, id, input.clone()).await {
        Ok(_) => Ok(redirect_with_flash(&session, "/dashboard", "Note saved")
            .await?
            .into_response()),
        Err(error) if error.kind() == ErrorKind::Validation => {
            let page = editor(user, Some(id), input, Some(error.user_message()));
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(error) => Ok(flash_error(&session, error).await?.into_response()),
    }
}

async fn delete_note(
    State(ctx): State<AppContext>,
    RequireUser(user): RequireUser,
    session: Session,
    Path(id): Path<Uuid>,
) -> PageResult<Redirect> {
    match notes::delete(&ctx, &user, id).await {
        Ok(()) => redirect_with_flash(&session, "/dashboard", "Note deleted").await,
        Err(error) => flash_error(&session, error).await,
    }
}

// ---- files ----

async fn request_upload(
    State(ctx): State<AppContext>,
    RequireUser(user): RequireUser,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<UploadTicket>, JsonError> {
    let Json(request) = payload?;
    Ok(Json(files::request_upload(&ctx, &user, request).await?))
}

async fn confirm_upload(
    State(ctx): State<AppContext>,
    RequireUser(user): RequireUser,
    session: Session,
    payload: Result<Json<UploadConfirmation>, JsonRejection>,
) -> Result<(StatusCode, Json<FileRef>), JsonError> {
    let Json(confirmation) = payload?;
    let file = files::confirm_upload(&ctx, &user, confirmation).await?;
    session::set_flash(&session, format!("Uploaded {}", file.filename)).await?;
    Ok((StatusCode::CREATED, Json(file)))
}

async fn download_file(
    State(ctx): State<AppContext>,
    RequireUser(user): RequireUser,
    session: Session,
    Path(id): Path<Uuid>,
) -> PageResult<Redirect> {
    match files::request_download(&ctx, &user, id).await {
        Ok(url) => Ok(Redirect::to(url.as_str())),
        Err(error) => flash_error(&session, error).await,
    }
}

async fn delete_file(
    State(ctx): State<AppContext>,
    RequireUser(user): RequireUser,
    session: Session,
    Path(id): Path<Uuid>,
) -> PageResult<Redirect> {
    match files::delete(&ctx, &user, id).await {
        Ok(()) => redirect_with_flash(&session, "/dashboard", "File deleted").await,
        Err(error) => flash_error(&session, error).await,
    }
}

async fn healthz(State(ctx): State<AppContext>) -> (StatusCode, &'static str) {
    match ctx.repo.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(error) => {
            tracing::error!(error = %error, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use api::db::MemoryRepository;
    use api::settings::Uploads;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use store::MemoryBlobStore;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use super::*;

    const PASSWORD: &str = "correct-horse";

    struct TestApp {
        router: Router,
        ctx: AppContext,
        blobs: MemoryBlobStore,
    }

    impl TestApp {
        fn new() -> Self {
            let blobs = MemoryBlobStore::new();
            let ctx = AppContext::new(
                Arc::new(MemoryRepository::new()),
                Arc::new(blobs.clone()),
                Uploads::default(),
            );
            let router =
                router(ctx.clone()).layer(SessionManagerLayer::new(MemoryStore::default()));
            Self { router, ctx, blobs }
        }

        async fn send(&self, request: Request<Body>) -> Response {
            self.router.clone().oneshot(request).await.unwrap()
        }

        /// Register `username` and return the session cookie.
        async fn sign_up(&self, username: &str) -> String {
            let response = self
                .send(form_request(
                    "/register",
                    &format!("username={username}&password={PASSWORD}"),
                    None,
                ))
                .await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
            assert_eq!(location(&response), "/dashboard");
            session_cookie(&response).expect("registration sets a session cookie")
        }

        async fn user(&self, username: &str) -> UserInfo {
            auth::login(&self.ctx, username, PASSWORD).await.unwrap()
        }
    }

    fn with_cookie(builder: axum::http::request::Builder, cookie: Option<&str>) -> axum::http::request::Builder {
        match cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        with_cookie(Request::get(uri), cookie)
            .body(Body::empty())
            .unwrap()
    }

    fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        with_cookie(Request::post(uri), cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
        with_cookie(Request::post(uri), cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn session_cookie(response: &Response) -> Option<String> {
        let value = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
        value.split(';').next().map(str::to_string)
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_pages_require_login() {
        let app = TestApp::new();

        for uri in ["/dashboard", "/notes/new"] {
            let response = app.send(get_request(uri, None)).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), "/login");
        }

        let response = app.send(get_request("/", None)).await;
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_register_lands_on_dashboard() {
        let app = TestApp::new();
        let cookie = app.sign_up("alice").await;

        let response = app.send(get_request("/dashboard", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Signed in as alice"));
        assert!(html.contains("Welcome, alice!"));

        let response = app.send(get_request("/", Some(&cookie))).await;
        assert_eq!(location(&response), "/dashboard");
    }

    #[tokio::test]
    async fn test_duplicate_registration_rerenders_form() {
        let app = TestApp::new();
        app.sign_up("alice").await;

        let response = app
            .send(form_request(
                "/register",
                &format!("username=ALICE&password={PASSWORD}"),
                None,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response)
            .await
            .contains("Username is already taken"));
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let app = TestApp::new();
        app.sign_up("alice").await;

        let response = app
            .send(form_request(
                "/login",
                "username=alice&password=wrong-password",
                None,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_text(response)
            .await
            .contains("Invalid username or password"));

        let response = app
            .send(form_request(
                "/login",
                &format!("username=alice&password={PASSWORD}"),
                None,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
        let cookie = session_cookie(&response).unwrap();

        let response = app.send(form_request("/logout", "", Some(&cookie))).await;
        assert_eq!(location(&response), "/login");

        let response = app.send(get_request("/dashboard", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let file_id = Uuid::new_v4();
        for request in [
            form_request("/notes", "title=After+logout&body=", Some(&cookie)),
            json_request(
                "/files/upload-request",
                json!({ "filename": "late.txt", "size": 10 }),
                Some(&cookie),
            ),
            get_request(&format!("/files/{file_id}/download"), Some(&cookie)),
            form_request(&format!("/files/{file_id}/delete"), "", Some(&cookie)),
        ] {
            let uri = request.uri().to_string();
            let response = app.send(request).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), "/login", "{uri}");
        }
        let alice = app.user("alice").await;
        assert!(notes::list(&app.ctx, &alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_note_lifecycle() {
        let app = TestApp::new();
        let cookie = app.sign_up("alice").await;

        let response = app
            .send(form_request(
                "/notes",
                "title=Week+1&body=%3Cb%3Eraw%3C%2Fb%3E",
                Some(&cookie),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let alice = app.user("alice").await;
        let note = notes::list(&app.ctx, &alice).await.unwrap().remove(0);
        assert_eq!(note.title, "Week 1");
        assert_eq!(note.body, "<b>raw</b>");

        let html = body_text(app.send(get_request("/dashboard", Some(&cookie))).await).await;
        assert!(html.contains("Note created"));
        assert!(html.contains(&format!("/notes/{}/edit", note.id)));

        let response = app
            .send(get_request(&format!("/notes/{}/edit", note.id), Some(&cookie)))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("&lt;b&gt;raw&lt;/b&gt;"));

        let response = app
            .send(form_request(
                &format!("/notes/{}", note.id),
                "title=Week+1+revised&body=",
                Some(&cookie),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let updated = notes::get(&app.ctx, &alice, note.id).await.unwrap();
        assert_eq!(updated.title, "Week 1 revised");

        let response = app
            .send(form_request(
                &format!("/notes/{}/delete", note.id),
                "",
                Some(&cookie),
            ))
            .await;
        assert_eq!(location(&response), "/dashboard");
        assert!(notes::list(&app.ctx, &alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_note_rerenders_editor() {
        let app = TestApp::new();
        let cookie = app.sign_up("alice").await;

        let response = app
            .send(form_request("/notes", "title=+++&body=kept", Some(&cookie)))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("Title is required"));
        assert!(html.contains("kept"));
    }

    #[tokio::test]
    async fn test_cannot_touch_another_users_note() {
        let app = TestApp::new();
        let alice_cookie = app.sign_up("alice").await;
        let bob_cookie = app.sign_up("bob").await;
        app.send(form_request("/notes", "title=Private&body=secret", Some(&alice_cookie)))
            .await;
        let alice = app.user("alice").await;
        let note = notes::list(&app.ctx, &alice).await.unwrap().remove(0);

        let response = app
            .send(get_request(&format!("/notes/{}/edit", note.id), Some(&bob_cookie)))
            .await;
        assert_eq!(location(&response), "/dashboard");

        let response = app
            .send(form_request(
                &format!("/notes/{}/delete", note.id),
                "",
                Some(&bob_cookie),
            ))
            .await;
        assert_eq!(location(&response), "/dashboard");

        let html = body_text(app.send(get_request("/dashboard", Some(&bob_cookie))).await).await;
        assert!(html.contains("You do not have access to this note"));
        assert!(!html.contains("Private"));
        assert_eq!(notes::list(&app.ctx, &alice).await.unwrap(), vec![note]);
    }

    #[tokio::test]
    async fn test_upload_download_delete() {
        let app = TestApp::new();
        let alice_cookie = app.sign_up("alice").await;
        let bob_cookie = app.sign_up("bob").await;

        let response = app
            .send(json_request(
                "/files/upload-request",
                json!({ "filename": "slides.pdf", "size": 10 }),
                Some(&alice_cookie),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let ticket: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(ticket["method"], "PUT");
        assert_eq!(ticket["expires_in"], 900);
        let key = ticket["key"].as_str().unwrap().to_string();

        // Bob cannot claim Alice's key
        let response = app
            .send(json_request(
                "/files/confirm",
                json!({ "key": key, "filename": "slides.pdf" }),
                Some(&bob_cookie),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        app.blobs.put(&key, 10).await;
        let response = app
            .send(json_request(
                "/files/confirm",
                json!({ "key": key, "filename": "slides.pdf" }),
                Some(&alice_cookie),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let file: Value = serde_json::from_str(&body_text(response).await).unwrap();
        let id = file["id"].as_str().unwrap().to_string();
        assert_eq!(file["size_bytes"], 10);

        let response = app
            .send(get_request(&format!("/files/{id}/download"), Some(&alice_cookie)))
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with("memory://blobs/"));
        assert!(location(&response).contains("method=GET"));

        let response = app
            .send(get_request(&format!("/files/{id}/download"), Some(&bob_cookie)))
            .await;
        assert_eq!(location(&response), "/dashboard");

        let response = app
            .send(form_request(&format!("/files/{id}/delete"), "", Some(&alice_cookie)))
            .await;
        assert_eq!(location(&response), "/dashboard");
        assert!(!app.blobs.contains(&key).await);
        let alice = app.user("alice").await;
        assert!(files::list(&app.ctx, &alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_errors_are_json() {
        let app = TestApp::new();
        let cookie = app.sign_up("alice").await;

        let response = app
            .send(json_request(
                "/files/upload-request",
                json!({ "filename": "../etc/passwd", "size": 10 }),
                Some(&cookie),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["error"].as_str().unwrap().contains("must not contain"));
    }

    #[tokio::test]
    async fn test_malformed_json_gets_json_error() {
        let app = TestApp::new();
        let cookie = app.sign_up("alice").await;

        let request = with_cookie(Request::post("/files/confirm"), Some(&cookie))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.send(request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_healthz() {
        let app = TestApp::new();
        let response = app.send(get_request("/healthz", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }
}
