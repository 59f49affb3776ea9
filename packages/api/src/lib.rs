//! # API crate: domain services for the student notes site
//!
//! Everything the web frontend does goes through the plain async functions in this
//! crate. Each one takes an explicit [`AppContext`] and, where it touches user data,
//! the authenticated [`UserInfo`]. Nothing here knows about HTTP.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | Local accounts, argon2 password hashing, session helpers |
//! | [`dashboard`] | The combined notes + files view of one user |
//! | [`db`] | Repository traits with PostgreSQL and in-memory implementations, migrations |
//! | [`error`] | [`AppError`] and its [`ErrorKind`] classification |
//! | [`files`] | Presigned uploads and downloads, file records |
//! | [`models`] | Database models and request/response payloads |
//! | [`notes`] | Per-user note CRUD |
//! | [`settings`] | Layered configuration (defaults, `config.toml`, `NOTES__*` env) |

use std::sync::Arc;

use store::{BlobStore, MemoryBlobStore};

pub mod auth;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod files;
pub mod models;
pub mod notes;
pub mod settings;

pub use error::{AppError, ErrorKind, Result};
pub use models::UserInfo;

use db::{MemoryRepository, Repository};
use settings::Uploads;

/// Shared handles every service function needs.
///
/// Cloning is cheap; the web layer keeps one in its router state.
#[derive(Clone, Debug)]
pub struct AppContext {
    pub repo: Arc<dyn Repository>,
    pub blobs: Arc<dyn BlobStore>,
    pub uploads: Uploads,
}

impl AppContext {
    pub fn new(repo: Arc<dyn Repository>, blobs: Arc<dyn BlobStore>, uploads: Uploads) -> Self {
        Self {
            repo,
            blobs,
            uploads,
        }
    }

    /// A context backed entirely by memory, with default upload limits.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryRepository::new()),
            Arc::new(MemoryBlobStore::new()),
            Uploads::default(),
        )
    }
}
