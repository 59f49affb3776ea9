//! # Database module: repositories for users, notes and file records
//!
//! The note and file services never talk to SQL directly; they go through the
//! [`Repository`] trait object held by [`crate::AppContext`]. Two implementations:
//!
//! - [`PgRepository`]: PostgreSQL through a [`sqlx::PgPool`], schema managed by the
//!   migrations in `packages/api/migrations` (see [`migrate`]).
//! - [`MemoryRepository`]: `HashMap`s behind a mutex, for tests and local runs.
//!
//! Repositories do not check ownership on reads; the services do that against the
//! returned owner field. Writes that take a `user_id` only touch rows owned by it.

use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{FileRef, NewFileRef, NewUser, Note, NoteInput, User};

mod memory;
mod pool;
mod postgres;

pub use memory::MemoryRepository;
pub use pool::{connect, migrate};
pub use postgres::PgRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; fails with [`crate::AppError::DuplicateUser`] if the username is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn insert_note(&self, user_id: Uuid, input: &NoteInput) -> Result<Note>;
    async fn find_note(&self, id: Uuid) -> Result<Option<Note>>;
    /// Overwrite title and body; `None` if no note `id` is owned by `user_id`.
    async fn update_note(&self, id: Uuid, user_id: Uuid, input: &NoteInput)
        -> Result<Option<Note>>;
    async fn delete_note(&self, id: Uuid, user_id: Uuid) -> Result<bool>;
    /// Notes owned by `user_id`, most recently updated first.
    async fn list_notes(&self, user_id: Uuid) -> Result<Vec<Note>>;
}

#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn insert_file(&self, file: NewFileRef) -> Result<FileRef>;
    async fn find_file(&self, id: Uuid) -> Result<Option<FileRef>>;
    async fn find_file_by_key(&self, storage_key: &str) -> Result<Option<FileRef>>;
    async fn delete_file(&self, id: Uuid, user_id: Uuid) -> Result<bool>;
    /// Files owned by `user_id`, newest upload first.
    async fn list_files(&self, user_id: Uuid) -> Result<Vec<FileRef>>;
}

/// Everything the application persists.
#[async_trait]
pub trait Repository: UserRepository + NoteRepository + FileRepository + fmt::Debug {
    /// Round-trip to the backing store, for health checks.
    async fn ping(&self) -> Result<()>;
}
