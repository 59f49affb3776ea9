use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{FileRepository, NoteRepository, Repository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{FileRef, NewFileRef, NewUser, Note, NoteInput, User};

/// PostgreSQL-backed repository.
#[derive(Clone, Debug)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        sqlx::query_as(
            "INSERT INTO users (id, username, password_hash) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateUser
            } else {
                AppError::Database(e)
            }
        })
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl NoteRepository for PgRepository {
    async fn insert_note(&self, user_id: Uuid, input: &NoteInput) -> Result<Note> {
        let note = sqlx::query_as(
            "INSERT INTO notes (id, user_id, title, body) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&input.title)
        .bind(&input.body)
        .fetch_one(&self.pool)
        .await?;
        Ok(note)
    }

    async fn find_note(&self, id: Uuid) -> Result<Option<Note>> {
        let note = sqlx::query_as("SELECT * FROM notes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(note)
    }

    async fn update_note(
        &self,
        id: Uuid,
        user_id: Uuid,
        input: &NoteInput,
    ) -> Result<Option<Note>> {
        let note = sqlx::query_as(
            "UPDATE notes SET title = $3, body = $4, updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .bind(&input.title)
        .bind(&input.body)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    async fn delete_note(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_notes(&self, user_id: Uuid) -> Result<Vec<Note>> {
        let notes = sqlx::query_as(
            "SELECT * FROM notes WHERE user_id = $1 ORDER BY updated_at DESC, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }
}

#[async_trait]
impl FileRepository for PgRepository {
    async fn insert_file(&self, file: NewFileRef) -> Result<FileRef> {
        sqlx::query_as(
            "INSERT INTO files (id, user_id, storage_key, filename, size_bytes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(file.user_id)
        .bind(&file.storage_key)
        .bind(&file.filename)
        .bind(file.size_bytes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::validation("this upload has already been recorded")
            } else {
                AppError::Database(e)
            }
        })
    }

    async fn find_file(&self, id: Uuid) -> Result<Option<FileRef>> {
        let file = sqlx::query_as("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(file)
    }

    async fn find_file_by_key(&self, storage_key: &str) -> Result<Option<FileRef>> {
        let file = sqlx::query_as("SELECT * FROM files WHERE storage_key = $1")
            .bind(storage_key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(file)
    }

    async fn delete_file(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_files(&self, user_id: Uuid) -> Result<Vec<FileRef>> {
        let files = sqlx::query_as(
            "SELECT * FROM files WHERE user_id = $1 ORDER BY uploaded_at DESC, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(files)
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
