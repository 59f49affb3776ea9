//! # Note service
//!
//! Plain-text notes owned by a single user. Every operation takes the
//! authenticated [`UserInfo`] explicitly; records owned by someone else yield
//! [`AppError::Forbidden`], missing ones [`AppError::NotFound`]. Titles and bodies
//! are stored exactly as submitted.

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Note, NoteInput, UserInfo};
use crate::AppContext;

pub const TITLE_MAX_CHARS: usize = 200;
pub const BODY_MAX_BYTES: usize = 100_000;

fn validate(input: &NoteInput) -> Result<()> {
    if input.title.trim().is_empty() {
        return Err(AppError::validation("Title is required"));
    }
    if input.title.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::validation(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    if input.body.len() > BODY_MAX_BYTES {
        return Err(AppError::validation(format!(
            "Note body must be at most {BODY_MAX_BYTES} bytes"
        )));
    }
    Ok(())
}

fn check_owner(note: Note, user: &UserInfo) -> Result<Note> {
    if note.user_id == user.id {
        Ok(note)
    } else {
        tracing::warn!(user_id = %user.id, note_id = %note.id, "note access denied");
        Err(AppError::Forbidden("note"))
    }
}

/// All notes of `user`, most recently updated first.
pub async fn list(ctx: &AppContext, user: &UserInfo) -> Result<Vec<Note>> {
    ctx.repo.list_notes(user.id).await
}

pub async fn get(ctx: &AppContext, user: &UserInfo, id: Uuid) -> Result<Note> {
    let note = ctx
        .repo
        .find_note(id)
        .await?
        .ok_or(AppError::NotFound("note"))?;
    check_owner(note, user)
}

pub async fn create(ctx: &AppContext, user: &UserInfo, input: NoteInput) -> Result<Note> {
    validate(&input)?;
    let note = ctx.repo.insert_note(user.id, &input).await?;
    tracing::info!(user_id = %user.id, note_id = %note.id, "note created");
    Ok(note)
}

/// Overwrite the title and body of an existing note.
pub async fn update(
    ctx: &AppContext,
    user: &UserInfo,
    id: Uuid,
    input: NoteInput,
) -> Result<Note> {
    validate(&input)?;
    get(ctx, user, id).await?;
    let note = ctx
        .repo
        .update_note(id, user.id, &input)
        .await?
        // Deleted between the ownership check and the update.
        .ok_or(AppError::NotFound("note"))?;
    tracing::info!(user_id = %user.id, note_id = %note.id, "note updated");
    Ok(note)
}

pub async fn delete(ctx: &AppContext, user: &UserInfo, id: Uuid) -> Result<()> {
    get(ctx, user, id).await?;
    if !ctx.repo.delete_note(id, user.id).await? {
        return Err(AppError::NotFound("note"));
    }
    tracing::info!(user_id = %user.id, note_id = %id, "note deleted");
    Ok(())
}
