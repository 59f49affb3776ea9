use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A plain-text note owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    /// Stored verbatim, never rendered as markup.
    pub body: String,
    pub updated_at: DateTime<Utc>,
}

/// Title and body as submitted by the note form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct NoteInput {
    pub title: String,
    #[serde(default)]
    pub body: String,
}
