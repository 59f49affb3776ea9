use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database record pointing at one uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct FileRef {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Object-store key, `"<user_id>/<upload_id>/<filename>"`.
    pub storage_key: String,
    /// Filename as chosen by the uploader.
    pub filename: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// A file record about to be inserted.
#[derive(Debug, Clone)]
pub struct NewFileRef {
    pub user_id: Uuid,
    pub storage_key: String,
    pub filename: String,
    pub size_bytes: i64,
}

/// Body of an upload request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub size: u64,
}

/// What the browser needs to PUT a file straight into the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadTicket {
    pub key: String,
    pub url: String,
    pub method: &'static str,
    pub expires_in: u64,
}

/// Body of an upload confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadConfirmation {
    pub key: String,
    pub filename: String,
}
