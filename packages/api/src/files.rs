//! # File service
//!
//! Uploaded files live in the object store; the database only keeps a
//! [`FileRef`] pointing at each object. Bytes never pass through this process:
//!
//! 1. [`request_upload`] validates the name and declared size, picks a key
//!    `"<user_id>/<upload_id>/<filename>"` and returns a presigned `PUT` URL.
//! 2. The browser uploads straight to the bucket.
//! 3. [`confirm_upload`] checks the key belongs to the caller, that the object
//!    really exists within the size limit, and records it.
//!
//! Downloads are presigned `GET` URLs. Deleting removes the object first and the
//! record second; if the record delete fails the object is already gone and the
//! inconsistency is logged.

use store::Access;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{FileRef, NewFileRef, UploadConfirmation, UploadRequest, UploadTicket, UserInfo};
use crate::AppContext;

pub const FILENAME_MAX_BYTES: usize = 255;

/// Characters object stores escape in keys; rejecting them keeps keys verbatim.
const FORBIDDEN_FILENAME_CHARS: &[char] = &[
    '/', '\\', '{', '}', '^', '%', '`', '[', ']', '"', '<', '>', '~', '#', '|', '*', '?',
];

fn validate_filename(filename: &str) -> Result<()> {
    if filename.trim().is_empty() {
        return Err(AppError::validation("Please choose a file"));
    }
    if filename.trim() != filename {
        return Err(AppError::validation(
            "Filename must not start or end with whitespace",
        ));
    }
    if filename.len() > FILENAME_MAX_BYTES {
        return Err(AppError::validation(format!(
            "Filename must be at most {FILENAME_MAX_BYTES} bytes"
        )));
    }
    if filename == "." || filename == ".." {
        return Err(AppError::validation("Invalid filename"));
    }
    if let Some(c) = filename
        .chars()
        .find(|c| c.is_control() || FORBIDDEN_FILENAME_CHARS.contains(c))
    {
        return Err(AppError::validation(format!(
            "Filename must not contain {c:?}"
        )));
    }
    Ok(())
}

fn size_limit_message(max_bytes: u64) -> String {
    if max_bytes >= 1024 * 1024 {
        format!("Files must be at most {} MiB", max_bytes / (1024 * 1024))
    } else {
        format!("Files must be at most {max_bytes} bytes")
    }
}

fn check_owner(file: FileRef, user: &UserInfo) -> Result<FileRef> {
    if file.user_id == user.id {
        Ok(file)
    } else {
        tracing::warn!(user_id = %user.id, file_id = %file.id, "file access denied");
        Err(AppError::Forbidden("file"))
    }
}

/// All files of `user`, newest upload first.
pub async fn list(ctx: &AppContext, user: &UserInfo) -> Result<Vec<FileRef>> {
    ctx.repo.list_files(user.id).await
}

pub async fn get(ctx: &AppContext, user: &UserInfo, id: Uuid) -> Result<FileRef> {
    let file = ctx
        .repo
        .find_file(id)
        .await?
        .ok_or(AppError::NotFound("file"))?;
    check_owner(file, user)
}

pub async fn request_upload(
    ctx: &AppContext,
    user: &UserInfo,
    request: UploadRequest,
) -> Result<UploadTicket> {
    validate_filename(&request.filename)?;
    if request.size == 0 {
        return Err(AppError::validation("The file is empty"));
    }
    if request.size > ctx.uploads.max_bytes {
        return Err(AppError::validation(size_limit_message(
            ctx.uploads.max_bytes,
        )));
    }

    let key = format!("{}/{}/{}", user.id, Uuid::new_v4(), request.filename);
    let ttl = ctx.uploads.upload_ttl();
    let url = ctx.blobs.presign(Access::Upload, &key, ttl).await?;

    tracing::info!(user_id = %user.id, key = %key, size = request.size, "upload requested");
    Ok(UploadTicket {
        key,
        url: url.to_string(),
        method: "PUT",
        expires_in: ttl.as_secs(),
    })
}

pub async fn confirm_upload(
    ctx: &AppContext,
    user: &UserInfo,
    confirmation: UploadConfirmation,
) -> Result<FileRef> {
    let UploadConfirmation { key, filename } = confirmation;
    validate_filename(&filename)?;

    let mut parts = key.split('/');
    let (Some(owner), Some(upload_id), Some(name), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(AppError::validation("Malformed upload key"));
    };
    if owner != user.id.to_string() {
        tracing::warn!(user_id = %user.id, key = %key, "upload confirmation for foreign key");
        return Err(AppError::Forbidden("file"));
    }
    if Uuid::parse_str(upload_id).is_err() {
        return Err(AppError::validation("Malformed upload key"));
    }
    if name != filename {
        return Err(AppError::validation("Filename does not match the upload"));
    }

    if let Some(existing) = ctx.repo.find_file_by_key(&key).await? {
        return check_owner(existing, user);
    }

    let Some(meta) = ctx.blobs.head(&key).await? else {
        return Err(AppError::validation("The upload has not completed"));
    };
    if meta.size > ctx.uploads.max_bytes {
        if let Err(error) = ctx.blobs.delete(&key).await {
            tracing::error!(key = %key, error = %error, "failed to remove oversized upload");
        }
        return Err(AppError::validation(size_limit_message(
            ctx.uploads.max_bytes,
        )));
    }
    let size_bytes = i64::try_from(meta.size)
        .map_err(|_| AppError::validation(size_limit_message(ctx.uploads.max_bytes)))?;

    let file = ctx
        .repo
        .insert_file(NewFileRef {
            user_id: user.id,
            storage_key: key,
            filename,
            size_bytes,
        })
        .await?;

    tracing::info!(user_id = %user.id, file_id = %file.id, size = file.size_bytes, "upload recorded");
    Ok(file)
}

/// A presigned download URL for a file the user owns.
pub async fn request_download(ctx: &AppContext, user: &UserInfo, id: Uuid) -> Result<url::Url> {
    let file = get(ctx, user, id).await?;
    let url = ctx
        .blobs
        .presign(Access::Download, &file.storage_key, ctx.uploads.download_ttl())
        .await?;
    tracing::debug!(user_id = %user.id, file_id = %file.id, "download presigned");
    Ok(url)
}

/// Delete the stored object, then its record.
pub async fn delete(ctx: &AppContext, user: &UserInfo, id: Uuid) -> Result<()> {
    let file = get(ctx, user, id).await?;
    ctx.blobs.delete(&file.storage_key).await?;

    match ctx.repo.delete_file(id, user.id).await {
        Ok(true) => {
            tracing::info!(user_id = %user.id, file_id = %id, "file deleted");
            Ok(())
        }
        Ok(false) => Err(AppError::NotFound("file")),
        Err(error) => {
            tracing::error!(
                file_id = %id,
                key = %file.storage_key,
                error = %error,
                "object deleted but file record remains"
            );
            Err(error)
        }
    }
}
