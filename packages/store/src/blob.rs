//! # Blob storage seam
//!
//! The application never moves file bytes itself: browsers upload and download
//! directly against the object store through presigned URLs. What the server
//! needs from storage is therefore small, and [`BlobStore`] captures exactly that:
//!
//! - [`BlobStore::presign`]: a time-limited URL for a `PUT` ([`Access::Upload`]) or
//!   `GET` ([`Access::Download`]) of one key.
//! - [`BlobStore::head`]: existence and size of a key, used to confirm an upload
//!   actually landed before a file record is written.
//! - [`BlobStore::delete`]: remove a key. Deleting a missing key succeeds.
//!
//! Keys are `/`-delimited strings such as `"<user_id>/<upload_id>/lecture.pdf"`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use object_store::path::Path as ObjectPath;
use url::Url;

/// Direction of a presigned request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Upload,
    Download,
}

impl Access {
    /// HTTP method the presigned URL is valid for.
    pub fn method(self) -> http::Method {
        match self {
            Access::Upload => http::Method::PUT,
            Access::Download => http::Method::GET,
        }
    }
}

/// Metadata of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMeta {
    pub key: String,
    pub size: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("object store error: {0}")]
    Backend(#[from] object_store::Error),
    #[error("object store unavailable")]
    Unavailable,
}

/// Presign, inspect and delete objects in a bucket.
#[async_trait]
pub trait BlobStore: Send + Sync + fmt::Debug {
    async fn presign(
        &self,
        access: Access,
        key: &str,
        expires_in: Duration,
    ) -> Result<Url, StorageError>;

    async fn head(&self, key: &str) -> Result<Option<BlobMeta>, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Parse a key into an object store path, rejecting anything the store would
/// have to re-encode.
pub fn object_path(key: &str) -> Result<ObjectPath, StorageError> {
    let path = ObjectPath::parse(key).map_err(|_| StorageError::InvalidKey(key.to_string()))?;
    if path.as_ref() != key || key.is_empty() {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_method() {
        assert_eq!(Access::Upload.method(), http::Method::PUT);
        assert_eq!(Access::Download.method(), http::Method::GET);
    }

    #[test]
    fn test_object_path_accepts_plain_keys() {
        let path = object_path("user/upload/lecture notes.pdf").unwrap();
        assert_eq!(path.as_ref(), "user/upload/lecture notes.pdf");
    }

    #[test]
    fn test_object_path_rejects_bad_keys() {
        assert!(object_path("").is_err());
        assert!(object_path("a//b").is_err());
        assert!(object_path("a/../b").is_err());
        assert!(object_path("/leading").is_err());
    }
}
