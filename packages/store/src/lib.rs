//! Object storage for uploaded files: a [`BlobStore`] trait with an S3 backend
//! and an in-memory backend.

pub mod blob;
pub mod s3;

mod memory;
pub use memory::MemoryBlobStore;

pub use blob::{Access, BlobMeta, BlobStore, StorageError};
pub use s3::{S3BlobStore, S3Config};
