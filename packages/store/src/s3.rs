//! # S3-backed blob store
//!
//! [`S3BlobStore`] wraps an [`AmazonS3`] client from the `object_store` crate, which
//! implements both [`ObjectStore`] (for `HEAD` and `DELETE`) and [`Signer`] (for
//! SigV4 presigned URLs). Credentials are resolved the usual AWS way through
//! [`AmazonS3Builder::from_env`]: `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`,
//! web identity, or the EC2 instance role.
//!
//! An explicit `endpoint` switches to path-style requests so that S3-compatible
//! stores (MinIO, LocalStack) work; plain `http://` endpoints are allowed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::signer::Signer;
use object_store::ObjectStore;
use url::Url;

use crate::blob::{object_path, Access, BlobMeta, BlobStore, StorageError};

/// Bucket location for [`S3BlobStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct S3BlobStore {
    s3: Arc<AmazonS3>,
}

impl S3BlobStore {
    pub fn from_env(config: &S3Config) -> Result<Self, StorageError> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(&config.bucket)
            .with_region(&config.region);

        if let Some(endpoint) = &config.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_virtual_hosted_style_request(false);
            if endpoint.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
        }

        let s3 = builder.build()?;
        tracing::info!(bucket = %config.bucket, region = %config.region, "object store configured");
        Ok(Self { s3: Arc::new(s3) })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn presign(
        &self,
        access: Access,
        key: &str,
        expires_in: Duration,
    ) -> Result<Url, StorageError> {
        let path = object_path(key)?;
        let url = Signer::signed_url(self.s3.as_ref(), access.method(), &path, expires_in).await?;
        Ok(url)
    }

    async fn head(&self, key: &str) -> Result<Option<BlobMeta>, StorageError> {
        let path = object_path(key)?;
        match ObjectStore::head(self.s3.as_ref(), &path).await {
            Ok(meta) => Ok(Some(BlobMeta {
                key: key.to_string(),
                size: meta.size as u64,
            })),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = object_path(key)?;
        match ObjectStore::delete(self.s3.as_ref(), &path).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
