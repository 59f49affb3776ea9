use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use url::Url;

use crate::blob::{object_path, Access, BlobMeta, BlobStore, StorageError};

/// In-memory BlobStore for tests and local development.
///
/// Presigned URLs use the `memory://` scheme and carry the method and expiry as
/// query parameters. "Uploading" is simulated with [`MemoryBlobStore::put`].
#[derive(Clone, Debug)]
pub struct MemoryBlobStore {
    objects: Arc<Mutex<HashMap<String, u64>>>,
    available: Arc<AtomicBool>,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self {
            objects: Arc::default(),
            available: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object of `size` bytes under `key`, as a browser would with a presigned PUT.
    pub async fn put(&self, key: &str, size: u64) {
        self.objects.lock().await.insert(key.to_string(), size);
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.lock().await.contains_key(key)
    }

    /// Make every subsequent call fail with [`StorageError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn presign(
        &self,
        access: Access,
        key: &str,
        expires_in: Duration,
    ) -> Result<Url, StorageError> {
        self.check_available()?;
        let path = object_path(key)?;

        let mut url = Url::parse("memory://blobs/").map_err(|_| StorageError::Unavailable)?;
        url.path_segments_mut()
            .map_err(|_| StorageError::InvalidKey(key.to_string()))?
            .pop_if_empty()
            .extend(path.parts().map(|part| part.as_ref().to_string()));
        url.query_pairs_mut()
            .append_pair("method", access.method().as_str())
            .append_pair("expires_in", &expires_in.as_secs().to_string());
        Ok(url)
    }

    async fn head(&self, key: &str) -> Result<Option<BlobMeta>, StorageError> {
        self.check_available()?;
        object_path(key)?;
        Ok(self.objects.lock().await.get(key).map(|size| BlobMeta {
            key: key.to_string(),
            size: *size,
        }))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        object_path(key)?;
        self.objects.lock().await.remove(key);
        Ok(())
    }
}
