//! # In-Memory Object Client
//!
//! Behaves like a single object-store bucket held in a map. Read URLs are
//! signed with [`SignedUrlGenerator`] and can be redeemed with
//! [`MemoryObjectClient::fetch`].

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::errors::{StorageError, StorageResult};
use super::object_client::{ObjectClient, DELETE_BATCH_SIZE};
use super::signed_url::{SignedUrl, SignedUrlGenerator};

/// Base of every URL this client hands out
pub const MEMORY_BASE_URL: &str = "memory://objects";

#[derive(Debug, Clone)]
struct MemoryObject {
    body: Vec<u8>,
    tagging: String,
}

/// Object client keeping everything in process memory
#[derive(Debug)]
pub struct MemoryObjectClient {
    bucket: String,
    objects: RwLock<BTreeMap<String, MemoryObject>>,
    signer: SignedUrlGenerator,
}

impl MemoryObjectClient {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(BTreeMap::new()),
            signer: SignedUrlGenerator::new(Uuid::new_v4().as_bytes()),
        }
    }

    fn poisoned() -> StorageError {
        StorageError::Io("Lock poisoned".into())
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tagging string stored with `key`
    pub fn tagging(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .ok()
            .and_then(|o| o.get(key).map(|obj| obj.tagging.clone()))
    }

    /// Redeem a URL produced by `presign_get`, returning the object bytes and
    /// the content disposition it would be served with.
    pub fn fetch(&self, url: &str) -> StorageResult<(Vec<u8>, String)> {
        let signed = SignedUrl::parse(url, MEMORY_BASE_URL)?;
        self.signer.verify(&signed)?;
        if signed.bucket != self.bucket {
            return Err(StorageError::NotFound(signed.bucket));
        }

        let objects = self.objects.read().map_err(|_| Self::poisoned())?;
        let object = objects
            .get(&signed.key)
            .ok_or_else(|| StorageError::NotFound(signed.key.clone()))?;
        Ok((object.body.clone(), signed.content_disposition))
    }
}

#[async_trait]
impl ObjectClient for MemoryObjectClient {
    async fn put_object(&self, key: &str, body: Vec<u8>, tagging: &str) -> StorageResult<()> {
        let mut objects = self.objects.write().map_err(|_| Self::poisoned())?;
        objects.insert(
            key.to_string(),
            MemoryObject {
                body,
                tagging: tagging.to_string(),
            },
        );
        Ok(())
    }

    async fn head_object(&self, key: &str) -> StorageResult<()> {
        let objects = self.objects.read().map_err(|_| Self::poisoned())?;
        if objects.contains_key(key) {
            Ok(())
        } else {
            Err(StorageError::NotFound(key.to_string()))
        }
    }

    async fn copy_object(
        &self,
        source_key: &str,
        destination_key: &str,
        tagging: &str,
    ) -> StorageResult<()> {
        let mut objects = self.objects.write().map_err(|_| Self::poisoned())?;
        let body = objects
            .get(source_key)
            .map(|obj| obj.body.clone())
            .ok_or_else(|| StorageError::NotFound(source_key.to_string()))?;
        objects.insert(
            destination_key.to_string(),
            MemoryObject {
                body,
                tagging: tagging.to_string(),
            },
        );
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let objects = self.objects.read().map_err(|_| Self::poisoned())?;
        Ok(objects
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn delete_objects(&self, keys: &[String]) -> StorageResult<()> {
        if keys.len() > DELETE_BATCH_SIZE {
            return Err(StorageError::Io(format!(
                "bulk delete of {} keys exceeds {}",
                keys.len(),
                DELETE_BATCH_SIZE
            )));
        }
        let mut objects = self.objects.write().map_err(|_| Self::poisoned())?;
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }

    async fn presign_get(
        &self,
        key: &str,
        content_disposition: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(self
            .signer
            .generate(&self.bucket, key, content_disposition, expires_in)
            .to_url(MEMORY_BASE_URL))
    }
}
