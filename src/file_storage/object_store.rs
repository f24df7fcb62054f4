//! # Object-Store Backend
//!
//! Keys are sharded as `{shard}/{identifier}/{filename}` (see [`keys`]) and
//! every object carries an `expires` tag. Reads hand out presigned URLs
//! instead of bytes.

use async_trait::async_trait;

use super::address::resolve_read_address;
use super::backend::{AccessHandle, BackendKind, DeleteOutcome, StorageBackend};
use super::errors::StorageResult;
use super::expiry::ExpiryTag;
use super::keys;
use super::object_client::{ObjectClient, DELETE_BATCH_SIZE};

/// Object-store backend over any [`ObjectClient`]
#[derive(Debug)]
pub struct ObjectStoreBackend<C: ObjectClient> {
    client: C,
    prevent_cleanup: bool,
}

impl<C: ObjectClient> ObjectStoreBackend<C> {
    pub fn new(client: C, prevent_cleanup: bool) -> Self {
        Self {
            client,
            prevent_cleanup,
        }
    }

    /// Underlying client
    pub fn client(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: ObjectClient> StorageBackend for ObjectStoreBackend<C> {
    fn kind(&self) -> BackendKind {
        BackendKind::ObjectStore
    }

    async fn put(
        &self,
        identifier: &str,
        filename: &str,
        size: u64,
        expires: ExpiryTag,
        content: &[u8],
    ) -> StorageResult<()> {
        let key = keys::object_key(identifier, filename);
        if size != content.len() as u64 {
            tracing::debug!(key = %key, declared = size, actual = content.len(), "declared size differs from body");
        }
        self.client
            .put_object(&key, content.to_vec(), &expires.tagging())
            .await
    }

    async fn get(&self, identifier: &str, filename: &str) -> StorageResult<AccessHandle> {
        let key = keys::object_key(identifier, filename);
        resolve_read_address(&self.client, &key, filename)
            .await
            .map(AccessHandle::Url)
    }

    async fn copy(
        &self,
        source_identifier: &str,
        destination_identifier: &str,
        filename: &str,
        expires: ExpiryTag,
    ) -> StorageResult<()> {
        let source_key = keys::object_key(source_identifier, filename);
        let destination_key = keys::object_key(destination_identifier, filename);

        self.client.head_object(&source_key).await?;
        self.client
            .copy_object(&source_key, &destination_key, &expires.tagging())
            .await
    }

    async fn delete(&self, identifier: &str, filename: &str) -> StorageResult<DeleteOutcome> {
        if self.prevent_cleanup {
            return Ok(DeleteOutcome::Retained);
        }
        let key = keys::object_key(identifier, filename);
        self.client.delete_objects(&[key]).await?;
        Ok(DeleteOutcome::Deleted(1))
    }

    async fn delete_all(&self, identifier: &str) -> StorageResult<DeleteOutcome> {
        if self.prevent_cleanup {
            return Ok(DeleteOutcome::Retained);
        }
        let keys = self.client.list_keys(&keys::object_prefix(identifier)).await?;
        for batch in keys.chunks(DELETE_BATCH_SIZE) {
            self.client.delete_objects(batch).await?;
        }
        Ok(DeleteOutcome::Deleted(keys.len()))
    }
}
