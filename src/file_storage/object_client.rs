//! # Object Client Port
//!
//! The handful of object-store calls the object-store backend needs. The S3
//! adapter talks to a real bucket; the in-memory adapter backs tests and local
//! development.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use super::errors::StorageResult;

/// Most keys a single bulk delete request may carry
pub const DELETE_BATCH_SIZE: usize = 1000;

#[async_trait]
pub trait ObjectClient: Send + Sync + fmt::Debug {
    /// Store an object, replacing any existing one and its tags
    async fn put_object(&self, key: &str, body: Vec<u8>, tagging: &str) -> StorageResult<()>;

    /// Cheap existence probe; `NotFound` when the key is absent
    async fn head_object(&self, key: &str) -> StorageResult<()>;

    /// Server-side copy, replacing the destination's tags with `tagging`
    async fn copy_object(
        &self,
        source_key: &str,
        destination_key: &str,
        tagging: &str,
    ) -> StorageResult<()>;

    /// Every key starting with `prefix`
    async fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Delete up to [`DELETE_BATCH_SIZE`] keys; absent keys are not an error
    async fn delete_objects(&self, keys: &[String]) -> StorageResult<()>;

    /// Time-limited GET URL served with the given content disposition
    async fn presign_get(
        &self,
        key: &str,
        content_disposition: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;
}
