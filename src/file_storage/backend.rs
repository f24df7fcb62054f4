//! # Storage Backend Trait

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;

use super::errors::{StorageError, StorageResult};
use super::expiry::ExpiryTag;

/// Which medium a backend writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Filesystem,
    ObjectStore,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Filesystem => write!(f, "filesystem"),
            BackendKind::ObjectStore => write!(f, "object-store"),
        }
    }
}

/// Backend-specific read reference for a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessHandle {
    /// Absolute path on local disk
    Path(PathBuf),
    /// Time-limited URL fetching the object directly from the medium
    Url(String),
}

/// Result of a delete request.
///
/// Backends only produce `Deleted` and `Retained`; the other two variants are
/// what a failed delete settles into once it reaches [`DeleteOutcome::settle`].
#[derive(Debug, Clone)]
pub enum DeleteOutcome {
    /// Objects physically removed
    Deleted(usize),
    /// Cleanup is disabled, nothing was touched
    Retained,
    /// Nothing existed to delete
    AlreadyAbsent,
    /// The medium refused or the request was malformed
    Failed(StorageError),
}

impl DeleteOutcome {
    /// Collapse a backend result into an outcome, keeping absent objects apart
    /// from real failures.
    pub fn settle(result: StorageResult<DeleteOutcome>) -> DeleteOutcome {
        match result {
            Ok(outcome) => outcome,
            Err(e) if e.is_not_found() => DeleteOutcome::AlreadyAbsent,
            Err(e) => DeleteOutcome::Failed(e),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DeleteOutcome::Failed(_))
    }
}

/// Capability interface shared by the filesystem and object-store backends.
///
/// Callers are expected to have validated identifier and filename already;
/// [`super::FileService`] does that before delegating here.
#[async_trait]
pub trait StorageBackend: Send + Sync + fmt::Debug {
    /// Medium this backend writes to
    fn kind(&self) -> BackendKind;

    /// Store `content`, overwriting any existing object with the same key
    async fn put(
        &self,
        identifier: &str,
        filename: &str,
        size: u64,
        expires: ExpiryTag,
        content: &[u8],
    ) -> StorageResult<()>;

    /// Resolve a read handle; `NotFound` when the object does not exist
    async fn get(&self, identifier: &str, filename: &str) -> StorageResult<AccessHandle>;

    /// Copy a file to another identifier, tagging the destination with `expires`
    async fn copy(
        &self,
        source_identifier: &str,
        destination_identifier: &str,
        filename: &str,
        expires: ExpiryTag,
    ) -> StorageResult<()>;

    /// Delete a single file
    async fn delete(&self, identifier: &str, filename: &str) -> StorageResult<DeleteOutcome>;

    /// Delete every file stored under an identifier
    async fn delete_all(&self, identifier: &str) -> StorageResult<DeleteOutcome>;
}
