//! # File Operations
//!
//! Validates parameters, resolves expiry tags and logs each operation before
//! handing it to the configured backend.

use std::sync::Arc;

use super::backend::{AccessHandle, BackendKind, DeleteOutcome, StorageBackend};
use super::errors::StorageResult;
use super::expiry::ExpiryTag;
use super::validation::{validate_identifier, validate_parameters};

/// File service for put/get/copy/delete
#[derive(Debug, Clone)]
pub struct FileService {
    backend: Arc<dyn StorageBackend>,
}

impl FileService {
    /// Create a new file service
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Medium behind this service
    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Store a file
    pub async fn put(
        &self,
        identifier: &str,
        filename: &str,
        size: u64,
        expires: Option<ExpiryTag>,
        content: &[u8],
    ) -> StorageResult<()> {
        validate_parameters(identifier, filename)?;
        let expires = ExpiryTag::resolve(expires);
        tracing::debug!(identifier, filename, size, %expires, "put file");

        self.backend
            .put(identifier, filename, size, expires, content)
            .await
    }

    /// Resolve a read handle for a file
    pub async fn get(&self, identifier: &str, filename: &str) -> StorageResult<AccessHandle> {
        validate_parameters(identifier, filename)?;
        tracing::debug!(identifier, filename, "get file");

        self.backend.get(identifier, filename).await
    }

    /// Copy a file to another identifier
    pub async fn copy(
        &self,
        source_identifier: &str,
        destination_identifier: &str,
        filename: &str,
        expires: Option<ExpiryTag>,
    ) -> StorageResult<()> {
        validate_parameters(source_identifier, filename)?;
        validate_identifier(destination_identifier)?;
        let expires = ExpiryTag::resolve(expires);
        tracing::debug!(source_identifier, destination_identifier, filename, %expires, "copy file");

        self.backend
            .copy(source_identifier, destination_identifier, filename, expires)
            .await
    }

    /// Delete a file. Never fails; the outcome says what happened.
    pub async fn delete(&self, identifier: &str, filename: &str) -> DeleteOutcome {
        let result = match validate_parameters(identifier, filename) {
            Ok(()) => self.backend.delete(identifier, filename).await,
            Err(e) => Err(e),
        };
        let outcome = DeleteOutcome::settle(result);
        log_delete(identifier, Some(filename), &outcome);
        outcome
    }

    /// Delete every file of an identifier. Never fails; the outcome says what
    /// happened.
    pub async fn delete_all(&self, identifier: &str) -> DeleteOutcome {
        let result = match validate_identifier(identifier) {
            Ok(()) => self.backend.delete_all(identifier).await,
            Err(e) => Err(e),
        };
        let outcome = DeleteOutcome::settle(result);
        log_delete(identifier, None, &outcome);
        outcome
    }
}

fn log_delete(identifier: &str, filename: Option<&str>, outcome: &DeleteOutcome) {
    let filename = filename.unwrap_or("*");
    match outcome {
        DeleteOutcome::Deleted(count) => {
            tracing::debug!(identifier, filename, count, "deleted")
        }
        DeleteOutcome::Retained => {
            tracing::debug!(identifier, filename, "cleanup disabled, delete skipped")
        }
        DeleteOutcome::AlreadyAbsent => {
            tracing::trace!(identifier, filename, "nothing to delete")
        }
        DeleteOutcome::Failed(e) => {
            tracing::warn!(identifier, filename, error = %e, "delete failed")
        }
    }
}
