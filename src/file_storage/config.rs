//! # Storage Configuration
//!
//! Selects the backend at startup.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::backend::StorageBackend;
use super::errors::StorageResult;
use super::local::{LocalBackend, LocalStorageConfig};
use super::object_store::ObjectStoreBackend;
use super::s3::{S3ObjectClient, S3StorageConfig};

/// Which backend to run, with its settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem
    Local(LocalStorageConfig),
    /// S3 or an S3-compatible object store
    S3(S3StorageConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Local(LocalStorageConfig::default())
    }
}

impl StorageConfig {
    /// Whether deletes are suppressed
    pub fn prevent_cleanup(&self) -> bool {
        match self {
            StorageConfig::Local(local) => local.prevent_cleanup,
            StorageConfig::S3(s3) => s3.prevent_cleanup,
        }
    }

    /// Construct the configured backend
    pub async fn build_backend(&self) -> StorageResult<Arc<dyn StorageBackend>> {
        match self {
            StorageConfig::Local(local) => Ok(Arc::new(LocalBackend::open(local)?)),
            StorageConfig::S3(s3) => {
                let client = S3ObjectClient::connect(s3).await?;
                Ok(Arc::new(ObjectStoreBackend::new(client, s3.prevent_cleanup)))
            }
        }
    }
}
