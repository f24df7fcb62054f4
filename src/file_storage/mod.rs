//! # File Storage Module
//!
//! Files are addressed by an identifier and their original filename and
//! stored either on the local filesystem or in an S3-compatible object store.
//!
//! Concurrent writes to the same identifier and filename are last-write-wins;
//! nothing here locks or versions objects.

pub mod address;
pub mod backend;
pub mod config;
pub mod errors;
pub mod expiry;
pub mod file;
pub mod keys;
pub mod local;
pub mod memory;
pub mod object_client;
pub mod object_store;
pub mod s3;
pub mod signed_url;
pub mod validation;

pub use backend::{AccessHandle, BackendKind, DeleteOutcome, StorageBackend};
pub use config::StorageConfig;
pub use errors::{StorageError, StorageResult};
pub use expiry::ExpiryTag;
pub use file::FileService;
pub use local::{LocalBackend, LocalStorageConfig};
pub use memory::MemoryObjectClient;
pub use object_client::ObjectClient;
pub use object_store::ObjectStoreBackend;
pub use s3::{S3ObjectClient, S3StorageConfig};
pub use signed_url::SignedUrlGenerator;
