//! # Local Filesystem Backend
//!
//! Files live at `{location}/{identifier}/{filename}`. Writes and copies go
//! through a temporary file in the identifier directory followed by a rename,
//! so a reader never sees a half-written object.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use uuid::Uuid;

use super::backend::{AccessHandle, BackendKind, DeleteOutcome, StorageBackend};
use super::errors::{StorageError, StorageResult};
use super::expiry::ExpiryTag;
use super::keys;

/// Prefix of in-flight upload files
const TEMP_PREFIX: &str = ".upload-";

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalStorageConfig {
    /// Folder location for storing files (default: "fileserverupload")
    #[serde(default = "default_location")]
    pub location: PathBuf,

    /// Skip physical deletes while still reporting success
    #[serde(default)]
    pub prevent_cleanup: bool,
}

fn default_location() -> PathBuf {
    PathBuf::from("fileserverupload")
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            prevent_cleanup: false,
        }
    }
}

/// Local filesystem storage backend
#[derive(Debug)]
pub struct LocalBackend {
    root: PathBuf,
    prevent_cleanup: bool,
}

impl LocalBackend {
    /// Open the backend, creating the storage directory when it is missing.
    pub fn open(config: &LocalStorageConfig) -> StorageResult<Self> {
        if config.location.as_os_str().is_empty() {
            return Err(StorageError::Config("storage location is empty".into()));
        }
        std::fs::create_dir_all(&config.location).map_err(|e| {
            StorageError::Io(format!(
                "cannot create {}: {}",
                config.location.display(),
                e
            ))
        })?;
        let root = std::fs::canonicalize(&config.location).map_err(|e| {
            StorageError::Io(format!(
                "cannot resolve {}: {}",
                config.location.display(),
                e
            ))
        })?;

        tracing::info!(root = %root.display(), prevent_cleanup = config.prevent_cleanup, "local storage ready");
        Ok(Self {
            root,
            prevent_cleanup: config.prevent_cleanup,
        })
    }

    /// Absolute storage root
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn display_key(identifier: &str, filename: &str) -> String {
        format!("{}/{}", identifier, filename)
    }

    /// Directory of an identifier, refusing anything that would resolve
    /// outside the storage root.
    fn identifier_dir(&self, identifier: &str) -> StorageResult<PathBuf> {
        let dir = keys::directory_path(&self.root, identifier);
        if !is_single_component(identifier) || dir.parent() != Some(self.root.as_path()) {
            return Err(StorageError::InvalidParameters(format!(
                "identifier '{}' is not a plain directory name",
                identifier
            )));
        }
        Ok(dir)
    }

    fn file_in(&self, identifier: &str, filename: &str) -> StorageResult<PathBuf> {
        let dir = self.identifier_dir(identifier)?;
        if !is_single_component(filename) {
            return Err(StorageError::InvalidParameters(format!(
                "filename for identifier '{}' is not a plain file name",
                identifier
            )));
        }
        Ok(dir.join(filename))
    }

    async fn ensure_directory(&self, identifier: &str) -> StorageResult<PathBuf> {
        let dir = self.identifier_dir(identifier)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::Io(format!("{}: {}", identifier, e)))?;
        Ok(dir)
    }

    async fn existing_file(&self, identifier: &str, filename: &str) -> StorageResult<PathBuf> {
        let path = self.file_in(identifier, filename)?;
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(StorageError::NotFound(Self::display_key(identifier, filename))),
            Err(e) => Err(StorageError::from_io(e, &Self::display_key(identifier, filename))),
        }
    }

    fn temp_path(dir: &Path) -> PathBuf {
        dir.join(format!("{}{}", TEMP_PREFIX, Uuid::new_v4().simple()))
    }

    /// Move a finished temporary file into place, cleaning up on failure.
    async fn commit(temp: &Path, target: &Path, what: &str) -> StorageResult<()> {
        if let Err(e) = fs::rename(temp, target).await {
            let _ = fs::remove_file(temp).await;
            return Err(StorageError::Io(format!("{}: {}", what, e)));
        }
        Ok(())
    }
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Filesystem
    }

    async fn put(
        &self,
        identifier: &str,
        filename: &str,
        size: u64,
        // The filesystem has no place for tags
        _expires: ExpiryTag,
        content: &[u8],
    ) -> StorageResult<()> {
        let key = Self::display_key(identifier, filename);
        if size != content.len() as u64 {
            tracing::debug!(key = %key, declared = size, actual = content.len(), "declared size differs from body");
        }

        let target = self.file_in(identifier, filename)?;
        let dir = self.ensure_directory(identifier).await?;
        let temp = Self::temp_path(&dir);
        if let Err(e) = fs::write(&temp, content).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::Io(format!("{}: {}", key, e)));
        }
        Self::commit(&temp, &target, &key).await
    }

    async fn get(&self, identifier: &str, filename: &str) -> StorageResult<AccessHandle> {
        self.existing_file(identifier, filename)
            .await
            .map(AccessHandle::Path)
    }

    async fn copy(
        &self,
        source_identifier: &str,
        destination_identifier: &str,
        filename: &str,
        _expires: ExpiryTag,
    ) -> StorageResult<()> {
        let source = self.existing_file(source_identifier, filename).await?;
        let key = Self::display_key(destination_identifier, filename);
        let target = self.file_in(destination_identifier, filename)?;

        let dir = self.ensure_directory(destination_identifier).await?;
        let temp = Self::temp_path(&dir);
        if let Err(e) = fs::copy(&source, &temp).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::from_io(e, &key));
        }
        Self::commit(&temp, &target, &key).await
    }

    async fn delete(&self, identifier: &str, filename: &str) -> StorageResult<DeleteOutcome> {
        if self.prevent_cleanup {
            return Ok(DeleteOutcome::Retained);
        }
        let dir = self.identifier_dir(identifier)?;
        let path = self.file_in(identifier, filename)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| StorageError::from_io(e, &Self::display_key(identifier, filename)))?;

        // Drop the identifier directory once its last file is gone. A concurrent
        // writer may have added a file in the meantime, in which case it stays.
        if let Err(e) = fs::remove_dir(&dir).await {
            tracing::trace!(identifier = %identifier, error = %e, "identifier directory kept");
        }
        Ok(DeleteOutcome::Deleted(1))
    }

    async fn delete_all(&self, identifier: &str) -> StorageResult<DeleteOutcome> {
        if self.prevent_cleanup {
            return Ok(DeleteOutcome::Retained);
        }
        let dir = self.identifier_dir(identifier)?;
        let mut entries = fs::read_dir(&dir).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::IdentifierNotFound(identifier.to_string())
            } else {
                StorageError::Io(format!("{}: {}", identifier, e))
            }
        })?;

        let mut deleted = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::Io(format!("{}: {}", identifier, e)))?
        {
            fs::remove_file(entry.path())
                .await
                .map_err(|e| StorageError::Io(format!("{}: {}", identifier, e)))?;
            deleted += 1;
        }

        fs::remove_dir(&dir)
            .await
            .map_err(|e| StorageError::Io(format!("{}: {}", identifier, e)))?;
        Ok(DeleteOutcome::Deleted(deleted))
    }
}
