//! # File Storage Errors

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// File storage errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    // Caller errors
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Identifier not found: {0}")]
    IdentifierNotFound(String),

    // Medium errors
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            StorageError::InvalidParameters(_) => 400,
            StorageError::NotFound(_) => 404,
            StorageError::IdentifierNotFound(_) => 404,
            StorageError::Io(_) => 500,
            StorageError::Config(_) => 500,
        }
    }

    /// True for the "object or identifier absent" conditions
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::NotFound(_) | StorageError::IdentifierNotFound(_)
        )
    }

    /// Map a filesystem error, keeping `NotFound` distinct from other faults
    pub(crate) fn from_io(err: std::io::Error, what: &str) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(what.to_string())
        } else {
            StorageError::Io(format!("{}: {}", what, err))
        }
    }
}
