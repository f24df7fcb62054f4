//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code. The rendered
//! message leads with a stable `FILESERVER_CLI_*` code.

use std::io;

use thiserror::Error;

use crate::file_storage::StorageError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    ConfigError,
    IoError,
    BootFailed,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "FILESERVER_CLI_CONFIG_ERROR",
            Self::IoError => "FILESERVER_CLI_IO_ERROR",
            Self::BootFailed => "FILESERVER_CLI_BOOT_FAILED",
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration missing, unreadable or invalid
    #[error("FILESERVER_CLI_CONFIG_ERROR: {0}")]
    Config(String),

    /// Writing output failed
    #[error("FILESERVER_CLI_IO_ERROR: {0}")]
    Io(String),

    /// Runtime, backend or listener could not start
    #[error("FILESERVER_CLI_BOOT_FAILED: {0}")]
    BootFailed(String),
}

impl CliError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::BootFailed(msg.into())
    }

    pub fn code(&self) -> CliErrorCode {
        match self {
            Self::Config(_) => CliErrorCode::ConfigError,
            Self::Io(_) => CliErrorCode::IoError,
            Self::BootFailed(_) => CliErrorCode::BootFailed,
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code().code()
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Config(msg) | Self::Io(msg) | Self::BootFailed(msg) => msg,
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Io(format!("JSON error: {}", e))
    }
}

/// A bad storage section is a config problem; anything else happened while
/// bringing the backend up.
impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Config(msg) => Self::Config(msg),
            other => Self::BootFailed(other.to_string()),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
