//! CLI command implementations
//!
//! `serve` boots in a fixed order: configuration, logging, storage backend,
//! HTTP listener. A failure at any step is fatal and nothing is served.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::file_storage::{FileService, StorageConfig};
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::{init_logging, level_filter, LogFormat};

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Storage backend selection (default: local filesystem)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log filter used when `RUST_LOG` is unset (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log line format (default: text)
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpServerConfig::default(),
            storage: StorageConfig::default(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        match &self.storage {
            StorageConfig::Local(local) if local.location.as_os_str().is_empty() => {
                return Err(CliError::config_error("storage.location must not be empty"));
            }
            StorageConfig::S3(s3) if s3.bucket_name.trim().is_empty() => {
                return Err(CliError::config_error(
                    "storage.bucket_name must not be empty",
                ));
            }
            _ => {}
        }

        if self.http.max_upload_bytes == 0 {
            return Err(CliError::config_error("http.max_upload_bytes must be > 0"));
        }

        level_filter(&self.log_level).map_err(CliError::config_error)?;

        Ok(())
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Start the HTTP file server
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = Config::load(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create runtime: {}", e)))?;

    rt.block_on(run_server(config))
}

async fn run_server(config: Config) -> CliResult<()> {
    init_logging(&config.log_level, config.log_format).map_err(CliError::config_error)?;

    let backend = config.storage.build_backend().await?;
    tracing::info!(
        backend = %backend.kind(),
        prevent_cleanup = config.storage.prevent_cleanup(),
        "storage backend ready"
    );

    let server = HttpServer::new(config.http, FileService::new(backend));
    server
        .start()
        .await
        .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
}

/// Print the resolved configuration, defaults filled in
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    println!("{}", render_config(&config)?);
    Ok(())
}

fn render_config(config: &Config) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(config)?)
}
