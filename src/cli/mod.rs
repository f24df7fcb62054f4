//! CLI module for the file server
//!
//! Provides command-line interface for:
//! - serve: Boot the storage backend and serve HTTP
//! - check-config: Validate and print the resolved configuration

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{check_config, run, run_command, serve, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
