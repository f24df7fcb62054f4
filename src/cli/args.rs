//! CLI argument definitions using clap
//!
//! Commands:
//! - fileserver serve --config <path> [--port <port>]
//! - fileserver check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fileserver - store, fetch, copy and delete files over HTTP
#[derive(Parser, Debug)]
#[command(name = "fileserver")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP file server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./fileserver.json")]
        config: PathBuf,

        /// Override the configured HTTP port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Load and validate the configuration, then print it resolved
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./fileserver.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
