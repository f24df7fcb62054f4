//! # HTTP Server Module
//!
//! Thin request/response mapping over [`crate::file_storage::FileService`].
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/{identifier}/{filename}` - Store, fetch and delete a file
//! - `/{identifier}` - Delete every file of an identifier
//! - `/copy/{source}/{destination}/{filename}` - Copy a file

pub mod config;
pub mod file_routes;
pub mod health_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
