//! fileserver - a file storage proxy
//!
//! Stores, fetches, copies and deletes files addressed by
//! `(identifier, filename)` on either the local filesystem or an
//! S3-compatible object store, behind a small HTTP surface.

pub mod cli;
pub mod file_storage;
pub mod http_server;
pub mod observability;
