//! # Key Scheme
//!
//! Derives storage addresses from an identifier and filename.
//!
//! - Filesystem: `{base}/{identifier}/{filename}`
//! - Object store: `{shard}/{identifier}/{filename}`, where the shard label is
//!   the identifier's first character when that character is not a hex digit,
//!   and [`FALLBACK_SHARD`] otherwise. Canonical UUIDs therefore all land under
//!   `z/`, while prefixed job keys spread over their discriminator character.

use std::path::{Path, PathBuf};

/// Shard label for identifiers starting with a hex digit
pub const FALLBACK_SHARD: char = 'z';

/// Shard label for an identifier.
pub fn shard_label(identifier: &str) -> char {
    match identifier.chars().next() {
        Some(first) if !first.is_ascii_hexdigit() => first,
        _ => FALLBACK_SHARD,
    }
}

/// Object-store prefix holding every file of an identifier, with trailing slash.
pub fn object_prefix(identifier: &str) -> String {
    format!("{}/{}/", shard_label(identifier), identifier)
}

/// Object-store key for a file.
pub fn object_key(identifier: &str, filename: &str) -> String {
    format!("{}{}", object_prefix(identifier), filename)
}

/// Percent-encode each segment of an object key, keeping the `/` separators.
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Inverse of [`encode_key`]; `None` when a segment is not valid UTF-8 after
/// decoding.
pub fn decode_key(encoded: &str) -> Option<String> {
    encoded
        .split('/')
        .map(|segment| urlencoding::decode(segment).ok().map(|s| s.into_owned()))
        .collect::<Option<Vec<_>>>()
        .map(|segments| segments.join("/"))
}

/// Filesystem directory holding every file of an identifier.
pub fn directory_path(base: &Path, identifier: &str) -> PathBuf {
    base.join(identifier)
}
