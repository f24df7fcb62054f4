//! # Identifier and Filename Validation
//!
//! Every storage operation runs these checks first and fails fast with
//! [`StorageError::InvalidParameters`] without touching the medium.

use std::sync::OnceLock;

use regex::Regex;

use super::errors::{StorageError, StorageResult};

/// Length of a canonical hyphenated UUID
const UUID_LENGTH: usize = 36;

/// Length of a job key: one prefix character plus a UUID with the dashes removed
const PREFIXED_UUID_LENGTH: usize = 32 + 1;

/// Filenames must be strictly shorter than this
pub const MAX_FILENAME_LENGTH: usize = 256;

fn uuid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-fA-F0-9\-]*$").expect("static pattern"))
}

/// Check an identifier against the two accepted shapes.
pub fn is_valid_identifier(identifier: &str) -> bool {
    let length = identifier.chars().count();

    if length == UUID_LENGTH {
        return uuid_pattern().is_match(identifier);
    }
    if length == PREFIXED_UUID_LENGTH {
        let mut chars = identifier.chars();
        return match chars.next() {
            Some(discriminator) => {
                is_path_safe(discriminator) && uuid_pattern().is_match(chars.as_str())
            }
            None => false,
        };
    }
    false
}

/// A job key discriminator is otherwise free-form, but it becomes the first
/// character of a directory name and must not turn that into a path.
fn is_path_safe(discriminator: char) -> bool {
    !matches!(discriminator, '/' | '\\' | '.') && !discriminator.is_control()
}

/// Check a filename for length and path traversal.
pub fn is_valid_filename(filename: &str) -> bool {
    filename.chars().count() < MAX_FILENAME_LENGTH && !is_traversal(filename)
}

/// Rejects anything that could escape the identifier's directory when joined
/// onto a filesystem path.
fn is_traversal(filename: &str) -> bool {
    filename == "."
        || filename == ".."
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0')
}

/// Validate an identifier on its own (bulk delete).
pub fn validate_identifier(identifier: &str) -> StorageResult<()> {
    if is_valid_identifier(identifier) {
        Ok(())
    } else {
        Err(StorageError::InvalidParameters(format!(
            "identifier '{}'",
            identifier
        )))
    }
}

/// Validate an identifier and filename pair.
pub fn validate_parameters(identifier: &str, filename: &str) -> StorageResult<()> {
    validate_identifier(identifier)?;
    if is_valid_filename(filename) {
        Ok(())
    } else {
        Err(StorageError::InvalidParameters(format!(
            "filename for identifier '{}'",
            identifier
        )))
    }
}
