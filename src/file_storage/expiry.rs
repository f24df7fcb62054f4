//! # Expiry Tags
//!
//! Retention markers attached to stored objects. Enforcement happens outside
//! this service by a lifecycle process reading the `expires` tag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::StorageError;

/// Metadata key the tag is stored under
pub const EXPIRES_TAG_KEY: &str = "expires";

/// Retention class of a stored object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryTag {
    /// Keep for a short period
    Short,
    /// Keep for the legal data retention period
    Legal,
    /// Never delete
    #[default]
    Never,
}

impl ExpiryTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryTag::Short => "short",
            ExpiryTag::Legal => "legal",
            ExpiryTag::Never => "never",
        }
    }

    /// Resolve an optional caller-supplied tag, defaulting to [`ExpiryTag::Never`].
    pub fn resolve(supplied: Option<ExpiryTag>) -> ExpiryTag {
        supplied.unwrap_or_default()
    }

    /// Parse an optional query value; absent or blank means "not supplied".
    pub fn parse_optional(value: Option<&str>) -> Result<Option<ExpiryTag>, StorageError> {
        match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }

    /// Tagging header value, `expires=<tag>`
    pub fn tagging(&self) -> String {
        format!("{}={}", EXPIRES_TAG_KEY, self.as_str())
    }
}

impl FromStr for ExpiryTag {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "short" => Ok(ExpiryTag::Short),
            "legal" => Ok(ExpiryTag::Legal),
            "never" => Ok(ExpiryTag::Never),
            other => Err(StorageError::InvalidParameters(format!(
                "unknown expiry tag '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ExpiryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
