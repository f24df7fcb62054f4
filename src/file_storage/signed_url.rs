//! # Signed URL Generation
//!
//! Keyed, expiring read URLs for the in-memory object client. The URL layout
//! is `{base}/{bucket}/{key}?expires={ts}&disposition={cd}&signature={sig}`.

use chrono::{DateTime, Duration, TimeZone, Utc};
use sha2::{Digest, Sha256};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

use super::errors::{StorageError, StorageResult};
use super::keys;

/// Signed URL generator
#[derive(Debug)]
pub struct SignedUrlGenerator {
    secret: Vec<u8>,
}

impl SignedUrlGenerator {
    /// Create a new generator
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
        }
    }

    /// Generate a signed URL valid for `valid_for`
    pub fn generate(
        &self,
        bucket: &str,
        key: &str,
        content_disposition: &str,
        valid_for: std::time::Duration,
    ) -> SignedUrl {
        let expires_at = Duration::from_std(valid_for)
            .ok()
            .and_then(|d| Utc::now().checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let signature = self.sign(bucket, key, content_disposition, expires_at.timestamp());

        SignedUrl {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_disposition: content_disposition.to_string(),
            expires_at,
            signature,
        }
    }

    /// Verify a signed URL
    pub fn verify(&self, url: &SignedUrl) -> StorageResult<()> {
        if Utc::now() > url.expires_at {
            return Err(StorageError::InvalidParameters("URL expired".into()));
        }

        let expected = self.sign(
            &url.bucket,
            &url.key,
            &url.content_disposition,
            url.expires_at.timestamp(),
        );
        if url.signature != expected {
            return Err(StorageError::InvalidParameters("invalid signature".into()));
        }

        Ok(())
    }

    fn sign(&self, bucket: &str, key: &str, content_disposition: &str, expires: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(format!("{}/{}/{}/{}", bucket, key, expires, content_disposition).as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

/// A signed URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub bucket: String,
    pub key: String,
    pub content_disposition: String,
    pub expires_at: DateTime<Utc>,
    pub signature: String,
}

impl SignedUrl {
    /// Generate the URL string
    pub fn to_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/{}?expires={}&disposition={}&signature={}",
            base_url.trim_end_matches('/'),
            self.bucket,
            keys::encode_key(&self.key),
            self.expires_at.timestamp(),
            urlencoding::encode(&self.content_disposition),
            self.signature
        )
    }

    /// Parse a URL produced by [`SignedUrl::to_url`] with the same base.
    pub fn parse(url: &str, base_url: &str) -> StorageResult<Self> {
        let malformed = || StorageError::InvalidParameters("malformed signed URL".into());

        let rest = url
            .strip_prefix(base_url.trim_end_matches('/'))
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(malformed)?;
        let (path, query) = rest.split_once('?').ok_or_else(malformed)?;
        let (bucket, key) = path.split_once('/').ok_or_else(malformed)?;

        let mut expires = None;
        let mut disposition = None;
        let mut signature = None;
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("expires", v)) => expires = v.parse::<i64>().ok(),
                Some(("disposition", v)) => {
                    disposition = urlencoding::decode(v).ok().map(|d| d.into_owned())
                }
                Some(("signature", v)) => signature = Some(v.to_string()),
                _ => {}
            }
        }

        let expires_at = expires
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .ok_or_else(malformed)?;

        Ok(SignedUrl {
            bucket: bucket.to_string(),
            key: keys::decode_key(key).ok_or_else(malformed)?,
            content_disposition: disposition.ok_or_else(malformed)?,
            expires_at,
            signature: signature.ok_or_else(malformed)?,
        })
    }
}
