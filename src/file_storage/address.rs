//! # Address Resolution
//!
//! Turns an object key into a URL the caller can fetch directly from the
//! object store, so the proxy never streams object bytes itself.

use std::time::Duration;

use super::errors::StorageResult;
use super::object_client::ObjectClient;

/// How long a resolved read URL stays valid
pub const SIGNATURE_DURATION: Duration = Duration::from_secs(60 * 60);

/// `Content-Disposition` value offering `filename` as a download.
pub fn attachment_disposition(filename: &str) -> String {
    let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
    format!("attachment; filename=\"{}\"", escaped)
}

/// Confirm the object exists, then presign a read URL for it.
///
/// A missing object surfaces as `NotFound`; the probe maps "no such key"
/// before any URL is generated.
pub async fn resolve_read_address<C: ObjectClient + ?Sized>(
    client: &C,
    key: &str,
    filename: &str,
) -> StorageResult<String> {
    client.head_object(key).await?;
    client
        .presign_get(key, &attachment_disposition(filename), SIGNATURE_DURATION)
        .await
}
