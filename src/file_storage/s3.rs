//! # S3 Object Client
//!
//! [`ObjectClient`] over `aws-sdk-s3`. Credentials and, unless configured,
//! the region come from the standard AWS environment chain.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier, TaggingDirective};
use aws_sdk_s3::Client;
use serde::{Deserialize, Serialize};

use super::errors::{StorageError, StorageResult};
use super::keys;
use super::object_client::ObjectClient;

/// S3 storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct S3StorageConfig {
    /// Bucket all objects are stored in
    pub bucket_name: String,

    /// Region override (default: AWS environment)
    #[serde(default)]
    pub region: Option<String>,

    /// Endpoint override for S3-compatible stores
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Use `{endpoint}/{bucket}/{key}` addressing
    #[serde(default)]
    pub force_path_style: bool,

    /// Skip physical deletes while still reporting success
    #[serde(default)]
    pub prevent_cleanup: bool,
}

/// S3-backed object client
#[derive(Debug, Clone)]
pub struct S3ObjectClient {
    client: Client,
    bucket: String,
}

fn medium_error<E: std::error::Error>(operation: &str, key: &str, err: E) -> StorageError {
    StorageError::Io(format!("{} {}: {}", operation, key, DisplayErrorContext(err)))
}


impl S3ObjectClient {
    /// Build a client from the AWS environment plus configured overrides.
    pub async fn connect(config: &S3StorageConfig) -> StorageResult<Self> {
        if config.bucket_name.trim().is_empty() {
            return Err(StorageError::Config("bucket_name is empty".into()));
        }

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_sdk_s3::config::Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::info!(bucket = %config.bucket_name, endpoint = ?config.endpoint, "s3 storage ready");
        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket_name.clone(),
        })
    }
}

#[async_trait]
impl ObjectClient for S3ObjectClient {
    async fn put_object(&self, key: &str, body: Vec<u8>, tagging: &str) -> StorageResult<()> {
        let length = body.len() as i64;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_length(length)
            .tagging(tagging)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| medium_error("put", key, e))?;
        Ok(())
    }

    async fn head_object(&self, key: &str) -> StorageResult<()> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false);
                if missing {
                    Err(StorageError::NotFound(key.to_string()))
                } else {
                    Err(medium_error("head", key, err))
                }
            }
        }
    }

    async fn copy_object(
        &self,
        source_key: &str,
        destination_key: &str,
        tagging: &str,
    ) -> StorageResult<()> {
        let result = self
            .client
            .copy_object()
            .copy_source(format!("{}/{}", self.bucket, keys::encode_key(source_key)))
            .bucket(&self.bucket)
            .key(destination_key)
            .tagging_directive(TaggingDirective::Replace)
            .tagging(tagging)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if err.as_service_error().and_then(|e| e.code()) == Some("NoSuchKey") => {
                Err(StorageError::NotFound(source_key.to_string()))
            }
            Err(err) => Err(medium_error("copy", source_key, err)),
        }
    }

    async fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;
        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);
            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }
            let response = request
                .send()
                .await
                .map_err(|e| medium_error("list", prefix, e))?;

            keys.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match response.next_continuation_token() {
                Some(token) => continuation_token = Some(token.to_string()),
                None => break,
            }
        }
        Ok(keys)
    }

    async fn delete_objects(&self, keys: &[String]) -> StorageResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let identifiers = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| medium_error("delete", &keys[0], e))?;
        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(true)
            .build()
            .map_err(|e| medium_error("delete", &keys[0], e))?;

        let response = self
            .client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| medium_error("delete", &keys[0], e))?;

        if let Some(failure) = response.errors().first() {
            return Err(StorageError::Io(format!(
                "delete {}: {}",
                failure.key().unwrap_or_default(),
                failure.message().unwrap_or("unknown error")
            )));
        }
        Ok(())
    }

    async fn presign_get(
        &self,
        key: &str,
        content_disposition: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let presigning =
            PresigningConfig::expires_in(expires_in).map_err(|e| medium_error("presign", key, e))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .response_content_disposition(content_disposition)
            .presigned(presigning)
            .await
            .map_err(|e| medium_error("presign", key, e))?;
        Ok(request.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: S3StorageConfig =
            serde_json::from_str(r#"{"bucket_name": "uploads"}"#).unwrap();
        assert_eq!(config.bucket_name, "uploads");
        assert!(config.region.is_none());
        assert!(!config.force_path_style);
        assert!(!config.prevent_cleanup);
    }

    #[tokio::test]
    async fn test_connect_rejects_empty_bucket() {
        let config = S3StorageConfig {
            bucket_name: " ".into(),
            region: None,
            endpoint: None,
            force_path_style: false,
            prevent_cleanup: false,
        };
        assert!(matches!(
            S3ObjectClient::connect(&config).await,
            Err(StorageError::Config(_))
        ));
    }
}
