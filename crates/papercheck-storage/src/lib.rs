//! Pre-signed upload URLs for paper PDFs.
//!
//! Uploads go under the `papers/` prefix. Client-supplied names are reduced
//! to a single safe path component before they become part of a key.

use std::time::Duration;

use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use serde::Serialize;
use thiserror::Error;

use papercheck_core::StorageConfig;

/// Prefix for every upload key.
pub const KEY_PREFIX: &str = "papers/";

/// Lifetime of a signed URL.
pub const UPLOAD_URL_EXPIRY: Duration = Duration::from_secs(300);

const MAX_FILE_NAME_LEN: usize = 255;
const UNIQUE_TOKEN_LEN: usize = 8;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage is not configured: missing {0}")]
    NotConfigured(&'static str),
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),
    #[error("failed to presign upload: {0}")]
    Presign(String),
}

/// A signed PUT URL plus the object key it writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedUpload {
    pub url: String,
    pub key: String,
}

/// Issues time-limited upload URLs for a single bucket.
#[derive(Debug, Clone)]
pub struct UploadSigner {
    client: Client,
    bucket: String,
    unique_keys: bool,
}

impl UploadSigner {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            unique_keys: false,
        }
    }

    /// Prefix keys with a random token so two uploads of the same name never collide.
    pub fn with_unique_keys(mut self, unique: bool) -> Self {
        self.unique_keys = unique;
        self
    }

    /// Build a signer from configuration.
    ///
    /// Static credentials are used when both the key id and the secret are
    /// set; otherwise the default AWS provider chain supplies them.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let bucket = config
            .bucket
            .clone()
            .ok_or(StorageError::NotConfigured("bucket name"))?;
        let region = Region::new(
            config
                .region
                .clone()
                .ok_or(StorageError::NotConfigured("region"))?,
        );

        let client = match (&config.access_key_id, &config.secret_access_key) {
            (Some(key_id), Some(secret)) => {
                let credentials =
                    Credentials::new(key_id, secret, None, None, "papercheck-config");
                let s3_config = aws_sdk_s3::Config::builder()
                    .behavior_version(BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(credentials)
                    .build();
                Client::from_conf(s3_config)
            }
            _ => {
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .load()
                    .await;
                Client::new(&shared)
            }
        };

        tracing::info!(bucket = %bucket, unique_keys = config.unique_keys, "upload signer ready");
        Ok(Self::new(client, bucket).with_unique_keys(config.unique_keys))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Presign a `PutObject` for `file_name` with the given content type.
    pub async fn sign(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<SignedUpload, StorageError> {
        let key = object_key(file_name, self.unique_keys)?;

        let presign = PresigningConfig::expires_in(UPLOAD_URL_EXPIRY)
            .map_err(|e| StorageError::Presign(e.to_string()))?;
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .presigned(presign)
            .await
            .map_err(|e| StorageError::Presign(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(key = %key, content_type, "signed upload url");
        Ok(SignedUpload {
            url: request.uri().to_string(),
            key,
        })
    }
}

/// Object key for an upload named `file_name`.
pub fn object_key(file_name: &str, unique: bool) -> Result<String, StorageError> {
    let name = sanitize_file_name(file_name)?;
    if unique {
        let token: String = std::iter::repeat_with(fastrand::alphanumeric)
            .take(UNIQUE_TOKEN_LEN)
            .collect();
        Ok(format!("{KEY_PREFIX}{token}-{name}"))
    } else {
        Ok(format!("{KEY_PREFIX}{name}"))
    }
}

/// Reduce a client-supplied name to one path component of `[A-Za-z0-9._-]`.
///
/// Directory parts (either separator) are dropped and every other character
/// becomes `_`. Names that end up empty, `.` or `..` are rejected.
pub fn sanitize_file_name(file_name: &str) -> Result<String, StorageError> {
    let last = file_name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILE_NAME_LEN)
        .collect();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return Err(StorageError::InvalidFileName(file_name.to_string()));
    }
    Ok(cleaned)
}
