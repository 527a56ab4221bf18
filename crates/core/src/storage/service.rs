//! Storage service implementation using Apache OpenDAL.

use bytes::Bytes;
use opendal::{Operator, services};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// An object written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    /// Storage key.
    pub key: String,
    /// Durable public URL.
    pub url: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type.
    pub content_type: String,
}

/// Storage service for post attachments.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl std::fmt::Debug for StorageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageService")
            .field("provider", &self.config.provider.name())
            .field("public_base_url", &self.config.public_base_url)
            .finish_non_exhaustive()
    }
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                Operator::new(builder)?.finish()
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);
                Operator::new(builder)?.finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );
                Operator::new(builder)?.finish()
            }
        };

        Ok(operator)
    }

    /// Validate an upload against config constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if file size or MIME type is invalid.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(size, self.config.max_file_size));
        }

        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::invalid_mime_type(content_type));
        }

        Ok(())
    }

    /// Generate storage key for an upload.
    ///
    /// Format: `{folder}/{upload_id}/{sanitized_filename}`
    #[must_use]
    pub fn generate_storage_key(folder: &str, upload_id: Uuid, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            sanitize_filename(folder),
            upload_id,
            sanitize_filename(filename)
        )
    }

    /// Public URL of `key`.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.config.public_base_url, key)
    }

    /// Validates and writes a file, returning its public URL.
    ///
    /// # Errors
    ///
    /// Returns a validation error before writing, or an operation error if
    /// the backend rejects the write.
    pub async fn upload(
        &self,
        folder: &str,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredObject, StorageError> {
        let size = data.len() as u64;
        self.validate_upload(content_type, size)?;

        let key = Self::generate_storage_key(folder, Uuid::now_v7(), filename);
        self.operator
            .write_with(&key, data)
            .content_type(content_type)
            .await
            .map_err(StorageError::from)?;

        debug!(key = %key, size, provider = self.config.provider.name(), "Stored upload");

        Ok(StoredObject {
            url: self.public_url(&key),
            key,
            size,
            content_type: content_type.to_string(),
        })
    }

    /// Best-effort removal of objects written earlier in a failed batch.
    pub async fn discard(&self, objects: &[StoredObject]) {
        for object in objects {
            if let Err(e) = self.operator.delete(&object.key).await {
                warn!(key = %object.key, error = %e, "Failed to discard upload");
            }
        }
    }
}

/// Segment used when a name sanitizes to nothing usable.
const FALLBACK_SEGMENT: &str = "upload";

/// Sanitize a path segment for a storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
/// Empty and dot-only segments become [`FALLBACK_SEGMENT`].
fn sanitize_filename(filename: &str) -> String {
    let sanitized: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().all(|c| c == '.') {
        FALLBACK_SEGMENT.to_string()
    } else {
        sanitized
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_sanitized_filename_safe_chars(filename in ".*") {
            let sanitized = sanitize_filename(&filename);

            for c in sanitized.chars() {
                let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
                prop_assert!(is_safe, "Unexpected character in sanitized filename: {}", c);
            }
        }

        #[test]
        fn prop_storage_key_has_three_segments(
            folder in ".{0,20}",
            filename in ".{0,40}",
        ) {
            let key = StorageService::generate_storage_key(&folder, Uuid::new_v4(), &filename);
            prop_assert_eq!(key.split('/').count(), 3);
            for segment in key.split('/') {
                prop_assert!(!segment.is_empty());
                prop_assert!(segment != "." && segment != "..");
            }
        }
    }
}
