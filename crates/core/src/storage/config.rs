//! Storage configuration types.

use std::path::PathBuf;

use ringbook_shared::config::{StorageBackend, StorageSettings};

/// Storage provider configuration.
#[derive(Debug, Clone)]
pub enum StorageProvider {
    /// S3-compatible storage: Supabase, Cloudflare R2, AWS S3
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Storage account name.
        account: String,
        /// Storage access key.
        access_key: String,
        /// Container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// URL prefix under which stored objects are publicly readable.
    pub public_base_url: String,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
}

impl StorageConfig {
    /// Default max file size: 10MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

    /// Create a new storage config with default limits.
    #[must_use]
    pub fn new(provider: StorageProvider, public_base_url: impl Into<String>) -> Self {
        Self {
            provider,
            public_base_url: public_base_url.into(),
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Build from the `[storage]` configuration section.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        let provider = match settings.backend {
            StorageBackend::S3 => StorageProvider::S3 {
                endpoint: settings.endpoint.clone(),
                bucket: settings.bucket.clone(),
                access_key_id: settings.access_key_id.clone(),
                secret_access_key: settings.secret_access_key.clone(),
                region: settings.region.clone(),
            },
            StorageBackend::AzureBlob => StorageProvider::AzureBlob {
                account: settings.endpoint.clone(),
                access_key: settings.secret_access_key.clone(),
                container: settings.bucket.clone(),
            },
            StorageBackend::Fs => StorageProvider::local_fs(&settings.root),
        };

        Self::new(provider, settings.public_base_url.trim_end_matches('/'))
            .with_max_file_size(settings.max_file_size)
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Images of any subtype and PDFs are accepted.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        let essence = mime_type.split(';').next().unwrap_or_default().trim();
        essence == "application/pdf"
            || essence
                .strip_prefix("image/")
                .is_some_and(|subtype| !subtype.is_empty())
    }
}
