//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Hosted auth provider configuration.
    pub auth: AuthConfig,
    /// Model endpoint configuration.
    pub llm: LlmConfig,
    /// Document parser configuration. PDF attachments are rejected when absent.
    #[serde(default)]
    pub parser: Option<ParserConfig>,
    /// Object storage configuration. Uploads are disabled when absent.
    #[serde(default)]
    pub storage: Option<StorageSettings>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Hosted auth configuration.
///
/// Tokens are issued by the auth provider and only validated here.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 secret of the auth project.
    pub jwt_secret: String,
    /// Expected `aud` claim, if the provider sets one.
    #[serde(default)]
    pub audience: Option<String>,
}

/// Model endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// API key sent as `x-api-key`.
    pub api_key: String,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the Messages API.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Upper bound on generated tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Timeout for a single generation, repair pass included.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "claude-3-5-sonnet-latest".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_llm_timeout() -> u64 {
    60
}

/// Document parser configuration (LlamaParse-compatible API).
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Base URL of the parsing API.
    #[serde(default = "default_parser_base_url")]
    pub base_url: String,
    /// Delay between job status polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Polls before the job is considered stuck.
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,
}

fn default_parser_base_url() -> String {
    "https://api.cloud.llamaindex.ai".to_string()
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_max_polls() -> u32 {
    60
}

/// Object storage backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// S3-compatible storage (Supabase Storage, R2, AWS S3).
    S3,
    /// Azure Blob Storage.
    AzureBlob,
    /// Local filesystem.
    Fs,
}

/// Object storage settings as read from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Backend kind.
    pub backend: StorageBackend,
    /// Bucket or container name.
    #[serde(default)]
    pub bucket: String,
    /// Service endpoint (S3) or account name (Azure).
    #[serde(default)]
    pub endpoint: String,
    /// Region for S3.
    #[serde(default = "default_region")]
    pub region: String,
    /// Access key id.
    #[serde(default)]
    pub access_key_id: String,
    /// Secret access key.
    #[serde(default)]
    pub secret_access_key: String,
    /// Root directory for the filesystem backend.
    #[serde(default = "default_root")]
    pub root: String,
    /// Public URL prefix under which stored objects are served.
    pub public_base_url: String,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_root() -> String {
    "./storage".to_string()
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("RINGBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(src: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(src, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_fill_optional_sections() {
        let cfg = from_toml(
            r#"
            [server]
            [database]
            url = "postgres://localhost/ringbook"
            [auth]
            jwt_secret = "secret"
            [llm]
            api_key = "key"
            "#,
        );

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.llm.base_url, "https://api.anthropic.com");
        assert_eq!(cfg.llm.timeout_secs, 60);
        assert!(cfg.parser.is_none());
        assert!(cfg.storage.is_none());
        assert!(cfg.auth.audience.is_none());
    }

    #[test]
    fn test_storage_section() {
        let cfg = from_toml(
            r#"
            [server]
            port = 9000
            [database]
            url = "postgres://localhost/ringbook"
            [auth]
            jwt_secret = "secret"
            audience = "authenticated"
            [llm]
            api_key = "key"
            model = "claude-3-haiku"
            [storage]
            backend = "s3"
            bucket = "post-files"
            endpoint = "https://project.supabase.co/storage/v1/s3"
            public_base_url = "https://project.supabase.co/storage/v1/object/public/post-files"
            "#,
        );

        let storage = cfg.storage.unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(storage.backend, StorageBackend::S3);
        assert_eq!(storage.region, "auto");
        assert_eq!(storage.max_file_size, 10 * 1024 * 1024);
        assert_eq!(cfg.llm.model, "claude-3-haiku");
    }
}
