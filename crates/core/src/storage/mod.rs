//! Object storage for post attachments using Apache OpenDAL.
//!
//! Supported backends:
//! - S3-compatible: Supabase Storage, Cloudflare R2, AWS S3
//! - Azure Blob Storage
//! - Local filesystem (development only)
//!
//! Uploaded objects are addressed by a durable public URL built from the
//! configured `public_base_url` and the object key.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{StorageService, StoredObject};
