//! Attachment types.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::Serialize;

/// A file received with a post.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original filename.
    pub filename: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File contents.
    pub data: Bytes,
}

/// Image types the model accepts inline.
const IMAGE_MEDIA_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Lowercased MIME type without parameters.
fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// How an upload is handed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Sent inline as an image.
    Image,
    /// Converted to text first.
    Pdf,
}

impl AttachmentKind {
    /// Classifies a MIME type; `None` for anything the model cannot take.
    #[must_use]
    pub fn classify(content_type: &str) -> Option<Self> {
        let essence = mime_essence(content_type);
        if essence == "application/pdf" {
            Some(Self::Pdf)
        } else if IMAGE_MEDIA_TYPES.contains(&essence.as_str()) {
            Some(Self::Image)
        } else {
            None
        }
    }
}

/// An image ready for the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    /// Lowercased MIME type, e.g. `image/jpeg`.
    pub media_type: String,
    /// Base64 payload without the data-URL prefix.
    pub data: String,
}

impl ImageAttachment {
    /// Encodes raw image bytes; parameters are dropped from `media_type`.
    #[must_use]
    pub fn encode(media_type: &str, bytes: &[u8]) -> Self {
        Self {
            media_type: mime_essence(media_type),
            data: STANDARD.encode(bytes),
        }
    }
}

/// Attachments converted for the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedAttachments {
    /// Images, in upload order.
    pub images: Vec<ImageAttachment>,
    /// Extracted PDF text, in upload order.
    pub pdf_texts: Vec<String>,
}
