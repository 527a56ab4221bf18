//! Chat model seam.

use serde::Serialize;

use super::error::GenerationError;

/// One block of user content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// Inline base64 image.
    Image {
        /// Image source.
        source: ImageSource,
    },
}

/// Base64 image source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSource {
    /// Always `base64`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// MIME type.
    pub media_type: String,
    /// Base64 payload.
    pub data: String,
}

impl ContentBlock {
    /// Text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Image block.
    #[must_use]
    pub fn image(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Image {
            source: ImageSource {
                kind: "base64",
                media_type: media_type.into(),
                data: data.into(),
            },
        }
    }
}

/// A single-turn request: system prompt plus one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// System prompt.
    pub system: String,
    /// User message content.
    pub content: Vec<ContentBlock>,
}

/// A text/vision model that answers a single-turn request.
///
/// Implementations must be deterministic as far as the endpoint allows
/// (temperature 0).
pub trait ChatModel: Send + Sync {
    /// Sends `request` and returns the reply text.
    fn complete(
        &self,
        request: ChatRequest,
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;
}
