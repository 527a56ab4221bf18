//! Attachment service implementation.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use super::error::AttachmentError;
use super::types::{AttachmentKind, ImageAttachment, PreparedAttachments, Upload};

/// Converts a PDF into plain text.
///
/// Implemented by [`super::LlamaParseClient`]; tests supply their own.
pub trait PdfTextExtractor: Send + Sync {
    /// Extracts the text of one PDF.
    fn extract_text(
        &self,
        filename: &str,
        data: Bytes,
    ) -> impl std::future::Future<Output = Result<String, AttachmentError>> + Send;
}

/// Attachment service turning uploads into generator input.
pub struct AttachmentService<P: PdfTextExtractor> {
    parser: Option<Arc<P>>,
}

impl<P: PdfTextExtractor> AttachmentService<P> {
    /// Create a new attachment service. Pass `None` to disable PDFs.
    #[must_use]
    pub fn new(parser: Option<Arc<P>>) -> Self {
        Self { parser }
    }

    /// Checks every upload before any of them is processed.
    ///
    /// # Errors
    ///
    /// Returns the first unsupported, empty, or (without a parser) PDF upload.
    pub fn validate(&self, uploads: &[Upload]) -> Result<Vec<AttachmentKind>, AttachmentError> {
        uploads
            .iter()
            .map(|upload| {
                let kind = AttachmentKind::classify(&upload.content_type)
                    .ok_or_else(|| AttachmentError::UnsupportedType(upload.content_type.clone()))?;
                if upload.data.is_empty() {
                    return Err(AttachmentError::EmptyFile(upload.filename.clone()));
                }
                if kind == AttachmentKind::Pdf && self.parser.is_none() {
                    return Err(AttachmentError::ParserUnavailable);
                }
                Ok(kind)
            })
            .collect()
    }

    /// Encodes images and extracts PDF text, preserving upload order.
    ///
    /// # Errors
    ///
    /// Returns a validation error before any parsing happens, or the first
    /// parser failure.
    pub async fn prepare(&self, uploads: Vec<Upload>) -> Result<PreparedAttachments, AttachmentError> {
        let kinds = self.validate(&uploads)?;
        let mut prepared = PreparedAttachments::default();

        for (upload, kind) in uploads.into_iter().zip(kinds) {
            match kind {
                AttachmentKind::Image => {
                    prepared
                        .images
                        .push(ImageAttachment::encode(&upload.content_type, &upload.data));
                }
                AttachmentKind::Pdf => {
                    let parser = self.parser.as_ref().ok_or(AttachmentError::ParserUnavailable)?;
                    let text = parser.extract_text(&upload.filename, upload.data).await?;
                    debug!(filename = %upload.filename, chars = text.len(), "Extracted PDF text");
                    prepared.pdf_texts.push(text);
                }
            }
        }

        Ok(prepared)
    }
}
