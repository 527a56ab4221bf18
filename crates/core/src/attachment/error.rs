//! Attachment error types.

use ringbook_shared::AppError;
use thiserror::Error;

/// Attachment intake errors.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// File type is neither an image nor a PDF.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// File is empty.
    #[error("file '{0}' is empty")]
    EmptyFile(String),

    /// A PDF was uploaded but no document parser is configured.
    #[error("PDF attachments are not enabled")]
    ParserUnavailable,

    /// Document parser returned an error.
    #[error("document parser error: {0}")]
    Parser(String),

    /// Document parser did not finish in time.
    #[error("document parser did not finish after {0} polls")]
    ParseTimeout(u32),

    /// Network failure talking to the document parser.
    #[error("document parser unreachable: {0}")]
    Network(#[from] reqwest::Error),
}

impl From<AttachmentError> for AppError {
    fn from(err: AttachmentError) -> Self {
        match err {
            AttachmentError::UnsupportedType(_) | AttachmentError::EmptyFile(_) => {
                Self::Validation(err.to_string())
            }
            AttachmentError::ParserUnavailable => Self::Unavailable(err.to_string()),
            AttachmentError::Parser(_)
            | AttachmentError::ParseTimeout(_)
            | AttachmentError::Network(_) => Self::Upstream(err.to_string()),
        }
    }
}
