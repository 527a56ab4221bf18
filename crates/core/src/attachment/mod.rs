//! Intake of files attached to a post.
//!
//! Images are passed to the model inline as base64; PDFs are first turned
//! into text by a document-parsing service. Attachment support is optional:
//! without a configured parser, PDFs are rejected and images still work.

mod error;
mod llamaparse;
mod service;
mod types;

pub use error::AttachmentError;
pub use llamaparse::LlamaParseClient;
pub use service::{AttachmentService, PdfTextExtractor};
pub use types::{AttachmentKind, ImageAttachment, PreparedAttachments, Upload};
