//! Generation error types.

use std::time::Duration;

use ringbook_shared::AppError;
use ringbook_shared::types::AccountId;
use thiserror::Error;

/// Errors from generating a candidate entry.
///
/// No partial candidate is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The model endpoint could not be reached.
    #[error("model endpoint unreachable: {0}")]
    Unreachable(String),

    /// Generation, repair included, exceeded its time budget.
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    /// The endpoint answered with a non-success status.
    #[error("model endpoint returned {status}: {message}")]
    Endpoint {
        /// HTTP status.
        status: u16,
        /// Error message from the body.
        message: String,
    },

    /// The reply could not be coerced into a candidate entry, even after repair.
    #[error("model output does not match the entry schema: {0}")]
    InvalidOutput(String),

    /// The reply references an account outside the chart.
    #[error("model referenced unknown account {0}")]
    UnknownAccount(AccountId),

    /// A line breaks the debit/credit exclusivity rule.
    #[error("model produced an invalid line: {0}")]
    InvalidLine(String),
}

impl GenerationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unreachable(_) => "MODEL_UNREACHABLE",
            Self::Timeout(_) => "GENERATION_TIMEOUT",
            Self::Endpoint { .. } => "MODEL_ERROR",
            Self::InvalidOutput(_) | Self::UnknownAccount(_) | Self::InvalidLine(_) => {
                "INVALID_MODEL_OUTPUT"
            }
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Timeout(_) => 504,
            _ => 502,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Unreachable(err.to_string())
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        Self::Domain {
            status: err.http_status_code(),
            code: err.error_code(),
            message: err.to_string(),
        }
    }
}
