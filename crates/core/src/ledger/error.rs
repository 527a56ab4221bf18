//! Ledger error types.
//!
//! Validation variants are raised before anything is written. `Database`
//! covers failures inside the atomic posting unit, which is always rolled
//! back in full.

use ringbook_shared::AppError;
use ringbook_shared::types::{AccountId, PostId, TransactionId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry has no lines.
    #[error("Entry must have at least one line")]
    EmptyEntry,

    /// A line references an account outside the organization's chart.
    #[error("Account not found: {0}")]
    UnknownAccount(AccountId),

    /// A line carries both a debit and a credit amount.
    #[error("Line for account {0} has both debit and credit set")]
    BothSides(AccountId),

    /// A line carries neither a debit nor a credit amount.
    #[error("Line for account {0} has neither debit nor credit set")]
    NoSide(AccountId),

    /// A line amount is negative.
    #[error("Line for account {0} has a negative amount")]
    NegativeAmount(AccountId),

    /// A line amount has fractions of a cent or exceeds the storable maximum.
    #[error("Line for account {0} has an amount that cannot be stored")]
    AmountOutOfRange(AccountId),

    /// Debits and credits differ.
    #[error("Entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    // ========== State Errors ==========
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Source post missing or authored by someone else.
    #[error("Post not found: {0}")]
    PostNotFound(PostId),

    /// An entry was already posted from this post.
    #[error("Post {0} already has a journal entry")]
    PostAlreadyProcessed(PostId),

    /// Transaction was already approved.
    #[error("Transaction {0} is already approved")]
    AlreadyApproved(TransactionId),

    /// The user owns no organization.
    #[error("No organization for the current user")]
    NoOrganization,

    // ========== Storage Errors ==========
    /// Database error; the posting unit was rolled back.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyEntry => "EMPTY_ENTRY",
            Self::UnknownAccount(_) => "ACCOUNT_NOT_FOUND",
            Self::BothSides(_) => "BOTH_SIDES_SET",
            Self::NoSide(_) => "NO_SIDE_SET",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::AmountOutOfRange(_) => "AMOUNT_OUT_OF_RANGE",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::PostNotFound(_) => "POST_NOT_FOUND",
            Self::PostAlreadyProcessed(_) => "POST_ALREADY_PROCESSED",
            Self::AlreadyApproved(_) => "ALREADY_APPROVED",
            Self::NoOrganization => "NO_ORGANIZATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::EmptyEntry
            | Self::UnknownAccount(_)
            | Self::BothSides(_)
            | Self::NoSide(_)
            | Self::NegativeAmount(_)
            | Self::AmountOutOfRange(_) => 400,
            Self::TransactionNotFound(_) | Self::PostNotFound(_) | Self::NoOrganization => 404,
            Self::AlreadyApproved(_) | Self::PostAlreadyProcessed(_) => 409,
            Self::Unbalanced { .. } => 422,
            Self::Database(_) => 500,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Database(_) => Self::Database(err.to_string()),
            _ => Self::Domain {
                status: err.http_status_code(),
                code: err.error_code(),
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::EmptyEntry.error_code(), "EMPTY_ENTRY");
        assert_eq!(
            LedgerError::UnknownAccount(AccountId(9)).error_code(),
            "ACCOUNT_NOT_FOUND"
        );
        assert_eq!(LedgerError::BothSides(AccountId(1)).error_code(), "BOTH_SIDES_SET");
        assert_eq!(LedgerError::NoSide(AccountId(1)).error_code(), "NO_SIDE_SET");
        assert_eq!(
            LedgerError::AmountOutOfRange(AccountId(1)).error_code(),
            "AMOUNT_OUT_OF_RANGE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::UnknownAccount(AccountId(9)).http_status_code(), 400);
        assert_eq!(
            LedgerError::TransactionNotFound(TransactionId(1)).http_status_code(),
            404
        );
        assert_eq!(LedgerError::AlreadyApproved(TransactionId(1)).http_status_code(), 409);
        assert_eq!(LedgerError::AmountOutOfRange(AccountId(1)).http_status_code(), 400);
        assert_eq!(
            LedgerError::Unbalanced {
                debit: dec!(1),
                credit: dec!(2)
            }
            .http_status_code(),
            422
        );
        assert_eq!(LedgerError::Database("down".into()).http_status_code(), 500);
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = LedgerError::UnknownAccount(AccountId(42)).into();
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.error_code(), "ACCOUNT_NOT_FOUND");
        assert_eq!(app.to_string(), "Account not found: 42");

        let app: AppError = LedgerError::PostAlreadyProcessed(PostId::new()).into();
        assert_eq!(app.status_code(), 409);
        assert_eq!(app.error_code(), "POST_ALREADY_PROCESSED");

        let app: AppError = LedgerError::Unbalanced {
            debit: dec!(60),
            credit: dec!(45),
        }
        .into();
        assert_eq!(app.status_code(), 422);
        assert_eq!(app.error_code(), "UNBALANCED_ENTRY");

        let app: AppError = LedgerError::Database("connection reset".into()).into();
        assert_eq!(app.error_code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Unbalanced {
            debit: dec!(100.00),
            credit: dec!(80.00),
        };
        assert_eq!(err.to_string(), "Entry is not balanced. Debit: 100.00, Credit: 80.00");
    }
}
