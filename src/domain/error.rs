//! Ledger Error Types
//!
//! The closed set of outcomes a ledger operation can fail with.

use thiserror::Error;

use crate::storage::StorageError;

/// Ledger operation errors
///
/// Every failure the service reports is one of these variants. Storage
/// failures that are not reclassified into a domain outcome travel inside
/// [`LedgerError::Internal`].
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("account id must be a positive number")]
    AccountIdMustBePositive,

    #[error("balance must be non-negative")]
    BalanceMustBeNonNegative,

    #[error("amount must be positive")]
    AmountMustBePositive,

    #[error("precision must be 8 or fewer decimal places")]
    PrecisionTooHigh,

    #[error("source and destination accounts must be different")]
    SourceAndDestinationMustDiffer,

    #[error("account not found")]
    AccountNotFound,

    #[error("source account not found")]
    SourceAccountNotFound,

    #[error("destination account not found")]
    DestinationAccountNotFound,

    #[error("account id already exists")]
    AccountIdAlreadyExists,

    #[error("insufficient funds")]
    InsufficientFunds,

    /// Unclassified storage/backend failure
    #[error("internal error: {0}")]
    Internal(#[from] StorageError),
}

/// Coarse classification used by callers to pick a response or retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    InsufficientFunds,
    Internal,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountIdMustBePositive
            | Self::BalanceMustBeNonNegative
            | Self::AmountMustBePositive
            | Self::PrecisionTooHigh
            | Self::SourceAndDestinationMustDiffer => ErrorKind::Validation,
            Self::AccountNotFound
            | Self::SourceAccountNotFound
            | Self::DestinationAccountNotFound => ErrorKind::NotFound,
            Self::AccountIdAlreadyExists => ErrorKind::Conflict,
            Self::InsufficientFunds => ErrorKind::InsufficientFunds,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code, e.g. `"insufficient_funds"`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccountIdMustBePositive => "account_id_must_be_positive",
            Self::BalanceMustBeNonNegative => "balance_must_be_non_negative",
            Self::AmountMustBePositive => "amount_must_be_positive",
            Self::PrecisionTooHigh => "precision_too_high",
            Self::SourceAndDestinationMustDiffer => "source_and_destination_must_differ",
            Self::AccountNotFound => "account_not_found",
            Self::SourceAccountNotFound => "source_account_not_found",
            Self::DestinationAccountNotFound => "destination_account_not_found",
            Self::AccountIdAlreadyExists => "account_id_already_exists",
            Self::InsufficientFunds => "insufficient_funds",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
