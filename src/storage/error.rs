//! Storage Errors
//!
//! Backend-agnostic error types for storage operations. Backend error codes
//! are translated here and never reach the service layer.

use crate::domain::AccountId;

/// Errors that can occur in the storage layer
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Row targeted by a write does not exist
    #[error("Account {0} does not exist")]
    NotFound(AccountId),

    /// A unique constraint rejected an insert
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A check or foreign key constraint rejected a write
    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    /// Backend cannot serve the request
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Any other database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StorageError::UniqueViolation(_))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StorageError::UniqueViolation(db_err.message().to_string());
            }
            if db_err.is_check_violation() || db_err.is_foreign_key_violation() {
                return StorageError::ConstraintViolation(db_err.message().to_string());
            }
        }
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StorageError::Unavailable(err.to_string())
            }
            other => StorageError::Database(other),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
