//! Domain module
//!
//! Core ledger types, validation rules and the error taxonomy.

pub mod account;
pub mod context;
pub mod error;
pub mod validation;

pub use account::{Account, AccountId, TransferRecord};
pub use context::OperationContext;
pub use error::{ErrorKind, LedgerError, LedgerResult};
