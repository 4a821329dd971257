//! internal_transfers Library
//!
//! Account ledger with atomic, row-locked transfers. Re-exports modules for
//! the server binary, the load test and integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod service;
pub mod storage;

pub use config::{Config, ConfigError, StorageBackend};
pub use domain::{Account, AccountId, ErrorKind, LedgerError, LedgerResult, OperationContext};
pub use error::{AppError, AppResult};
pub use service::LedgerService;
pub use storage::{AccountStore, InMemoryAccountStore, PgAccountStore, UnitOfWork};
