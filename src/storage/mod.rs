//! Storage module
//!
//! The storage port used by the ledger service and its backends.
//! PostgreSQL is the production backend; the in-memory backend keeps the same
//! locking and rollback contract for tests and local runs.

mod error;
pub mod memory;
mod port;
pub mod postgres;

pub use error::{StorageError, StorageResult};
pub use memory::{FailPoint, InMemoryAccountStore, InMemoryUnitOfWork};
pub use port::{AccountStore, UnitOfWork};
pub use postgres::{PgAccountStore, PgUnitOfWork};
