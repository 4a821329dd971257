//! Storage port
//!
//! Traits the ledger service is written against. A plain read and a locked
//! read are separate operations on separate types, so a caller states by
//! construction whether it is inside a unit of work.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{AccountId, TransferRecord};

use super::StorageResult;

/// Shared handle to the account store.
#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    /// Unit of work opened by [`AccountStore::begin`].
    type Tx: UnitOfWork + 'static;

    /// Open a unit of work.
    async fn begin(&self) -> StorageResult<Self::Tx>;

    /// Insert a new account row.
    ///
    /// A duplicate id fails with [`super::StorageError::UniqueViolation`].
    async fn create_account(&self, id: AccountId, balance: Decimal) -> StorageResult<()>;

    /// Read a balance without taking any lock.
    async fn balance(&self, id: AccountId) -> StorageResult<Option<Decimal>>;
}

/// Exclusively owned unit of work.
///
/// Terminal operations consume the handle. Dropping it without calling
/// [`UnitOfWork::commit`] rolls back every change made through it and
/// releases its row locks.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Read a balance and hold an exclusive lock on the row until this unit
    /// of work ends. Returns `None` when the row does not exist.
    async fn lock_balance(&mut self, id: AccountId) -> StorageResult<Option<Decimal>>;

    /// Add a signed delta to a balance.
    async fn adjust_balance(&mut self, id: AccountId, delta: Decimal) -> StorageResult<()>;

    /// Append a completed transfer to the transaction log.
    async fn record_transfer(&mut self, transfer: &TransferRecord) -> StorageResult<()>;

    async fn commit(self) -> StorageResult<()>;

    async fn rollback(self) -> StorageResult<()>;
}
