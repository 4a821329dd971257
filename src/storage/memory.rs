//! In-memory storage backend
//!
//! Each account row owns an async mutex that plays the role of the row lock:
//! a unit of work holds the guard from its first locked read or write until it
//! ends. Changes are staged inside the unit of work and only written to the
//! shared rows on commit, so dropping it is a rollback.
//!
//! Plain reads never touch the row lock, matching the non-blocking reads of
//! an MVCC database.
//!
//! Fail points let tests force storage failures (or panics) at a given step.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::{AccountId, TransferRecord};

use super::{AccountStore, StorageError, StorageResult, UnitOfWork};

/// Storage step at which a failure can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Begin,
    CreateAccount,
    Balance,
    LockBalance,
    AdjustBalance,
    RecordTransfer,
    Commit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureMode {
    Error,
    Panic,
}

#[derive(Debug)]
struct Row {
    lock: Arc<Mutex<()>>,
    balance: RwLock<Decimal>,
}

impl Row {
    fn new(balance: Decimal) -> Self {
        Self {
            lock: Arc::new(Mutex::new(())),
            balance: RwLock::new(balance),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    rows: RwLock<HashMap<AccountId, Arc<Row>>>,
    transfers: RwLock<Vec<TransferRecord>>,
    fail_points: Mutex<HashMap<FailPoint, FailureMode>>,
    open_units: AtomicUsize,
}

impl Inner {
    async fn check(&self, point: FailPoint) -> StorageResult<()> {
        let mode = self.fail_points.lock().await.get(&point).copied();
        match mode {
            None => Ok(()),
            Some(FailureMode::Error) => Err(StorageError::Unavailable(format!(
                "injected failure at {:?}",
                point
            ))),
            Some(FailureMode::Panic) => panic!("injected panic at {:?}", point),
        }
    }

    async fn row(&self, id: AccountId) -> Option<Arc<Row>> {
        self.rows.read().await.get(&id).cloned()
    }
}

/// Account store kept in process memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    inner: Arc<Inner>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call reaching `point` fail with [`StorageError::Unavailable`].
    pub async fn fail_on(&self, point: FailPoint) {
        self.inner
            .fail_points
            .lock()
            .await
            .insert(point, FailureMode::Error);
    }

    /// Make every call reaching `point` panic.
    pub async fn panic_on(&self, point: FailPoint) {
        self.inner
            .fail_points
            .lock()
            .await
            .insert(point, FailureMode::Panic);
    }

    pub async fn clear_failures(&self) {
        self.inner.fail_points.lock().await.clear();
    }

    /// Units of work that have been opened and not yet ended.
    pub fn open_units(&self) -> usize {
        self.inner.open_units.load(Ordering::SeqCst)
    }

    /// Committed transfer log, oldest first.
    pub async fn transfers(&self) -> Vec<TransferRecord> {
        self.inner.transfers.read().await.clone()
    }

    /// Sum of all committed balances.
    pub async fn total_balance(&self) -> Decimal {
        let rows: Vec<Arc<Row>> = self.inner.rows.read().await.values().cloned().collect();
        let mut total = Decimal::ZERO;
        for row in rows {
            total += *row.balance.read().await;
        }
        total
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    type Tx = InMemoryUnitOfWork;

    async fn begin(&self) -> StorageResult<InMemoryUnitOfWork> {
        self.inner.check(FailPoint::Begin).await?;
        self.inner.open_units.fetch_add(1, Ordering::SeqCst);

        Ok(InMemoryUnitOfWork {
            store: Arc::clone(&self.inner),
            held: HashMap::new(),
            transfers: Vec::new(),
        })
    }

    async fn create_account(&self, id: AccountId, balance: Decimal) -> StorageResult<()> {
        self.inner.check(FailPoint::CreateAccount).await?;

        if id <= 0 || balance < Decimal::ZERO {
            return Err(StorageError::ConstraintViolation(format!(
                "account {} with balance {} violates accounts checks",
                id, balance
            )));
        }

        match self.inner.rows.write().await.entry(id) {
            Entry::Occupied(_) => Err(StorageError::UniqueViolation(format!(
                "duplicate key value violates unique constraint \"accounts_pkey\" (account_id={})",
                id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Row::new(balance)));
                Ok(())
            }
        }
    }

    async fn balance(&self, id: AccountId) -> StorageResult<Option<Decimal>> {
        self.inner.check(FailPoint::Balance).await?;

        match self.inner.row(id).await {
            Some(row) => Ok(Some(*row.balance.read().await)),
            None => Ok(None),
        }
    }
}

struct HeldRow {
    row: Arc<Row>,
    pending: Decimal,
    _guard: OwnedMutexGuard<()>,
}

impl HeldRow {
    async fn current(&self) -> Decimal {
        *self.row.balance.read().await + self.pending
    }
}

/// Unit of work over [`InMemoryAccountStore`]
pub struct InMemoryUnitOfWork {
    store: Arc<Inner>,
    held: HashMap<AccountId, HeldRow>,
    transfers: Vec<TransferRecord>,
}

impl InMemoryUnitOfWork {
    /// Lock a row for the rest of this unit of work. Re-acquiring a row this
    /// unit of work already holds returns the existing hold.
    async fn acquire(&mut self, id: AccountId) -> Option<&mut HeldRow> {
        if !self.held.contains_key(&id) {
            let row = self.store.row(id).await?;
            let guard = Arc::clone(&row.lock).lock_owned().await;
            self.held.insert(
                id,
                HeldRow {
                    row,
                    pending: Decimal::ZERO,
                    _guard: guard,
                },
            );
        }
        self.held.get_mut(&id)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn lock_balance(&mut self, id: AccountId) -> StorageResult<Option<Decimal>> {
        self.store.check(FailPoint::LockBalance).await?;

        match self.acquire(id).await {
            Some(held) => Ok(Some(held.current().await)),
            None => Ok(None),
        }
    }

    async fn adjust_balance(&mut self, id: AccountId, delta: Decimal) -> StorageResult<()> {
        self.store.check(FailPoint::AdjustBalance).await?;

        let held = self.acquire(id).await.ok_or(StorageError::NotFound(id))?;
        let current = held.current().await;
        let next = current.checked_add(delta).ok_or_else(|| {
            StorageError::ConstraintViolation(format!("balance of account {} overflows", id))
        })?;
        if next < Decimal::ZERO {
            return Err(StorageError::ConstraintViolation(format!(
                "balance of account {} would become {}",
                id, next
            )));
        }

        held.pending += delta;
        Ok(())
    }

    async fn record_transfer(&mut self, transfer: &TransferRecord) -> StorageResult<()> {
        self.store.check(FailPoint::RecordTransfer).await?;

        for id in [transfer.source_id, transfer.destination_id] {
            if self.store.row(id).await.is_none() {
                return Err(StorageError::ConstraintViolation(format!(
                    "transactions reference missing account {}",
                    id
                )));
            }
        }

        self.transfers.push(transfer.clone());
        Ok(())
    }

    async fn commit(self) -> StorageResult<()> {
        let mut this = self;
        this.store.check(FailPoint::Commit).await?;

        // Take every write guard before touching any balance, so a commit
        // abandoned halfway leaves nothing applied.
        let mut writes = Vec::with_capacity(this.held.len());
        for held in this.held.values() {
            if !held.pending.is_zero() {
                writes.push((held.row.balance.write().await, held.pending));
            }
        }
        let mut log = this.store.transfers.write().await;

        for (mut balance, pending) in writes {
            *balance += pending;
        }
        log.append(&mut this.transfers);

        Ok(())
    }

    async fn rollback(self) -> StorageResult<()> {
        drop(self);
        Ok(())
    }
}

impl Drop for InMemoryUnitOfWork {
    fn drop(&mut self) {
        self.store.open_units.fetch_sub(1, Ordering::SeqCst);
    }
}
