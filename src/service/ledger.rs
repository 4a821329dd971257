//! Ledger Service
//!
//! Creates accounts, reads balances and moves funds between accounts.
//! The service holds no balances of its own; every operation goes to the
//! store, and all cross-request coordination is left to the store's row locks.

use rust_decimal::Decimal;

use crate::domain::validation::{
    validate_account_id, validate_distinct_accounts, validate_non_negative, validate_positive,
    validate_scale,
};
use crate::domain::{Account, AccountId, LedgerError, LedgerResult, TransferRecord};
use crate::storage::{AccountStore, StorageError, UnitOfWork};

/// Ledger operations over an [`AccountStore`]
#[derive(Debug, Clone)]
pub struct LedgerService<S> {
    store: S,
}

impl<S: AccountStore> LedgerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // CreateAccount
    // =========================================================================

    /// Create an account holding `initial_balance`.
    ///
    /// Either the row exists afterwards with exactly that balance, or the call
    /// fails and nothing was written.
    pub async fn create_account(&self, id: AccountId, initial_balance: Decimal) -> LedgerResult<()> {
        if let Err(err) = validate_account_id(id)
            .and_then(|_| validate_non_negative(&initial_balance))
            .and_then(|_| validate_scale(&initial_balance))
        {
            tracing::warn!(account_id = id, balance = %initial_balance, "CreateAccount rejected: {}", err);
            return Err(err);
        }

        match self.store.create_account(id, initial_balance).await {
            Ok(()) => {
                tracing::info!(account_id = id, balance = %initial_balance, "Account created");
                Ok(())
            }
            Err(StorageError::UniqueViolation(_)) => {
                tracing::info!(account_id = id, "CreateAccount duplicate account id");
                Err(LedgerError::AccountIdAlreadyExists)
            }
            Err(e) => {
                tracing::error!(account_id = id, "CreateAccount storage error: {}", e);
                Err(LedgerError::Internal(e))
            }
        }
    }

    // =========================================================================
    // GetAccount
    // =========================================================================

    /// Read an account's current balance without locking.
    pub async fn get_account(&self, id: AccountId) -> LedgerResult<Account> {
        if let Err(err) = validate_account_id(id) {
            tracing::warn!(account_id = id, "GetAccount rejected: {}", err);
            return Err(err);
        }

        let balance = self.store.balance(id).await.map_err(|e| {
            tracing::error!(account_id = id, "GetAccount storage error: {}", e);
            LedgerError::Internal(e)
        })?;

        balance
            .map(|balance| Account::new(id, balance))
            .ok_or(LedgerError::AccountNotFound)
    }

    // =========================================================================
    // Transfer
    // =========================================================================

    /// Move `amount` from `source_id` to `destination_id` atomically.
    ///
    /// Both balances change in one unit of work or neither does. The unit of
    /// work is committed once on success and rolled back on every other exit;
    /// a panic between begin and commit rolls back when the handle is dropped.
    pub async fn transfer(
        &self,
        source_id: AccountId,
        destination_id: AccountId,
        amount: Decimal,
    ) -> LedgerResult<()> {
        if let Err(err) = validate_transfer(source_id, destination_id, &amount) {
            tracing::warn!(
                source_id,
                destination_id,
                amount = %amount,
                "Transfer rejected: {}",
                err
            );
            return Err(err);
        }

        let transfer = TransferRecord::new(source_id, destination_id, amount);

        let mut uow = self.store.begin().await.map_err(|e| {
            tracing::error!("Transfer failed to begin unit of work: {}", e);
            LedgerError::Internal(e)
        })?;

        if let Err(err) = apply_transfer(&mut uow, &transfer).await {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::error!("Transfer rollback failed: {}", rollback_err);
            }
            log_transfer_failure(&transfer, &err);
            return Err(err);
        }

        uow.commit().await.map_err(|e| {
            tracing::error!(source_id, destination_id, "Transfer commit failed: {}", e);
            LedgerError::Internal(e)
        })?;

        tracing::info!(
            source_id,
            destination_id,
            amount = %amount,
            "Transfer successful"
        );
        Ok(())
    }
}

fn validate_transfer(
    source_id: AccountId,
    destination_id: AccountId,
    amount: &Decimal,
) -> LedgerResult<()> {
    validate_account_id(source_id)?;
    validate_account_id(destination_id)?;
    validate_distinct_accounts(source_id, destination_id)?;
    validate_positive(amount)?;
    validate_scale(amount)
}

/// Lock both rows, check them, and stage the two balance changes.
///
/// Rows are locked in ascending id order; the checks then run in the
/// source-first order callers observe: source existence, sufficiency,
/// destination existence.
async fn apply_transfer<U: UnitOfWork>(uow: &mut U, transfer: &TransferRecord) -> LedgerResult<()> {
    let (first, second) = transfer.lock_order();
    let first_balance = uow.lock_balance(first).await?;
    let second_balance = uow.lock_balance(second).await?;

    let (source_balance, destination_balance) = if first == transfer.source_id {
        (first_balance, second_balance)
    } else {
        (second_balance, first_balance)
    };

    let source_balance = source_balance.ok_or(LedgerError::SourceAccountNotFound)?;
    if source_balance < transfer.amount {
        return Err(LedgerError::InsufficientFunds);
    }
    destination_balance.ok_or(LedgerError::DestinationAccountNotFound)?;

    uow.adjust_balance(transfer.source_id, -transfer.amount).await?;
    uow.adjust_balance(transfer.destination_id, transfer.amount)
        .await?;
    uow.record_transfer(transfer).await?;

    Ok(())
}

fn log_transfer_failure(transfer: &TransferRecord, err: &LedgerError) {
    let TransferRecord {
        source_id,
        destination_id,
        amount,
    } = transfer;

    match err {
        LedgerError::Internal(e) => tracing::error!(
            source_id,
            destination_id,
            "Transfer error, unit of work rolled back: {}",
            e
        ),
        LedgerError::InsufficientFunds => tracing::warn!(
            source_id,
            destination_id,
            amount = %amount,
            "Transfer insufficient funds"
        ),
        other => tracing::warn!(
            source_id,
            destination_id,
            "Transfer failed, unit of work rolled back: {}",
            other
        ),
    }
}
