//! PostgreSQL storage backend
//!
//! Row locks come from `SELECT ... FOR UPDATE` inside a `sqlx` transaction.
//! A `sqlx::Transaction` that is dropped before commit is rolled back when
//! its connection returns to the pool, which gives [`PgUnitOfWork`] its
//! rollback-on-drop guarantee.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{AccountId, TransferRecord};

use super::{AccountStore, StorageError, StorageResult, UnitOfWork};

/// Account store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Create a new PgAccountStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    type Tx = PgUnitOfWork;

    async fn begin(&self) -> StorageResult<PgUnitOfWork> {
        let tx = self.pool.begin().await?;
        Ok(PgUnitOfWork { tx })
    }

    async fn create_account(&self, id: AccountId, balance: Decimal) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (account_id, balance)
            VALUES ($1, $2)
            "#,
        )
        .bind(id)
        .bind(balance)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn balance(&self, id: AccountId) -> StorageResult<Option<Decimal>> {
        let balance: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT balance FROM accounts WHERE account_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(balance)
    }
}

/// Unit of work over a single PostgreSQL transaction
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_balance(&mut self, id: AccountId) -> StorageResult<Option<Decimal>> {
        let balance: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT balance FROM accounts WHERE account_id = $1 FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(balance)
    }

    async fn adjust_balance(&mut self, id: AccountId, delta: Decimal) -> StorageResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance + $1, updated_at = NOW()
            WHERE account_id = $2
            "#,
        )
        .bind(delta)
        .bind(id)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(StorageError::NotFound(id));
        }

        Ok(())
    }

    async fn record_transfer(&mut self, transfer: &TransferRecord) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (source_account_id, destination_account_id, amount)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(transfer.source_id)
        .bind(transfer.destination_id)
        .bind(transfer.amount)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self) -> StorageResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> StorageResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
