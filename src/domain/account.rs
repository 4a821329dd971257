//! Account entity
//!
//! Balance-bearing records. The storage backend owns their durable state;
//! these types only carry values across the service boundary.

use rust_decimal::Decimal;

/// Account identifier. Always positive once validated.
pub type AccountId = i64;

/// An account and its current balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub balance: Decimal,
}

impl Account {
    pub fn new(id: AccountId, balance: Decimal) -> Self {
        Self { id, balance }
    }
}

/// A completed movement of funds, appended once per successful transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub source_id: AccountId,
    pub destination_id: AccountId,
    pub amount: Decimal,
}

impl TransferRecord {
    pub fn new(source_id: AccountId, destination_id: AccountId, amount: Decimal) -> Self {
        Self {
            source_id,
            destination_id,
            amount,
        }
    }

    /// The two account ids in ascending order.
    ///
    /// Row locks are always taken in this order so that two transfers touching
    /// the same pair of accounts cannot wait on each other.
    pub fn lock_order(&self) -> (AccountId, AccountId) {
        if self.source_id <= self.destination_id {
            (self.source_id, self.destination_id)
        } else {
            (self.destination_id, self.source_id)
        }
    }
}
