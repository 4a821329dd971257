//! Service module
//!
//! The ledger service composes validation, the storage port and units of
//! work into the account and transfer operations.

mod ledger;


pub use ledger::LedgerService;
