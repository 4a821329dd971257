//! Validation rules
//!
//! Pure checks run before any storage interaction. None of them perform I/O
//! or mutate their inputs.

use rust_decimal::Decimal;

use super::{AccountId, LedgerError};

/// Maximum decimal places for balances and amounts (8)
pub const MAX_SCALE: u32 = 8;

/// Account ids must be strictly positive.
pub fn validate_account_id(id: AccountId) -> Result<(), LedgerError> {
    if id <= 0 {
        return Err(LedgerError::AccountIdMustBePositive);
    }
    Ok(())
}

/// At most [`MAX_SCALE`] fractional digits.
///
/// Trailing zeros count: `"1.123456780"` carries nine digits and is rejected.
pub fn validate_scale(value: &Decimal) -> Result<(), LedgerError> {
    if value.scale() > MAX_SCALE {
        return Err(LedgerError::PrecisionTooHigh);
    }
    Ok(())
}

/// Initial balances may be zero but never negative.
pub fn validate_non_negative(balance: &Decimal) -> Result<(), LedgerError> {
    if *balance < Decimal::ZERO {
        return Err(LedgerError::BalanceMustBeNonNegative);
    }
    Ok(())
}

/// Transfer amounts must be strictly positive.
pub fn validate_positive(amount: &Decimal) -> Result<(), LedgerError> {
    if *amount <= Decimal::ZERO {
        return Err(LedgerError::AmountMustBePositive);
    }
    Ok(())
}

pub fn validate_distinct_accounts(
    source: AccountId,
    destination: AccountId,
) -> Result<(), LedgerError> {
    if source == destination {
        return Err(LedgerError::SourceAndDestinationMustDiffer);
    }
    Ok(())
}
