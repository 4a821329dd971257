//! API Routes
//!
//! HTTP endpoint definitions.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, LedgerError};
use crate::error::{AppError, AppResult};
use crate::service::LedgerService;
use crate::storage::AccountStore;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateAccountRequest {
    pub account_id: AccountId,
    pub initial_balance: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AccountResponse {
    pub account_id: AccountId,
    pub balance: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TransactionRequest {
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: String,
}

/// Shared router state
pub type AppState<S> = Arc<LedgerService<S>>;

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router<S: AccountStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/accounts", post(create_account::<S>))
        .route("/accounts/:account_id", get(get_account::<S>))
        .route("/transactions", post(submit_transaction::<S>))
}

// =========================================================================
// POST /accounts
// =========================================================================

async fn create_account<S: AccountStore>(
    State(ledger): State<AppState<S>>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(request) = payload.map_err(invalid_body)?;
    let initial_balance = parse_decimal(&request.initial_balance, "invalid initial balance")?;

    ledger
        .create_account(request.account_id, initial_balance)
        .await?;

    Ok(StatusCode::CREATED)
}

// =========================================================================
// GET /accounts/:account_id
// =========================================================================

async fn get_account<S: AccountStore>(
    State(ledger): State<AppState<S>>,
    account_id: Result<Path<AccountId>, PathRejection>,
) -> AppResult<Json<AccountResponse>> {
    let Path(account_id) =
        account_id.map_err(|_| AppError::InvalidRequest("invalid account id".to_string()))?;

    let account = ledger.get_account(account_id).await?;

    Ok(Json(AccountResponse {
        account_id: account.id,
        balance: account.balance.to_string(),
    }))
}

// =========================================================================
// POST /transactions
// =========================================================================

async fn submit_transaction<S: AccountStore>(
    State(ledger): State<AppState<S>>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Json(request) = payload.map_err(invalid_body)?;
    let amount = parse_decimal(&request.amount, "invalid amount")?;

    ledger
        .transfer(
            request.source_account_id,
            request.destination_account_id,
            amount,
        )
        .await?;

    Ok(StatusCode::OK)
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    AppError::InvalidRequest(format!("invalid request body: {}", rejection.body_text()))
}

/// Parse a decimal string exactly as written, keeping its scale.
///
/// Inputs that cannot be held without rounding fail with
/// [`LedgerError::PrecisionTooHigh`] instead of being silently rounded.
fn parse_decimal(value: &str, message: &str) -> AppResult<Decimal> {
    Decimal::from_str_exact(value.trim()).map_err(|e| match e {
        rust_decimal::Error::Underflow => AppError::Ledger(LedgerError::PrecisionTooHigh),
        _ => AppError::InvalidRequest(message.to_string()),
    })
}
