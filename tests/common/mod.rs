//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use rand::Rng;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use internal_transfers::storage::InMemoryAccountStore;
use internal_transfers::{api, AccountId, LedgerService};

/// Connect to DATABASE_URL and apply migrations
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    internal_transfers::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Base for a block of account ids no other test run is using.
///
/// Tests share one database without truncation, so each picks its own range.
pub fn unique_id_base() -> AccountId {
    rand::thread_rng().gen_range(1..1_000_000_000i64) * 1_000
}

/// Router over a fresh in-memory store
pub fn memory_app() -> (Router, InMemoryAccountStore) {
    let store = InMemoryAccountStore::new();
    let ledger = Arc::new(LedgerService::new(store.clone()));
    (api::build_router(ledger), store)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
