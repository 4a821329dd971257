//! API Integration Tests
//!
//! Drives the full router (middleware included) over the in-memory store.

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;
use tower::util::ServiceExt;

use internal_transfers::storage::FailPoint;

mod common;

use common::{body_json, get_request, json_request, memory_app};

#[tokio::test]
async fn test_health() {
    let (app, _) = memory_app();

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_and_get_account_keeps_scale() {
    let (app, _) = memory_app();

    let req = json_request(
        "POST",
        "/accounts",
        json!({ "account_id": 123, "initial_balance": "100.50" }),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get_request("/accounts/123")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["account_id"], 123);
    assert_eq!(body["balance"], "100.50");
}

#[tokio::test]
async fn test_create_account_invalid_json() {
    let (app, _) = memory_app();

    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/accounts")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("not-json"))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error_code"], "invalid_request");
    assert!(body["error"].as_str().unwrap().contains("invalid request body"));
}

#[tokio::test]
async fn test_create_account_invalid_initial_balance() {
    let (app, store) = memory_app();

    let req = json_request(
        "POST",
        "/accounts",
        json!({ "account_id": 1, "initial_balance": "not-a-number" }),
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("invalid initial balance"));
    assert_eq!(store.total_balance().await, dec!(0));
}

#[tokio::test]
async fn test_create_account_validation_errors() {
    let (app, _) = memory_app();

    let cases = [
        (json!({ "account_id": 0, "initial_balance": "1" }), "account_id_must_be_positive"),
        (json!({ "account_id": 1, "initial_balance": "-1" }), "balance_must_be_non_negative"),
        (
            json!({ "account_id": 1, "initial_balance": "1.123456789" }),
            "precision_too_high",
        ),
    ];

    for (payload, code) in cases {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/accounts", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error_code"], code);
    }
}

#[tokio::test]
async fn test_create_account_conflict() {
    let (app, _) = memory_app();
    let payload = json!({ "account_id": 7, "initial_balance": "10" });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/accounts", payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/accounts", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error_code"],
        "account_id_already_exists"
    );
}

#[tokio::test]
async fn test_get_account_errors() {
    let (app, _) = memory_app();

    let response = app
        .clone()
        .oneshot(get_request("/accounts/abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid request: invalid account id");

    let response = app
        .clone()
        .oneshot(get_request("/accounts/999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error_code"], "account_not_found");

    let response = app.oneshot(get_request("/accounts/0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transfer_e2e() {
    let (app, store) = memory_app();

    for (id, balance) in [(1, "100.00"), (2, "50")] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/accounts",
                json!({ "account_id": id, "initial_balance": balance }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/transactions",
            json!({
                "source_account_id": 1,
                "destination_account_id": 2,
                "amount": "30.25"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let source = body_json(app.clone().oneshot(get_request("/accounts/1")).await.unwrap()).await;
    let destination = body_json(app.oneshot(get_request("/accounts/2")).await.unwrap()).await;

    assert_eq!(source["balance"], "69.75");
    assert_eq!(destination["balance"], "80.25");
    assert_eq!(store.transfers().await.len(), 1);
    assert_eq!(store.total_balance().await, dec!(150.00));
}

#[tokio::test]
async fn test_transfer_errors() {
    let (app, _) = memory_app();

    app.clone()
        .oneshot(json_request(
            "POST",
            "/accounts",
            json!({ "account_id": 1, "initial_balance": "10" }),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/accounts",
            json!({ "account_id": 2, "initial_balance": "0" }),
        ))
        .await
        .unwrap();

    let cases = [
        (1, 2, "10.01", StatusCode::BAD_REQUEST, "insufficient_funds"),
        (3, 2, "1", StatusCode::NOT_FOUND, "source_account_not_found"),
        (1, 3, "1", StatusCode::NOT_FOUND, "destination_account_not_found"),
        (1, 1, "1", StatusCode::BAD_REQUEST, "source_and_destination_must_differ"),
        (1, 2, "0", StatusCode::BAD_REQUEST, "amount_must_be_positive"),
        (1, 2, "abc", StatusCode::BAD_REQUEST, "invalid_request"),
    ];

    for (source, destination, amount, status, code) in cases {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/transactions",
                json!({
                    "source_account_id": source,
                    "destination_account_id": destination,
                    "amount": amount
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), status, "{} -> {} {}", source, destination, amount);
        assert_eq!(body_json(response).await["error_code"], code);
    }

    let source = body_json(app.oneshot(get_request("/accounts/1")).await.unwrap()).await;
    assert_eq!(source["balance"], "10");
}

#[tokio::test]
async fn test_storage_failure_hides_details() {
    let (app, store) = memory_app();
    store.fail_on(FailPoint::CreateAccount).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/accounts",
            json!({ "account_id": 5, "initial_balance": "1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "internal server error");
    assert_eq!(body["error_code"], "internal_error");
}

#[tokio::test]
async fn test_correlation_id_echoed() {
    let (app, _) = memory_app();
    let correlation_id = "0b6cb5a4-4f8e-4c43-9a3f-1d1f3d4c8b21";

    let req = axum::http::Request::builder()
        .uri("/health")
        .header("X-Correlation-Id", correlation_id)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(
        response.headers().get("x-correlation-id").unwrap(),
        correlation_id
    );

    // Malformed ids are replaced with a fresh one
    let req = axum::http::Request::builder()
        .uri("/health")
        .header("X-Correlation-Id", "not-a-uuid")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let echoed = response.headers().get("x-correlation-id").unwrap();
    assert!(uuid::Uuid::parse_str(echoed.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_create_account_rejects_unrepresentable_precision() {
    let (app, store) = memory_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/accounts",
            json!({
                "account_id": 11,
                "initial_balance": "12345678901234567890123456.123456789"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error_code"], "precision_too_high");

    let response = app.oneshot(get_request("/accounts/11")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.total_balance().await, dec!(0));
}

#[tokio::test]
async fn test_transfer_rejects_unrepresentable_precision() {
    let (app, store) = memory_app();

    for (id, balance) in [(1, "100"), (2, "0")] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/accounts",
                json!({ "account_id": id, "initial_balance": balance }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/transactions",
            json!({
                "source_account_id": 1,
                "destination_account_id": 2,
                "amount": "12345678901234567890123456.123456789"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error_code"], "precision_too_high");

    let source = body_json(app.clone().oneshot(get_request("/accounts/1")).await.unwrap()).await;
    let destination = body_json(app.oneshot(get_request("/accounts/2")).await.unwrap()).await;
    assert_eq!(source["balance"], "100");
    assert_eq!(destination["balance"], "0");
    assert!(store.transfers().await.is_empty());
}
