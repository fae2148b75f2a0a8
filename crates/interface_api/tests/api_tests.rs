//! HTTP API integration tests
//!
//! Drives the full router (auth middleware included) against the scripted
//! gateway, covering the end-to-end payment scenarios: card initialization,
//! mobile money settlement via webhook, and webhook authenticity failures.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use core_kernel::UserId;
use domain_payments::GatewayStatus;
use interface_api::{auth, config::ApiConfig, create_router, AppState};
use test_utils::fixtures::{
    charge_failed_event, charge_success_event, customers, TEST_GATEWAY_SECRET,
};
use test_utils::MockGateway;

const JWT_SECRET: &str = "test-jwt-secret";

fn test_config() -> ApiConfig {
    ApiConfig {
        jwt_secret: JWT_SECRET.to_string(),
        paystack_secret_key: TEST_GATEWAY_SECRET.to_string(),
        ..ApiConfig::default()
    }
}

fn harness() -> (TestServer, AppState, Arc<MockGateway>) {
    let gateway = Arc::new(MockGateway::new(TEST_GATEWAY_SECRET));
    let state = AppState::with_gateway(test_config(), gateway.clone());
    let server = TestServer::new(create_router(state.clone())).expect("router builds");
    (server, state, gateway)
}

fn bearer_token() -> String {
    auth::create_token(&UserId::new(), JWT_SECRET, 3600).expect("token signs")
}

fn authorization(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {token}")).expect("header value"),
    )
}

fn signature_header(signature: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-paystack-signature"),
        HeaderValue::from_str(signature).expect("header value"),
    )
}

fn amount_of(value: &Value) -> Decimal {
    serde_json::from_value(value.clone()).expect("decimal amount")
}

// ============================================================================
// Health and auth
// ============================================================================

#[tokio::test]
async fn test_health_endpoints_are_public() {
    let (server, _, _) = harness();
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server.get("/health/ready").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "ready");
}

#[tokio::test]
async fn test_payment_routes_require_bearer_token() {
    let (server, _, _) = harness();
    let response = server.get("/api/v1/payments/stats").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server
        .post("/api/v1/payments/initialize")
        .json(&json!({"amount": 10, "email": customers::EMAIL, "payment_method": "card"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Scenario 1: card initialization
// ============================================================================

#[tokio::test]
async fn test_initialize_card_payment() {
    let (server, _, _) = harness();
    let (name, value) = authorization(&bearer_token());

    let response = server
        .post("/api/v1/payments/initialize")
        .add_header(name, value)
        .json(&json!({
            "amount": 100.00,
            "email": customers::EMAIL,
            "payment_method": "card",
            "callback_url": "https://app.example.com/payment/callback"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "success");

    let data = &body["data"];
    let reference = data["reference"].as_str().expect("reference");
    assert!(reference.starts_with("SIKA_"));
    assert_eq!(reference.len(), "SIKA_".len() + 16);
    assert!(data["authorization_url"]
        .as_str()
        .expect("authorization_url")
        .contains(reference));
    assert!(data["access_code"].as_str().is_some());

    // The payment was recorded PENDING
    let (name, value) = authorization(&bearer_token());
    let response = server
        .get(&format!("/api/v1/payments/{reference}"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let payment = response.json::<Value>();
    assert_eq!(payment["status"], "pending");
    assert_eq!(amount_of(&payment["amount"]), dec!(100.00));
    assert_eq!(payment["currency"], "GHS");
}

#[tokio::test]
async fn test_initialize_rejects_bad_input() {
    let (server, _, _) = harness();

    // Non-positive amount
    let (name, value) = authorization(&bearer_token());
    let response = server
        .post("/api/v1/payments/initialize")
        .add_header(name, value)
        .json(&json!({"amount": -5, "email": customers::EMAIL, "payment_method": "card"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Invalid email
    let (name, value) = authorization(&bearer_token());
    let response = server
        .post("/api/v1/payments/initialize")
        .add_header(name, value)
        .json(&json!({"amount": 10, "email": "not-an-email", "payment_method": "card"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_initialize_when_gateway_is_down_returns_503_and_keeps_pending() {
    let (server, state, gateway) = harness();
    gateway.set_unavailable(true);

    let (name, value) = authorization(&bearer_token());
    let response = server
        .post("/api/v1/payments/initialize")
        .add_header(name, value)
        .json(&json!({"amount": 30, "email": customers::EMAIL, "payment_method": "card"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(gateway.initialize_calls(), 1);

    let payments = state.ledger.list().await;
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status.code(), "pending");
}

// ============================================================================
// Scenario 2: mobile money settled by webhook, collection credited once
// ============================================================================

#[tokio::test]
async fn test_mobile_money_settles_via_webhook_and_credits_collection() {
    let (server, _, gateway) = harness();

    // Create the collection the payment contributes to
    let (name, value) = authorization(&bearer_token());
    let response = server
        .post("/api/v1/collections")
        .add_header(name, value)
        .json(&json!({"title": "Village clinic roof", "target_amount": 5000}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let collection = response.json::<Value>();
    let collection_id = collection["id"].as_str().expect("collection id").to_string();
    assert_eq!(amount_of(&collection["current_amount"]), dec!(0));

    // Submit the mobile money payment
    let (name, value) = authorization(&bearer_token());
    let response = server
        .post("/api/v1/payments/mobile-money")
        .add_header(name, value)
        .json(&json!({
            "amount": 50.00,
            "phone": customers::PHONE,
            "provider": "mtn",
            "email": customers::EMAIL,
            "name": customers::NAME,
            "collection_id": collection_id
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["status"], "processing");
    let reference: core_kernel::PaymentReference = body["data"]["reference"]
        .as_str()
        .expect("reference")
        .parse()
        .expect("well-formed reference");
    assert!(reference.as_str().starts_with("SIKA_MOMO_"));

    // Gateway confirms via webhook
    let event = charge_success_event(&reference);
    let signature = gateway.sign(&event);
    let (name, value) = signature_header(&signature);
    let response = server
        .post("/api/v1/payments/webhook")
        .add_header(name, value)
        .bytes(event.clone().into())
        .content_type("application/json")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "success");

    // Payment settled
    let (name, value) = authorization(&bearer_token());
    let response = server
        .get(&format!("/api/v1/payments/{}", reference.as_str()))
        .add_header(name, value)
        .await;
    let payment = response.json::<Value>();
    assert_eq!(payment["status"], "success");
    assert!(payment["processed_at"].as_str().is_some());

    // Collection credited by exactly 50.00
    let (name, value) = authorization(&bearer_token());
    let response = server
        .get(&format!("/api/v1/collections/{collection_id}"))
        .add_header(name, value)
        .await;
    assert_eq!(
        amount_of(&response.json::<Value>()["current_amount"]),
        dec!(50.00)
    );

    // Redelivery acknowledges but changes nothing
    let (name, value) = signature_header(&signature);
    let response = server
        .post("/api/v1/payments/webhook")
        .add_header(name, value)
        .bytes(event.into())
        .content_type("application/json")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let (name, value) = authorization(&bearer_token());
    let response = server
        .get(&format!("/api/v1/collections/{collection_id}"))
        .add_header(name, value)
        .await;
    assert_eq!(
        amount_of(&response.json::<Value>()["current_amount"]),
        dec!(50.00)
    );
}

#[tokio::test]
async fn test_declined_charge_fails_the_payment() {
    let (server, state, gateway) = harness();
    gateway.set_decline_charges(true);

    let (name, value) = authorization(&bearer_token());
    let response = server
        .post("/api/v1/payments/mobile-money")
        .add_header(name, value)
        .json(&json!({
            "amount": 15.00,
            "phone": customers::PHONE,
            "provider": "airteltigo",
            "email": customers::EMAIL,
            "name": customers::NAME
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(gateway.charge_calls(), 1);

    let payments = state.ledger.list().await;
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status.code(), "failed");
    assert!(payments[0].processed_at.is_some());
}

// ============================================================================
// Scenario 3: invalid webhook signature
// ============================================================================

#[tokio::test]
async fn test_webhook_with_invalid_signature_is_rejected() {
    let (server, state, _) = harness();

    // A processing payment the forged webhook targets
    let (name, value) = authorization(&bearer_token());
    let response = server
        .post("/api/v1/payments/mobile-money")
        .add_header(name, value)
        .json(&json!({
            "amount": 20.00,
            "phone": customers::PHONE,
            "provider": "vodafone",
            "email": customers::EMAIL,
            "name": customers::NAME
        }))
        .await;
    let reference: core_kernel::PaymentReference = response.json::<Value>()["data"]["reference"]
        .as_str()
        .expect("reference")
        .parse()
        .expect("well-formed reference");

    let event = charge_success_event(&reference);
    let (name, value) = signature_header("00ff00ff");
    let response = server
        .post("/api/v1/payments/webhook")
        .add_header(name, value)
        .bytes(event.into())
        .content_type("application/json")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "invalid_signature");

    // Status unchanged, audit entry recorded
    let payment = state.ledger.get(&reference).await.expect("payment exists");
    assert_eq!(payment.status.code(), "processing");
    let logs = state.ledger.logs(&reference).await.expect("logs exist");
    assert!(logs.iter().any(|l| matches!(
        l.condition,
        Some(domain_payments::AuditCondition::InvalidSignature)
    )));
}

#[tokio::test]
async fn test_webhook_without_signature_is_rejected() {
    let (server, _, _) = harness();
    let response = server
        .post("/api/v1/payments/webhook")
        .bytes(br#"{"event":"charge.success","data":{"reference":"SIKA_0123456789ABCDEF"}}"#.to_vec().into())
        .content_type("application/json")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Verify-poll and stats
// ============================================================================

#[tokio::test]
async fn test_verify_reconciles_against_gateway() {
    let (server, _, gateway) = harness();

    let (name, value) = authorization(&bearer_token());
    let response = server
        .post("/api/v1/payments/mobile-money")
        .add_header(name, value)
        .json(&json!({
            "amount": 75.50,
            "phone": customers::PHONE,
            "provider": "mtn",
            "email": customers::EMAIL,
            "name": customers::NAME
        }))
        .await;
    let reference = response.json::<Value>()["data"]["reference"]
        .as_str()
        .expect("reference")
        .to_string();

    gateway.queue_verify_status(GatewayStatus::Success).await;

    let (name, value) = authorization(&bearer_token());
    let response = server
        .get(&format!("/api/v1/payments/verify/{reference}"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["status"], "success");
    assert_eq!(amount_of(&body["data"]["amount"]), dec!(75.50));
    assert!(body["data"]["processed_at"].as_str().is_some());
}

#[tokio::test]
async fn test_verify_unknown_reference_is_404() {
    let (server, _, _) = harness();
    let (name, value) = authorization(&bearer_token());
    let response = server
        .get("/api/v1/payments/verify/SIKA_FFFFFFFFFFFFFFFF")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_aggregate_the_ledger() {
    let (server, _, gateway) = harness();

    // Two payments; one settles successfully
    for _ in 0..2 {
        let (name, value) = authorization(&bearer_token());
        server
            .post("/api/v1/payments/mobile-money")
            .add_header(name, value)
            .json(&json!({
                "amount": 40.00,
                "phone": customers::PHONE,
                "provider": "mtn",
                "email": customers::EMAIL,
                "name": customers::NAME
            }))
            .await;
    }

    let (name, value) = authorization(&bearer_token());
    let response = server
        .get("/api/v1/payments")
        .add_header(name, value)
        .await;
    let payments = response.json::<Value>();
    let first: core_kernel::PaymentReference = payments[0]["reference"]
        .as_str()
        .expect("reference")
        .parse()
        .expect("well-formed reference");
    let second: core_kernel::PaymentReference = payments[1]["reference"]
        .as_str()
        .expect("reference")
        .parse()
        .expect("well-formed reference");

    // One settles, one fails
    for event in [charge_success_event(&first), charge_failed_event(&second)] {
        let signature = gateway.sign(&event);
        let (name, value) = signature_header(&signature);
        server
            .post("/api/v1/payments/webhook")
            .add_header(name, value)
            .bytes(event.into())
            .content_type("application/json")
            .await;
    }

    let (name, value) = authorization(&bearer_token());
    let response = server
        .get("/api/v1/payments/stats")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let stats = response.json::<Value>();
    assert_eq!(stats["total_payments"], 2);
    assert_eq!(stats["successful_payments"], 1);
    assert_eq!(stats["failed_payments"], 1);
    assert_eq!(amount_of(&stats["total_revenue"]), dec!(40.00));
    assert_eq!(stats["success_rate"], 50.0);
}
