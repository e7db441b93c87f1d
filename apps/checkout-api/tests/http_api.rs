//! End-to-end HTTP tests: the full router with a mock gateway and an
//! in-memory audit sink.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crest_audit::{AuditError, MemoryAuditSink, SecurityAuditSink};
use crest_core::{PriceCatalog, SecurityIncident};

use crest_checkout_api::config::ApiConfig;
use crest_checkout_api::gateway::MockGateway;
use crest_checkout_api::routes;
use crest_checkout_api::service::CheckoutService;
use crest_checkout_api::AppState;

// =============================================================================
// Harness
// =============================================================================

struct Harness {
    router: Router,
    gateway: Arc<MockGateway>,
    sink: Arc<MemoryAuditSink>,
}

fn harness() -> Harness {
    let gateway = Arc::new(MockGateway::new());
    let sink = Arc::new(MemoryAuditSink::new());
    let service = CheckoutService::new(
        Arc::new(PriceCatalog::builtin()),
        Arc::clone(&gateway) as Arc<dyn crest_checkout_api::gateway::PaymentGateway>,
        Arc::clone(&sink) as Arc<dyn SecurityAuditSink>,
        "http://localhost:3001",
    );
    let state = Arc::new(AppState {
        service,
        config: ApiConfig::load().expect("default config loads"),
    });
    Harness {
        router: routes::router(state),
        gateway,
        sink,
    }
}

async fn post_checkout(router: &Router, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/checkout/session")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Lets spawned audit writes run to completion on the test runtime.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// Accept Paths
// =============================================================================

#[tokio::test]
async fn plain_plan_checkout_succeeds() {
    let h = harness();

    let (status, body) = post_checkout(
        &h.router,
        json!({
            "amount": 49900,
            "currency": "INR",
            "planId": "monthly",
            "userId": "user-42"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["redirectUrl"].as_str().unwrap().starts_with("https://"));
    assert!(!body["sessionId"].as_str().unwrap().is_empty());

    // The gateway was charged the server-computed amount
    let sent = h.gateway.last_request().unwrap();
    assert_eq!(sent.amount_minor, 49900);
    assert_eq!(sent.metadata.get("userId").unwrap(), "user-42");
}

#[tokio::test]
async fn coupon_checkout_accepts_discounted_amount() {
    let h = harness();

    let (status, _) = post_checkout(
        &h.router,
        json!({
            "amount": 44910,
            "currency": "INR",
            "planId": "monthly",
            "couponCode": "SAVE10"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.gateway.last_request().unwrap().amount_minor, 44910);
}

#[tokio::test]
async fn unknown_coupon_is_ignored_not_fatal() {
    let h = harness();

    let (status, _) = post_checkout(
        &h.router,
        json!({
            "amount": 49900,
            "currency": "INR",
            "planId": "monthly",
            "couponCode": "FAKE50"
        }),
    )
    .await;

    // Full price is the expected amount, so the checkout goes through
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.gateway.last_request().unwrap().amount_minor, 49900);
}

// =============================================================================
// Reject Paths
// =============================================================================

#[tokio::test]
async fn underpaid_cart_is_rejected_and_audited() {
    let h = harness();

    let (status, body) = post_checkout(
        &h.router,
        json!({
            "amount": 19900,
            "currency": "INR",
            "planId": "basic",
            "addonIds": ["profile_slot"]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SECURITY_ERROR");
    assert_eq!(body["error"], "Invalid payment amount detected.");

    // The response must never leak the expected amount
    let raw = body.to_string();
    assert!(!raw.contains("expectedAmount"));
    assert!(!raw.contains("49800"));

    // No gateway call for a rejected amount
    assert_eq!(h.gateway.calls(), 0);

    // Exactly one incident, with the diagnostic pair
    settle().await;
    let incidents = h.sink.recorded();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].expected_amount, 49800);
    assert_eq!(incidents[0].provided_amount, 19900);
    assert_ne!(incidents[0].expected_amount, incidents[0].provided_amount);
}

#[tokio::test]
async fn unsupported_currency_is_rejected_before_everything() {
    let h = harness();

    let (status, body) = post_checkout(
        &h.router,
        json!({
            "amount": 49900,
            "currency": "XYZ",
            "planId": "monthly"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNSUPPORTED_CURRENCY");
    assert_eq!(h.gateway.calls(), 0);

    settle().await;
    assert!(h.sink.is_empty());
}

#[tokio::test]
async fn empty_selection_is_rejected() {
    let h = harness();

    let (status, body) = post_checkout(
        &h.router,
        json!({
            "amount": 49900,
            "currency": "INR"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "EMPTY_SELECTION");
    assert_eq!(h.gateway.calls(), 0);
}

#[tokio::test]
async fn missing_amount_is_invalid_input() {
    let h = harness();

    let (status, body) = post_checkout(
        &h.router,
        json!({
            "currency": "INR",
            "planId": "monthly"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn unknown_plan_id_is_invalid_input() {
    let h = harness();

    let (status, body) = post_checkout(
        &h.router,
        json!({
            "amount": 49900,
            "currency": "INR",
            "planId": "lifetime_platinum"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(h.gateway.calls(), 0);
}

// =============================================================================
// Audit Failure Semantics
// =============================================================================

/// A sink whose every write fails, for exercising the non-fatal rule.
#[derive(Debug, Default)]
struct FailingSink;

#[async_trait::async_trait]
impl SecurityAuditSink for FailingSink {
    async fn record(&self, _incident: &SecurityIncident) -> Result<(), AuditError> {
        Err(AuditError::WriteFailed("disk full".to_string()))
    }
}

#[tokio::test]
async fn audit_write_failure_never_blocks_the_rejection() {
    let gateway = Arc::new(MockGateway::new());
    let service = CheckoutService::new(
        Arc::new(PriceCatalog::builtin()),
        Arc::clone(&gateway) as Arc<dyn crest_checkout_api::gateway::PaymentGateway>,
        Arc::new(FailingSink),
        "http://localhost:3001",
    );
    let state = Arc::new(AppState {
        service,
        config: ApiConfig::load().unwrap(),
    });
    let router = routes::router(state);

    let (status, body) = post_checkout(
        &router,
        json!({
            "amount": 1,
            "currency": "INR",
            "planId": "monthly"
        }),
    )
    .await;

    // The reject decision is authoritative even though the write will fail
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "SECURITY_ERROR");
}

// =============================================================================
// Gateway Failure Semantics
// =============================================================================

#[tokio::test]
async fn gateway_failure_surfaces_as_500() {
    let gateway = Arc::new(MockGateway::failing());
    let sink = Arc::new(MemoryAuditSink::new());
    let service = CheckoutService::new(
        Arc::new(PriceCatalog::builtin()),
        Arc::clone(&gateway) as Arc<dyn crest_checkout_api::gateway::PaymentGateway>,
        Arc::clone(&sink) as Arc<dyn SecurityAuditSink>,
        "http://localhost:3001",
    );
    let state = Arc::new(AppState {
        service,
        config: ApiConfig::load().unwrap(),
    });
    let router = routes::router(state);

    let (status, body) = post_checkout(
        &router,
        json!({
            "amount": 49900,
            "currency": "INR",
            "planId": "monthly"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "GATEWAY_ERROR");
    // Exactly one attempt: the checkout layer never retries the gateway
    assert_eq!(gateway.calls(), 1);
}

// =============================================================================
// Pricing & Health
// =============================================================================

#[tokio::test]
async fn pricing_defaults_to_reference_currency() {
    let h = harness();

    let (status, body) = get_json(&h.router, "/pricing").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currency"], "INR");
    let monthly = body["plans"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == "monthly")
        .unwrap();
    assert_eq!(monthly["priceMinor"], 49900);
    assert_eq!(monthly["anchorMinor"], 69900);
}

#[tokio::test]
async fn pricing_applies_device_rules() {
    let h = harness();

    let (_, desktop) = get_json(&h.router, "/pricing?currency=USD").await;
    let (_, android) = get_json(&h.router, "/pricing?currency=USD&deviceClass=android").await;

    let price = |body: &Value, id: &str| {
        body["plans"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["id"] == id)
            .unwrap()["priceMinor"]
            .as_i64()
            .unwrap()
    };

    assert_eq!(price(&desktop, "oneDay"), 999);
    assert_eq!(price(&android, "oneDay"), 1399); // charged at basic's price
    assert_eq!(price(&android, "monthly"), price(&desktop, "monthly"));
}

#[tokio::test]
async fn pricing_rejects_unsupported_currency() {
    let h = harness();

    let (status, body) = get_json(&h.router, "/pricing?currency=XYZ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNSUPPORTED_CURRENCY");
}

#[tokio::test]
async fn healthz_is_ok() {
    let h = harness();

    let (status, body) = get_json(&h.router, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// =============================================================================
// Metadata Pass-Through
// =============================================================================

#[tokio::test]
async fn fulfillment_metadata_reaches_the_gateway_opaquely() {
    let h = harness();

    let (status, _) = post_checkout(
        &h.router,
        json!({
            "amount": 49900,
            "currency": "INR",
            "planId": "monthly",
            "userId": "user-7",
            "billingCycle": "monthly",
            "includeJobTracker": true,
            "gclid": "abc-123"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let sent = h.gateway.last_request().unwrap();
    assert_eq!(sent.metadata.get("userId").unwrap(), "user-7");
    assert_eq!(sent.metadata.get("billingCycle").unwrap(), "monthly");
    // Non-string values pass through as their JSON rendering
    assert_eq!(sent.metadata.get("includeJobTracker").unwrap(), "true");
    assert_eq!(sent.metadata.get("gclid").unwrap(), "abc-123");
}

#[tokio::test]
async fn duplicate_addons_price_per_occurrence() {
    let h = harness();
    let mut body = BTreeMap::new();
    body.insert("amount", json!(59800));
    body.insert("currency", json!("INR"));
    body.insert("isStandaloneAddon", json!(true));
    body.insert("addonIds", json!(["profile_slot", "profile_slot"]));

    let (status, _) = post_checkout(&h.router, serde_json::to_value(body).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.gateway.last_request().unwrap().amount_minor, 59800);
}
