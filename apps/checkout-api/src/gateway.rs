//! # Payment Gateway Adapter
//!
//! The seam between the checkout service and the hosted payment page.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_session(amount, currency, description, urls, metadata)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  { session_id, redirect_url }  - or GatewayError                        │
//! │                                                                         │
//! │  Rules:                                                                 │
//! │  • The amount is ALWAYS the server-computed charge. The adapter is     │
//! │    never handed a client-submitted number.                             │
//! │  • No internal retries: a failure surfaces to the caller as 500.       │
//! │  • The HTTP call owns its own timeout (30s).                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crest_core::Currency;

/// Stripe Checkout Sessions endpoint.
const STRIPE_SESSIONS_URL: &str = "https://api.stripe.com/v1/checkout/sessions";

/// Gateway call timeout. Session creation is a single small POST; anything
/// slower than this is an outage.
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Types
// =============================================================================

/// Everything the gateway needs to host a payment page.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    /// Server-computed charge in minor units.
    pub amount_minor: i64,

    /// Charge currency.
    pub currency: Currency,

    /// Line-item product name shown on the hosted page.
    pub product_name: String,

    /// Line-item description.
    pub description: String,

    /// Redirect after successful payment.
    pub success_url: String,

    /// Redirect after cancellation.
    pub cancel_url: String,

    /// Opaque fulfillment metadata stored with the session.
    pub metadata: BTreeMap<String, String>,
}

/// A created gateway session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySession {
    pub session_id: String,
    pub redirect_url: String,
}

/// Gateway call failures. Surfaced to the caller as 500; never retried
/// by the checkout service.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, timeout, TLS).
    #[error("Gateway request failed: {0}")]
    Request(String),

    /// The gateway answered with a non-success status.
    #[error("Gateway declined: {status}: {message}")]
    Declined { status: u16, message: String },

    /// The gateway answered 2xx but the body was not what we expect.
    #[error("Malformed gateway response: {0}")]
    MalformedResponse(String),
}

// =============================================================================
// Trait
// =============================================================================

/// Creates hosted payment sessions.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates one payment session for an accepted checkout.
    async fn create_session(&self, request: &SessionRequest)
        -> Result<GatewaySession, GatewayError>;
}

// =============================================================================
// Stripe Implementation
// =============================================================================

/// Stripe Checkout implementation of [`PaymentGateway`].
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    endpoint: String,
}

impl StripeGateway {
    /// Creates a gateway client with the production endpoint.
    pub fn new(secret_key: impl Into<String>) -> Self {
        StripeGateway {
            client: reqwest::Client::builder()
                .timeout(GATEWAY_TIMEOUT)
                .build()
                .expect("reqwest client construction cannot fail with static config"),
            secret_key: secret_key.into(),
            endpoint: STRIPE_SESSIONS_URL.to_string(),
        }
    }

    /// Overrides the endpoint (stripe-mock, integration stubs).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// The subset of Stripe's session object we consume.
#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    url: String,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<GatewaySession, GatewayError> {
        // Stripe's form encoding uses bracketed paths for nested fields
        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                request.currency.code().to_lowercase(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                request.product_name.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]".to_string(),
                request.description.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                request.amount_minor.to_string(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
        ];
        for (key, value) in &request.metadata {
            params.push((format!("metadata[{key}]"), value.clone()));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Declined {
                status: status.as_u16(),
                message,
            });
        }

        let session: StripeSession = response
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        Ok(GatewaySession {
            session_id: session.id,
            redirect_url: session.url,
        })
    }
}

// =============================================================================
// Mock Implementation
// =============================================================================

/// In-process gateway for tests.
///
/// Records every request it sees so tests can assert the gateway was (or
/// was not) invoked, and with which amount.
#[derive(Debug, Default)]
pub struct MockGateway {
    fail: bool,
    requests: Mutex<Vec<SessionRequest>>,
}

impl MockGateway {
    /// A gateway that succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose every call fails.
    pub fn failing() -> Self {
        MockGateway {
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of sessions requested so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().expect("gateway mutex poisoned").len()
    }

    /// The most recent session request, if any.
    pub fn last_request(&self) -> Option<SessionRequest> {
        self.requests
            .lock()
            .expect("gateway mutex poisoned")
            .last()
            .cloned()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<GatewaySession, GatewayError> {
        self.requests
            .lock()
            .expect("gateway mutex poisoned")
            .push(request.clone());

        if self.fail {
            return Err(GatewayError::Declined {
                status: 503,
                message: "mock gateway unavailable".to_string(),
            });
        }

        Ok(GatewaySession {
            session_id: format!("cs_test_{}", self.calls()),
            redirect_url: "https://checkout.example.test/pay".to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn session_request(amount: i64) -> SessionRequest {
        SessionRequest {
            amount_minor: amount,
            currency: Currency::Inr,
            product_name: "Crest Pro".to_string(),
            description: "30 Day Access".to_string(),
            success_url: "http://localhost/success".to_string(),
            cancel_url: "http://localhost/cancel".to_string(),
            metadata: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_mock_gateway_records_requests() {
        let gateway = MockGateway::new();
        let session = gateway.create_session(&session_request(49900)).await.unwrap();

        assert!(session.session_id.starts_with("cs_test_"));
        assert_eq!(gateway.calls(), 1);
        assert_eq!(gateway.last_request().unwrap().amount_minor, 49900);
    }

    #[tokio::test]
    async fn test_failing_gateway_surfaces_error() {
        let gateway = MockGateway::failing();
        let result = gateway.create_session(&session_request(49900)).await;

        assert!(matches!(result, Err(GatewayError::Declined { status: 503, .. })));
        // The attempt is still recorded
        assert_eq!(gateway.calls(), 1);
    }
}
