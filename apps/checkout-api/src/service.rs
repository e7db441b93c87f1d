//! # Checkout Service
//!
//! Orchestrates one checkout attempt across validation, auditing, and the
//! payment gateway.
//!
//! ## Attempt Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RECEIVED                                                               │
//! │     │  CheckoutValidator::validate                                      │
//! │     ▼                                                                   │
//! │  VALIDATED ──────────────┬──────────────────────────────┐              │
//! │     │ accept             │ reject                        │ input error │
//! │     ▼                    ▼                               ▼             │
//! │  ACCEPTED             REJECTED                       400 response      │
//! │     │ gateway call       │ spawn audit write                           │
//! │     │                    ▼                                             │
//! │     │              INCIDENT_LOGGED (async; response already sent)      │
//! │     ├── ok ──► SESSION_CREATED ──► 200 {redirectUrl, sessionId}        │
//! │     └── err ─► FAILED ──► 500 (surfaced, never retried here)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Audit Semantics
//! The rejection response is returned as soon as the decision is made; the
//! incident write happens on a spawned task with bounded retries. A write
//! failure is reported via `tracing::error!` (the operational channel) and
//! never surfaces to the end user.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crest_audit::SecurityAuditSink;
use crest_core::validation::clip_metadata_value;
use crest_core::{
    AddonId, CheckoutRequest, CheckoutState, CheckoutValidator, CheckoutVerdict, PlanId,
    PriceCatalog, SecurityIncident,
};

use crate::error::ApiError;
use crate::gateway::{GatewaySession, PaymentGateway, SessionRequest};

/// How many times a failed incident write is attempted before giving up.
const INCIDENT_WRITE_ATTEMPTS: u32 = 3;

/// Orchestrates checkout attempts over immutable pricing state.
pub struct CheckoutService {
    catalog: Arc<PriceCatalog>,
    gateway: Arc<dyn PaymentGateway>,
    audit: Arc<dyn SecurityAuditSink>,
    base_url: String,
}

impl CheckoutService {
    /// Wires the service. The catalog is shared read-only; a configuration
    /// reload builds a new catalog and swaps the Arc wholesale.
    pub fn new(
        catalog: Arc<PriceCatalog>,
        gateway: Arc<dyn PaymentGateway>,
        audit: Arc<dyn SecurityAuditSink>,
        base_url: impl Into<String>,
    ) -> Self {
        CheckoutService {
            catalog,
            gateway,
            audit,
            base_url: base_url.into(),
        }
    }

    /// The catalog this service prices against.
    pub fn catalog(&self) -> &Arc<PriceCatalog> {
        &self.catalog
    }

    /// Runs one checkout attempt end to end.
    ///
    /// Every validation error resolves before the gateway is touched, and
    /// the gateway only ever sees the server-computed amount.
    pub async fn checkout(
        &self,
        request: CheckoutRequest,
        origin: Option<String>,
    ) -> Result<GatewaySession, ApiError> {
        let mut state = CheckoutState::Received;

        let validator = CheckoutValidator::new(&self.catalog);
        let verdict = validator.validate(&request)?;
        state = self.advance(state, CheckoutState::Validated);

        match verdict {
            CheckoutVerdict::Accepted { amount, outcome } => {
                state = self.advance(state, CheckoutState::Accepted);
                debug!(
                    expected = outcome.expected_minor,
                    provided = outcome.provided_minor,
                    currency = %request.currency,
                    "Checkout amount accepted"
                );

                let currency = crest_core::Currency::from_code(&request.currency)
                    .ok_or_else(|| ApiError::UnsupportedCurrency(request.currency.clone()))?;
                let session_request =
                    self.build_session_request(&request, currency, amount.minor(), origin);
                match self.gateway.create_session(&session_request).await {
                    Ok(session) => {
                        state = self.advance(state, CheckoutState::SessionCreated);
                        info!(
                            session_id = %session.session_id,
                            amount = amount.minor(),
                            currency = %request.currency,
                            state = ?state,
                            "Checkout session created"
                        );
                        Ok(session)
                    }
                    Err(gateway_err) => {
                        self.advance(state, CheckoutState::Failed);
                        error!(error = %gateway_err, "Gateway session creation failed");
                        Err(ApiError::Gateway(gateway_err))
                    }
                }
            }

            CheckoutVerdict::Rejected { outcome, incident } => {
                state = self.advance(state, CheckoutState::Rejected);
                // Operational channel only: the HTTP body stays generic
                warn!(
                    incident = %incident.id,
                    expected = outcome.expected_minor,
                    provided = outcome.provided_minor,
                    currency = %request.currency,
                    "Price manipulation detected"
                );
                self.spawn_incident_write(state, incident);
                Err(ApiError::TamperDetected)
            }
        }
    }

    /// Fire-and-forget incident persistence with bounded retries.
    ///
    /// The caller's response must never wait on this; the uuid keyed
    /// `INSERT OR IGNORE` makes retries at-least-once safe.
    fn spawn_incident_write(&self, state: CheckoutState, incident: SecurityIncident) {
        let sink = Arc::clone(&self.audit);
        tokio::spawn(async move {
            for attempt in 1..=INCIDENT_WRITE_ATTEMPTS {
                match sink.record(&incident).await {
                    Ok(()) => {
                        debug_assert!(state.can_transition_to(CheckoutState::IncidentLogged));
                        debug!(incident = %incident.id, "Security incident recorded");
                        return;
                    }
                    Err(e) if attempt < INCIDENT_WRITE_ATTEMPTS => {
                        warn!(
                            incident = %incident.id,
                            attempt,
                            error = %e,
                            "Incident write failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt))).await;
                    }
                    Err(e) => {
                        // The rejection already went out; this is purely an
                        // operational alert.
                        error!(
                            incident = %incident.id,
                            error = %e,
                            "Security incident lost after retries"
                        );
                    }
                }
            }
        });
    }

    /// Builds the gateway session request for an accepted checkout.
    fn build_session_request(
        &self,
        request: &CheckoutRequest,
        currency: crest_core::Currency,
        amount_minor: i64,
        origin: Option<String>,
    ) -> SessionRequest {
        let (product_name, description) = self.line_item(request);

        let base = origin.unwrap_or_else(|| self.base_url.clone());
        let success_url = format!("{base}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}");
        let cancel_url = format!("{base}/checkout?cancelled=true");

        // Pass fulfillment metadata through clipped, and stamp the values
        // fulfillment needs to trust: the effective currency and the
        // server-computed amount.
        let mut metadata: BTreeMap<String, String> = request
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), clip_metadata_value(v)))
            .collect();
        metadata.insert("effectiveCurrency".to_string(), request.currency.clone());
        metadata.insert("finalAmount".to_string(), amount_minor.to_string());
        if let Some(plan) = request.plan_id {
            metadata.insert("planId".to_string(), plan.as_str().to_string());
        }
        if let Some(coupon) = &request.coupon_code {
            metadata.insert("couponCode".to_string(), clip_metadata_value(coupon));
        }

        SessionRequest {
            amount_minor,
            currency,
            product_name,
            description,
            success_url,
            cancel_url,
            metadata,
        }
    }

    /// Derives the hosted-page line item from the selection.
    fn line_item(&self, request: &CheckoutRequest) -> (String, String) {
        if let Some(plan_id) = request.plan_id {
            let name = self
                .catalog
                .plan(plan_id)
                .map(|p| format!("Crest {}", p.name))
                .unwrap_or_else(|| "Crest Premium".to_string());
            return (name, plan_description(plan_id).to_string());
        }

        // Standalone add-on purchase: name it after the first declared add-on
        let addon = request
            .addon_ids
            .iter()
            .find_map(|raw| AddonId::from_wire(raw))
            .and_then(|id| self.catalog.addon(id));
        match addon {
            Some(addon) => (format!("Crest {}", addon.name), addon.description.clone()),
            None => (
                "Crest".to_string(),
                "Premium Access".to_string(),
            ),
        }
    }

    /// Logs and (in debug builds) asserts a state transition.
    fn advance(&self, from: CheckoutState, to: CheckoutState) -> CheckoutState {
        debug_assert!(from.can_transition_to(to), "illegal transition {from:?} → {to:?}");
        debug!(from = ?from, to = ?to, "Checkout state transition");
        to
    }
}

/// Hosted-page description per plan.
fn plan_description(plan: PlanId) -> &'static str {
    match plan {
        PlanId::SixMonth => "6 Month Access - Complete Success Kit",
        PlanId::Quarterly => "3 Month Access - Career Growth Bundle",
        PlanId::Monthly => "30 Day Access - Pro Job Seeker",
        PlanId::Basic => "7 Day Access - Starter Plan",
        PlanId::OneDay => "3 Day Access - Quick Start",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
