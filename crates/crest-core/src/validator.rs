//! # Checkout Amount Validator
//!
//! The orchestrating core: recomputes the expected charge for a submitted
//! cart and compares it to the client-submitted amount.
//!
//! ## The Tamper Check
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              validate(request) - exact order matters                    │
//! │                                                                         │
//! │  1. currency in supported set?        ──no──► UnsupportedCurrency      │
//! │  2. anything selected?                ──no──► EmptySelection           │
//! │  3. base = plan price from resolved table (or 0)                       │
//! │  4. base += each DECLARED add-on      (unknown ids skipped silently)   │
//! │  5. base = coupon applied             (unknown codes are a no-op)      │
//! │  6. final = presentation rounding     (per-currency step, half-up)     │
//! │  7. difference = |client amount - final|                               │
//! │  8. difference <= tolerance ──► ACCEPT (charge `final`, never the      │
//! │                 │               client's number)                       │
//! │                 └──────────────► REJECT + SecurityIncident             │
//! │                                                                         │
//! │  Rounding touches the money exactly twice: inside step 5 (post-        │
//! │  discount) and at step 6. Nowhere else.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Posture
//! The client's amount is a claim, not an instruction. On acceptance the
//! gateway is given the server-computed amount; on rejection the caller
//! sees only a generic message while the expected/provided pair lives in
//! the audit record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::{AddonId, PlanId, PriceCatalog};
use crate::currency::Currency;
use crate::discount::DiscountEngine;
use crate::error::{CheckoutError, CheckoutResult};
use crate::money::Money;
use crate::resolve::{DeviceClass, EffectivePricingResolver};
use crate::validation::{validate_addon_selection, validate_amount_minor, validate_currency_code};
use crate::AMOUNT_TOLERANCE_MINOR;

// =============================================================================
// Checkout Request
// =============================================================================

/// A submitted checkout, as the validator sees it.
///
/// The currency and add-on ids stay raw strings on purpose: membership in
/// the closed sets is exactly what the validator decides (hard error for
/// currencies, silent skip for add-ons). The plan id is already typed -
/// an unknown plan string is malformed input rejected at deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Submitted currency code, e.g. "INR".
    pub currency: String,

    /// Selected plan, if any.
    pub plan_id: Option<PlanId>,

    /// Selected add-on ids as submitted. Unknown/retired ids are skipped
    /// silently - stale client caches must not break checkout.
    #[serde(default)]
    pub addon_ids: Vec<String>,

    /// Coupon code, if any. Untrusted; unknown codes apply no discount.
    pub coupon_code: Option<String>,

    /// Client-submitted amount in minor units. A claim to verify, never a
    /// number to charge.
    pub amount_minor: i64,

    /// Resolved device classification.
    #[serde(default)]
    pub device_class: DeviceClass,

    /// Standalone add-on purchase with no plan.
    #[serde(default)]
    pub standalone_addon: bool,

    /// Opaque fulfillment metadata (user id, acquisition tags, profile
    /// details). Never inspected here beyond pass-through.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

// =============================================================================
// Verdict Types
// =============================================================================

/// Accept/reject decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

/// The numbers behind a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    /// Server-computed expected charge in minor units.
    pub expected_minor: i64,
    /// Client-submitted amount in minor units.
    pub provided_minor: i64,
    /// Absolute difference.
    pub difference_minor: i64,
    /// The decision the difference produced.
    pub decision: Decision,
}

/// Incident type recorded for amount-mismatch rejections.
pub const INCIDENT_TYPE_PRICE_MANIPULATION: &str = "PRICE_MANIPULATION";

/// Immutable audit record for a rejected checkout.
///
/// Created once per rejected request, persisted append-only, never
/// updated. The uuid doubles as the at-least-once dedup key for the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SecurityIncident {
    /// Per-attempt identifier; dedup key for retried audit writes.
    #[ts(as = "String")]
    pub id: Uuid,

    /// Incident classification, e.g. `PRICE_MANIPULATION`.
    pub incident_type: String,

    /// What the client claimed, in minor units.
    pub provided_amount: i64,

    /// What the server computed, in minor units.
    pub expected_amount: i64,

    /// Currency of both amounts.
    pub currency: Currency,

    /// Selected plan, if any.
    pub plan_id: Option<PlanId>,

    /// Submitted coupon code, if any.
    pub coupon_code: Option<String>,

    /// Submitted add-on ids, verbatim.
    pub addon_ids: Vec<String>,

    /// When the incident was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// The validator's answer for a structurally valid request.
///
/// Tamper rejection is verdict data, not an error: the caller must be able
/// to persist the incident and still return only a generic message.
#[derive(Debug, Clone)]
pub enum CheckoutVerdict {
    /// The amount checks out. `amount` is the server-computed charge - the
    /// only number ever forwarded to the payment gateway.
    Accepted {
        amount: Money,
        outcome: ValidationOutcome,
    },

    /// The difference exceeded tolerance. The incident carries the
    /// diagnostic detail; callers never expose `outcome.expected_minor`.
    Rejected {
        outcome: ValidationOutcome,
        incident: SecurityIncident,
    },
}

// =============================================================================
// Checkout State Machine
// =============================================================================

/// Lifecycle of one checkout attempt.
///
/// ```text
/// RECEIVED → VALIDATED → ACCEPTED → SESSION_CREATED
///                │            └────► FAILED           (gateway failure)
///                └────► REJECTED → INCIDENT_LOGGED    (tamper)
/// ```
///
/// `Failed` is reachable only from `Accepted`: a gateway failure is an
/// operational problem, distinct from a tamper rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    Received,
    Validated,
    Accepted,
    SessionCreated,
    Rejected,
    IncidentLogged,
    Failed,
}

impl CheckoutState {
    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(self, next: CheckoutState) -> bool {
        use CheckoutState::*;
        matches!(
            (self, next),
            (Received, Validated)
                | (Validated, Accepted)
                | (Validated, Rejected)
                | (Accepted, SessionCreated)
                | (Accepted, Failed)
                | (Rejected, IncidentLogged)
        )
    }

    /// Whether this state ends the attempt.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CheckoutState::SessionCreated | CheckoutState::IncidentLogged | CheckoutState::Failed
        )
    }
}

// =============================================================================
// Validator
// =============================================================================

/// Recomputes the expected charge and decides accept/reject.
///
/// Stateless and synchronous: everything it reads is immutable catalog
/// data, so concurrent validations never contend.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutValidator<'a> {
    catalog: &'a PriceCatalog,
    resolver: EffectivePricingResolver<'a>,
    discounts: DiscountEngine<'a>,
    tolerance_minor: i64,
}

impl<'a> CheckoutValidator<'a> {
    /// Creates a validator with the standard tolerance.
    pub fn new(catalog: &'a PriceCatalog) -> Self {
        Self::with_tolerance(catalog, AMOUNT_TOLERANCE_MINOR)
    }

    /// Creates a validator with an explicit tolerance (tests, staged
    /// rollouts). The tolerance absorbs benign client-side rounding; it is
    /// not a discount mechanism.
    pub fn with_tolerance(catalog: &'a PriceCatalog, tolerance_minor: i64) -> Self {
        CheckoutValidator {
            catalog,
            resolver: EffectivePricingResolver::new(catalog),
            discounts: DiscountEngine::new(catalog),
            tolerance_minor,
        }
    }

    /// Recomputes the expected charge for a request, without deciding.
    ///
    /// Pure: two calls with the same request always return the same
    /// amount. This is the "truth" price.
    pub fn expected_amount(&self, request: &CheckoutRequest) -> CheckoutResult<Money> {
        let currency = self.parse_currency(&request.currency)?;

        // Nothing chargeable selected is a client bug, not a tamper case.
        if request.plan_id.is_none() && request.addon_ids.is_empty() && !request.standalone_addon {
            return Err(CheckoutError::EmptySelection);
        }

        let table = self.resolver.resolve(currency, request.device_class);

        // Base plan price. A plan missing from the table (retired via
        // config) contributes zero, same as the add-on rule below.
        let mut base = Money::from_minor(
            request
                .plan_id
                .and_then(|plan| table.plan_minor(plan))
                .unwrap_or(0),
        );

        // Declared add-ons accumulate; unknown ids are skipped silently.
        for raw_id in &request.addon_ids {
            if let Some(addon) = AddonId::from_wire(raw_id) {
                if let Some(price) = table.addon_minor(addon) {
                    base += Money::from_minor(price);
                }
            }
        }

        // Coupon (no-op when unknown). Rounding point one: post-discount.
        if let Some(code) = &request.coupon_code {
            base = self.discounts.apply_code(base, code);
        }

        // Rounding point two: presentation unit.
        Ok(base.round_to_step(currency.presentation_step()))
    }

    /// Validates a submitted checkout.
    ///
    /// Input errors (`UnsupportedCurrency`, `EmptySelection`, field
    /// failures) come back as `Err` and must be resolved before any
    /// gateway call. A structurally valid request always gets a verdict.
    pub fn validate(&self, request: &CheckoutRequest) -> CheckoutResult<CheckoutVerdict> {
        validate_amount_minor(request.amount_minor)?;
        validate_addon_selection(request.addon_ids.len())?;

        let currency = self.parse_currency(&request.currency)?;
        let expected = self.expected_amount(request)?;

        let difference = (Money::from_minor(request.amount_minor) - expected).abs();

        if difference.minor() <= self.tolerance_minor {
            let outcome = ValidationOutcome {
                expected_minor: expected.minor(),
                provided_minor: request.amount_minor,
                difference_minor: difference.minor(),
                decision: Decision::Accept,
            };
            return Ok(CheckoutVerdict::Accepted {
                amount: expected,
                outcome,
            });
        }

        let outcome = ValidationOutcome {
            expected_minor: expected.minor(),
            provided_minor: request.amount_minor,
            difference_minor: difference.minor(),
            decision: Decision::Reject,
        };
        let incident = SecurityIncident {
            id: Uuid::new_v4(),
            incident_type: INCIDENT_TYPE_PRICE_MANIPULATION.to_string(),
            provided_amount: request.amount_minor,
            expected_amount: expected.minor(),
            currency,
            plan_id: request.plan_id,
            coupon_code: request.coupon_code.clone(),
            addon_ids: request.addon_ids.clone(),
            created_at: Utc::now(),
        };
        Ok(CheckoutVerdict::Rejected { outcome, incident })
    }

    /// The catalog this validator prices against.
    pub fn catalog(&self) -> &'a PriceCatalog {
        self.catalog
    }

    fn parse_currency(&self, code: &str) -> CheckoutResult<Currency> {
        validate_currency_code(code)?;
        Currency::from_code(code).ok_or_else(|| CheckoutError::UnsupportedCurrency {
            code: code.trim().to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
