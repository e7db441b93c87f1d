//! # HTTP Routes
//!
//! The axum boundary of the checkout service.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /checkout/session   Validate amount, create gateway session      │
//! │       200 {redirectUrl, sessionId}                                     │
//! │       400 {error, code: EMPTY_SELECTION | UNSUPPORTED_CURRENCY         │
//! │                        | INVALID_INPUT | SECURITY_ERROR}               │
//! │       500 {error, code: GATEWAY_ERROR | INTERNAL_ERROR}                │
//! │                                                                         │
//! │  GET /pricing             Effective price table for a storefront       │
//! │  GET /healthz             Liveness                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The checkout body is deserialized by hand from a JSON value so that
//! every malformed-input path maps to the same `{error, code}` shape the
//! rest of the API speaks, and so unrecognized fields ride along as opaque
//! fulfillment metadata instead of being rejected.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crest_core::catalog::{AddonDuration, DownloadQuota};
use crest_core::convert::CurrencyConverter;
use crest_core::{
    AddonId, CheckoutRequest, Currency, DeviceClass, EffectivePricingResolver, PlanId,
};

use crate::error::ApiError;
use crate::AppState;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/checkout/session", post(create_checkout_session))
        .route("/pricing", get(get_pricing))
        .route("/healthz", get(healthz))
        .with_state(state)
}

// =============================================================================
// POST /checkout/session
// =============================================================================

/// The recognized checkout fields. Everything else in the body is opaque
/// fulfillment metadata.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutSessionBody {
    amount: Option<i64>,
    currency: Option<String>,
    plan_id: Option<PlanId>,
    #[serde(default)]
    addon_ids: Vec<String>,
    coupon_code: Option<String>,
    device_class: Option<String>,
    #[serde(default)]
    is_standalone_addon: bool,
    origin: Option<String>,
    #[serde(flatten)]
    metadata: BTreeMap<String, Value>,
}

/// Successful session creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutSessionResponse {
    redirect_url: String,
    session_id: String,
}

async fn create_checkout_session(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<Value>,
) -> Result<Json<CheckoutSessionResponse>, ApiError> {
    let body: CheckoutSessionBody = serde_json::from_value(raw)
        .map_err(|e| ApiError::InvalidInput(format!("Malformed request body: {e}")))?;

    let amount = body
        .amount
        .ok_or_else(|| ApiError::InvalidInput("amount is required".to_string()))?;
    let currency = body
        .currency
        .ok_or_else(|| ApiError::InvalidInput("currency is required".to_string()))?;

    // Unrecognized body fields pass through as opaque metadata strings
    let metadata = body
        .metadata
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect();

    let request = CheckoutRequest {
        currency,
        plan_id: body.plan_id,
        addon_ids: body.addon_ids,
        coupon_code: body.coupon_code,
        amount_minor: amount,
        device_class: DeviceClass::from_wire(body.device_class.as_deref()),
        standalone_addon: body.is_standalone_addon,
        metadata,
    };

    let session = state.service.checkout(request, body.origin).await?;
    Ok(Json(CheckoutSessionResponse {
        redirect_url: session.redirect_url,
        session_id: session.session_id,
    }))
}

// =============================================================================
// GET /pricing
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricingQuery {
    currency: Option<String>,
    device_class: Option<String>,
}

/// One plan as the pricing screen sees it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanPricing {
    id: PlanId,
    name: String,
    price_minor: i64,
    anchor_minor: i64,
    duration_days: u32,
    downloads: DownloadQuota,
    features: Vec<String>,
}

/// One add-on as the pricing screen sees it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddonPricing {
    id: AddonId,
    name: String,
    price_minor: i64,
    duration: AddonDuration,
    description: String,
    features: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PricingResponse {
    currency: Currency,
    symbol: &'static str,
    name: &'static str,
    device_class: DeviceClass,
    plans: Vec<PlanPricing>,
    addons: Vec<AddonPricing>,
}

async fn get_pricing(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PricingQuery>,
) -> Result<Json<PricingResponse>, ApiError> {
    let currency = match query.currency.as_deref() {
        None => Currency::REFERENCE,
        Some(code) => Currency::from_code(code)
            .ok_or_else(|| ApiError::UnsupportedCurrency(code.to_string()))?,
    };
    let device_class = DeviceClass::from_wire(query.device_class.as_deref());

    let catalog = state.service.catalog();
    let resolver = EffectivePricingResolver::new(catalog);
    let converter = CurrencyConverter::new(catalog);
    let table = resolver.resolve(currency, device_class);

    let plans = catalog
        .plans()
        .iter()
        .filter_map(|plan| {
            let price_minor = table.plan_minor(plan.id)?;
            let anchor_minor = converter.plan_anchor_price(plan.id, currency)?.minor();
            Some(PlanPricing {
                id: plan.id,
                name: plan.name.clone(),
                price_minor,
                anchor_minor,
                duration_days: plan.duration_days,
                downloads: plan.downloads,
                features: plan.features.clone(),
            })
        })
        .collect();

    let addons = catalog
        .addons()
        .iter()
        .filter_map(|addon| {
            let price_minor = table.addon_minor(addon.id)?;
            Some(AddonPricing {
                id: addon.id,
                name: addon.name.clone(),
                price_minor,
                duration: addon.duration,
                description: addon.description.clone(),
                features: addon.features.clone(),
            })
        })
        .collect();

    Ok(Json(PricingResponse {
        currency,
        symbol: currency.symbol(),
        name: currency.name(),
        device_class,
        plans,
        addons,
    }))
}

// =============================================================================
// GET /healthz
// =============================================================================

async fn healthz() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
