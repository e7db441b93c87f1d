//! # crest-core: Pure Pricing & Validation Logic for Crest Checkout
//!
//! This crate is the **heart** of Crest Checkout. It contains the whole
//! multi-currency pricing engine and the checkout-amount integrity check
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Crest Checkout Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend                                 │   │
//! │  │    Pricing UI ──► Plan Picker ──► Checkout ──► Gateway page    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               apps/checkout-api (axum)                          │   │
//! │  │    POST /checkout/session, GET /pricing, GET /healthz          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ crest-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ │   │
//! │  │   │ catalog │ │ convert │ │ resolve │ │discount │ │validator│ │   │
//! │  │   │  plans  │ │   PPP   │ │ device  │ │ coupons │ │ tamper  │ │   │
//! │  │   │ addons  │ │override │ │  rules  │ │rounding │ │  check  │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 crest-audit (incident store)                    │   │
//! │  │            append-only SQLite, at-least-once writes             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`currency`] - Closed currency set with purchasing-power multipliers
//! - [`catalog`] - Immutable plan/add-on/coupon source of truth
//! - [`convert`] - Reference-to-target currency conversion with overrides
//! - [`resolve`] - Device-aware effective price tables
//! - [`discount`] - Coupon resolution and discount rounding
//! - [`validator`] - The checkout-amount tamper check
//! - [`validation`] - Field-level input rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same request always recomputes the same charge
//! 2. **No I/O**: the audit sink and payment gateway live in other crates
//! 3. **Integer Money**: minor units (i64) everywhere, round-half-up at
//!    exactly two points (post-discount, post-presentation-rounding)
//! 4. **Closed Sets**: currencies, plans, and add-ons are enums - adding
//!    one without full pricing data is a compile error
//!
//! ## Example Usage
//!
//! ```rust
//! use crest_core::catalog::{PlanId, PriceCatalog};
//! use crest_core::resolve::DeviceClass;
//! use crest_core::validator::{CheckoutRequest, CheckoutValidator, CheckoutVerdict};
//!
//! let catalog = PriceCatalog::builtin();
//! let validator = CheckoutValidator::new(&catalog);
//!
//! let request = CheckoutRequest {
//!     currency: "INR".to_string(),
//!     plan_id: Some(PlanId::Monthly),
//!     addon_ids: vec![],
//!     coupon_code: Some("SAVE10".to_string()),
//!     amount_minor: 44910,
//!     device_class: DeviceClass::Desktop,
//!     standalone_addon: false,
//!     metadata: Default::default(),
//! };
//!
//! match validator.validate(&request).unwrap() {
//!     CheckoutVerdict::Accepted { amount, .. } => assert_eq!(amount.minor(), 44910),
//!     CheckoutVerdict::Rejected { .. } => unreachable!(),
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod convert;
pub mod currency;
pub mod discount;
pub mod error;
pub mod money;
pub mod resolve;
pub mod validation;
pub mod validator;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use crest_core::Money` instead of
// `use crest_core::money::Money`

pub use catalog::{AddonId, PlanId, PriceCatalog};
pub use currency::Currency;
pub use error::{CatalogError, CheckoutError, CheckoutResult, ValidationError};
pub use money::Money;
pub use resolve::{DeviceClass, EffectivePricingResolver, PriceTable};
pub use validator::{
    CheckoutRequest, CheckoutState, CheckoutValidator, CheckoutVerdict, Decision,
    SecurityIncident, ValidationOutcome,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum acceptable |client amount - computed amount| in minor units.
///
/// ## Business Reason
/// Absorbs benign client-side rounding drift (a frontend displaying a
/// converted price it formatted itself). It is NOT a discount: anything
/// past one minor unit is treated as tampering.
pub const AMOUNT_TOLERANCE_MINOR: i64 = 1;

/// Maximum add-on ids accepted in a single checkout.
///
/// ## Business Reason
/// The catalog has a handful of add-ons; a huge list is abuse or a broken
/// client, not a real cart.
pub const MAX_ADDON_SELECTION: usize = 20;

/// Maximum stored length of one fulfillment metadata value.
///
/// ## Business Reason
/// Metadata rides along to the payment gateway, which caps value sizes.
/// Values are clipped, never rejected, so oversized acquisition tags
/// cannot fail a purchase.
pub const METADATA_VALUE_MAX_LEN: usize = 500;
