//! # Currency Model
//!
//! The closed set of supported currencies and their pricing attributes.
//!
//! ## Closed Set, Hard Errors
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Currency Resolution                                │
//! │                                                                         │
//! │  Client submits "USD"  ──► Currency::from_code ──► Some(Currency::Usd) │
//! │  Client submits "XYZ"  ──► Currency::from_code ──► None                │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │                        UnsupportedCurrency (400)                        │
//! │                                                                         │
//! │  There is NO silent default. A currency the catalog does not declare   │
//! │  must never produce a price.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Per-Currency Attributes
//! - **Purchasing-power multiplier** (basis points of the reference
//!   currency): converts a reference price into this currency's price.
//!   The reference currency's own multiplier is exactly 10000 (×1.0).
//! - **Presentation step**: minor units per displayed price step. AED
//!   storefronts show whole dirhams, so its step is 100; every other
//!   supported currency is priced to the exact minor unit.
//! - **Minor units per major unit**: declared explicitly (100 for every
//!   supported currency), never inferred from the code.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Purchasing-Power Multiplier
// =============================================================================

/// Purchasing-power multiplier in basis points of the reference currency.
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000. Keeping the multiplier as an integer
/// keeps the whole conversion on the integer money path: no floats ever
/// touch a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PppMultiplier(u32);

impl PppMultiplier {
    /// Creates a multiplier from basis points (10000 = ×1.0).
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        PppMultiplier(bps)
    }

    /// The reference currency's own multiplier: exactly ×1.0.
    #[inline]
    pub const fn reference() -> Self {
        PppMultiplier(10_000)
    }

    /// Returns the multiplier in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

// =============================================================================
// Currency
// =============================================================================

/// The closed set of supported currencies.
///
/// Adding a currency means adding a variant here, at which point every
/// exhaustive `match` in the crate stops compiling until the new currency's
/// multiplier, presentation step, and display data are declared. That is
/// deliberate: a new currency without complete pricing data is a bug the
/// compiler should catch, not a silent pass-through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Indian rupee - the reference currency all base prices are declared in.
    Inr,
    /// US dollar.
    Usd,
    /// Euro.
    Eur,
    /// British pound.
    Gbp,
    /// UAE dirham.
    Aed,
}

impl Currency {
    /// All supported currencies, reference first.
    pub const ALL: [Currency; 5] = [
        Currency::Inr,
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Aed,
    ];

    /// The reference currency that catalog base prices are declared in.
    pub const REFERENCE: Currency = Currency::Inr;

    /// Parses an ISO 4217 code (case-insensitive).
    ///
    /// Returns `None` for anything outside the supported set - the caller
    /// turns that into an `UnsupportedCurrency` rejection, never a default.
    pub fn from_code(code: &str) -> Option<Currency> {
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code.trim()))
    }

    /// The ISO 4217 code.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Aed => "AED",
        }
    }

    /// Display symbol for logs and the pricing endpoint.
    pub const fn symbol(&self) -> &'static str {
        match self {
            Currency::Inr => "₹",
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Aed => "د.إ",
        }
    }

    /// Human-readable currency name.
    pub const fn name(&self) -> &'static str {
        match self {
            Currency::Inr => "Indian Rupee",
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Gbp => "British Pound",
            Currency::Aed => "UAE Dirham",
        }
    }

    /// Purchasing-power multiplier from the reference currency.
    ///
    /// These are pricing-team numbers, not FX rates: they express what the
    /// product should cost in each market relative to the reference price.
    pub const fn multiplier(&self) -> PppMultiplier {
        match self {
            Currency::Inr => PppMultiplier::reference(),
            Currency::Usd => PppMultiplier::from_bps(500),  // ×0.05
            Currency::Eur => PppMultiplier::from_bps(460),  // ×0.046
            Currency::Gbp => PppMultiplier::from_bps(400),  // ×0.04
            Currency::Aed => PppMultiplier::from_bps(1800), // ×0.18
        }
    }

    /// Presentation rounding step in minor units.
    ///
    /// AED storefronts display whole dirhams, so charges round to the
    /// nearest 100 fils. Every other supported currency is priced to the
    /// exact minor unit (identity rounding).
    pub const fn presentation_step(&self) -> i64 {
        match self {
            Currency::Aed => 100,
            Currency::Inr | Currency::Usd | Currency::Eur | Currency::Gbp => 1,
        }
    }

    /// Minor units per major unit, declared explicitly per currency.
    ///
    /// All supported currencies are 100-subunit currencies (paise, cents,
    /// pence, fils). Declared rather than inferred so a future
    /// zero-decimal currency cannot be mispriced by a factor of 100.
    pub const fn minor_per_major(&self) -> i64 {
        match self {
            Currency::Inr | Currency::Usd | Currency::Eur | Currency::Gbp | Currency::Aed => 100,
        }
    }

    /// Whether this is the reference currency.
    #[inline]
    pub fn is_reference(&self) -> bool {
        *self == Currency::REFERENCE
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
