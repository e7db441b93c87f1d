//! # Price Catalog
//!
//! Static, immutable source of truth for plan and add-on pricing.
//!
//! ## Catalog Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         PriceCatalog                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ PlanDefinition  │   │ AddonDefinition │   │CouponDefinition │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (PlanId)    │   │  id (AddonId)   │   │  code           │       │
//! │  │  base_price     │   │  base_price     │   │  rate [0,1)     │       │
//! │  │  anchor_price   │   │  duration       │   │  label          │       │
//! │  │  hierarchy rank │   │  features       │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  Per-currency overrides (hand-tuned "clean" numbers):                  │
//! │  ┌──────────────────────────┐  ┌──────────────────────────┐            │
//! │  │ PlanPriceOverride        │  │ AddonPriceOverride       │            │
//! │  │ (plan, currency) → price │  │ (addon, currency) → price│            │
//! │  └──────────────────────────┘  └──────────────────────────┘            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! Constructed once at process start (from the built-in dataset or JSON
//! configuration), then shared read-only by reference. A configuration
//! change builds a whole new catalog and swaps the pointer; cells are
//! never mutated in place.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::currency::Currency;
use crate::error::CatalogError;
use crate::money::Money;

// =============================================================================
// Plan / Add-on Identifiers
// =============================================================================

/// The closed set of purchasable plans.
///
/// Free and trial tiers never reach checkout, so they are deliberately not
/// variants here: a selection is always charge-bearing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum PlanId {
    /// 3-day quick access.
    OneDay,
    /// 7-day starter pack.
    Basic,
    /// 30-day professional plan.
    Monthly,
    /// 90-day bundle.
    Quarterly,
    /// 180-day full kit.
    SixMonth,
}

impl PlanId {
    /// All purchasable plans, lowest tier first.
    pub const ALL: [PlanId; 5] = [
        PlanId::OneDay,
        PlanId::Basic,
        PlanId::Monthly,
        PlanId::Quarterly,
        PlanId::SixMonth,
    ];

    /// The wire identifier used in API payloads and audit records.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PlanId::OneDay => "oneDay",
            PlanId::Basic => "basic",
            PlanId::Monthly => "monthly",
            PlanId::Quarterly => "quarterly",
            PlanId::SixMonth => "sixMonth",
        }
    }

    /// Parses a stored or submitted plan id.
    pub fn from_wire(id: &str) -> Option<PlanId> {
        PlanId::ALL.into_iter().find(|p| p.as_str() == id.trim())
    }
}

/// The closed set of purchasable add-ons.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AddonId {
    /// Single document download without a plan.
    OneTimeDownload,
    /// Additional profile slot, lifetime access.
    ProfileSlot,
}

impl AddonId {
    /// All purchasable add-ons.
    pub const ALL: [AddonId; 2] = [AddonId::OneTimeDownload, AddonId::ProfileSlot];

    /// The wire identifier used in API payloads and audit records.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AddonId::OneTimeDownload => "one_time_download",
            AddonId::ProfileSlot => "profile_slot",
        }
    }

    /// Parses a client-submitted add-on id.
    ///
    /// Returns `None` for anything unknown. Callers skip unknown ids
    /// silently: stale client caches referencing retired add-ons must not
    /// break checkout.
    pub fn from_wire(id: &str) -> Option<AddonId> {
        AddonId::ALL.into_iter().find(|a| a.as_str() == id.trim())
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// Coupon discount fraction in parts per 100 000, always in [0, 1).
///
/// ## Why parts per 100 000?
/// Production coupons include rates like 75.377%, which basis points
/// cannot represent. 1 part = 0.001%. The integer representation keeps
/// discount math on the integer money path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Full scale: 100 000 parts = 100%.
    pub const SCALE: u32 = 100_000;

    /// Creates a rate from parts per 100 000 (10 000 = 10%).
    ///
    /// Rates at or above 100% are invalid coupon data; `PriceCatalog::validate`
    /// rejects them at construction time.
    #[inline]
    pub const fn from_parts_per_100k(parts: u32) -> Self {
        DiscountRate(parts)
    }

    /// Creates a rate from a whole percentage (10 = 10%).
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        DiscountRate(percent * 1_000)
    }

    /// Returns the rate in parts per 100 000.
    #[inline]
    pub const fn parts_per_100k(&self) -> u32 {
        self.0
    }

    /// Checks the [0, 1) invariant.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.0 < Self::SCALE
    }
}

// =============================================================================
// Definitions
// =============================================================================

/// Download allowance attached to a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DownloadQuota {
    /// Fixed number of downloads for the plan's duration.
    Limited(u32),
    /// No cap.
    Unlimited,
}

/// Duration semantics of an add-on purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AddonDuration {
    /// Consumed once.
    OneTime,
    /// Never expires.
    Unlimited,
}

/// A purchasable plan. Immutable, defined once.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlanDefinition {
    pub id: PlanId,

    /// Display name shown on pricing screens and gateway line items.
    pub name: String,

    /// Base price in reference-currency minor units.
    pub base_price_minor: i64,

    /// Anchor ("was") price for discount framing. Display-only: the
    /// chargeable amount never derives from it.
    pub anchor_price_minor: i64,

    /// Access duration in days.
    pub duration_days: u32,

    /// Download allowance.
    pub downloads: DownloadQuota,

    /// Tier rank, 1 = lowest. Strictly ordered across plans.
    pub hierarchy: u8,

    /// Marketing feature list for the pricing endpoint.
    pub features: Vec<String>,
}

impl PlanDefinition {
    /// Returns the base price as Money.
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_minor(self.base_price_minor)
    }

    /// Returns the anchor price as Money.
    #[inline]
    pub fn anchor_price(&self) -> Money {
        Money::from_minor(self.anchor_price_minor)
    }
}

/// A purchasable add-on. Immutable, defined once.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddonDefinition {
    pub id: AddonId,

    /// Display name shown on pricing screens and gateway line items.
    pub name: String,

    /// Base price in reference-currency minor units.
    pub base_price_minor: i64,

    /// Duration semantics (one-time vs lifetime).
    pub duration: AddonDuration,

    /// One-line description for gateway line items.
    pub description: String,

    /// Marketing feature list for the pricing endpoint.
    pub features: Vec<String>,
}

impl AddonDefinition {
    /// Returns the base price as Money.
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_minor(self.base_price_minor)
    }
}

/// A coupon. The code is a case-insensitive key.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CouponDefinition {
    /// Canonical (uppercase) coupon code.
    pub code: String,

    /// Discount fraction in [0, 1).
    pub rate: DiscountRate,

    /// Display label, e.g. "10% OFF".
    pub label: String,
}

/// Hand-tuned per-currency plan price, taking precedence over the
/// purchasing-power formula unconditionally.
///
/// Overrides exist because formula output sometimes needs commercially
/// "clean" numbers ($13.99 instead of the computed $9.95), and determinism
/// requires the declared number to always win rather than be blended.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PlanPriceOverride {
    pub plan: PlanId,
    pub currency: Currency,
    pub price_minor: i64,
    /// Optional hand-tuned anchor price for the same pair.
    pub anchor_minor: Option<i64>,
}

/// Hand-tuned per-currency add-on price.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddonPriceOverride {
    pub addon: AddonId,
    pub currency: Currency,
    pub price_minor: i64,
}

// =============================================================================
// Price Catalog
// =============================================================================

/// Typed, read-only lookup over plans, add-ons, coupons, and overrides.
///
/// No side effects; constructed once from configuration and injected by
/// reference into every component that prices anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCatalog {
    plans: Vec<PlanDefinition>,
    addons: Vec<AddonDefinition>,
    coupons: Vec<CouponDefinition>,
    #[serde(default)]
    plan_overrides: Vec<PlanPriceOverride>,
    #[serde(default)]
    addon_overrides: Vec<AddonPriceOverride>,
}

impl PriceCatalog {
    /// The production dataset.
    ///
    /// Base prices are reference-currency (INR) minor units; USD carries
    /// hand-tuned overrides for commercially clean numbers.
    pub fn builtin() -> Self {
        let plans = vec![
            PlanDefinition {
                id: PlanId::OneDay,
                name: "Quick Start".to_string(),
                base_price_minor: 19900,
                anchor_price_minor: 39900,
                duration_days: 3,
                downloads: DownloadQuota::Limited(2),
                hierarchy: 1,
                features: vec![
                    "Document Downloads (3 days)".to_string(),
                    "AI Suggestions".to_string(),
                    "50+ Premium Templates".to_string(),
                ],
            },
            PlanDefinition {
                id: PlanId::Basic,
                name: "Starter (Sachet Pack)".to_string(),
                base_price_minor: 19900,
                anchor_price_minor: 39900,
                duration_days: 7,
                downloads: DownloadQuota::Limited(5),
                hierarchy: 2,
                features: vec![
                    "Document Downloads (7 days)".to_string(),
                    "AI Suggestions".to_string(),
                    "50+ Premium Templates".to_string(),
                    "Score Checker".to_string(),
                ],
            },
            PlanDefinition {
                id: PlanId::Monthly,
                name: "Pro (Job Seeker Choice)".to_string(),
                base_price_minor: 49900,
                anchor_price_minor: 69900,
                duration_days: 30,
                downloads: DownloadQuota::Unlimited,
                hierarchy: 3,
                features: vec![
                    "Unlimited Downloads".to_string(),
                    "Tailor to Any Job".to_string(),
                    "Salary Analyzer".to_string(),
                    "24/7 Email & Chat Support".to_string(),
                ],
            },
            PlanDefinition {
                id: PlanId::Quarterly,
                name: "Expert (Career Growth Bundle)".to_string(),
                base_price_minor: 69900,
                anchor_price_minor: 89900,
                duration_days: 90,
                downloads: DownloadQuota::Unlimited,
                hierarchy: 4,
                features: vec![
                    "Unlimited Downloads".to_string(),
                    "AI Job Search (100 jobs/day)".to_string(),
                    "3 Month Career Roadmap".to_string(),
                    "Priority Support".to_string(),
                ],
            },
            PlanDefinition {
                id: PlanId::SixMonth,
                name: "Ultimate (Complete Success Kit)".to_string(),
                base_price_minor: 89900,
                anchor_price_minor: 129900,
                duration_days: 180,
                downloads: DownloadQuota::Unlimited,
                hierarchy: 5,
                features: vec![
                    "Unlimited Downloads".to_string(),
                    "AI Job Search (Unlimited)".to_string(),
                    "Interview Prep Kit".to_string(),
                    "6 Month Career Roadmap".to_string(),
                ],
            },
        ];

        let addons = vec![
            AddonDefinition {
                id: AddonId::OneTimeDownload,
                name: "One-Time Download".to_string(),
                base_price_minor: 9900,
                duration: AddonDuration::OneTime,
                description: "Download just this document without a plan".to_string(),
                features: vec![
                    "Single Document Download".to_string(),
                    "No Subscription".to_string(),
                    "Instant Access".to_string(),
                ],
            },
            AddonDefinition {
                id: AddonId::ProfileSlot,
                name: "Additional Profile Slot".to_string(),
                base_price_minor: 29900,
                duration: AddonDuration::Unlimited,
                description: "Add a slot for a friend or family member".to_string(),
                features: vec![
                    "Create One Additional Profile".to_string(),
                    "Download Documents for this Profile".to_string(),
                    "Lifetime Access".to_string(),
                ],
            },
        ];

        let coupons = vec![
            CouponDefinition {
                code: "SAVE10".to_string(),
                rate: DiscountRate::from_percent(10),
                label: "10% OFF".to_string(),
            },
            CouponDefinition {
                code: "SAVE15".to_string(),
                rate: DiscountRate::from_percent(15),
                label: "15% OFF".to_string(),
            },
            CouponDefinition {
                code: "SAVE20".to_string(),
                rate: DiscountRate::from_percent(20),
                label: "20% OFF".to_string(),
            },
            CouponDefinition {
                code: "SAVE30".to_string(),
                rate: DiscountRate::from_percent(30),
                label: "30% OFF".to_string(),
            },
            CouponDefinition {
                code: "SAVE75".to_string(),
                rate: DiscountRate::from_parts_per_100k(75_377),
                label: "75% OFF".to_string(),
            },
            CouponDefinition {
                code: "RESOLUTION2026".to_string(),
                rate: DiscountRate::from_percent(20),
                label: "20% OFF".to_string(),
            },
        ];

        // USD numbers are hand-tuned by the pricing team; the formula would
        // produce $9.95 / $9.95 / $24.95 / $34.95 / $44.95 for these plans.
        let plan_overrides = vec![
            PlanPriceOverride {
                plan: PlanId::OneDay,
                currency: Currency::Usd,
                price_minor: 999,
                anchor_minor: Some(1299),
            },
            PlanPriceOverride {
                plan: PlanId::Basic,
                currency: Currency::Usd,
                price_minor: 1399,
                anchor_minor: Some(1699),
            },
            PlanPriceOverride {
                plan: PlanId::Monthly,
                currency: Currency::Usd,
                price_minor: 2499,
                anchor_minor: Some(2499),
            },
            PlanPriceOverride {
                plan: PlanId::Quarterly,
                currency: Currency::Usd,
                price_minor: 4499,
                anchor_minor: Some(4499),
            },
            PlanPriceOverride {
                plan: PlanId::SixMonth,
                currency: Currency::Usd,
                price_minor: 5999,
                anchor_minor: Some(5999),
            },
        ];

        let addon_overrides = vec![
            AddonPriceOverride {
                addon: AddonId::OneTimeDownload,
                currency: Currency::Usd,
                price_minor: 299,
            },
            AddonPriceOverride {
                addon: AddonId::ProfileSlot,
                currency: Currency::Usd,
                price_minor: 499,
            },
        ];

        let catalog = PriceCatalog {
            plans,
            addons,
            coupons,
            plan_overrides,
            addon_overrides,
        };
        debug_assert!(catalog.validate().is_ok());
        catalog
    }

    /// Builds a catalog from JSON configuration, applying the same
    /// validation as the built-in dataset.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: PriceCatalog =
            serde_json::from_str(json).map_err(|e| CatalogError::Malformed(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Structural validation: price sanity, coupon rate bounds, no
    /// duplicate definitions.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for plan in &self.plans {
            if plan.base_price_minor < 0 || plan.anchor_price_minor < 0 {
                return Err(CatalogError::NegativePrice {
                    item: plan.id.as_str().to_string(),
                });
            }
        }
        for addon in &self.addons {
            if addon.base_price_minor < 0 {
                return Err(CatalogError::NegativePrice {
                    item: addon.id.as_str().to_string(),
                });
            }
        }
        for coupon in &self.coupons {
            if !coupon.rate.is_valid() {
                return Err(CatalogError::InvalidCouponRate {
                    code: coupon.code.clone(),
                    parts: coupon.rate.parts_per_100k(),
                });
            }
        }
        for (i, plan) in self.plans.iter().enumerate() {
            if self.plans[..i].iter().any(|p| p.id == plan.id) {
                return Err(CatalogError::Duplicate {
                    item: plan.id.as_str().to_string(),
                });
            }
        }
        for (i, addon) in self.addons.iter().enumerate() {
            if self.addons[..i].iter().any(|a| a.id == addon.id) {
                return Err(CatalogError::Duplicate {
                    item: addon.id.as_str().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Looks up a plan definition.
    pub fn plan(&self, id: PlanId) -> Option<&PlanDefinition> {
        self.plans.iter().find(|p| p.id == id)
    }

    /// Looks up an add-on definition.
    pub fn addon(&self, id: AddonId) -> Option<&AddonDefinition> {
        self.addons.iter().find(|a| a.id == id)
    }

    /// Case-insensitive coupon lookup.
    ///
    /// Coupon codes are untrusted user input: an unknown code returns
    /// `None`, which callers treat as "no discount", never an error.
    pub fn coupon(&self, code: &str) -> Option<&CouponDefinition> {
        let code = code.trim();
        self.coupons
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }

    /// The closed set of supported currency codes.
    pub fn currencies(&self) -> &'static [Currency] {
        &Currency::ALL
    }

    /// All plan definitions, lowest tier first.
    pub fn plans(&self) -> &[PlanDefinition] {
        &self.plans
    }

    /// All add-on definitions.
    pub fn addons(&self) -> &[AddonDefinition] {
        &self.addons
    }

    /// Declared charge override for a (plan, currency) pair.
    pub fn plan_override(&self, plan: PlanId, currency: Currency) -> Option<i64> {
        self.plan_overrides
            .iter()
            .find(|o| o.plan == plan && o.currency == currency)
            .map(|o| o.price_minor)
    }

    /// Declared anchor override for a (plan, currency) pair.
    pub fn plan_anchor_override(&self, plan: PlanId, currency: Currency) -> Option<i64> {
        self.plan_overrides
            .iter()
            .find(|o| o.plan == plan && o.currency == currency)
            .and_then(|o| o.anchor_minor)
    }

    /// Declared charge override for an (add-on, currency) pair.
    pub fn addon_override(&self, addon: AddonId, currency: Currency) -> Option<i64> {
        self.addon_overrides
            .iter()
            .find(|o| o.addon == addon && o.currency == currency)
            .map(|o| o.price_minor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_validates() {
        let catalog = PriceCatalog::builtin();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.plans().len(), 5);
        assert_eq!(catalog.addons().len(), 2);
    }

    #[test]
    fn test_plan_lookup() {
        let catalog = PriceCatalog::builtin();
        let monthly = catalog.plan(PlanId::Monthly).unwrap();
        assert_eq!(monthly.base_price_minor, 49900);
        assert_eq!(monthly.anchor_price_minor, 69900);
        assert_eq!(monthly.downloads, DownloadQuota::Unlimited);
    }

    #[test]
    fn test_addon_lookup() {
        let catalog = PriceCatalog::builtin();
        let slot = catalog.addon(AddonId::ProfileSlot).unwrap();
        assert_eq!(slot.base_price_minor, 29900);
        assert_eq!(slot.duration, AddonDuration::Unlimited);
    }

    #[test]
    fn test_coupon_lookup_is_case_insensitive() {
        let catalog = PriceCatalog::builtin();
        assert!(catalog.coupon("SAVE10").is_some());
        assert!(catalog.coupon("save10").is_some());
        assert!(catalog.coupon(" Save10 ").is_some());
        assert!(catalog.coupon("FAKE50").is_none());
    }

    #[test]
    fn test_hierarchy_is_strictly_ordered() {
        let catalog = PriceCatalog::builtin();
        let ranks: Vec<u8> = catalog.plans().iter().map(|p| p.hierarchy).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ranks, sorted);
    }

    #[test]
    fn test_addon_id_from_wire() {
        assert_eq!(AddonId::from_wire("profile_slot"), Some(AddonId::ProfileSlot));
        assert_eq!(
            AddonId::from_wire("one_time_download"),
            Some(AddonId::OneTimeDownload)
        );
        // Retired or mistyped ids are simply unknown
        assert_eq!(AddonId::from_wire("job_tracker"), None);
    }

    #[test]
    fn test_override_lookup() {
        let catalog = PriceCatalog::builtin();
        assert_eq!(
            catalog.plan_override(PlanId::Monthly, Currency::Usd),
            Some(2499)
        );
        // No EUR overrides: the formula rules there
        assert_eq!(catalog.plan_override(PlanId::Monthly, Currency::Eur), None);
        assert_eq!(
            catalog.addon_override(AddonId::ProfileSlot, Currency::Usd),
            Some(499)
        );
    }

    #[test]
    fn test_from_json_round_trip() {
        let catalog = PriceCatalog::builtin();
        let json = serde_json::to_string(&catalog).unwrap();
        let restored = PriceCatalog::from_json(&json).unwrap();
        assert_eq!(restored.plans().len(), catalog.plans().len());
        assert_eq!(
            restored.plan_override(PlanId::Basic, Currency::Usd),
            Some(1399)
        );
    }

    #[test]
    fn test_from_json_rejects_bad_coupon_rate() {
        let mut catalog = PriceCatalog::builtin();
        catalog.coupons.push(CouponDefinition {
            code: "FREE100".to_string(),
            rate: DiscountRate::from_parts_per_100k(100_000),
            label: "100% OFF".to_string(),
        });
        let json = serde_json::to_string(&catalog).unwrap();
        assert!(matches!(
            PriceCatalog::from_json(&json),
            Err(CatalogError::InvalidCouponRate { .. })
        ));
    }
}
