//! # Effective Pricing Resolution
//!
//! Produces the exact price table a checkout session should use, combining
//! currency conversion with device-class business rules.
//!
//! ## Resolution Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              resolve(currency, device_class)                            │
//! │                                                                         │
//! │  PriceCatalog                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CurrencyConverter  ──► price for every plan and add-on                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PRICE_SUBSTITUTIONS ──► (currency, device) rows may replace one       │
//! │       │                  plan's price with another plan's price        │
//! │       ▼                                                                 │
//! │  PriceTable (deterministic, ordered, never mutated in place)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why a Table, Not Conditionals
//! Device pricing rules used to be the kind of logic that ends up inlined
//! in UI code. Here they are rows of data: each row can be unit-tested,
//! audited, and removed without touching resolution code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::catalog::{AddonId, PlanId, PriceCatalog};
use crate::convert::CurrencyConverter;
use crate::currency::Currency;

// =============================================================================
// Device Class
// =============================================================================

/// Coarse device classification used to select alternate pricing rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, Default,
)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Desktop or unclassified web. The least restrictive class: standard
    /// pricing with no substitutions.
    #[default]
    Desktop,
    /// Android app/webview traffic.
    Android,
    /// iOS app/webview traffic.
    Ios,
}

impl DeviceClass {
    /// Resolves a client-submitted device class string.
    ///
    /// Unrecognized or missing values resolve to `Desktop` (the least
    /// restrictive classification). An unknown device must never block
    /// resolution - worst case the user sees standard pricing.
    pub fn from_wire(value: Option<&str>) -> DeviceClass {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("android") => DeviceClass::Android,
            Some(v) if v.eq_ignore_ascii_case("ios") => DeviceClass::Ios,
            Some(v) if v.eq_ignore_ascii_case("desktop") => DeviceClass::Desktop,
            _ => DeviceClass::Desktop,
        }
    }

    /// The wire identifier.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Desktop => "desktop",
            DeviceClass::Android => "android",
            DeviceClass::Ios => "ios",
        }
    }
}

// =============================================================================
// Substitution Table
// =============================================================================

/// One device-pricing rule: for (currency, device), charge `plan` at
/// `price_of`'s price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceSubstitution {
    pub currency: Currency,
    pub device: DeviceClass,
    /// The plan whose table entry is replaced.
    pub plan: PlanId,
    /// The plan whose converted price is charged instead.
    pub price_of: PlanId,
}

/// The declared device-pricing rules.
///
/// Android storefront economics make the entry-level tier unprofitable at
/// its web price point, so Android traffic is charged the starter-pack
/// rate for it. Rows are declared per currency so each market's rule can
/// be tuned (or dropped) independently.
pub const PRICE_SUBSTITUTIONS: &[PriceSubstitution] = &[
    PriceSubstitution {
        currency: Currency::Inr,
        device: DeviceClass::Android,
        plan: PlanId::OneDay,
        price_of: PlanId::Basic,
    },
    PriceSubstitution {
        currency: Currency::Usd,
        device: DeviceClass::Android,
        plan: PlanId::OneDay,
        price_of: PlanId::Basic,
    },
];

// =============================================================================
// Price Table
// =============================================================================

/// The complete per-session price table.
///
/// A pure function of (catalog, currency, device class): identical inputs
/// always produce a byte-identical table (BTreeMap keeps iteration and
/// serialization order deterministic). Tables are replaced wholesale, never
/// patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceTable {
    pub currency: Currency,
    pub device_class: DeviceClass,
    /// Chargeable plan prices in minor units.
    pub plans: BTreeMap<PlanId, i64>,
    /// Chargeable add-on prices in minor units.
    pub addons: BTreeMap<AddonId, i64>,
}

impl PriceTable {
    /// Looks up a plan's chargeable price in minor units.
    pub fn plan_minor(&self, id: PlanId) -> Option<i64> {
        self.plans.get(&id).copied()
    }

    /// Looks up an add-on's chargeable price in minor units.
    pub fn addon_minor(&self, id: AddonId) -> Option<i64> {
        self.addons.get(&id).copied()
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Builds effective price tables from the catalog, converter, and
/// substitution rules.
#[derive(Debug, Clone, Copy)]
pub struct EffectivePricingResolver<'a> {
    catalog: &'a PriceCatalog,
    converter: CurrencyConverter<'a>,
}

impl<'a> EffectivePricingResolver<'a> {
    /// Creates a resolver over the given catalog.
    pub fn new(catalog: &'a PriceCatalog) -> Self {
        EffectivePricingResolver {
            catalog,
            converter: CurrencyConverter::new(catalog),
        }
    }

    /// Resolves the price table for a (currency, device class) pair.
    ///
    /// Converts every declared plan and add-on, then applies the matching
    /// substitution rows. Idempotent: two calls with identical inputs
    /// return identical tables.
    pub fn resolve(&self, currency: Currency, device_class: DeviceClass) -> PriceTable {
        let mut plans = BTreeMap::new();
        for plan in self.catalog.plans() {
            if let Some(price) = self.converter.plan_price(plan.id, currency) {
                plans.insert(plan.id, price.minor());
            }
        }

        let mut addons = BTreeMap::new();
        for addon in self.catalog.addons() {
            if let Some(price) = self.converter.addon_price(addon.id, currency) {
                addons.insert(addon.id, price.minor());
            }
        }

        for rule in PRICE_SUBSTITUTIONS {
            if rule.currency != currency || rule.device != device_class {
                continue;
            }
            // A substitution can only reprice a plan that is actually on
            // sale; it never resurrects a retired one.
            if !plans.contains_key(&rule.plan) {
                continue;
            }
            if let Some(price) = self.converter.plan_price(rule.price_of, currency) {
                plans.insert(rule.plan, price.minor());
            }
        }

        PriceTable {
            currency,
            device_class,
            plans,
            addons,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_class_from_wire() {
        assert_eq!(DeviceClass::from_wire(Some("android")), DeviceClass::Android);
        assert_eq!(DeviceClass::from_wire(Some("Android ")), DeviceClass::Android);
        assert_eq!(DeviceClass::from_wire(Some("ios")), DeviceClass::Ios);
        assert_eq!(DeviceClass::from_wire(Some("desktop")), DeviceClass::Desktop);
    }

    #[test]
    fn test_unknown_device_defaults_to_least_restrictive() {
        assert_eq!(DeviceClass::from_wire(None), DeviceClass::Desktop);
        assert_eq!(DeviceClass::from_wire(Some("")), DeviceClass::Desktop);
        assert_eq!(DeviceClass::from_wire(Some("smart_fridge")), DeviceClass::Desktop);
    }

    #[test]
    fn test_resolve_covers_all_declared_items() {
        let catalog = PriceCatalog::builtin();
        let resolver = EffectivePricingResolver::new(&catalog);
        let table = resolver.resolve(Currency::Inr, DeviceClass::Desktop);

        assert_eq!(table.plans.len(), catalog.plans().len());
        assert_eq!(table.addons.len(), catalog.addons().len());
        assert_eq!(table.plan_minor(PlanId::Monthly), Some(49900));
        assert_eq!(table.addon_minor(AddonId::ProfileSlot), Some(29900));
    }

    #[test]
    fn test_android_substitution_applies() {
        let catalog = PriceCatalog::builtin();
        let resolver = EffectivePricingResolver::new(&catalog);

        // USD desktop: oneDay at its own declared price
        let desktop = resolver.resolve(Currency::Usd, DeviceClass::Desktop);
        assert_eq!(desktop.plan_minor(PlanId::OneDay), Some(999));

        // USD Android: oneDay charged at basic's price
        let android = resolver.resolve(Currency::Usd, DeviceClass::Android);
        assert_eq!(android.plan_minor(PlanId::OneDay), Some(1399));
        assert_eq!(
            android.plan_minor(PlanId::OneDay),
            android.plan_minor(PlanId::Basic)
        );

        // Other plans are untouched
        assert_eq!(android.plan_minor(PlanId::Monthly), desktop.plan_minor(PlanId::Monthly));
    }

    #[test]
    fn test_no_substitution_rows_for_ios_or_unlisted_currencies() {
        let catalog = PriceCatalog::builtin();
        let resolver = EffectivePricingResolver::new(&catalog);

        let ios = resolver.resolve(Currency::Usd, DeviceClass::Ios);
        let desktop = resolver.resolve(Currency::Usd, DeviceClass::Desktop);
        assert_eq!(ios.plans, desktop.plans);

        let eur_android = resolver.resolve(Currency::Eur, DeviceClass::Android);
        let eur_desktop = resolver.resolve(Currency::Eur, DeviceClass::Desktop);
        assert_eq!(eur_android.plans, eur_desktop.plans);
    }

    #[test]
    fn test_resolve_is_idempotent_and_byte_identical() {
        let catalog = PriceCatalog::builtin();
        let resolver = EffectivePricingResolver::new(&catalog);

        for currency in Currency::ALL {
            for device in [DeviceClass::Desktop, DeviceClass::Android, DeviceClass::Ios] {
                let first = resolver.resolve(currency, device);
                let second = resolver.resolve(currency, device);
                assert_eq!(first, second);
                // Byte-identical serialization, not just structural equality
                assert_eq!(
                    serde_json::to_vec(&first).unwrap(),
                    serde_json::to_vec(&second).unwrap()
                );
            }
        }
    }
}
