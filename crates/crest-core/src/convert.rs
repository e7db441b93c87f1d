//! # Currency Conversion
//!
//! Turns reference-currency catalog prices into per-currency prices.
//!
//! ## Conversion Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Price Resolution Order                             │
//! │                                                                         │
//! │  plan_price(monthly, USD)                                              │
//! │       │                                                                 │
//! │       ├── Declared override for (monthly, USD)?                         │
//! │       │        │                                                        │
//! │       │        └── YES → return override, UNCONDITIONALLY              │
//! │       │                  ($24.99, hand-tuned clean number)             │
//! │       │                                                                 │
//! │       └── NO → formula: round_half_up(base × multiplier)               │
//! │                  49900 × 0.05 = 2495 → $24.95                          │
//! │                                                                         │
//! │  The override always wins. Blending it with the formula would make    │
//! │  the computed "truth" price depend on evaluation order - the tamper   │
//! │  check requires one deterministic answer.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::catalog::{AddonId, PlanId, PriceCatalog};
use crate::currency::Currency;
use crate::money::Money;

/// Converts reference-currency catalog prices into target-currency prices.
///
/// Stateless beyond the borrowed catalog; every method is a pure function
/// of its arguments.
#[derive(Debug, Clone, Copy)]
pub struct CurrencyConverter<'a> {
    catalog: &'a PriceCatalog,
}

impl<'a> CurrencyConverter<'a> {
    /// Creates a converter over the given catalog.
    pub fn new(catalog: &'a PriceCatalog) -> Self {
        CurrencyConverter { catalog }
    }

    /// Computes a plan's chargeable price in the target currency.
    ///
    /// Returns `None` only when the plan is not declared in the catalog
    /// (possible with config-driven catalogs); callers treat that like any
    /// other retired item.
    pub fn plan_price(&self, plan: PlanId, currency: Currency) -> Option<Money> {
        if let Some(override_minor) = self.catalog.plan_override(plan, currency) {
            return Some(Money::from_minor(override_minor));
        }
        let definition = self.catalog.plan(plan)?;
        Some(definition.base_price().scale(currency.multiplier()))
    }

    /// Computes a plan's anchor ("was") price in the target currency.
    ///
    /// Anchor prices follow the same override-then-formula rule; they are
    /// display framing only and never feed the charge amount.
    pub fn plan_anchor_price(&self, plan: PlanId, currency: Currency) -> Option<Money> {
        if let Some(override_minor) = self.catalog.plan_anchor_override(plan, currency) {
            return Some(Money::from_minor(override_minor));
        }
        let definition = self.catalog.plan(plan)?;
        Some(definition.anchor_price().scale(currency.multiplier()))
    }

    /// Computes an add-on's chargeable price in the target currency.
    pub fn addon_price(&self, addon: AddonId, currency: Currency) -> Option<Money> {
        if let Some(override_minor) = self.catalog.addon_override(addon, currency) {
            return Some(Money::from_minor(override_minor));
        }
        let definition = self.catalog.addon(addon)?;
        Some(definition.base_price().scale(currency.multiplier()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_currency_is_identity() {
        let catalog = PriceCatalog::builtin();
        let converter = CurrencyConverter::new(&catalog);

        assert_eq!(
            converter.plan_price(PlanId::Monthly, Currency::Inr).unwrap().minor(),
            49900
        );
        assert_eq!(
            converter.addon_price(AddonId::ProfileSlot, Currency::Inr).unwrap().minor(),
            29900
        );
    }

    #[test]
    fn test_formula_drives_currencies_without_overrides() {
        let catalog = PriceCatalog::builtin();
        let converter = CurrencyConverter::new(&catalog);

        // EUR: 49900 × 0.046 = 2295.4 → 2295
        assert_eq!(
            converter.plan_price(PlanId::Monthly, Currency::Eur).unwrap().minor(),
            2295
        );
        // GBP: 49900 × 0.04 = 1996
        assert_eq!(
            converter.plan_price(PlanId::Monthly, Currency::Gbp).unwrap().minor(),
            1996
        );
        // AED: 49900 × 0.18 = 8982 (presentation rounding happens later)
        assert_eq!(
            converter.plan_price(PlanId::Monthly, Currency::Aed).unwrap().minor(),
            8982
        );
    }

    #[test]
    fn test_override_beats_formula() {
        let catalog = PriceCatalog::builtin();
        let converter = CurrencyConverter::new(&catalog);

        // Formula would give 49900 × 0.05 = 2495; the declared $24.99 wins
        assert_eq!(
            converter.plan_price(PlanId::Monthly, Currency::Usd).unwrap().minor(),
            2499
        );
        // Same for add-ons: formula gives 1495, declared $4.99 wins
        assert_eq!(
            converter.addon_price(AddonId::ProfileSlot, Currency::Usd).unwrap().minor(),
            499
        );
    }

    #[test]
    fn test_every_declared_override_wins_everywhere() {
        let catalog = PriceCatalog::builtin();
        let converter = CurrencyConverter::new(&catalog);

        for plan in PlanId::ALL {
            for currency in Currency::ALL {
                let price = converter.plan_price(plan, currency).unwrap();
                match catalog.plan_override(plan, currency) {
                    Some(declared) => assert_eq!(price.minor(), declared),
                    None => {
                        let base = catalog.plan(plan).unwrap().base_price();
                        assert_eq!(price, base.scale(currency.multiplier()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_anchor_prices_follow_same_rule() {
        let catalog = PriceCatalog::builtin();
        let converter = CurrencyConverter::new(&catalog);

        // Declared USD anchor
        assert_eq!(
            converter.plan_anchor_price(PlanId::OneDay, Currency::Usd).unwrap().minor(),
            1299
        );
        // Formula anchor for EUR: 39900 × 0.046 = 1835.4 → 1835
        assert_eq!(
            converter.plan_anchor_price(PlanId::OneDay, Currency::Eur).unwrap().minor(),
            1835
        );
    }
}
