//! # Discount Engine
//!
//! Resolves coupon codes and applies discounts with defined rounding.
//!
//! ## Untrusted Input Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Coupon codes come straight from the client. The lookup result         │
//! │  decides the discount, never the request's claim about it:             │
//! │                                                                         │
//! │  "SAVE10"   ──► known   ──► 10% off, round-half-up                     │
//! │  "save10"   ──► known   ──► same (codes are case-insensitive keys)     │
//! │  "FAKE50"   ──► unknown ──► no discount, NOT an error                  │
//! │  8 KB blob  ──► treated as unknown ──► no discount                     │
//! │                                                                         │
//! │  A bad coupon must never hard-fail a checkout; the worst outcome of    │
//! │  a made-up code is paying full price.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::catalog::{CouponDefinition, PriceCatalog};
use crate::money::Money;

/// Longest coupon code the engine will even try to look up. Anything
/// longer is garbage input and resolves to "no discount".
pub const MAX_COUPON_CODE_LEN: usize = 64;

/// Resolves coupon codes against the catalog and applies discounts.
#[derive(Debug, Clone, Copy)]
pub struct DiscountEngine<'a> {
    catalog: &'a PriceCatalog,
}

impl<'a> DiscountEngine<'a> {
    /// Creates a discount engine over the given catalog.
    pub fn new(catalog: &'a PriceCatalog) -> Self {
        DiscountEngine { catalog }
    }

    /// Case-insensitive coupon lookup.
    ///
    /// Returns `None` for unknown codes and for codes longer than
    /// [`MAX_COUPON_CODE_LEN`]; both mean "no discount applied".
    pub fn lookup(&self, code: &str) -> Option<&'a CouponDefinition> {
        let code = code.trim();
        if code.is_empty() || code.len() > MAX_COUPON_CODE_LEN {
            return None;
        }
        self.catalog.coupon(code)
    }

    /// Applies a coupon to a price.
    ///
    /// `discount = round_half_up(price × rate)`; `result = max(0, price - discount)`.
    /// For any declared coupon, `0 <= apply(price, coupon) <= price`.
    pub fn apply(&self, price: Money, coupon: &CouponDefinition) -> Money {
        price.apply_discount(coupon.rate)
    }

    /// Convenience: looks up a code and applies it, passing the price
    /// through untouched when the code is unknown.
    pub fn apply_code(&self, price: Money, code: &str) -> Money {
        match self.lookup(code) {
            Some(coupon) => self.apply(price, coupon),
            None => price,
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
    fn test_lookup_known_codes() {
        let catalog = PriceCatalog::builtin();
        let engine = DiscountEngine::new(&catalog);

        assert!(engine.lookup("SAVE10").is_some());
        assert!(engine.lookup("save10").is_some());
        assert!(engine.lookup("Resolution2026").is_some());
    }

    #[test]
    fn test_lookup_unknown_is_none_not_error() {
        let catalog = PriceCatalog::builtin();
        let engine = DiscountEngine::new(&catalog);

        assert!(engine.lookup("FAKE50").is_none());
        assert!(engine.lookup("").is_none());
        assert!(engine.lookup(&"A".repeat(200)).is_none());
    }

    #[test]
    fn test_apply_ten_percent() {
        let catalog = PriceCatalog::builtin();
        let engine = DiscountEngine::new(&catalog);
        let coupon = engine.lookup("SAVE10").unwrap();

        assert_eq!(engine.apply(Money::from_minor(49900), coupon).minor(), 44910);
    }

    #[test]
    fn test_apply_fractional_rate() {
        let catalog = PriceCatalog::builtin();
        let engine = DiscountEngine::new(&catalog);
        let coupon = engine.lookup("SAVE75").unwrap();

        // 49900 × 0.75377 = 37613.1... → 37613 discount → 12287
        assert_eq!(engine.apply(Money::from_minor(49900), coupon).minor(), 12287);
    }

    #[test]
    fn test_apply_bounds_for_all_declared_coupons() {
        let catalog = PriceCatalog::builtin();
        let engine = DiscountEngine::new(&catalog);

        for price in [0i64, 1, 299, 999, 19900, 49900, 89900] {
            let price = Money::from_minor(price);
            for coupon in ["SAVE10", "SAVE15", "SAVE20", "SAVE30", "SAVE75", "RESOLUTION2026"] {
                let discounted = engine.apply(price, engine.lookup(coupon).unwrap());
                assert!(!discounted.is_negative());
                assert!(discounted <= price);
            }
        }
    }

    #[test]
    fn test_apply_code_unknown_is_identity() {
        let catalog = PriceCatalog::builtin();
        let engine = DiscountEngine::new(&catalog);

        let price = Money::from_minor(19900);
        assert_eq!(engine.apply_code(price, "FAKE50"), price);
        assert_eq!(engine.apply_code(price, "SAVE20").minor(), 15920);
    }
}
