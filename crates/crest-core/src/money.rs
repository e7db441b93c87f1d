//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In a checkout validator that recomputes a "truth" price, a single     │
//! │  off-by-one minor unit turns a legitimate purchase into a false        │
//! │  tamper rejection - or lets a manipulated amount slip through.         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    49900 paise, 2499 cents - plain i64 everywhere.                     │
//! │    Rounding happens at exactly two defined points (post-discount,      │
//! │    post-presentation-rounding), always round-half-up, and nowhere      │
//! │    else.                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use crest_core::money::Money;
//! use crest_core::catalog::DiscountRate;
//!
//! // Create from minor units (the only way)
//! let price = Money::from_minor(49900); // ₹499.00
//!
//! // Apply a 10% coupon with round-half-up
//! let discounted = price.apply_discount(DiscountRate::from_parts_per_100k(10_000));
//! assert_eq!(discounted.minor(), 44910);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::catalog::DiscountRate;
use crate::currency::PppMultiplier;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise, cents, fils).
///
/// ## Design Decisions
/// - **i64 (signed)**: differences can be negative before `abs()`
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
///
/// Every chargeable amount in the system flows through this type: catalog
/// base prices, converted per-currency prices, discounted totals, and the
/// final amount handed to the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use crest_core::money::Money;
    ///
    /// let price = Money::from_minor(49900); // ₹499.00 in paise
    /// assert_eq!(price.minor(), 49900);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major-unit portion (rupees, dollars, dirhams).
    ///
    /// All supported currencies declare 100 minor units per major unit,
    /// so this is a plain division by 100.
    #[inline]
    pub const fn major_part(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit remainder (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    ///
    /// Used for the client-vs-computed amount difference in the tamper
    /// check, which compares `|provided - expected|` to the tolerance.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Scales a reference-currency price by a purchasing-power multiplier.
    ///
    /// ## Rounding
    /// Round-half-up via integer math: `(minor * bps + 5000) / 10000`.
    /// The `+5000` term is half the scale, so `.5` boundaries round up.
    /// i128 intermediates prevent overflow on large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use crest_core::money::Money;
    /// use crest_core::currency::PppMultiplier;
    ///
    /// let base = Money::from_minor(49900);          // ₹499.00
    /// let usd = base.scale(PppMultiplier::from_bps(500)); // ×0.05
    /// assert_eq!(usd.minor(), 2495);                // $24.95
    /// ```
    pub fn scale(&self, multiplier: PppMultiplier) -> Money {
        let scaled = (self.0 as i128 * multiplier.bps() as i128 + 5_000) / 10_000;
        Money::from_minor(scaled as i64)
    }

    /// Applies a coupon discount and returns the discounted amount.
    ///
    /// ## Algorithm
    /// `discount = round_half_up(minor * rate)`; `result = max(0, minor - discount)`.
    /// The clamp guarantees a coupon can never drive a price below zero.
    ///
    /// ## Example
    /// ```rust
    /// use crest_core::money::Money;
    /// use crest_core::catalog::DiscountRate;
    ///
    /// let price = Money::from_minor(49900);
    /// let ten_percent = DiscountRate::from_parts_per_100k(10_000);
    /// assert_eq!(price.apply_discount(ten_percent).minor(), 44910);
    /// ```
    pub fn apply_discount(&self, rate: DiscountRate) -> Money {
        let discount = (self.0 as i128 * rate.parts_per_100k() as i128 + 50_000) / 100_000;
        let result = (self.0 as i128 - discount).max(0);
        Money::from_minor(result as i64)
    }

    /// Rounds to the nearest multiple of `step` minor units (half-up).
    ///
    /// This is the presentation rounding applied once at the end of the
    /// charge computation: currencies whose UI shows whole round numbers
    /// declare a step of 100; exact-cent currencies declare 1 (identity).
    ///
    /// ## Example
    /// ```rust
    /// use crest_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(8982).round_to_step(100).minor(), 9000);
    /// assert_eq!(Money::from_minor(8949).round_to_step(100).minor(), 8900);
    /// assert_eq!(Money::from_minor(44910).round_to_step(1).minor(), 44910);
    /// ```
    pub fn round_to_step(&self, step: i64) -> Money {
        if step <= 1 {
            return *self;
        }
        let rounded = (self.0 + step / 2) / step * step;
        Money::from_minor(rounded)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Currency-aware formatting (symbols,
/// locale separators) belongs to the presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major_part().abs(), self.minor_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(49900);
        assert_eq!(money.minor(), 49900);
        assert_eq!(money.major_part(), 499);
        assert_eq!(money.minor_part(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_minor(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_minor(500)), "5.00");
        assert_eq!(format!("{}", Money::from_minor(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_minor(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
    }

    #[test]
    fn test_scale_rounds_half_up() {
        // 19900 × 0.05 = 995 exactly
        let base = Money::from_minor(19900);
        assert_eq!(base.scale(PppMultiplier::from_bps(500)).minor(), 995);

        // 49900 × 0.046 = 2295.4 → 2295
        assert_eq!(
            Money::from_minor(49900).scale(PppMultiplier::from_bps(460)).minor(),
            2295
        );

        // 10100 × 0.005 = 50.5 → 51 (half rounds up)
        assert_eq!(
            Money::from_minor(10100).scale(PppMultiplier::from_bps(50)).minor(),
            51
        );
    }

    #[test]
    fn test_identity_multiplier() {
        let base = Money::from_minor(89900);
        assert_eq!(base.scale(PppMultiplier::reference()).minor(), 89900);
    }

    #[test]
    fn test_apply_discount() {
        let price = Money::from_minor(49900);
        let rate = DiscountRate::from_parts_per_100k(10_000); // 10%
        assert_eq!(price.apply_discount(rate).minor(), 44910);
    }

    #[test]
    fn test_apply_discount_rounds_half_up() {
        // 999 × 15% = 149.85 → 150 discount → 849
        let price = Money::from_minor(999);
        let rate = DiscountRate::from_parts_per_100k(15_000);
        assert_eq!(price.apply_discount(rate).minor(), 849);

        // 50 × 75.377% = 37.6885 → 38 discount → 12
        let price = Money::from_minor(50);
        let rate = DiscountRate::from_parts_per_100k(75_377);
        assert_eq!(price.apply_discount(rate).minor(), 12);
    }

    #[test]
    fn test_discount_never_negative() {
        // 99.999% of 1 rounds to a full discount; result clamps at zero
        let price = Money::from_minor(1);
        let rate = DiscountRate::from_parts_per_100k(99_999);
        assert_eq!(price.apply_discount(rate).minor(), 0);

        let zero = Money::zero();
        assert_eq!(zero.apply_discount(rate).minor(), 0);
    }

    #[test]
    fn test_round_to_step() {
        assert_eq!(Money::from_minor(8982).round_to_step(100).minor(), 9000);
        assert_eq!(Money::from_minor(8949).round_to_step(100).minor(), 8900);
        // exact half rounds up
        assert_eq!(Money::from_minor(8950).round_to_step(100).minor(), 9000);
        // identity step leaves the value untouched
        assert_eq!(Money::from_minor(44910).round_to_step(1).minor(), 44910);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_minor(100);
        assert!(positive.is_positive());

        let negative = Money::from_minor(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().minor(), 100);
    }
}
