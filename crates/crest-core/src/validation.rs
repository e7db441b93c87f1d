//! # Validation Module
//!
//! Field-level input validation for checkout requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP deserialization (serde)                                 │
//! │  ├── Type checks, closed enums (unknown planId → 400)                  │
//! │  └── Rejected before any business logic                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - field rules                                    │
//! │  ├── amount must be positive                                           │
//! │  └── add-on selection bounded, metadata bounded                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: CheckoutValidator - the recomputed-price tamper check        │
//! │                                                                         │
//! │  Defense in depth: every layer assumes the client is hostile           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_ADDON_SELECTION, METADATA_VALUE_MAX_LEN};

/// Result type for validation operations.
pub type FieldResult<T> = Result<T, ValidationError>;

/// Validates a client-submitted amount in minor units.
///
/// ## Rules
/// - Must be positive (> 0): zero-amount checkouts don't exist, and a
///   negative amount is never legitimate input
pub fn validate_amount_minor(minor: i64) -> FieldResult<()> {
    if minor <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a submitted currency code's shape (not its membership in the
/// supported set - that is the validator's `UnsupportedCurrency` check).
///
/// ## Rules
/// - Must not be empty
/// - At most 8 characters (real ISO codes are 3; anything longer is junk)
pub fn validate_currency_code(code: &str) -> FieldResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "currency".to_string(),
        });
    }

    if code.len() > 8 {
        return Err(ValidationError::TooLong {
            field: "currency".to_string(),
            max: 8,
        });
    }

    Ok(())
}

/// Validates the add-on selection size.
///
/// ## Rules
/// - At most MAX_ADDON_SELECTION entries. The catalog only has a handful
///   of add-ons; a huge list is abuse, not a real cart.
pub fn validate_addon_selection(count: usize) -> FieldResult<()> {
    if count > MAX_ADDON_SELECTION {
        return Err(ValidationError::OutOfRange {
            field: "addonIds".to_string(),
            min: 0,
            max: MAX_ADDON_SELECTION as i64,
        });
    }

    Ok(())
}

/// Truncates an opaque fulfillment metadata value to the persisted limit.
///
/// Metadata is pass-through for fulfillment and gateway storage; values
/// are clipped rather than rejected so overlong acquisition junk cannot
/// fail a purchase.
pub fn clip_metadata_value(value: &str) -> String {
    if value.len() <= METADATA_VALUE_MAX_LEN {
        return value.to_string();
    }
    // Clip on a char boundary so multi-byte values can't split mid-char
    let mut end = METADATA_VALUE_MAX_LEN;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amount_minor() {
        assert!(validate_amount_minor(1).is_ok());
        assert!(validate_amount_minor(49900).is_ok());

        assert!(validate_amount_minor(0).is_err());
        assert!(validate_amount_minor(-100).is_err());
    }

    #[test]
    fn test_validate_currency_code() {
        assert!(validate_currency_code("INR").is_ok());
        assert!(validate_currency_code("XYZ").is_ok()); // shape ok, support checked later

        assert!(validate_currency_code("").is_err());
        assert!(validate_currency_code("   ").is_err());
        assert!(validate_currency_code("NOTACURRENCY").is_err());
    }

    #[test]
    fn test_validate_addon_selection() {
        assert!(validate_addon_selection(0).is_ok());
        assert!(validate_addon_selection(MAX_ADDON_SELECTION).is_ok());
        assert!(validate_addon_selection(MAX_ADDON_SELECTION + 1).is_err());
    }

    #[test]
    fn test_clip_metadata_value() {
        assert_eq!(clip_metadata_value("gclid=abc"), "gclid=abc");

        let long = "x".repeat(METADATA_VALUE_MAX_LEN + 50);
        assert_eq!(clip_metadata_value(&long).len(), METADATA_VALUE_MAX_LEN);

        // Multi-byte content clips on a char boundary without panicking
        let emoji = "é".repeat(METADATA_VALUE_MAX_LEN);
        let clipped = clip_metadata_value(&emoji);
        assert!(clipped.len() <= METADATA_VALUE_MAX_LEN);
        assert!(clipped.chars().all(|c| c == 'é'));
    }
}
