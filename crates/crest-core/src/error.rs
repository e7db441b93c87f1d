//! # Error Types
//!
//! Domain-specific error types for crest-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  crest-core errors (this file)                                         │
//! │  ├── CheckoutError    - Checkout rejections resolved before money      │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── CatalogError     - Catalog configuration rejected at startup      │
//! │                                                                         │
//! │  crest-audit errors (separate crate)                                   │
//! │  └── AuditError       - Incident persistence failures                  │
//! │                                                                         │
//! │  checkout-api errors (in app)                                          │
//! │  └── ApiError         - What the HTTP client sees (serialized)         │
//! │                                                                         │
//! │  Flow: ValidationError → CheckoutError → ApiError → HTTP response      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (currency code, field name)
//! 3. Errors are enum variants, never String
//! 4. Tamper rejections are NOT errors - they are verdict data carrying an
//!    incident, so persistence and the generic user message stay decoupled

use thiserror::Error;

// =============================================================================
// Checkout Error
// =============================================================================

/// Checkout rejections resolved before any money moves.
///
/// Every variant maps to a 400-class response; none of them ever reaches
/// the payment gateway.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The submitted currency code is outside the supported set.
    ///
    /// There is no fallback currency: pricing in a currency the catalog
    /// does not declare would charge an arbitrary amount.
    #[error("Unsupported currency: {code}")]
    UnsupportedCurrency { code: String },

    /// Nothing chargeable was selected: no plan, no add-ons, and no
    /// standalone add-on flag.
    #[error("No plan or addon selected")]
    EmptySelection,

    /// Input validation failed (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when client-submitted fields don't meet requirements.
/// Used for early validation before any pricing logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Catalog Error
// =============================================================================

/// Catalog configuration rejected at construction time.
///
/// A process must refuse to start with a catalog that could misprice a
/// charge; these never occur after startup.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// JSON configuration failed to parse.
    #[error("Malformed catalog configuration: {0}")]
    Malformed(String),

    /// A plan or add-on declares a negative price.
    #[error("Negative price declared for {item}")]
    NegativePrice { item: String },

    /// A coupon rate is outside [0, 1).
    #[error("Coupon {code} has invalid rate: {parts} parts per 100k")]
    InvalidCouponRate { code: String, parts: u32 },

    /// The same plan or add-on is defined twice.
    #[error("Duplicate definition for {item}")]
    Duplicate { item: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CheckoutError.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Unit Tests
// =============================================================================
