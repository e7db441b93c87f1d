//! # Crest Checkout API
//!
//! HTTP server exposing the pricing engine and checkout-amount validator.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Checkout API Server                              │
//! │                                                                         │
//! │  Frontend ───► HTTP (8080) ───► CheckoutService ───► crest-core        │
//! │                                      │                                  │
//! │                      ┌───────────────┴──────────────┐                   │
//! │                      ▼                              ▼                   │
//! │                SQLite audit store           Payment gateway             │
//! │                (reject path)                (accept path)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `CHECKOUT_HTTP_PORT` - HTTP port (default: 8080)
//! - `CHECKOUT_AUDIT_DB_PATH` - SQLite path for incidents
//! - `CHECKOUT_CATALOG_PATH` - optional JSON catalog override
//! - `STRIPE_SECRET_KEY` - gateway secret
//! - `CHECKOUT_BASE_URL` - redirect base for success/cancel pages

pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod service;

// Re-exports
pub use config::ApiConfig;
pub use error::ApiError;
pub use service::CheckoutService;

/// Shared application state.
///
/// Everything in here is immutable after startup; handlers share it via
/// `Arc`. A configuration reload would build a fresh `AppState` and swap
/// the pointer, never mutate in place.
pub struct AppState {
    /// The checkout orchestration service.
    pub service: CheckoutService,

    /// Loaded configuration.
    pub config: ApiConfig,
}
