//! # crest-audit: Security Incident Store
//!
//! Durable, append-only persistence for checkout tamper incidents.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Incident Write Path                                │
//! │                                                                         │
//! │  CheckoutValidator (crest-core)                                        │
//! │       │  REJECT verdict carries a SecurityIncident                     │
//! │       ▼                                                                 │
//! │  Checkout service (apps/checkout-api)                                  │
//! │       │  fire-and-forget spawn; response is never delayed              │
//! │       ▼                                                                 │
//! │  dyn SecurityAuditSink ──► SqliteAuditSink (WAL, append-only)          │
//! │                       └──► MemoryAuditSink (tests)                     │
//! │                                                                         │
//! │  Failures: tracing::error! only. The rejection stands regardless.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`sink`] - The `SecurityAuditSink` trait and the in-memory impl
//! - [`sqlite`] - The durable SQLite implementation
//! - [`error`] - Store error types

pub mod error;
pub mod sink;
pub mod sqlite;

// Re-exports
pub use error::{AuditError, AuditResult};
pub use sink::{MemoryAuditSink, SecurityAuditSink};
pub use sqlite::{AuditDbConfig, SqliteAuditSink};
