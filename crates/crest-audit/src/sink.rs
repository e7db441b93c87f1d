//! # Audit Sink Trait
//!
//! The seam between the checkout service and incident persistence.
//!
//! ## Contract
//! - `record` is append-only and idempotent per incident id: recording the
//!   same incident twice stores it once (at-least-once delivery with the
//!   uuid as the dedup key)
//! - Errors are non-fatal to the caller: the rejection decision is
//!   authoritative even when the write fails

use async_trait::async_trait;
use std::sync::Mutex;

use crest_core::SecurityIncident;

use crate::error::AuditResult;

/// Durable, append-only store for tamper incidents.
#[async_trait]
pub trait SecurityAuditSink: Send + Sync {
    /// Persists one incident. Idempotent per `incident.id`.
    async fn record(&self, incident: &SecurityIncident) -> AuditResult<()>;
}

/// In-memory sink for tests and local development.
///
/// Deduplicates by incident id like the durable implementation, so service
/// retry logic can be exercised without a database.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    incidents: Mutex<Vec<SecurityIncident>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn recorded(&self) -> Vec<SecurityIncident> {
        self.incidents.lock().expect("audit sink mutex poisoned").clone()
    }

    /// Number of distinct incidents recorded.
    pub fn len(&self) -> usize {
        self.incidents.lock().expect("audit sink mutex poisoned").len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SecurityAuditSink for MemoryAuditSink {
    async fn record(&self, incident: &SecurityIncident) -> AuditResult<()> {
        let mut incidents = self.incidents.lock().expect("audit sink mutex poisoned");
        if !incidents.iter().any(|existing| existing.id == incident.id) {
            incidents.push(incident.clone());
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
