//! # Audit Store Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AuditError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tracing::error! in the checkout service (operational channel)         │
//! │                                                                         │
//! │  NEVER propagated to the end user: the reject decision stands even     │
//! │  when the audit write fails.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Audit store operation errors.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Incident insert failed.
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored row could not be decoded back into an incident.
    #[error("Corrupt incident row {id}: {reason}")]
    CorruptRow { id: String, reason: String },
}

/// Convert sqlx errors to AuditError.
impl From<sqlx::Error> for AuditError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                AuditError::ConnectionFailed(err.to_string())
            }
            sqlx::Error::Database(db_err) => AuditError::WriteFailed(db_err.message().to_string()),
            other => AuditError::QueryFailed(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AuditError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AuditError::MigrationFailed(err.to_string())
    }
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
