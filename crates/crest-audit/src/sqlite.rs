//! # SQLite Audit Sink
//!
//! Durable incident persistence on SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     SQLite Incident Store                               │
//! │                                                                         │
//! │  Service startup                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AuditDbConfig::new(path) ← Configure pool settings                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteAuditSink::connect(config).await ← Create pool + migrations     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  record(incident) ── INSERT OR IGNORE ──► security_incidents           │
//! │                                                                         │
//! │  INSERT OR IGNORE + uuid primary key = retried writes are idempotent   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! WAL (Write-Ahead Logging) is enabled so incident review queries never
//! block incident writes, and vice versa.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crest_core::{Currency, PlanId, SecurityIncident};

use crate::error::{AuditError, AuditResult};
use crate::sink::SecurityAuditSink;

/// Embedded migrations from the `migrations/sqlite` directory.
///
/// The `sqlx::migrate!()` macro embeds all SQL files from the workspace
/// migrations directory into the binary at compile time; no runtime file
/// access is needed.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

// =============================================================================
// Configuration
// =============================================================================

/// Audit database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = AuditDbConfig::new("/var/lib/crest/audit.db").max_connections(5);
/// let sink = SqliteAuditSink::connect(config).await?;
/// ```
#[derive(Debug, Clone)]
pub struct AuditDbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (writes are tiny and infrequent)
    pub max_connections: u32,

    /// Connection timeout duration.
    pub connect_timeout: Duration,

    /// Whether to run migrations on connect.
    pub run_migrations: bool,
}

impl AuditDbConfig {
    /// Creates a configuration with the given database path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        AuditDbConfig {
            database_path: path.into(),
            max_connections: 5,
            connect_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

// =============================================================================
// Sink
// =============================================================================

/// SQLite-backed [`SecurityAuditSink`].
#[derive(Debug, Clone)]
pub struct SqliteAuditSink {
    pool: SqlitePool,
}

impl SqliteAuditSink {
    /// Opens (creating if missing) the incident database and runs pending
    /// migrations.
    pub async fn connect(config: AuditDbConfig) -> AuditResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.database_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| AuditError::ConnectionFailed(e.to_string()))?;

        let sink = SqliteAuditSink { pool };
        if config.run_migrations {
            sink.run_migrations().await?;
        }

        info!(path = %config.database_path.display(), "Audit store ready");
        Ok(sink)
    }

    /// Opens an in-memory store (tests, local development).
    ///
    /// A single connection is mandatory here: each in-memory SQLite
    /// connection owns its own private database.
    pub async fn in_memory() -> AuditResult<Self> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .journal_mode(SqliteJournalMode::Memory);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| AuditError::ConnectionFailed(e.to_string()))?;

        let sink = SqliteAuditSink { pool };
        sink.run_migrations().await?;
        Ok(sink)
    }

    /// Runs all pending migrations.
    pub async fn run_migrations(&self) -> AuditResult<()> {
        MIGRATOR.run(&self.pool).await?;
        debug!("Audit store migrations complete");
        Ok(())
    }

    /// Total number of stored incidents.
    pub async fn count(&self) -> AuditResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM security_incidents")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Most recent incidents, newest first.
    pub async fn recent(&self, limit: i64) -> AuditResult<Vec<SecurityIncident>> {
        let rows: Vec<IncidentRow> = sqlx::query_as(
            r#"
            SELECT id, incident_type, provided_amount, expected_amount,
                   currency, plan_id, coupon_code, addon_ids, created_at
            FROM security_incidents
            ORDER BY created_at DESC, id
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(IncidentRow::into_incident).collect()
    }
}

#[async_trait]
impl SecurityAuditSink for SqliteAuditSink {
    async fn record(&self, incident: &SecurityIncident) -> AuditResult<()> {
        let addon_ids = serde_json::to_string(&incident.addon_ids)
            .map_err(|e| AuditError::WriteFailed(e.to_string()))?;

        // INSERT OR IGNORE: a retried delivery of the same incident id is
        // a no-op, which is exactly the at-least-once contract.
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO security_incidents
                (id, incident_type, provided_amount, expected_amount,
                 currency, plan_id, coupon_code, addon_ids, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(incident.id.to_string())
        .bind(&incident.incident_type)
        .bind(incident.provided_amount)
        .bind(incident.expected_amount)
        .bind(incident.currency.code())
        .bind(incident.plan_id.map(|p| p.as_str()))
        .bind(&incident.coupon_code)
        .bind(addon_ids)
        .bind(incident.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw `security_incidents` row.
#[derive(Debug, sqlx::FromRow)]
struct IncidentRow {
    id: String,
    incident_type: String,
    provided_amount: i64,
    expected_amount: i64,
    currency: String,
    plan_id: Option<String>,
    coupon_code: Option<String>,
    addon_ids: String,
    created_at: String,
}

impl IncidentRow {
    fn into_incident(self) -> AuditResult<SecurityIncident> {
        let corrupt = |reason: String| AuditError::CorruptRow {
            id: self.id.clone(),
            reason,
        };

        let id = self
            .id
            .parse()
            .map_err(|_| corrupt("invalid uuid".to_string()))?;
        let currency = Currency::from_code(&self.currency)
            .ok_or_else(|| corrupt(format!("unknown currency {}", self.currency)))?;
        let plan_id = match &self.plan_id {
            Some(raw) => Some(
                PlanId::from_wire(raw)
                    .ok_or_else(|| corrupt(format!("unknown plan {raw}")))?,
            ),
            None => None,
        };
        let addon_ids: Vec<String> = serde_json::from_str(&self.addon_ids)
            .map_err(|e| corrupt(format!("bad addon list: {e}")))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| corrupt(format!("bad timestamp: {e}")))?
            .with_timezone(&Utc);

        Ok(SecurityIncident {
            id,
            incident_type: self.incident_type,
            provided_amount: self.provided_amount,
            expected_amount: self.expected_amount,
            currency,
            plan_id,
            coupon_code: self.coupon_code,
            addon_ids,
            created_at,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn incident(provided: i64, expected: i64) -> SecurityIncident {
        SecurityIncident {
            id: Uuid::new_v4(),
            incident_type: "PRICE_MANIPULATION".to_string(),
            provided_amount: provided,
            expected_amount: expected,
            currency: Currency::Inr,
            plan_id: Some(PlanId::Basic),
            coupon_code: Some("SAVE10".to_string()),
            addon_ids: vec!["profile_slot".to_string()],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_and_read_back() {
        let sink = SqliteAuditSink::in_memory().await.unwrap();

        sink.record(&incident(19900, 49800)).await.unwrap();
        assert_eq!(sink.count().await.unwrap(), 1);

        let stored = sink.recent(10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].provided_amount, 19900);
        assert_eq!(stored[0].expected_amount, 49800);
        assert_eq!(stored[0].currency, Currency::Inr);
        assert_eq!(stored[0].plan_id, Some(PlanId::Basic));
        assert_eq!(stored[0].addon_ids, vec!["profile_slot".to_string()]);
    }

    #[tokio::test]
    async fn test_retried_write_is_deduplicated() {
        let sink = SqliteAuditSink::in_memory().await.unwrap();
        let one = incident(100, 200);

        sink.record(&one).await.unwrap();
        sink.record(&one).await.unwrap();
        sink.record(&one).await.unwrap();

        assert_eq!(sink.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_distinct_incidents_all_stored() {
        let sink = SqliteAuditSink::in_memory().await.unwrap();

        sink.record(&incident(100, 200)).await.unwrap();
        sink.record(&incident(300, 400)).await.unwrap();

        assert_eq!(sink.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_addon_only_incident_round_trips() {
        let sink = SqliteAuditSink::in_memory().await.unwrap();

        let mut one = incident(1, 29900);
        one.plan_id = None;
        one.coupon_code = None;
        sink.record(&one).await.unwrap();

        let stored = sink.recent(1).await.unwrap();
        assert_eq!(stored[0].plan_id, None);
        assert_eq!(stored[0].coupon_code, None);
    }
}
