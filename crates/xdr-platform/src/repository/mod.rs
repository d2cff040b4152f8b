//! Repository Layer
//!
//! SQLite repositories for all domain entities. Queries are built at runtime
//! with `sqlx::query` so no database is needed at compile time.

pub mod user;
pub mod event;
pub mod incident;
pub mod asset;
pub mod alert_rule;
pub mod audit_log;

pub use user::{IdentityStore, UserRepository};
pub use event::{EventFilter, EventRepository};
pub use incident::IncidentRepository;
pub use asset::AssetRepository;
pub use alert_rule::AlertRuleRepository;
pub use audit_log::{AuditLogFilter, AuditLogRepository};

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::error::{PlatformError, Result};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    full_name TEXT NOT NULL,
    role TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS security_events (
    id TEXT PRIMARY KEY,
    timestamp TEXT NOT NULL,
    severity TEXT NOT NULL,
    event_type TEXT NOT NULL,
    source TEXT NOT NULL,
    description TEXT NOT NULL,
    status TEXT NOT NULL,
    affected_assets TEXT NOT NULL DEFAULT '[]',
    iocs TEXT NOT NULL DEFAULT '[]',
    mitre TEXT NOT NULL DEFAULT '[]'
);
CREATE INDEX IF NOT EXISTS idx_events_severity ON security_events(severity);
CREATE INDEX IF NOT EXISTS idx_events_status ON security_events(status);

CREATE TABLE IF NOT EXISTS incidents (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    severity TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    assignee TEXT NOT NULL,
    description TEXT NOT NULL,
    affected_systems INTEGER NOT NULL DEFAULT 0,
    related_events TEXT NOT NULL DEFAULT '[]',
    timeline TEXT NOT NULL DEFAULT '[]'
);
CREATE INDEX IF NOT EXISTS idx_incidents_status ON incidents(status);

CREATE TABLE IF NOT EXISTS assets (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    asset_type TEXT NOT NULL,
    os TEXT NOT NULL,
    ip TEXT NOT NULL,
    status TEXT NOT NULL,
    last_seen TEXT NOT NULL,
    owner TEXT NOT NULL,
    department TEXT NOT NULL,
    risk_score INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS alert_rules (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    severity TEXT NOT NULL,
    enabled INTEGER NOT NULL DEFAULT 1,
    conditions TEXT NOT NULL,
    actions TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS audit_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    action TEXT NOT NULL,
    resource_type TEXT NOT NULL,
    resource_id TEXT,
    details TEXT,
    ip_address TEXT,
    timestamp TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_audit_logs_timestamp ON audit_logs(timestamp);
"#;

/// Open a pool. `sqlite::memory:` gets a single, never-recycled connection
/// so every query sees the same database.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.foreign_keys(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?
    };

    Ok(pool)
}

/// Create all tables and indexes. Safe to run on every start.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    info!("Database schema ready");
    Ok(())
}

/// Next numeric suffix for ids of the form `{prefix}NNN`.
pub(crate) async fn next_sequence(pool: &SqlitePool, table: &str, prefix: &str) -> Result<i64> {
    let sql = format!(
        "SELECT MAX(CAST(SUBSTR(id, {}) AS INTEGER)) FROM {} WHERE id LIKE ?",
        prefix.len() + 1,
        table
    );
    let max: Option<i64> = sqlx::query_scalar(&sql)
        .bind(format!("{}%", prefix))
        .fetch_one(pool)
        .await?;
    Ok(max.unwrap_or(0) + 1)
}

pub(crate) fn format_id(prefix: &str, sequence: i64) -> String {
    format!("{}{:03}", prefix, sequence)
}

pub(crate) fn encode_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<T> {
    Ok(serde_json::from_str(text)?)
}

/// Parse a stored enum column. A bad value is data corruption, not a client
/// error.
pub(crate) fn parse_column<T>(value: &str, column: &str) -> Result<T>
where
    T: FromStr<Err = PlatformError>,
{
    value.parse().map_err(|_| {
        PlatformError::internal(format!("Unexpected value '{}' in column {}", value, column))
    })
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = connect("sqlite::memory:", 1).await.unwrap();
    init_schema(&pool).await.unwrap();
    pool
}
