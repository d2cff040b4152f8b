//! Security Event Repository

use std::sync::Arc;

use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use tokio::sync::Mutex;

use super::{decode_json, encode_json, format_id, next_sequence, parse_column};
use crate::domain::{EventStatus, SecurityEvent, Severity};
use crate::error::Result;

const ID_PREFIX: &str = "EVT-";
const COLUMNS: &str =
    "id, timestamp, severity, event_type, source, description, status, affected_assets, iocs, mitre";

/// Optional list filters. `search` is a literal, case-insensitive substring
/// of type, source or description; `%` and `_` carry no special meaning.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub severity: Option<Severity>,
    pub status: Option<EventStatus>,
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct EventRepository {
    pool: SqlitePool,
    id_lock: Arc<Mutex<()>>,
}

impl EventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            id_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Newest first.
    pub async fn find_all(&self, filter: &EventFilter) -> Result<Vec<SecurityEvent>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM security_events WHERE 1 = 1", COLUMNS));

        if let Some(severity) = filter.severity {
            qb.push(" AND severity = ").push_bind(severity.as_str());
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY timestamp DESC, id DESC");

        let rows = qb.build().fetch_all(&self.pool).await?;
        let events = rows.iter().map(row_to_event).collect::<Result<Vec<_>>>()?;

        match filter.search.as_deref().filter(|s| !s.is_empty()) {
            Some(term) => {
                let needle = term.to_lowercase();
                Ok(events.into_iter().filter(|e| e.matches_search(&needle)).collect())
            }
            None => Ok(events),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<SecurityEvent>> {
        let sql = format!("SELECT {} FROM security_events WHERE id = ?", COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_event).transpose()
    }

    /// Allocate the next `EVT-NNN` id and insert the event built from it.
    pub async fn create<F>(&self, build: F) -> Result<SecurityEvent>
    where
        F: FnOnce(String) -> SecurityEvent + Send,
    {
        let _guard = self.id_lock.lock().await;
        let seq = next_sequence(&self.pool, "security_events", ID_PREFIX).await?;
        let event = build(format_id(ID_PREFIX, seq));
        self.insert(&event).await?;
        Ok(event)
    }

    pub async fn insert(&self, event: &SecurityEvent) -> Result<()> {
        self.write(event, "INSERT").await.map(|_| ())
    }

    /// Insert unless the id already exists. Returns true if inserted.
    pub async fn insert_if_absent(&self, event: &SecurityEvent) -> Result<bool> {
        self.write(event, "INSERT OR IGNORE").await
    }

    async fn write(&self, event: &SecurityEvent, verb: &str) -> Result<bool> {
        let sql = format!(
            "{} INTO security_events ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            verb, COLUMNS
        );
        let result = sqlx::query(&sql)
            .bind(&event.id)
            .bind(event.timestamp)
            .bind(event.severity.as_str())
            .bind(&event.event_type)
            .bind(&event.source)
            .bind(&event.description)
            .bind(event.status.as_str())
            .bind(encode_json(&event.affected_assets)?)
            .bind(encode_json(&event.iocs)?)
            .bind(encode_json(&event.mitre)?)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Persist status and description.
    pub async fn update(&self, event: &SecurityEvent) -> Result<bool> {
        let result = sqlx::query("UPDATE security_events SET status = ?, description = ? WHERE id = ?")
            .bind(event.status.as_str())
            .bind(&event.description)
            .bind(&event.id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM security_events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_event(row: &SqliteRow) -> Result<SecurityEvent> {
    let severity: String = row.try_get("severity")?;
    let status: String = row.try_get("status")?;
    let affected_assets: String = row.try_get("affected_assets")?;
    let iocs: String = row.try_get("iocs")?;
    let mitre: String = row.try_get("mitre")?;

    Ok(SecurityEvent {
        id: row.try_get("id")?,
        timestamp: row.try_get("timestamp")?,
        severity: parse_column(&severity, "security_events.severity")?,
        event_type: row.try_get("event_type")?,
        source: row.try_get("source")?,
        description: row.try_get("description")?,
        status: parse_column(&status, "security_events.status")?,
        affected_assets: decode_json(&affected_assets)?,
        iocs: decode_json(&iocs)?,
        mitre: decode_json(&mitre)?,
    })
}
