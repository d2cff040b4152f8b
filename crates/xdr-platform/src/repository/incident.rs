//! Incident Repository

use std::sync::Arc;

use chrono::{Datelike, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tokio::sync::Mutex;

use super::{decode_json, encode_json, format_id, next_sequence, parse_column};
use crate::domain::{Incident, IncidentStatus};
use crate::error::Result;

const COLUMNS: &str = "id, title, severity, status, created_at, updated_at, assignee, description, \
                       affected_systems, related_events, timeline";

#[derive(Clone)]
pub struct IncidentRepository {
    pool: SqlitePool,
    id_lock: Arc<Mutex<()>>,
}

impl IncidentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            id_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn find_all(&self, status: Option<IncidentStatus>) -> Result<Vec<Incident>> {
        let rows = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {} FROM incidents WHERE status = ? ORDER BY created_at DESC, id DESC",
                    COLUMNS
                );
                sqlx::query(&sql)
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {} FROM incidents ORDER BY created_at DESC, id DESC", COLUMNS);
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
        };
        rows.iter().map(row_to_incident).collect()
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Incident>> {
        let sql = format!("SELECT {} FROM incidents WHERE id = ?", COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_incident).transpose()
    }

    /// Allocate the next `INC-YYYY-NNN` id for the current year and insert
    /// the incident built from it.
    pub async fn create<F>(&self, build: F) -> Result<Incident>
    where
        F: FnOnce(String) -> Incident + Send,
    {
        let prefix = format!("INC-{}-", Utc::now().year());
        let _guard = self.id_lock.lock().await;
        let seq = next_sequence(&self.pool, "incidents", &prefix).await?;
        let incident = build(format_id(&prefix, seq));
        self.insert(&incident).await?;
        Ok(incident)
    }

    pub async fn insert(&self, incident: &Incident) -> Result<()> {
        self.write(incident, "INSERT").await.map(|_| ())
    }

    pub async fn insert_if_absent(&self, incident: &Incident) -> Result<bool> {
        self.write(incident, "INSERT OR IGNORE").await
    }

    async fn write(&self, incident: &Incident, verb: &str) -> Result<bool> {
        let sql = format!(
            "{} INTO incidents ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            verb, COLUMNS
        );
        let result = sqlx::query(&sql)
            .bind(&incident.id)
            .bind(&incident.title)
            .bind(incident.severity.as_str())
            .bind(incident.status.as_str())
            .bind(incident.created_at)
            .bind(incident.updated_at)
            .bind(&incident.assignee)
            .bind(&incident.description)
            .bind(incident.affected_systems)
            .bind(encode_json(&incident.related_events)?)
            .bind(encode_json(&incident.timeline)?)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Persist status, assignee, timeline and `updated_at`.
    pub async fn update(&self, incident: &Incident) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE incidents SET status = ?, assignee = ?, timeline = ?, updated_at = ? WHERE id = ?",
        )
        .bind(incident.status.as_str())
        .bind(&incident.assignee)
        .bind(encode_json(&incident.timeline)?)
        .bind(incident.updated_at)
        .bind(&incident.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_incident(row: &SqliteRow) -> Result<Incident> {
    let severity: String = row.try_get("severity")?;
    let status: String = row.try_get("status")?;
    let related_events: String = row.try_get("related_events")?;
    let timeline: String = row.try_get("timeline")?;

    Ok(Incident {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        severity: parse_column(&severity, "incidents.severity")?,
        status: parse_column(&status, "incidents.status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        assignee: row.try_get("assignee")?,
        description: row.try_get("description")?,
        affected_systems: row.try_get("affected_systems")?,
        related_events: decode_json(&related_events)?,
        timeline: decode_json(&timeline)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;
    use crate::repository::test_pool;

    fn incident(id: String) -> Incident {
        Incident::new(id, "Ransomware", Severity::Critical, "John Smith", "desc", 5)
            .with_related_events(vec!["EVT-001".to_string()])
    }

    #[tokio::test]
    async fn test_create_uses_current_year_prefix() {
        let repo = IncidentRepository::new(test_pool().await);
        let created = repo.create(incident).await.unwrap();

        assert_eq!(created.id, format!("INC-{}-001", Utc::now().year()));
        let second = repo.create(incident).await.unwrap();
        assert_eq!(second.id, format!("INC-{}-002", Utc::now().year()));
    }

    #[tokio::test]
    async fn test_timeline_round_trips() {
        let repo = IncidentRepository::new(test_pool().await);
        let mut created = repo.create(incident).await.unwrap();

        created.set_status(IncidentStatus::Resolved, "analyst");
        assert!(repo.update(&created).await.unwrap());

        let stored = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, IncidentStatus::Resolved);
        assert_eq!(stored.timeline.len(), 2);
        assert_eq!(stored.timeline[1].action, "Status changed to resolved");
        assert_eq!(stored.related_events, vec!["EVT-001"]);
    }

    #[tokio::test]
    async fn test_status_filter() {
        let repo = IncidentRepository::new(test_pool().await);
        let mut resolved = repo.create(incident).await.unwrap();
        resolved.set_status(IncidentStatus::Resolved, "admin");
        repo.update(&resolved).await.unwrap();
        repo.create(incident).await.unwrap();

        assert_eq!(repo.find_all(None).await.unwrap().len(), 2);
        let active = repo.find_all(Some(IncidentStatus::InProgress)).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_ne!(active[0].id, resolved.id);
    }
}
