//! Audit Log Repository

use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};

use super::{decode_json, encode_json, parse_column};
use crate::domain::{AuditAction, AuditLog};
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub username: Option<String>,
    pub action: Option<AuditAction>,
    pub resource_type: Option<String>,
}

#[derive(Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the assigned row id.
    pub async fn insert(&self, log: &AuditLog) -> Result<i64> {
        let details = log.details.as_ref().map(encode_json).transpose()?;
        let result = sqlx::query(
            r#"
            INSERT INTO audit_logs (username, action, resource_type, resource_id, details, ip_address, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.username)
        .bind(log.action.as_str())
        .bind(&log.resource_type)
        .bind(&log.resource_id)
        .bind(details)
        .bind(&log.ip_address)
        .bind(log.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Newest first.
    pub async fn find(&self, filter: &AuditLogFilter, limit: i64, offset: i64) -> Result<Vec<AuditLog>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, username, action, resource_type, resource_id, details, ip_address, timestamp \
             FROM audit_logs WHERE 1 = 1",
        );
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_log).collect()
    }

    pub async fn count(&self, filter: &AuditLogFilter) -> Result<i64> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM audit_logs WHERE 1 = 1");
        push_filter(&mut qb, filter);
        Ok(qb.build_query_scalar().fetch_one(&self.pool).await?)
    }
}

fn push_filter<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &AuditLogFilter) {
    if let Some(username) = &filter.username {
        qb.push(" AND username = ").push_bind(username.clone());
    }
    if let Some(action) = filter.action {
        qb.push(" AND action = ").push_bind(action.as_str());
    }
    if let Some(resource_type) = &filter.resource_type {
        qb.push(" AND resource_type = ").push_bind(resource_type.clone());
    }
}

fn row_to_log(row: &SqliteRow) -> Result<AuditLog> {
    let action: String = row.try_get("action")?;
    let details: Option<String> = row.try_get("details")?;
    Ok(AuditLog {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        action: parse_column(&action, "audit_logs.action")?,
        resource_type: row.try_get("resource_type")?,
        resource_id: row.try_get("resource_id")?,
        details: details.as_deref().map(decode_json).transpose()?,
        ip_address: row.try_get("ip_address")?,
        timestamp: row.try_get("timestamp")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_pool;

    #[tokio::test]
    async fn test_insert_and_filter() {
        let repo = AuditLogRepository::new(test_pool().await);
        repo.insert(&AuditLog::new(AuditAction::Login, "User", "admin")).await.unwrap();
        repo.insert(
            &AuditLog::new(AuditAction::Create, "SecurityEvent", "analyst")
                .with_resource_id("EVT-006")
                .with_details(serde_json::json!({ "severity": "high" })),
        )
        .await
        .unwrap();

        assert_eq!(repo.count(&AuditLogFilter::default()).await.unwrap(), 2);

        let all = repo.find(&AuditLogFilter::default(), 50, 0).await.unwrap();
        assert_eq!(all[0].action, AuditAction::Create);
        assert_eq!(all[0].details.as_ref().unwrap()["severity"], "high");
        assert_eq!(all[1].action, AuditAction::Login);

        let filter = AuditLogFilter {
            username: Some("admin".to_string()),
            ..Default::default()
        };
        let admin_only = repo.find(&filter, 50, 0).await.unwrap();
        assert_eq!(admin_only.len(), 1);
        assert_eq!(repo.count(&filter).await.unwrap(), 1);
        assert!(admin_only[0].resource_id.is_none());
    }

    #[tokio::test]
    async fn test_limit_and_offset() {
        let repo = AuditLogRepository::new(test_pool().await);
        for _ in 0..5 {
            repo.insert(&AuditLog::new(AuditAction::Update, "Incident", "analyst")).await.unwrap();
        }
        assert_eq!(repo.find(&AuditLogFilter::default(), 2, 0).await.unwrap().len(), 2);
        assert_eq!(repo.find(&AuditLogFilter::default(), 10, 4).await.unwrap().len(), 1);
    }
}
