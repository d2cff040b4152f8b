//! Alert Rule Repository

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{decode_json, encode_json, parse_column};
use crate::domain::AlertRule;
use crate::error::Result;

const COLUMNS: &str = "id, name, severity, enabled, conditions, actions";

#[derive(Clone)]
pub struct AlertRuleRepository {
    pool: SqlitePool,
}

impl AlertRuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> Result<Vec<AlertRule>> {
        let sql = format!("SELECT {} FROM alert_rules ORDER BY id", COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_rule).collect()
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<AlertRule>> {
        let sql = format!("SELECT {} FROM alert_rules WHERE id = ?", COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_rule).transpose()
    }

    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE alert_rules SET enabled = ? WHERE id = ?")
            .bind(enabled)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert_if_absent(&self, rule: &AlertRule) -> Result<bool> {
        let sql = format!(
            "INSERT OR IGNORE INTO alert_rules ({}) VALUES (?, ?, ?, ?, ?, ?)",
            COLUMNS
        );
        let result = sqlx::query(&sql)
            .bind(&rule.id)
            .bind(&rule.name)
            .bind(rule.severity.as_str())
            .bind(rule.enabled)
            .bind(&rule.conditions)
            .bind(encode_json(&rule.actions)?)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_rule(row: &SqliteRow) -> Result<AlertRule> {
    let severity: String = row.try_get("severity")?;
    let actions: String = row.try_get("actions")?;
    Ok(AlertRule {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        severity: parse_column(&severity, "alert_rules.severity")?,
        enabled: row.try_get("enabled")?,
        conditions: row.try_get("conditions")?,
        actions: decode_json(&actions)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;
    use crate::repository::test_pool;

    #[tokio::test]
    async fn test_toggle_enabled() {
        let repo = AlertRuleRepository::new(test_pool().await);
        let rule = AlertRule {
            id: "RULE-001".to_string(),
            name: "Critical Malware Detection".to_string(),
            severity: Severity::Critical,
            enabled: true,
            conditions: "malware_detected AND severity=critical".to_string(),
            actions: vec!["notify_soc".to_string(), "isolate_host".to_string()],
        };
        repo.insert_if_absent(&rule).await.unwrap();

        assert!(repo.set_enabled("RULE-001", false).await.unwrap());
        let stored = repo.find_by_id("RULE-001").await.unwrap().unwrap();
        assert!(!stored.enabled);
        assert_eq!(stored.actions, rule.actions);

        assert!(!repo.set_enabled("RULE-404", true).await.unwrap());
    }
}
