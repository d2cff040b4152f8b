//! Audit Service
//!
//! Records who changed what. Recording never fails the calling request;
//! storage errors are logged and dropped.

use serde_json::Value;
use tracing::warn;

use crate::domain::{AuditAction, AuditLog};
use crate::repository::AuditLogRepository;
use crate::service::authorization::AuthContext;

#[derive(Clone)]
pub struct AuditService {
    repo: AuditLogRepository,
}

impl AuditService {
    pub fn new(repo: AuditLogRepository) -> Self {
        Self { repo }
    }

    pub async fn log_create(&self, auth: &AuthContext, resource_type: &str, resource_id: &str, details: Value) {
        self.log_change(auth, AuditAction::Create, resource_type, resource_id, details).await
    }

    pub async fn log_update(&self, auth: &AuthContext, resource_type: &str, resource_id: &str, details: Value) {
        self.log_change(auth, AuditAction::Update, resource_type, resource_id, details).await
    }

    pub async fn log_delete(&self, auth: &AuthContext, resource_type: &str, resource_id: &str) {
        let log = AuditLog::new(AuditAction::Delete, resource_type, &auth.username)
            .with_resource_id(resource_id);
        self.record(log).await
    }

    pub async fn log_login(&self, username: &str, ip_address: Option<String>) {
        let log = AuditLog::new(AuditAction::Login, "User", username).with_ip_address(ip_address);
        self.record(log).await
    }

    pub async fn log_register(&self, auth: &AuthContext, user_id: &str, new_username: &str) {
        let log = AuditLog::new(AuditAction::Register, "User", &auth.username)
            .with_resource_id(user_id)
            .with_details(serde_json::json!({ "username": new_username }));
        self.record(log).await
    }

    pub async fn log_token_refreshed(&self, auth: &AuthContext) {
        self.record(AuditLog::new(AuditAction::TokenRefreshed, "User", &auth.username))
            .await
    }

    pub async fn log_metrics_reset(&self, auth: &AuthContext) {
        self.record(AuditLog::new(AuditAction::MetricsReset, "Metrics", &auth.username))
            .await
    }

    async fn log_change(
        &self,
        auth: &AuthContext,
        action: AuditAction,
        resource_type: &str,
        resource_id: &str,
        details: Value,
    ) {
        let log = AuditLog::new(action, resource_type, &auth.username)
            .with_resource_id(resource_id)
            .with_details(details);
        self.record(log).await
    }

    pub async fn record(&self, log: AuditLog) {
        if let Err(e) = self.repo.insert(&log).await {
            warn!(
                action = %log.action,
                resource_type = %log.resource_type,
                error = %e,
                "Failed to write audit log"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::repository::{test_pool, AuditLogFilter};

    #[tokio::test]
    async fn test_changes_are_attributed() {
        let repo = AuditLogRepository::new(test_pool().await);
        let audit = AuditService::new(repo.clone());
        let auth = AuthContext::new("analyst", Role::Analyst);

        audit
            .log_create(&auth, "SecurityEvent", "EVT-006", serde_json::json!({ "type": "Port Scan" }))
            .await;
        audit.log_delete(&AuthContext::new("admin", Role::Admin), "SecurityEvent", "EVT-006").await;

        let logs = repo.find(&AuditLogFilter::default(), 10, 0).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action, AuditAction::Delete);
        assert_eq!(logs[0].username, "admin");
        assert_eq!(logs[1].username, "analyst");
        assert_eq!(logs[1].resource_id.as_deref(), Some("EVT-006"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_swallowed() {
        let pool = test_pool().await;
        let audit = AuditService::new(AuditLogRepository::new(pool.clone()));
        sqlx::query("DROP TABLE audit_logs").execute(&pool).await.unwrap();

        audit.log_login("admin", None).await;
    }
}
