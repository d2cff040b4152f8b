//! Audit Log Entity
//!
//! Append-only record of who did what to which resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Login,
    Register,
    TokenRefreshed,
    MetricsReset,
}

string_enum!(AuditAction {
    Create => "CREATE",
    Update => "UPDATE",
    Delete => "DELETE",
    Login => "LOGIN",
    Register => "REGISTER",
    TokenRefreshed => "TOKEN_REFRESHED",
    MetricsReset => "METRICS_RESET",
});

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    /// Assigned by the store; zero until persisted
    pub id: i64,
    pub username: String,
    pub action: AuditAction,
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(
        action: AuditAction,
        resource_type: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            username: username.into(),
            action,
            resource_type: resource_type.into(),
            resource_id: None,
            details: None,
            ip_address: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_ip_address(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_log_builder() {
        let log = AuditLog::new(AuditAction::Delete, "SecurityEvent", "admin")
            .with_resource_id("EVT-003")
            .with_details(serde_json::json!({ "reason": "duplicate" }));

        assert_eq!(log.action, AuditAction::Delete);
        assert_eq!(log.username, "admin");
        assert_eq!(log.resource_id.as_deref(), Some("EVT-003"));
        assert_eq!(log.details.unwrap()["reason"], "duplicate");
    }

    #[test]
    fn test_action_wire_names() {
        assert_eq!(
            serde_json::to_string(&AuditAction::TokenRefreshed).unwrap(),
            "\"TOKEN_REFRESHED\""
        );
        assert_eq!("TOKEN_REFRESHED".parse::<AuditAction>().unwrap(), AuditAction::TokenRefreshed);
    }
}
