//! Audit Logs Admin API
//!
//! Read access to the audit trail.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::common::{parse_optional, ApiQuery};
use crate::api::middleware::Authenticated;
use crate::domain::AuditLog;
use crate::error::PlatformError;
use crate::repository::{AuditLogFilter, AuditLogRepository};
use crate::service::Operation;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuditLogsQuery {
    /// Page size, 1-1000 (default 100)
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Filter by acting user
    pub username: Option<String>,
    /// Filter by action, e.g. `CREATE` or `LOGIN`
    pub action: Option<String>,
    /// Filter by resource type, e.g. `SecurityEvent`
    pub resource_type: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuditLogListResponse {
    pub logs: Vec<AuditLog>,
    /// Matching entries across all pages
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone)]
pub struct AuditLogsState {
    pub audit_logs: AuditLogRepository,
}

/// List audit log entries, newest first
#[utoipa::path(
    get,
    path = "/api/audit-logs",
    tag = "audit-logs",
    params(AuditLogsQuery),
    responses(
        (status = 200, description = "Audit log page", body = AuditLogListResponse),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_audit_logs(
    State(state): State<AuditLogsState>,
    Authenticated(auth): Authenticated,
    ApiQuery(query): ApiQuery<AuditLogsQuery>,
) -> Result<Json<AuditLogListResponse>, PlatformError> {
    auth.require(Operation::ReadAuditLogs)?;

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);
    let filter = AuditLogFilter {
        username: query.username.filter(|s| !s.is_empty()),
        action: parse_optional(query.action.as_deref())?,
        resource_type: query.resource_type.filter(|s| !s.is_empty()),
    };

    let logs = state.audit_logs.find(&filter, limit, offset).await?;
    let total = state.audit_logs.count(&filter).await?;

    Ok(Json(AuditLogListResponse { logs, total, limit, offset }))
}

pub fn audit_logs_router(state: AuditLogsState) -> Router {
    Router::new()
        .route("/", get(list_audit_logs))
        .with_state(state)
}
