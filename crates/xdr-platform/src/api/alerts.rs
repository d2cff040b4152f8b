//! Alert Rules API
//!
//! - GET /api/alerts - List rules
//! - PUT /api/alerts/{id} - Enable or disable a rule (admin)

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::api::common::ApiJson;
use crate::api::middleware::Authenticated;
use crate::domain::AlertRule;
use crate::error::PlatformError;
use crate::repository::AlertRuleRepository;
use crate::service::{AuditService, Operation};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateAlertRuleRequest {
    pub enabled: Option<bool>,
}

#[derive(Clone)]
pub struct AlertsState {
    pub rules: AlertRuleRepository,
    pub audit: AuditService,
}

/// List alert rules
#[utoipa::path(
    get,
    path = "/api/alerts",
    tag = "alerts",
    responses(
        (status = 200, description = "Alert rules", body = Vec<AlertRule>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_alert_rules(
    State(state): State<AlertsState>,
    Authenticated(auth): Authenticated,
) -> Result<Json<Vec<AlertRule>>, PlatformError> {
    auth.require(Operation::ListAlertRules)?;
    Ok(Json(state.rules.find_all().await?))
}

/// Toggle an alert rule
#[utoipa::path(
    put,
    path = "/api/alerts/{id}",
    tag = "alerts",
    params(("id" = String, Path, description = "Alert rule ID")),
    request_body = UpdateAlertRuleRequest,
    responses(
        (status = 200, description = "Rule updated", body = AlertRule),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Rule not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_alert_rule(
    State(state): State<AlertsState>,
    Authenticated(auth): Authenticated,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateAlertRuleRequest>,
) -> Result<Json<AlertRule>, PlatformError> {
    auth.require(Operation::UpdateAlertRule)?;

    let mut rule = state
        .rules
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("AlertRule", &id))?;

    if let Some(enabled) = req.enabled {
        state.rules.set_enabled(&id, enabled).await?;
        rule.enabled = enabled;
        state
            .audit
            .log_update(&auth, "AlertRule", &id, json!({ "enabled": enabled }))
            .await;
    }

    Ok(Json(rule))
}

pub fn alerts_router(state: AlertsState) -> Router {
    Router::new()
        .route("/", get(list_alert_rules))
        .route("/:id", put(update_alert_rule))
        .with_state(state)
}
