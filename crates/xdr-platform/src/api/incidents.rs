//! Incidents API
//!
//! REST endpoints for incident tracking. Status and assignee changes are
//! recorded on the incident timeline under the acting user.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::api::common::{parse_optional, ApiJson, ApiQuery};
use crate::api::middleware::Authenticated;
use crate::domain::{Incident, IncidentStatus, Severity};
use crate::error::PlatformError;
use crate::realtime::{Broadcaster, Notification};
use crate::repository::IncidentRepository;
use crate::service::{AuditService, Operation};

const RESOURCE: &str = "Incident";

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncidentRequest {
    pub title: String,
    pub severity: Severity,
    pub assignee: String,
    pub description: String,
    pub affected_systems: i64,
    #[serde(default)]
    pub related_events: Vec<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateIncidentRequest {
    pub status: Option<IncidentStatus>,
    pub assignee: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IncidentsQuery {
    /// in_progress, monitoring or resolved
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct IncidentsState {
    pub incidents: IncidentRepository,
    pub broadcaster: Broadcaster,
    pub audit: AuditService,
}

/// List incidents
#[utoipa::path(
    get,
    path = "/api/incidents",
    tag = "incidents",
    params(IncidentsQuery),
    responses(
        (status = 200, description = "Incidents", body = Vec<Incident>),
        (status = 422, description = "Unknown status")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_incidents(
    State(state): State<IncidentsState>,
    Authenticated(auth): Authenticated,
    ApiQuery(query): ApiQuery<IncidentsQuery>,
) -> Result<Json<Vec<Incident>>, PlatformError> {
    auth.require(Operation::ListIncidents)?;
    let status = parse_optional(query.status.as_deref())?;
    Ok(Json(state.incidents.find_all(status).await?))
}

/// Get incident by ID
#[utoipa::path(
    get,
    path = "/api/incidents/{id}",
    tag = "incidents",
    params(("id" = String, Path, description = "Incident ID")),
    responses(
        (status = 200, description = "Incident found", body = Incident),
        (status = 404, description = "Incident not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_incident(
    State(state): State<IncidentsState>,
    Authenticated(auth): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Incident>, PlatformError> {
    auth.require(Operation::ReadIncident)?;
    let incident = state
        .incidents
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found(RESOURCE, &id))?;
    Ok(Json(incident))
}

/// Open an incident
#[utoipa::path(
    post,
    path = "/api/incidents",
    tag = "incidents",
    request_body = CreateIncidentRequest,
    responses(
        (status = 200, description = "Incident created", body = Incident),
        (status = 403, description = "Analyst or admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_incident(
    State(state): State<IncidentsState>,
    Authenticated(auth): Authenticated,
    ApiJson(req): ApiJson<CreateIncidentRequest>,
) -> Result<Json<Incident>, PlatformError> {
    auth.require(Operation::CreateIncident)?;

    if req.affected_systems < 0 {
        return Err(PlatformError::validation("affectedSystems must not be negative"));
    }

    let incident = state
        .incidents
        .create(|id| {
            Incident::new(id, req.title, req.severity, req.assignee, req.description, req.affected_systems)
                .with_related_events(req.related_events)
        })
        .await?;

    let report = state.broadcaster.broadcast(&Notification::NewIncident(incident.clone())).await;
    debug!(incident_id = %incident.id, delivered = report.delivered, "New incident broadcast");

    state
        .audit
        .log_create(&auth, RESOURCE, &incident.id, json!({ "severity": incident.severity, "title": incident.title }))
        .await;

    Ok(Json(incident))
}

/// Change an incident's status or assignee
#[utoipa::path(
    put,
    path = "/api/incidents/{id}",
    tag = "incidents",
    params(("id" = String, Path, description = "Incident ID")),
    request_body = UpdateIncidentRequest,
    responses(
        (status = 200, description = "Incident updated", body = Incident),
        (status = 404, description = "Incident not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_incident(
    State(state): State<IncidentsState>,
    Authenticated(auth): Authenticated,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateIncidentRequest>,
) -> Result<Json<Incident>, PlatformError> {
    auth.require(Operation::UpdateIncident)?;

    let mut incident = state
        .incidents
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found(RESOURCE, &id))?;

    let mut changes = serde_json::Map::new();
    if let Some(status) = req.status {
        incident.set_status(status, &auth.username);
        changes.insert("status".to_string(), json!(status));
    }
    if let Some(assignee) = req.assignee {
        changes.insert("assignee".to_string(), json!(assignee));
        incident.assign(assignee, &auth.username);
    }
    incident.touch();

    state.incidents.update(&incident).await?;
    state.audit.log_update(&auth, RESOURCE, &id, changes.into()).await;

    Ok(Json(incident))
}

pub fn incidents_router(state: IncidentsState) -> Router {
    Router::new()
        .route("/", get(list_incidents).post(create_incident))
        .route("/:id", get(get_incident).put(update_incident))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults_related_events() {
        let json = r#"{
            "title": "Phishing wave",
            "severity": "high",
            "assignee": "Jane Doe",
            "description": "Credential phishing",
            "affectedSystems": 4
        }"#;
        let req: CreateIncidentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.affected_systems, 4);
        assert!(req.related_events.is_empty());
    }

    #[test]
    fn test_update_request_rejects_unknown_status() {
        let result: Result<UpdateIncidentRequest, _> = serde_json::from_str(r#"{"status":"closed"}"#);
        assert!(result.is_err());
    }
}
