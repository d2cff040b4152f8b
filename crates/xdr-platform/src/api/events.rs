//! Security Events API
//!
//! REST endpoints for security event triage. New events are pushed to every
//! real-time subscriber.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::api::common::{parse_optional, ApiJson, ApiQuery, MessageResponse};
use crate::api::middleware::Authenticated;
use crate::domain::{EventStatus, SecurityEvent, Severity};
use crate::error::PlatformError;
use crate::realtime::{Broadcaster, Notification};
use crate::repository::{EventFilter, EventRepository};
use crate::service::{AuditService, Operation};

const RESOURCE: &str = "SecurityEvent";

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(rename = "type")]
    pub event_type: String,
    pub source: String,
    pub description: String,
    pub severity: Severity,
    #[serde(default)]
    pub affected_assets: Vec<String>,
    #[serde(default)]
    pub iocs: Vec<String>,
    #[serde(default)]
    pub mitre: Vec<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    pub status: Option<EventStatus>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQuery {
    /// critical, high, medium or low
    pub severity: Option<String>,
    /// investigating, monitoring or resolved
    pub status: Option<String>,
    /// Case-insensitive match on type, source or description
    pub search: Option<String>,
}

impl EventsQuery {
    fn into_filter(self) -> Result<EventFilter, PlatformError> {
        Ok(EventFilter {
            severity: parse_optional(self.severity.as_deref())?,
            status: parse_optional(self.status.as_deref())?,
            search: self.search.filter(|s| !s.trim().is_empty()),
        })
    }
}

#[derive(Clone)]
pub struct EventsState {
    pub events: EventRepository,
    pub broadcaster: Broadcaster,
    pub audit: AuditService,
}

/// List security events
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "events",
    params(EventsQuery),
    responses(
        (status = 200, description = "Events, newest first", body = Vec<SecurityEvent>),
        (status = 422, description = "Unknown filter value")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_events(
    State(state): State<EventsState>,
    Authenticated(auth): Authenticated,
    ApiQuery(query): ApiQuery<EventsQuery>,
) -> Result<Json<Vec<SecurityEvent>>, PlatformError> {
    auth.require(Operation::ListEvents)?;
    let events = state.events.find_all(&query.into_filter()?).await?;
    Ok(Json(events))
}

/// Get security event by ID
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    tag = "events",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event found", body = SecurityEvent),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_event(
    State(state): State<EventsState>,
    Authenticated(auth): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SecurityEvent>, PlatformError> {
    auth.require(Operation::ReadEvent)?;
    let event = state
        .events
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found(RESOURCE, &id))?;
    Ok(Json(event))
}

/// Create a security event
#[utoipa::path(
    post,
    path = "/api/events",
    tag = "events",
    request_body = CreateEventRequest,
    responses(
        (status = 200, description = "Event created", body = SecurityEvent),
        (status = 403, description = "Analyst or admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_event(
    State(state): State<EventsState>,
    Authenticated(auth): Authenticated,
    ApiJson(req): ApiJson<CreateEventRequest>,
) -> Result<Json<SecurityEvent>, PlatformError> {
    auth.require(Operation::CreateEvent)?;

    let event = state
        .events
        .create(|id| {
            SecurityEvent::new(id, req.event_type, req.source, req.description, req.severity)
                .with_affected_assets(req.affected_assets)
                .with_iocs(req.iocs)
                .with_mitre(req.mitre)
        })
        .await?;

    let report = state.broadcaster.broadcast(&Notification::NewEvent(event.clone())).await;
    debug!(event_id = %event.id, delivered = report.delivered, "New event broadcast");

    state
        .audit
        .log_create(&auth, RESOURCE, &event.id, json!({ "severity": event.severity, "type": event.event_type }))
        .await;

    Ok(Json(event))
}

/// Update a security event's status or description
#[utoipa::path(
    put,
    path = "/api/events/{id}",
    tag = "events",
    params(("id" = String, Path, description = "Event ID")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = SecurityEvent),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_event(
    State(state): State<EventsState>,
    Authenticated(auth): Authenticated,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateEventRequest>,
) -> Result<Json<SecurityEvent>, PlatformError> {
    auth.require(Operation::UpdateEvent)?;

    let mut event = state
        .events
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found(RESOURCE, &id))?;

    let mut changes = serde_json::Map::new();
    if let Some(status) = req.status {
        event.status = status;
        changes.insert("status".to_string(), json!(status));
    }
    if let Some(description) = req.description {
        changes.insert("description".to_string(), json!(description));
        event.description = description;
    }

    state.events.update(&event).await?;
    state.audit.log_update(&auth, RESOURCE, &id, changes.into()).await;

    Ok(Json(event))
}

/// Delete a security event
#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    tag = "events",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_event(
    State(state): State<EventsState>,
    Authenticated(auth): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, PlatformError> {
    auth.require(Operation::DeleteEvent)?;

    if !state.events.delete(&id).await? {
        return Err(PlatformError::not_found(RESOURCE, &id));
    }
    state.audit.log_delete(&auth, RESOURCE, &id).await;

    Ok(Json(MessageResponse::new("Event deleted successfully")))
}

pub fn events_router(state: EventsState) -> Router {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/:id", get(get_event).put(update_event).delete(delete_event))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_uses_external_field_names() {
        let json = r#"{
            "type": "Port Scan",
            "source": "FIREWALL-01",
            "description": "scan",
            "severity": "medium",
            "affectedAssets": ["FIREWALL-01"]
        }"#;
        let req: CreateEventRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.event_type, "Port Scan");
        assert_eq!(req.affected_assets, vec!["FIREWALL-01".to_string()]);
        assert!(req.iocs.is_empty());
    }

    #[test]
    fn test_query_into_filter() {
        let query = EventsQuery {
            severity: Some("critical".to_string()),
            status: None,
            search: Some("  ".to_string()),
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.severity, Some(Severity::Critical));
        assert!(filter.search.is_none());

        let bad = EventsQuery {
            status: Some("closed".to_string()),
            ..Default::default()
        };
        assert!(bad.into_filter().is_err());
    }
}
