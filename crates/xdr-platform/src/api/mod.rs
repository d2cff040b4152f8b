//! API Layer
//!
//! REST and WebSocket endpoints. Every router carries its own state; auth
//! state travels in request extensions.

pub mod common;
pub mod middleware;

pub mod auth;
pub mod events;
pub mod incidents;
pub mod assets;
pub mod alerts;
pub mod dashboard;
pub mod monitoring;
pub mod audit_logs;
pub mod ws;
pub mod openapi;

pub use common::*;
pub use middleware::{track_requests, AppState, Authenticated};

pub use auth::{auth_router, AuthState};
pub use events::{events_router, EventsState};
pub use incidents::{incidents_router, IncidentsState};
pub use assets::{assets_router, AssetsState};
pub use alerts::{alerts_router, AlertsState};
pub use dashboard::{dashboard_router, DashboardState};
pub use monitoring::{monitoring_router, MonitoringState, API_VERSION};
pub use audit_logs::{audit_logs_router, AuditLogsState};
pub use ws::{ws_router, WsState};
pub use openapi::XdrApiDoc;

use axum::{middleware::from_fn_with_state, routing::get, Extension, Json, Router};
use serde::Serialize;
use utoipa::OpenApi;

use crate::platform::XdrPlatform;

#[derive(Debug, Serialize)]
pub struct ApiBanner {
    pub message: String,
    pub version: String,
    pub docs: String,
}

async fn root() -> Json<ApiBanner> {
    Json(ApiBanner {
        message: "XDR Management API".to_string(),
        version: API_VERSION.to_string(),
        docs: "/api-docs/openapi.json".to_string(),
    })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(XdrApiDoc::openapi())
}

/// Full application router, without transport layers (CORS, tracing),
/// which the server adds.
pub fn build_router(platform: &XdrPlatform) -> Router {
    let app_state = AppState {
        tokens: platform.tokens.clone(),
    };

    let auth_state = AuthState {
        auth: platform.auth.clone(),
        accounts: platform.accounts.clone(),
        audit: platform.audit.clone(),
    };
    let events_state = EventsState {
        events: platform.events.clone(),
        broadcaster: platform.broadcaster.clone(),
        audit: platform.audit.clone(),
    };
    let incidents_state = IncidentsState {
        incidents: platform.incidents.clone(),
        broadcaster: platform.broadcaster.clone(),
        audit: platform.audit.clone(),
    };
    let assets_state = AssetsState {
        assets: platform.assets.clone(),
    };
    let alerts_state = AlertsState {
        rules: platform.alert_rules.clone(),
        audit: platform.audit.clone(),
    };
    let dashboard_state = DashboardState {
        dashboard: platform.dashboard.clone(),
    };
    let monitoring_state = MonitoringState {
        metrics: platform.metrics.clone(),
        registry: platform.registry.clone(),
        audit: platform.audit.clone(),
        start_time: platform.start_time,
    };
    let audit_logs_state = AuditLogsState {
        audit_logs: platform.audit_logs.clone(),
    };
    let ws_state = WsState {
        registry: platform.registry.clone(),
    };

    Router::new()
        .route("/", get(root))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api/auth", auth_router(auth_state))
        .nest("/api/events", events_router(events_state))
        .nest("/api/incidents", incidents_router(incidents_state))
        .nest("/api/assets", assets_router(assets_state))
        .nest("/api/alerts", alerts_router(alerts_state))
        .nest("/api/dashboard", dashboard_router(dashboard_state))
        .nest("/api/monitoring", monitoring_router(monitoring_state))
        .nest("/api/audit-logs", audit_logs_router(audit_logs_state))
        .merge(ws_router(ws_state))
        .layer(from_fn_with_state(platform.metrics.clone(), track_requests))
        .layer(Extension(app_state))
}
