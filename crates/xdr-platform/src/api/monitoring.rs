//! Monitoring API
//!
//! Public health probes plus admin-only request metrics.

use std::time::Instant;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::common::MessageResponse;
use crate::api::middleware::Authenticated;
use crate::error::PlatformError;
use crate::realtime::ConnectionRegistry;
use crate::service::{AuditService, MetricsSnapshot, Operation, RequestMetrics};

pub const API_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProbeResponse {
    pub status: String,
}

#[derive(Clone)]
pub struct MonitoringState {
    pub metrics: RequestMetrics,
    pub registry: ConnectionRegistry,
    pub audit: AuditService,
    pub start_time: Instant,
}

/// Health check
#[utoipa::path(
    get,
    path = "/api/monitoring/health",
    tag = "monitoring",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health(State(state): State<MonitoringState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs_f64();
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: API_VERSION.to_string(),
        uptime_seconds: (uptime * 100.0).round() / 100.0,
    })
}

/// Readiness probe
#[utoipa::path(
    get,
    path = "/api/monitoring/ready",
    tag = "monitoring",
    responses((status = 200, description = "Ready", body = ProbeResponse))
)]
pub async fn ready() -> Json<ProbeResponse> {
    Json(ProbeResponse { status: "ready".to_string() })
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/api/monitoring/live",
    tag = "monitoring",
    responses((status = 200, description = "Alive", body = ProbeResponse))
)]
pub async fn live() -> Json<ProbeResponse> {
    Json(ProbeResponse { status: "alive".to_string() })
}

/// Request metrics (admin)
#[utoipa::path(
    get,
    path = "/api/monitoring/metrics",
    tag = "monitoring",
    responses(
        (status = 200, description = "Current metrics", body = MetricsSnapshot),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_metrics(
    State(state): State<MonitoringState>,
    Authenticated(auth): Authenticated,
) -> Result<Json<MetricsSnapshot>, PlatformError> {
    auth.require(Operation::ReadMetrics)?;
    Ok(Json(state.metrics.snapshot(state.registry.len())))
}

/// Reset request metrics (admin)
#[utoipa::path(
    post,
    path = "/api/monitoring/metrics/reset",
    tag = "monitoring",
    responses(
        (status = 200, description = "Metrics cleared", body = MessageResponse),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reset_metrics(
    State(state): State<MonitoringState>,
    Authenticated(auth): Authenticated,
) -> Result<Json<MessageResponse>, PlatformError> {
    auth.require(Operation::ResetMetrics)?;
    state.metrics.reset();
    state.audit.log_metrics_reset(&auth).await;
    Ok(Json(MessageResponse::new("Metrics reset successfully")))
}

pub fn monitoring_router(state: MonitoringState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/live", get(live))
        .route("/metrics", get(get_metrics))
        .route("/metrics/reset", post(reset_metrics))
        .with_state(state)
}
