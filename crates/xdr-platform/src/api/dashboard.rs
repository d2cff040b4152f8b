//! Dashboard API

use axum::{extract::State, routing::get, Json, Router};

use crate::api::middleware::Authenticated;
use crate::error::PlatformError;
use crate::service::{DashboardService, DashboardStats, Operation};

#[derive(Clone)]
pub struct DashboardState {
    pub dashboard: DashboardService,
}

/// Aggregate SOC statistics
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "dashboard",
    responses(
        (status = 200, description = "Current statistics", body = DashboardStats)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_stats(
    State(state): State<DashboardState>,
    Authenticated(auth): Authenticated,
) -> Result<Json<DashboardStats>, PlatformError> {
    auth.require(Operation::ReadDashboard)?;
    Ok(Json(state.dashboard.stats().await?))
}

pub fn dashboard_router(state: DashboardState) -> Router {
    Router::new()
        .route("/stats", get(get_stats))
        .with_state(state)
}
