//! Assets API
//!
//! Read-only inventory of monitored hosts.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::common::{parse_optional, ApiQuery};
use crate::api::middleware::Authenticated;
use crate::domain::Asset;
use crate::error::PlatformError;
use crate::repository::AssetRepository;
use crate::service::Operation;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssetsQuery {
    /// healthy, compromised or investigating
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct AssetsState {
    pub assets: AssetRepository,
}

/// List assets
#[utoipa::path(
    get,
    path = "/api/assets",
    tag = "assets",
    params(AssetsQuery),
    responses(
        (status = 200, description = "Assets", body = Vec<Asset>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_assets(
    State(state): State<AssetsState>,
    Authenticated(auth): Authenticated,
    ApiQuery(query): ApiQuery<AssetsQuery>,
) -> Result<Json<Vec<Asset>>, PlatformError> {
    auth.require(Operation::ListAssets)?;
    let status = parse_optional(query.status.as_deref())?;
    Ok(Json(state.assets.find_all(status).await?))
}

/// Get asset by ID
#[utoipa::path(
    get,
    path = "/api/assets/{id}",
    tag = "assets",
    params(("id" = String, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset found", body = Asset),
        (status = 404, description = "Asset not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_asset(
    State(state): State<AssetsState>,
    Authenticated(auth): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Asset>, PlatformError> {
    auth.require(Operation::ReadAsset)?;
    let asset = state
        .assets
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Asset", &id))?;
    Ok(Json(asset))
}

pub fn assets_router(state: AssetsState) -> Router {
    Router::new()
        .route("/", get(list_assets))
        .route("/:id", get(get_asset))
        .with_state(state)
}
