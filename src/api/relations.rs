use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::validation::{parse_entity_id, parse_kind};
use super::{ApiError, ApiJson, ApiResponse, AppState};
use crate::db::ListParams;
use crate::models::{EntityInput, EntityShows, Page, RelationEntity};

/// GET /{kind}
pub async fn list_entities(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Page<RelationEntity>>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let page = state.catalog().list_entities(kind, &params).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// POST /{kind}
pub async fn create_entity(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    ApiJson(input): ApiJson<EntityInput>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entity = state.catalog().create_entity(kind, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(entity))))
}

/// GET /{kind}/{id}
pub async fn get_entity(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<RelationEntity>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let id = parse_entity_id(&id)?;
    let entity = state.catalog().get_entity(kind, id).await?;
    Ok(Json(ApiResponse::success(entity)))
}

/// PATCH /{kind}/{id}
pub async fn update_entity(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
    ApiJson(input): ApiJson<EntityInput>,
) -> Result<Json<ApiResponse<RelationEntity>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let id = parse_entity_id(&id)?;
    let entity = state.catalog().update_entity(kind, id, input).await?;
    Ok(Json(ApiResponse::success(entity)))
}

/// GET /{kind}/{id}/shows
pub async fn shows_of_entity(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<EntityShows>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let id = parse_entity_id(&id)?;
    let shows = state.catalog().shows_of_entity(kind, id, &params).await?;
    Ok(Json(ApiResponse::success(shows)))
}
