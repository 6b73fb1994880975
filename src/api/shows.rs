use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::validation::{parse_entity_id, parse_kind, parse_show_id};
use super::{ApiError, ApiJson, ApiResponse, AppState, MessageResponse};
use crate::db::ListParams;
use crate::models::{LinkedEntity, Page, RelationEntry, ShowInput, ShowView, WriteMode};

/// GET /shows
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Page<ShowView>>>, ApiError> {
    let page = state.catalog().list_shows(&params).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// POST /shows
pub async fn create_show(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<ShowInput>,
) -> Result<impl IntoResponse, ApiError> {
    let show = state.catalog().create_show(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(show))))
}

/// GET /shows/{id}
pub async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ShowView>>, ApiError> {
    let id = parse_show_id(&id)?;
    let show = state.catalog().get_show(id).await?;
    Ok(Json(ApiResponse::success(show)))
}

/// PATCH /shows/{id}
pub async fn patch_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ShowInput>,
) -> Result<Json<ApiResponse<ShowView>>, ApiError> {
    write_show(&state, &id, input, WriteMode::Patch).await
}

/// PUT /shows/{id}
pub async fn replace_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ShowInput>,
) -> Result<Json<ApiResponse<ShowView>>, ApiError> {
    write_show(&state, &id, input, WriteMode::Replace).await
}

async fn write_show(
    state: &AppState,
    id: &str,
    input: ShowInput,
    mode: WriteMode,
) -> Result<Json<ApiResponse<ShowView>>, ApiError> {
    let id = parse_show_id(id)?;
    let show = state.catalog().update_show(id, input, mode).await?;
    Ok(Json(ApiResponse::success(show)))
}

/// DELETE /shows/{id}
pub async fn delete_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = parse_show_id(&id)?;
    state.catalog().delete_show(id).await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Show {id} deleted"),
    })))
}

/// GET /shows/{id}/{kind}
pub async fn list_links(
    State(state): State<Arc<AppState>>,
    Path((id, kind)): Path<(String, String)>,
) -> Result<Json<ApiResponse<Vec<LinkedEntity>>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let id = parse_show_id(&id)?;
    let links = state.catalog().show_links(id, kind).await?;
    Ok(Json(ApiResponse::success(links)))
}

/// POST /shows/{id}/{kind}
pub async fn add_link(
    State(state): State<Arc<AppState>>,
    Path((id, kind)): Path<(String, String)>,
    ApiJson(entry): ApiJson<RelationEntry>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let id = parse_show_id(&id)?;
    let linked = state.catalog().link_entity(id, kind, entry).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(linked))))
}

/// DELETE /shows/{id}/{kind}/{entity_id}
pub async fn remove_link(
    State(state): State<Arc<AppState>>,
    Path((id, kind, entity_id)): Path<(String, String, String)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let id = parse_show_id(&id)?;
    let entity_id = parse_entity_id(&entity_id)?;
    state.catalog().unlink_entity(id, kind, entity_id).await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("{} {entity_id} unlinked from show {id}", kind.label()),
    })))
}
