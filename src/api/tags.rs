use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, TagDto, TagRequest};

/// GET /tags
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<TagDto>>>, ApiError> {
    let tags = state.store().list_tags(user.id).await?;
    Ok(Json(ApiResponse::success(
        tags.into_iter().map(TagDto::from).collect(),
    )))
}

/// GET /tags/{id}
pub async fn get_tag(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<TagDto>>, ApiError> {
    let tag = state
        .store()
        .get_tag(user.id, id)
        .await?
        .ok_or_else(|| ApiError::tag_not_found(id))?;
    Ok(Json(ApiResponse::success(tag.into())))
}

/// POST /tags
pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<TagRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TagDto>>), ApiError> {
    let nombre = payload.nombre.trim();
    if nombre.is_empty() {
        return Err(ApiError::validation("Tag name is required"));
    }

    if state.store().find_tag_by_name(user.id, nombre).await?.is_some() {
        return Err(ApiError::conflict(format!("Tag '{nombre}' already exists")));
    }

    let tag = state.store().create_tag(user.id, nombre).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(tag.into()))))
}

/// PUT /tags/{id}
pub async fn rename_tag(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<TagRequest>,
) -> Result<Json<ApiResponse<TagDto>>, ApiError> {
    let nombre = payload.nombre.trim();
    if nombre.is_empty() {
        return Err(ApiError::validation("Tag name is required"));
    }

    if let Some(existing) = state.store().find_tag_by_name(user.id, nombre).await?
        && existing.id != id
    {
        return Err(ApiError::conflict(format!("Tag '{nombre}' already exists")));
    }

    if !state.store().rename_tag(user.id, id, nombre).await? {
        return Err(ApiError::tag_not_found(id));
    }

    let tag = state
        .store()
        .get_tag(user.id, id)
        .await?
        .ok_or_else(|| ApiError::tag_not_found(id))?;
    Ok(Json(ApiResponse::success(tag.into())))
}

/// DELETE /tags/{id}
pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if !state.store().delete_tag(user.id, id).await? {
        return Err(ApiError::tag_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
