use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState, TranslationDto};

#[derive(Deserialize)]
pub struct TranslationQuery {
    pub lang: String,
}

/// GET /medias/{id}/translation?lang=xx
pub async fn get_translation(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Query(query): Query<TranslationQuery>,
) -> Result<Json<ApiResponse<TranslationDto>>, ApiError> {
    if !state.store().is_media_attached(user.id, id).await? {
        return Err(ApiError::media_not_found(id));
    }

    let lang = query.lang.trim().to_lowercase();
    if lang.is_empty() {
        return Err(ApiError::validation("lang is required"));
    }

    let translation = state
        .translations()
        .get_or_fetch(id, &lang)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?
        .ok_or_else(|| {
            ApiError::NotFound(format!("No {lang} translation available for media {id}"))
        })?;

    Ok(Json(ApiResponse::success(translation.into())))
}

/// DELETE /medias/{id}/translation?lang=xx
pub async fn evict_translation(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Query(query): Query<TranslationQuery>,
) -> Result<StatusCode, ApiError> {
    if !state.store().is_media_attached(user.id, id).await? {
        return Err(ApiError::media_not_found(id));
    }

    let lang = query.lang.trim().to_lowercase();
    if !state.translations().evict(id, &lang).await? {
        return Err(ApiError::NotFound(format!(
            "No cached {lang} translation for media {id}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}
