use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::clients::tmdb::{SearchResult, TmdbMediaType};

#[derive(Deserialize)]
pub struct LanguageQuery {
    pub language: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub language: Option<String>,
}

#[derive(Deserialize)]
pub struct RecommendationsQuery {
    pub language: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
}

const fn default_page() -> u32 {
    1
}

async fn language_or_default(state: &Arc<AppState>, requested: Option<String>) -> String {
    match requested {
        Some(lang) => lang,
        None => state.config().read().await.tmdb.language.clone(),
    }
}

fn parse_media_type(s: &str) -> Result<TmdbMediaType, ApiError> {
    TmdbMediaType::parse(s)
        .ok_or_else(|| ApiError::validation("media_type must be 'movie' or 'tv'"))
}

/// GET /tmdb/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<SearchResult>>>, ApiError> {
    if query.query.trim().is_empty() {
        return Err(ApiError::validation("query is required"));
    }
    let language = language_or_default(&state, query.language).await;

    let results = state
        .tmdb()
        .search_multi(&query.query, &language)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(results)))
}

/// GET /tmdb/{media_type}/{id}
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path((media_type, id)): Path<(String, i32)>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let media_type = parse_media_type(&media_type)?;
    let language = language_or_default(&state, query.language).await;

    let detail = state
        .tmdb()
        .detail_raw(media_type, id, &language)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("TMDb title", id))?;

    Ok(Json(ApiResponse::success(detail)))
}

/// GET /tmdb/{media_type}/{id}/credits
pub async fn credits(
    State(state): State<Arc<AppState>>,
    Path((media_type, id)): Path<(String, i32)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let media_type = parse_media_type(&media_type)?;

    let credits = state
        .tmdb()
        .credits(media_type, id)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("TMDb title", id))?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "director": credits.director_string(media_type),
        "elenco": credits.cast_string(),
    }))))
}

/// GET /tmdb/{media_type}/{id}/videos
pub async fn videos(
    State(state): State<Arc<AppState>>,
    Path((media_type, id)): Path<(String, i32)>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<ApiResponse<Vec<crate::clients::tmdb::Video>>>, ApiError> {
    let media_type = parse_media_type(&media_type)?;
    let language = language_or_default(&state, query.language).await;

    let videos = state
        .tmdb()
        .videos(media_type, id, &language)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(videos)))
}

/// GET /tmdb/{media_type}/{id}/trailer
pub async fn trailer(
    State(state): State<Arc<AppState>>,
    Path((media_type, id)): Path<(String, i32)>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let media_type = parse_media_type(&media_type)?;
    let language = language_or_default(&state, query.language).await;

    let url = state
        .tmdb()
        .trailer_url(media_type, id, &language)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "trailer_url": url }),
    )))
}

/// GET /tmdb/{media_type}/{id}/providers
pub async fn watch_providers(
    State(state): State<Arc<AppState>>,
    Path((media_type, id)): Path<(String, i32)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let media_type = parse_media_type(&media_type)?;

    let providers = state
        .tmdb()
        .watch_providers(media_type, id)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("TMDb title", id))?;

    Ok(Json(ApiResponse::success(providers)))
}

/// GET /tmdb/{media_type}/{id}/external-ids
pub async fn external_ids(
    State(state): State<Arc<AppState>>,
    Path((media_type, id)): Path<(String, i32)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let media_type = parse_media_type(&media_type)?;

    let ids = state
        .tmdb()
        .external_ids(media_type, id)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("TMDb title", id))?;

    Ok(Json(ApiResponse::success(ids)))
}

/// GET /tmdb/{media_type}/{id}/recommendations
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    Path((media_type, id)): Path<(String, i32)>,
    Query(query): Query<RecommendationsQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let media_type = parse_media_type(&media_type)?;
    let language = language_or_default(&state, query.language).await;

    let recs = state
        .tmdb()
        .recommendations(media_type, id, &language, query.page)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("TMDb title", id))?;

    Ok(Json(ApiResponse::success(recs)))
}

/// GET /tmdb/collection/{id}
pub async fn collection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let language = language_or_default(&state, query.language).await;

    let collection = state
        .tmdb()
        .collection(id, &language)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("TMDb collection", id))?;

    Ok(Json(ApiResponse::success(collection)))
}

/// GET /tmdb/person/{id}
pub async fn person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let language = language_or_default(&state, query.language).await;

    let person = state
        .tmdb()
        .person_detail(id, &language)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("TMDb person", id))?;

    Ok(Json(ApiResponse::success(person)))
}

/// GET /tmdb/person/{id}/credits
pub async fn person_credits(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(query): Query<LanguageQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let language = language_or_default(&state, query.language).await;

    let credits = state
        .tmdb()
        .person_combined_credits(id, &language)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("TMDb person", id))?;

    Ok(Json(ApiResponse::success(credits)))
}

/// GET /tmdb/person/{id}/external-ids
pub async fn person_external_ids(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let ids = state
        .tmdb()
        .person_external_ids(id)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("TMDb person", id))?;

    Ok(Json(ApiResponse::success(ids)))
}
