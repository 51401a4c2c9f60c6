use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::refresh::{BatchReport, RefreshStats};

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub uptime_seconds: u64,
    pub media_count: u64,
    pub database: String,
}

/// GET /health
///
/// Unauthenticated liveness probe, checks the database connection.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store().ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            tracing::error!("Health check failed: {err}");
            (StatusCode::SERVICE_UNAVAILABLE, "database unreachable")
        }
    }
}

/// GET /system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<StatusResponse>>, ApiError> {
    let database = match state.store().ping().await {
        Ok(()) => "ok".to_string(),
        Err(_) => "error".to_string(),
    };

    let media_count = state.store().count_media().await?;

    Ok(Json(ApiResponse::success(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        media_count,
        database,
    })))
}

/// GET /system/refresh/stats
pub async fn refresh_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<RefreshStats>>, ApiError> {
    let stats = state.refresh().stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

#[derive(Deserialize)]
pub struct RefreshRunQuery {
    pub limit: Option<u64>,
}

/// POST /system/refresh/run
pub async fn refresh_run(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RefreshRunQuery>,
) -> Result<Json<ApiResponse<BatchReport>>, ApiError> {
    let limit = match query.limit {
        Some(limit) => limit,
        None => state.config().read().await.scheduler.refresh_batch_limit,
    };

    let report = state.refresh().run_batch(limit).await?;
    Ok(Json(ApiResponse::success(report)))
}
