use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{
    ApiError, ApiResponse, AppState, CreateMediaRequest, MediaDto, MediaListQuery, SimilarDto,
    UpdateMediaRequest,
};
use crate::clients::tmdb::TmdbMediaType;
use crate::db::{CatalogEntry, MediaFilters, NewMedia, PersonalUpdate, SharedUpdate};
use crate::services::similarity::{self, DEFAULT_SIMILAR_LIMIT};
use crate::services::stats;

fn filters_from_query(query: &MediaListQuery) -> MediaFilters {
    MediaFilters {
        tipo: query.tipo.clone(),
        pendiente: query.pendiente,
        favorito: query.favorito,
        genero: query.genero.clone(),
        min_year: query.min_year,
        max_year: query.max_year,
        min_nota: query.min_nota,
        min_nota_personal: query.min_nota_personal,
        tag_id: query.tag_id,
        tmdb_id: query.tmdb_id,
        order_by: query.order_by.clone(),
        skip: query.skip,
        limit: query.limit,
    }
}

/// GET /medias
pub async fn list_medias(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<MediaListQuery>,
) -> Result<Response, ApiError> {
    let filters = filters_from_query(&query);

    let entries = state.store().list_catalog(user.id, &filters).await?;
    let mut tag_map = state.store().tag_ids_by_media(user.id).await?;

    let dtos: Vec<MediaDto> = entries
        .into_iter()
        .map(|e| {
            let tag_ids = tag_map.remove(&e.media.id).unwrap_or_default();
            MediaDto::from_entry(e, tag_ids)
        })
        .collect();

    let mut headers = HeaderMap::new();
    if query.include_total {
        let total = state.store().count_catalog(user.id, &filters).await?;
        if let Ok(value) = HeaderValue::from_str(&total.to_string()) {
            headers.insert("X-Total-Count", value);
        }
    }

    Ok((headers, Json(ApiResponse::success(dtos))).into_response())
}

/// GET /medias/{id}
pub async fn get_media(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MediaDto>>, ApiError> {
    let entry = state
        .store()
        .get_catalog_entry(user.id, id)
        .await?
        .ok_or_else(|| ApiError::media_not_found(id))?;

    let mut tag_map = state.store().tag_ids_by_media(user.id).await?;
    let tag_ids = tag_map.remove(&id).unwrap_or_default();

    Ok(Json(ApiResponse::success(MediaDto::from_entry(
        entry, tag_ids,
    ))))
}

/// POST /medias
///
/// With a tmdb_id the row is enriched from TMDb; an existing shared row is
/// attached to the caller instead of duplicated. Manual creates require
/// titulo and tipo and fall back to a (titulo, anio) duplicate check.
pub async fn create_media(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<CreateMediaRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MediaDto>>), ApiError> {
    let media_id = if let Some(tmdb_id) = payload.tmdb_id {
        if let Some(existing) = state.store().find_media_by_tmdb_id(tmdb_id).await? {
            attach_existing(&state, user.id, existing.id).await?
        } else {
            create_from_tmdb(&state, &payload, tmdb_id).await?
        }
    } else {
        create_manual(&state, user.id, &payload).await?
    };

    state.store().attach_media(user.id, media_id).await?;

    apply_personal_fields(&state, user.id, media_id, &payload).await?;

    let entry = state
        .store()
        .get_catalog_entry(user.id, media_id)
        .await?
        .ok_or_else(|| ApiError::internal("Created row vanished"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(MediaDto::from_entry(entry, vec![]))),
    ))
}

async fn attach_existing(
    state: &Arc<AppState>,
    usuario_id: i32,
    media_id: i32,
) -> Result<i32, ApiError> {
    if state.store().is_media_attached(usuario_id, media_id).await? {
        return Err(ApiError::conflict("Media is already in your catalog"));
    }
    Ok(media_id)
}

async fn create_from_tmdb(
    state: &Arc<AppState>,
    payload: &CreateMediaRequest,
    tmdb_id: i32,
) -> Result<i32, ApiError> {
    let media_type = match payload.media_type.as_deref() {
        Some(s) => TmdbMediaType::parse(s)
            .ok_or_else(|| ApiError::validation("media_type must be 'movie' or 'tv'"))?,
        None => TmdbMediaType::from_tipo(payload.tipo.as_deref().unwrap_or("pelicula")),
    };

    let nuevo = state
        .enrichment()
        .fetch_new_media(media_type, tmdb_id)
        .await
        .map_err(|e| ApiError::tmdb_error(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("TMDb title", tmdb_id))?;

    let media_id = state.store().create_media(nuevo).await?;

    match state.enrichment().fetch_keywords(media_type, tmdb_id).await {
        Ok(kws) if !kws.is_empty() => {
            state.store().set_media_keywords(media_id, &kws).await?;
        }
        Ok(_) => {}
        Err(err) => tracing::warn!("Keyword fetch failed for tmdb {tmdb_id}: {err}"),
    }

    Ok(media_id)
}

async fn create_manual(
    state: &Arc<AppState>,
    usuario_id: i32,
    payload: &CreateMediaRequest,
) -> Result<i32, ApiError> {
    let titulo = payload
        .titulo
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("titulo is required"))?;
    let tipo = payload
        .tipo
        .as_deref()
        .ok_or_else(|| ApiError::validation("tipo is required"))?;
    if tipo != "pelicula" && tipo != "serie" {
        return Err(ApiError::validation("tipo must be 'pelicula' or 'serie'"));
    }

    if let Some(existing) = state
        .store()
        .find_media_by_titulo_anio(titulo, payload.anio)
        .await?
    {
        return attach_existing(state, usuario_id, existing.id).await;
    }

    let nuevo = NewMedia {
        tmdb_id: None,
        titulo: titulo.to_string(),
        anio: payload.anio,
        genero: payload.genero.clone(),
        sinopsis: payload.sinopsis.clone(),
        director: payload.director.clone(),
        elenco: payload.elenco.clone(),
        imagen: payload.imagen.clone(),
        tipo: tipo.to_string(),
        ..NewMedia::default()
    };

    Ok(state.store().create_media(nuevo).await?)
}

async fn apply_personal_fields(
    state: &Arc<AppState>,
    usuario_id: i32,
    media_id: i32,
    payload: &CreateMediaRequest,
) -> Result<(), ApiError> {
    let update = PersonalUpdate {
        nota_personal: payload.nota_personal.map(Some),
        anotacion_personal: payload.anotacion_personal.clone().map(Some),
        favorito: payload.favorito,
        pendiente: payload.pendiente,
    };

    if update.nota_personal.is_some()
        || update.anotacion_personal.is_some()
        || update.favorito.is_some()
        || update.pendiente.is_some()
    {
        state
            .store()
            .update_personal(usuario_id, media_id, update)
            .await?;
    }
    Ok(())
}

/// PATCH /medias/{id}
pub async fn update_media(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateMediaRequest>,
) -> Result<Json<ApiResponse<MediaDto>>, ApiError> {
    if !state.store().is_media_attached(user.id, id).await? {
        return Err(ApiError::media_not_found(id));
    }

    if let Some(nota) = payload.nota_personal.flatten()
        && !(0.0..=10.0).contains(&nota)
    {
        return Err(ApiError::validation("nota_personal must be within 0-10"));
    }

    let personal = PersonalUpdate {
        nota_personal: payload.nota_personal,
        anotacion_personal: payload.anotacion_personal,
        favorito: payload.favorito,
        pendiente: payload.pendiente,
    };
    state.store().update_personal(user.id, id, personal).await?;

    let shared = SharedUpdate {
        titulo: payload.titulo,
        genero: payload.genero,
        sinopsis: payload.sinopsis,
        imagen: payload.imagen,
        auto_update_enabled: payload.auto_update_enabled,
        needs_update: payload.needs_update,
    };
    state.store().update_media(id, shared).await?;

    let entry = state
        .store()
        .get_catalog_entry(user.id, id)
        .await?
        .ok_or_else(|| ApiError::media_not_found(id))?;

    let mut tag_map = state.store().tag_ids_by_media(user.id).await?;
    let tag_ids = tag_map.remove(&id).unwrap_or_default();

    Ok(Json(ApiResponse::success(MediaDto::from_entry(
        entry, tag_ids,
    ))))
}

/// DELETE /medias/{id}
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if !state.store().detach_media(user.id, id).await? {
        return Err(ApiError::media_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct SimilaresQuery {
    pub limit: Option<usize>,
}

/// GET /medias/{id}/similares
pub async fn similares(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Query(query): Query<SimilaresQuery>,
) -> Result<Json<ApiResponse<Vec<SimilarDto>>>, ApiError> {
    let source = state
        .store()
        .get_catalog_entry(user.id, id)
        .await?
        .ok_or_else(|| ApiError::media_not_found(id))?;

    let candidates = state
        .store()
        .list_catalog(user.id, &MediaFilters::default())
        .await?;
    let tag_map = state.store().tag_ids_by_media(user.id).await?;
    let keyword_map = state.store().keyword_ids_by_media().await?;

    let limit = query.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);
    let scored = similarity::similares(&source, &candidates, &tag_map, &keyword_map, limit);

    let dtos: Vec<SimilarDto> = scored
        .into_iter()
        .map(|s| SimilarDto {
            score: s.score,
            media: MediaDto::from_entry(s.entry, vec![]),
        })
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /medias/{id}/tags/{tag_id}
pub async fn attach_tag(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, tag_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    if !state.store().is_media_attached(user.id, id).await? {
        return Err(ApiError::media_not_found(id));
    }
    if state.store().get_tag(user.id, tag_id).await?.is_none() {
        return Err(ApiError::tag_not_found(tag_id));
    }
    if !state.store().attach_tag(user.id, id, tag_id).await? {
        return Err(ApiError::conflict("Tag is already attached"));
    }
    Ok(StatusCode::CREATED)
}

/// DELETE /medias/{id}/tags/{tag_id}
pub async fn detach_tag(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, tag_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    if !state.store().detach_tag(user.id, id, tag_id).await? {
        return Err(ApiError::NotFound(format!(
            "Tag {tag_id} is not attached to media {id}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Stats
// ============================================================================

async fn all_entries(state: &Arc<AppState>, usuario_id: i32) -> Result<Vec<CatalogEntry>, ApiError> {
    Ok(state
        .store()
        .list_catalog(usuario_id, &MediaFilters::default())
        .await?)
}

#[derive(Deserialize)]
pub struct StatsCountQuery {
    pub tipo: Option<String>,
    pub pendiente: Option<bool>,
}

/// GET /medias/stats/count
pub async fn stats_count(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<StatsCountQuery>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let entries = all_entries(&state, user.id).await?;
    let total = stats::count(&entries, query.tipo.as_deref(), query.pendiente);
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "total": total }),
    )))
}

#[derive(Deserialize)]
pub struct StatsTipoQuery {
    pub tipo: Option<String>,
}

/// GET /medias/stats/top5
pub async fn stats_top5(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<StatsTipoQuery>,
) -> Result<Json<ApiResponse<Vec<stats::TopEntry>>>, ApiError> {
    let entries = all_entries(&state, user.id).await?;
    let tipo = query.tipo.as_deref().unwrap_or("pelicula");
    Ok(Json(ApiResponse::success(stats::top5(&entries, tipo))))
}

/// GET /medias/stats/peor
pub async fn stats_peor(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<StatsTipoQuery>,
) -> Result<Json<ApiResponse<MediaDto>>, ApiError> {
    let entries = all_entries(&state, user.id).await?;
    let tipo = query.tipo.as_deref().unwrap_or("pelicula");
    let peor = stats::peor(&entries, tipo)
        .ok_or_else(|| ApiError::NotFound(format!("No rated {tipo} in your catalog")))?;
    Ok(Json(ApiResponse::success(MediaDto::from_entry(
        peor,
        vec![],
    ))))
}

/// GET /medias/stats/distribucion-generos
pub async fn stats_distribucion_generos(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<std::collections::HashMap<String, usize>>>, ApiError> {
    let entries = all_entries(&state, user.id).await?;
    Ok(Json(ApiResponse::success(stats::distribucion_generos(
        &entries,
    ))))
}

/// GET /medias/stats/generos-vistos
pub async fn stats_generos_vistos(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<stats::GenerosVistos>>, ApiError> {
    let entries = all_entries(&state, user.id).await?;
    Ok(Json(ApiResponse::success(stats::generos_vistos(&entries))))
}

/// GET /medias/stats/vistos-por-anio
pub async fn stats_vistos_por_anio(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<std::collections::BTreeMap<i32, usize>>>, ApiError> {
    let entries = all_entries(&state, user.id).await?;
    Ok(Json(ApiResponse::success(stats::vistos_por_anio(&entries))))
}

/// GET /medias/stats/top-personas
pub async fn stats_top_personas(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<stats::TopPersonas>>, ApiError> {
    let entries = all_entries(&state, user.id).await?;
    Ok(Json(ApiResponse::success(stats::top_personas(&entries))))
}
