use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::collections::HashSet;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{
    AddListaMediaRequest, ApiError, ApiResponse, AppState, CreateListaRequest, ListaDetailDto,
    ListaDto, ListaItemDto, ReorderListaRequest, UpdateListaRequest,
};
use crate::db::ListaRow;

async fn require_lista(
    state: &Arc<AppState>,
    usuario_id: i32,
    lista_id: i32,
) -> Result<ListaRow, ApiError> {
    state
        .store()
        .get_lista(usuario_id, lista_id)
        .await?
        .ok_or_else(|| ApiError::lista_not_found(lista_id))
}

/// GET /listas
pub async fn list_listas(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<ListaDto>>>, ApiError> {
    let listas = state.store().list_listas(user.id).await?;
    Ok(Json(ApiResponse::success(
        listas.into_iter().map(ListaDto::from).collect(),
    )))
}

/// GET /listas/{id}
pub async fn get_lista(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ListaDetailDto>>, ApiError> {
    let lista = require_lista(&state, user.id, id).await?;
    let items = state.store().lista_items(id).await?;

    Ok(Json(ApiResponse::success(ListaDetailDto {
        id: lista.id,
        nombre: lista.nombre,
        descripcion: lista.descripcion,
        fecha_creacion: lista.fecha_creacion,
        items: items.into_iter().map(ListaItemDto::from).collect(),
    })))
}

/// POST /listas
pub async fn create_lista(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<CreateListaRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ListaDto>>), ApiError> {
    let nombre = payload.nombre.trim();
    if nombre.is_empty() {
        return Err(ApiError::validation("Lista name is required"));
    }

    if state
        .store()
        .find_lista_by_name(user.id, nombre)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(format!(
            "Lista '{nombre}' already exists"
        )));
    }

    let lista = state
        .store()
        .create_lista(user.id, nombre, payload.descripcion.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(lista.into()))))
}

/// PUT /listas/{id}
pub async fn update_lista(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateListaRequest>,
) -> Result<Json<ApiResponse<ListaDto>>, ApiError> {
    require_lista(&state, user.id, id).await?;

    if let Some(nombre) = payload.nombre.as_deref() {
        let nombre = nombre.trim();
        if nombre.is_empty() {
            return Err(ApiError::validation("Lista name is required"));
        }
        if let Some(existing) = state.store().find_lista_by_name(user.id, nombre).await?
            && existing.id != id
        {
            return Err(ApiError::conflict(format!(
                "Lista '{nombre}' already exists"
            )));
        }
    }

    state
        .store()
        .update_lista(
            user.id,
            id,
            payload.nombre.as_deref().map(str::trim),
            payload.descripcion.as_ref().map(Option::as_deref),
        )
        .await?;

    let lista = require_lista(&state, user.id, id).await?;
    Ok(Json(ApiResponse::success(lista.into())))
}

/// DELETE /listas/{id}
pub async fn delete_lista(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if !state.store().delete_lista(user.id, id).await? {
        return Err(ApiError::lista_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /listas/{id}/medias
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<ListaItemDto>>>, ApiError> {
    require_lista(&state, user.id, id).await?;
    let items = state.store().lista_items(id).await?;
    Ok(Json(ApiResponse::success(
        items.into_iter().map(ListaItemDto::from).collect(),
    )))
}

/// POST /listas/{id}/medias
pub async fn add_media(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<AddListaMediaRequest>,
) -> Result<StatusCode, ApiError> {
    require_lista(&state, user.id, id).await?;

    if !state
        .store()
        .is_media_attached(user.id, payload.media_id)
        .await?
    {
        return Err(ApiError::media_not_found(payload.media_id));
    }

    if !state
        .store()
        .add_media_to_lista(id, payload.media_id, payload.personal_position)
        .await?
    {
        return Err(ApiError::conflict("Media is already in this lista"));
    }

    Ok(StatusCode::CREATED)
}

/// DELETE /listas/{id}/medias/{media_id}
pub async fn remove_media(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path((id, media_id)): Path<(i32, i32)>,
) -> Result<StatusCode, ApiError> {
    require_lista(&state, user.id, id).await?;

    if !state.store().remove_media_from_lista(id, media_id).await? {
        return Err(ApiError::NotFound(format!(
            "Media {media_id} is not in lista {id}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /listas/{id}/reorder
///
/// The body must be a permutation of the lista's current media ids.
pub async fn reorder(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<ReorderListaRequest>,
) -> Result<Json<ApiResponse<Vec<ListaItemDto>>>, ApiError> {
    require_lista(&state, user.id, id).await?;

    let items = state.store().lista_items(id).await?;
    let current: HashSet<i32> = items.iter().map(|i| i.media_id).collect();
    let given: HashSet<i32> = payload.media_ids.iter().copied().collect();

    if given.len() != payload.media_ids.len() {
        return Err(ApiError::validation("media_ids contains duplicates"));
    }
    if current != given {
        return Err(ApiError::validation(
            "media_ids must contain exactly the lista's current items",
        ));
    }

    state.store().reorder_lista(id, &payload.media_ids).await?;

    let items = state.store().lista_items(id).await?;
    Ok(Json(ApiResponse::success(
        items.into_iter().map(ListaItemDto::from).collect(),
    )))
}
