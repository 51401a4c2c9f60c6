use serde::{Deserialize, Deserializer, Serialize};

use crate::db::{CatalogEntry, ListaItem, ListaRow, TagRow, TranslationRow};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Distinguishes "field absent" from "field set to null" in PATCH bodies.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

#[derive(Debug, Serialize)]
pub struct MediaDto {
    pub id: i32,
    pub tmdb_id: Option<i32>,
    pub titulo: String,
    pub anio: Option<i32>,
    pub genero: Option<String>,
    pub sinopsis: Option<String>,
    pub director: Option<String>,
    pub elenco: Option<String>,
    pub imagen: Option<String>,
    pub tipo: String,
    pub temporadas: Option<i32>,
    pub episodios: Option<i32>,
    pub nota_imdb: Option<f32>,
    pub original_title: Option<String>,
    pub runtime: Option<i32>,
    pub production_countries: Option<String>,
    pub status: Option<String>,
    pub certification: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    pub episode_runtime: Option<i32>,
    pub auto_update_enabled: bool,
    pub nota_personal: Option<f32>,
    pub anotacion_personal: Option<String>,
    pub favorito: bool,
    pub pendiente: bool,
    pub fecha_agregado: String,
    pub tag_ids: Vec<i32>,
}

impl MediaDto {
    #[must_use]
    pub fn from_entry(entry: CatalogEntry, tag_ids: Vec<i32>) -> Self {
        let m = entry.media;
        Self {
            id: m.id,
            tmdb_id: m.tmdb_id,
            titulo: m.titulo,
            anio: m.anio,
            genero: m.genero,
            sinopsis: m.sinopsis,
            director: m.director,
            elenco: m.elenco,
            imagen: m.imagen,
            tipo: m.tipo,
            temporadas: m.temporadas,
            episodios: m.episodios,
            nota_imdb: m.nota_imdb,
            original_title: m.original_title,
            runtime: m.runtime,
            production_countries: m.production_countries,
            status: m.status,
            certification: m.certification,
            first_air_date: m.first_air_date,
            last_air_date: m.last_air_date,
            episode_runtime: m.episode_runtime,
            auto_update_enabled: m.auto_update_enabled,
            nota_personal: entry.nota_personal,
            anotacion_personal: entry.anotacion_personal,
            favorito: entry.favorito,
            pendiente: entry.pendiente,
            fecha_agregado: entry.fecha_agregado,
            tag_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SimilarDto {
    pub score: i32,
    #[serde(flatten)]
    pub media: MediaDto,
}

#[derive(Debug, Deserialize)]
pub struct CreateMediaRequest {
    pub tmdb_id: Option<i32>,
    pub media_type: Option<String>,
    pub titulo: Option<String>,
    pub anio: Option<i32>,
    pub tipo: Option<String>,
    pub genero: Option<String>,
    pub sinopsis: Option<String>,
    pub director: Option<String>,
    pub elenco: Option<String>,
    pub imagen: Option<String>,
    pub nota_personal: Option<f32>,
    pub anotacion_personal: Option<String>,
    #[serde(default)]
    pub favorito: Option<bool>,
    #[serde(default)]
    pub pendiente: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMediaRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub nota_personal: Option<Option<f32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub anotacion_personal: Option<Option<String>>,
    pub favorito: Option<bool>,
    pub pendiente: Option<bool>,
    pub titulo: Option<String>,
    pub genero: Option<String>,
    pub sinopsis: Option<String>,
    pub imagen: Option<String>,
    pub auto_update_enabled: Option<bool>,
    pub needs_update: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct MediaListQuery {
    pub tipo: Option<String>,
    pub pendiente: Option<bool>,
    pub favorito: Option<bool>,
    pub genero: Option<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub min_nota: Option<f32>,
    pub min_nota_personal: Option<f32>,
    pub tag_id: Option<i32>,
    pub tmdb_id: Option<i32>,
    pub order_by: Option<String>,
    #[serde(default)]
    pub skip: u64,
    pub limit: Option<u64>,
    #[serde(default)]
    pub include_total: bool,
}

#[derive(Debug, Serialize)]
pub struct TagDto {
    pub id: i32,
    pub nombre: String,
}

impl From<TagRow> for TagDto {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            nombre: row.nombre,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub nombre: String,
}

#[derive(Debug, Serialize)]
pub struct ListaDto {
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub fecha_creacion: String,
}

impl From<ListaRow> for ListaDto {
    fn from(row: ListaRow) -> Self {
        Self {
            id: row.id,
            nombre: row.nombre,
            descripcion: row.descripcion,
            fecha_creacion: row.fecha_creacion,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListaDetailDto {
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub fecha_creacion: String,
    pub items: Vec<ListaItemDto>,
}

#[derive(Debug, Serialize)]
pub struct ListaItemDto {
    pub media_id: i32,
    pub personal_position: Option<i32>,
}

impl From<ListaItem> for ListaItemDto {
    fn from(item: ListaItem) -> Self {
        Self {
            media_id: item.media_id,
            personal_position: item.personal_position,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateListaRequest {
    pub nombre: String,
    pub descripcion: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateListaRequest {
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub descripcion: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct AddListaMediaRequest {
    pub media_id: i32,
    pub personal_position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderListaRequest {
    pub media_ids: Vec<i32>,
}

#[derive(Debug, Serialize)]
pub struct TranslationDto {
    pub media_id: i32,
    pub language_code: String,
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub tagline: Option<String>,
    pub certification: Option<String>,
    pub release_date: Option<String>,
}

impl From<TranslationRow> for TranslationDto {
    fn from(row: TranslationRow) -> Self {
        Self {
            media_id: row.media_id,
            language_code: row.language_code,
            title: row.title,
            synopsis: row.synopsis,
            poster_url: row.poster_url,
            backdrop_url: row.backdrop_url,
            tagline: row.tagline,
            certification: row.certification,
            release_date: row.release_date,
        }
    }
}
