use std::collections::HashMap;

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::info;

use crate::entities::{keywords, media, media_keywords, media_tags, prelude::*, usuario_media};

/// Shared catalog row, independent of any user.
#[derive(Debug, Clone)]
pub struct MediaRow {
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
    pub last_updated_tmdb: Option<String>,
    pub auto_update_enabled: bool,
    pub needs_update: bool,
}

/// Catalog row merged with the owning user's personal fields.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub media: MediaRow,
    pub nota_personal: Option<f32>,
    pub anotacion_personal: Option<String>,
    pub favorito: bool,
    pub pendiente: bool,
    pub fecha_agregado: String,
}

/// Fields settable when creating a shared catalog row.
#[derive(Debug, Clone, Default)]
pub struct NewMedia {
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
}

/// Partial update of the caller's personal fields.
#[derive(Debug, Clone, Default)]
pub struct PersonalUpdate {
    pub nota_personal: Option<Option<f32>>,
    pub anotacion_personal: Option<Option<String>>,
    pub favorito: Option<bool>,
    pub pendiente: Option<bool>,
}

/// Partial update of shared metadata fields.
#[derive(Debug, Clone, Default)]
pub struct SharedUpdate {
    pub titulo: Option<String>,
    pub genero: Option<String>,
    pub sinopsis: Option<String>,
    pub imagen: Option<String>,
    pub auto_update_enabled: Option<bool>,
    pub needs_update: Option<bool>,
}

/// Metadata fields overwritten by a TMDb refresh.
#[derive(Debug, Clone, Default)]
pub struct RefreshedMetadata {
    pub titulo: Option<String>,
    pub genero: Option<String>,
    pub sinopsis: Option<String>,
    pub director: Option<String>,
    pub elenco: Option<String>,
    pub imagen: Option<String>,
    pub temporadas: Option<i32>,
    pub episodios: Option<i32>,
    pub nota_imdb: Option<f32>,
    pub runtime: Option<i32>,
    pub status: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    pub episode_runtime: Option<i32>,
}

/// List filters for a user's catalog.
#[derive(Debug, Clone, Default)]
pub struct MediaFilters {
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
    pub skip: u64,
    pub limit: Option<u64>,
}

pub struct MediaRepository {
    conn: DatabaseConnection,
}

impl MediaRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Model Conversion Helpers
    // ========================================================================

    fn map_media_model(m: media::Model) -> MediaRow {
        MediaRow {
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
            last_updated_tmdb: m.last_updated_tmdb,
            auto_update_enabled: m.auto_update_enabled,
            needs_update: m.needs_update,
        }
    }

    fn map_entry(um: usuario_media::Model, m: media::Model) -> CatalogEntry {
        CatalogEntry {
            media: Self::map_media_model(m),
            nota_personal: um.nota_personal,
            anotacion_personal: um.anotacion_personal,
            favorito: um.favorito,
            pendiente: um.pendiente,
            fecha_agregado: um.fecha_agregado,
        }
    }

    // ========================================================================
    // Listing & Filtering
    // ========================================================================

    async fn tag_media_ids(&self, usuario_id: i32, tag_id: i32) -> Result<Vec<i32>> {
        let rows = MediaTags::find()
            .filter(media_tags::Column::UsuarioId.eq(usuario_id))
            .filter(media_tags::Column::TagId.eq(tag_id))
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|r| r.media_id).collect())
    }

    async fn filtered_query(
        &self,
        usuario_id: i32,
        filters: &MediaFilters,
    ) -> Result<sea_orm::SelectTwo<UsuarioMedia, Media>> {
        let mut query = UsuarioMedia::find()
            .find_also_related(Media)
            .filter(usuario_media::Column::UsuarioId.eq(usuario_id));

        if let Some(tipo) = &filters.tipo {
            query = query.filter(media::Column::Tipo.eq(tipo));
        }
        if let Some(pendiente) = filters.pendiente {
            query = query.filter(usuario_media::Column::Pendiente.eq(pendiente));
        }
        if let Some(favorito) = filters.favorito {
            query = query.filter(usuario_media::Column::Favorito.eq(favorito));
        }
        if let Some(genero) = &filters.genero {
            query = query.filter(media::Column::Genero.contains(genero));
        }
        if let Some(min_year) = filters.min_year {
            query = query.filter(media::Column::Anio.gte(min_year));
        }
        if let Some(max_year) = filters.max_year {
            query = query.filter(media::Column::Anio.lte(max_year));
        }
        if let Some(min_nota) = filters.min_nota {
            query = query.filter(media::Column::NotaImdb.gte(min_nota));
        }
        if let Some(min_personal) = filters.min_nota_personal {
            query = query.filter(usuario_media::Column::NotaPersonal.gte(min_personal));
        }
        if let Some(tmdb_id) = filters.tmdb_id {
            query = query.filter(media::Column::TmdbId.eq(tmdb_id));
        }
        if let Some(tag_id) = filters.tag_id {
            let ids = self.tag_media_ids(usuario_id, tag_id).await?;
            query = query.filter(usuario_media::Column::MediaId.is_in(ids));
        }

        query = match filters.order_by.as_deref() {
            Some("titulo") => query.order_by_asc(media::Column::Titulo),
            Some("titulo_desc") => query.order_by_desc(media::Column::Titulo),
            Some("anio") => query.order_by_asc(media::Column::Anio),
            Some("anio_desc") => query.order_by_desc(media::Column::Anio),
            Some("nota_imdb") => query.order_by_asc(media::Column::NotaImdb),
            Some("nota_imdb_desc") => query.order_by_desc(media::Column::NotaImdb),
            Some("nota_personal") => query.order_by_asc(usuario_media::Column::NotaPersonal),
            Some("nota_personal_desc") => query.order_by_desc(usuario_media::Column::NotaPersonal),
            Some("fecha_agregado") => query.order_by_asc(usuario_media::Column::FechaAgregado),
            _ => query.order_by_desc(usuario_media::Column::FechaAgregado),
        };

        Ok(query)
    }

    pub async fn list_for_user(
        &self,
        usuario_id: i32,
        filters: &MediaFilters,
    ) -> Result<Vec<CatalogEntry>> {
        let mut query = self.filtered_query(usuario_id, filters).await?;

        if filters.skip > 0 {
            query = query.offset(filters.skip);
        }
        if let Some(limit) = filters.limit {
            query = query.limit(limit);
        }

        let rows = query.all(&self.conn).await?;

        Ok(rows
            .into_iter()
            .filter_map(|(um, m)| m.map(|m| Self::map_entry(um, m)))
            .collect())
    }

    pub async fn count_for_user(&self, usuario_id: i32, filters: &MediaFilters) -> Result<u64> {
        let query = self.filtered_query(usuario_id, filters).await?;
        Ok(query.count(&self.conn).await?)
    }

    pub async fn get_entry(&self, usuario_id: i32, media_id: i32) -> Result<Option<CatalogEntry>> {
        let row = UsuarioMedia::find()
            .find_also_related(Media)
            .filter(usuario_media::Column::UsuarioId.eq(usuario_id))
            .filter(usuario_media::Column::MediaId.eq(media_id))
            .one(&self.conn)
            .await?;

        Ok(row.and_then(|(um, m)| m.map(|m| Self::map_entry(um, m))))
    }

    // ========================================================================
    // Shared Row Lookup & Creation
    // ========================================================================

    pub async fn get(&self, media_id: i32) -> Result<Option<MediaRow>> {
        let row = Media::find_by_id(media_id).one(&self.conn).await?;
        Ok(row.map(Self::map_media_model))
    }

    pub async fn find_by_tmdb_id(&self, tmdb_id: i32) -> Result<Option<MediaRow>> {
        let row = Media::find()
            .filter(media::Column::TmdbId.eq(tmdb_id))
            .one(&self.conn)
            .await?;
        Ok(row.map(Self::map_media_model))
    }

    pub async fn find_by_titulo_anio(
        &self,
        titulo: &str,
        anio: Option<i32>,
    ) -> Result<Option<MediaRow>> {
        let mut query = Media::find().filter(media::Column::Titulo.eq(titulo));
        query = match anio {
            Some(anio) => query.filter(media::Column::Anio.eq(anio)),
            None => query.filter(media::Column::Anio.is_null()),
        };
        let row = query.one(&self.conn).await?;
        Ok(row.map(Self::map_media_model))
    }

    pub async fn create(&self, nuevo: NewMedia) -> Result<i32> {
        let active = media::ActiveModel {
            tmdb_id: Set(nuevo.tmdb_id),
            titulo: Set(nuevo.titulo.clone()),
            anio: Set(nuevo.anio),
            genero: Set(nuevo.genero),
            sinopsis: Set(nuevo.sinopsis),
            director: Set(nuevo.director),
            elenco: Set(nuevo.elenco),
            imagen: Set(nuevo.imagen),
            tipo: Set(nuevo.tipo),
            temporadas: Set(nuevo.temporadas),
            episodios: Set(nuevo.episodios),
            nota_imdb: Set(nuevo.nota_imdb),
            original_title: Set(nuevo.original_title),
            runtime: Set(nuevo.runtime),
            production_countries: Set(nuevo.production_countries),
            status: Set(nuevo.status),
            certification: Set(nuevo.certification),
            first_air_date: Set(nuevo.first_air_date),
            last_air_date: Set(nuevo.last_air_date),
            episode_runtime: Set(nuevo.episode_runtime),
            last_updated_tmdb: Set(Some(chrono::Utc::now().to_rfc3339())),
            auto_update_enabled: Set(true),
            needs_update: Set(false),
            ..Default::default()
        };

        let res = Media::insert(active).exec(&self.conn).await?;
        info!("Created catalog row {}: {}", res.last_insert_id, nuevo.titulo);
        Ok(res.last_insert_id)
    }

    // ========================================================================
    // User Attachment
    // ========================================================================

    pub async fn is_attached(&self, usuario_id: i32, media_id: i32) -> Result<bool> {
        let row = UsuarioMedia::find_by_id((usuario_id, media_id))
            .one(&self.conn)
            .await?;
        Ok(row.is_some())
    }

    pub async fn attach_to_user(&self, usuario_id: i32, media_id: i32) -> Result<()> {
        let active = usuario_media::ActiveModel {
            usuario_id: Set(usuario_id),
            media_id: Set(media_id),
            nota_personal: Set(None),
            anotacion_personal: Set(None),
            favorito: Set(false),
            pendiente: Set(false),
            fecha_agregado: Set(chrono::Utc::now().to_rfc3339()),
        };

        UsuarioMedia::insert(active).exec(&self.conn).await?;
        Ok(())
    }

    /// Detach a row from a user's catalog. The shared row is removed when no
    /// other user still references it. Returns false if the row was not in
    /// the user's catalog.
    pub async fn detach_from_user(&self, usuario_id: i32, media_id: i32) -> Result<bool> {
        let result = UsuarioMedia::delete_by_id((usuario_id, media_id))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Ok(false);
        }

        let remaining = UsuarioMedia::find()
            .filter(usuario_media::Column::MediaId.eq(media_id))
            .count(&self.conn)
            .await?;

        if remaining == 0 {
            Media::delete_by_id(media_id).exec(&self.conn).await?;
            info!("Removed orphaned catalog row {media_id}");
        }

        Ok(true)
    }

    // ========================================================================
    // Updates
    // ========================================================================

    pub async fn update_personal(
        &self,
        usuario_id: i32,
        media_id: i32,
        update: PersonalUpdate,
    ) -> Result<bool> {
        let Some(row) = UsuarioMedia::find_by_id((usuario_id, media_id))
            .one(&self.conn)
            .await?
        else {
            return Ok(false);
        };

        let mut active: usuario_media::ActiveModel = row.into();
        if let Some(nota) = update.nota_personal {
            active.nota_personal = Set(nota);
        }
        if let Some(anotacion) = update.anotacion_personal {
            active.anotacion_personal = Set(anotacion);
        }
        if let Some(favorito) = update.favorito {
            active.favorito = Set(favorito);
        }
        if let Some(pendiente) = update.pendiente {
            active.pendiente = Set(pendiente);
        }
        active.update(&self.conn).await?;

        Ok(true)
    }

    pub async fn update_shared(&self, media_id: i32, update: SharedUpdate) -> Result<bool> {
        let Some(row) = Media::find_by_id(media_id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: media::ActiveModel = row.into();
        if let Some(titulo) = update.titulo {
            active.titulo = Set(titulo);
        }
        if let Some(genero) = update.genero {
            active.genero = Set(Some(genero));
        }
        if let Some(sinopsis) = update.sinopsis {
            active.sinopsis = Set(Some(sinopsis));
        }
        if let Some(imagen) = update.imagen {
            active.imagen = Set(Some(imagen));
        }
        if let Some(enabled) = update.auto_update_enabled {
            active.auto_update_enabled = Set(enabled);
        }
        if let Some(needs_update) = update.needs_update {
            active.needs_update = Set(needs_update);
        }
        active.update(&self.conn).await?;

        Ok(true)
    }

    /// Overwrite metadata after a TMDb refresh and clear the manual flag.
    pub async fn apply_refresh(&self, media_id: i32, refreshed: RefreshedMetadata) -> Result<()> {
        let Some(row) = Media::find_by_id(media_id).one(&self.conn).await? else {
            anyhow::bail!("Catalog row {media_id} not found");
        };

        let mut active: media::ActiveModel = row.into();
        if let Some(titulo) = refreshed.titulo {
            active.titulo = Set(titulo);
        }
        if let Some(genero) = refreshed.genero {
            active.genero = Set(Some(genero));
        }
        if let Some(sinopsis) = refreshed.sinopsis {
            active.sinopsis = Set(Some(sinopsis));
        }
        if let Some(director) = refreshed.director {
            active.director = Set(Some(director));
        }
        if let Some(elenco) = refreshed.elenco {
            active.elenco = Set(Some(elenco));
        }
        if let Some(imagen) = refreshed.imagen {
            active.imagen = Set(Some(imagen));
        }
        if let Some(temporadas) = refreshed.temporadas {
            active.temporadas = Set(Some(temporadas));
        }
        if let Some(episodios) = refreshed.episodios {
            active.episodios = Set(Some(episodios));
        }
        if let Some(nota) = refreshed.nota_imdb {
            active.nota_imdb = Set(Some(nota));
        }
        if let Some(runtime) = refreshed.runtime {
            active.runtime = Set(Some(runtime));
        }
        if let Some(status) = refreshed.status {
            active.status = Set(Some(status));
        }
        if let Some(first_air) = refreshed.first_air_date {
            active.first_air_date = Set(Some(first_air));
        }
        if let Some(last_air) = refreshed.last_air_date {
            active.last_air_date = Set(Some(last_air));
        }
        if let Some(ep_runtime) = refreshed.episode_runtime {
            active.episode_runtime = Set(Some(ep_runtime));
        }
        active.last_updated_tmdb = Set(Some(chrono::Utc::now().to_rfc3339()));
        active.needs_update = Set(false);
        active.update(&self.conn).await?;

        Ok(())
    }

    /// All shared rows, used by the refresh pass and its stats endpoint.
    pub async fn list_all(&self) -> Result<Vec<MediaRow>> {
        let rows = Media::find()
            .order_by_asc(media::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Self::map_media_model).collect())
    }

    pub async fn count_all(&self) -> Result<u64> {
        Ok(Media::find().count(&self.conn).await?)
    }

    // ========================================================================
    // Tags on Media
    // ========================================================================

    pub async fn attach_tag(&self, usuario_id: i32, media_id: i32, tag_id: i32) -> Result<bool> {
        let existing = MediaTags::find_by_id((usuario_id, media_id, tag_id))
            .one(&self.conn)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        let active = media_tags::ActiveModel {
            usuario_id: Set(usuario_id),
            media_id: Set(media_id),
            tag_id: Set(tag_id),
        };
        MediaTags::insert(active).exec(&self.conn).await?;
        Ok(true)
    }

    pub async fn detach_tag(&self, usuario_id: i32, media_id: i32, tag_id: i32) -> Result<bool> {
        let result = MediaTags::delete_by_id((usuario_id, media_id, tag_id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Tag ids per media row for one user, for the similarity scorer.
    pub async fn tag_ids_by_media(&self, usuario_id: i32) -> Result<HashMap<i32, Vec<i32>>> {
        let rows = MediaTags::find()
            .filter(media_tags::Column::UsuarioId.eq(usuario_id))
            .all(&self.conn)
            .await?;

        let mut map: HashMap<i32, Vec<i32>> = HashMap::new();
        for row in rows {
            map.entry(row.media_id).or_default().push(row.tag_id);
        }
        Ok(map)
    }

    // ========================================================================
    // Keywords
    // ========================================================================

    /// Upsert TMDb keywords and replace the row's keyword links.
    pub async fn set_keywords(&self, media_id: i32, kws: &[(i32, String)]) -> Result<()> {
        MediaKeywords::delete_many()
            .filter(media_keywords::Column::MediaId.eq(media_id))
            .exec(&self.conn)
            .await?;

        for (tmdb_keyword_id, nombre) in kws {
            let keyword = Keywords::find()
                .filter(keywords::Column::TmdbKeywordId.eq(*tmdb_keyword_id))
                .one(&self.conn)
                .await?;

            let keyword_id = match keyword {
                Some(k) => k.id,
                None => {
                    let active = keywords::ActiveModel {
                        tmdb_keyword_id: Set(*tmdb_keyword_id),
                        nombre: Set(nombre.clone()),
                        ..Default::default()
                    };
                    Keywords::insert(active).exec(&self.conn).await?.last_insert_id
                }
            };

            let link = media_keywords::ActiveModel {
                media_id: Set(media_id),
                keyword_id: Set(keyword_id),
            };
            MediaKeywords::insert(link).exec(&self.conn).await?;
        }

        Ok(())
    }

    /// Keyword ids per media row, for the similarity scorer.
    pub async fn keyword_ids_by_media(&self) -> Result<HashMap<i32, Vec<i32>>> {
        let rows = MediaKeywords::find().all(&self.conn).await?;

        let mut map: HashMap<i32, Vec<i32>> = HashMap::new();
        for row in rows {
            map.entry(row.media_id).or_default().push(row.keyword_id);
        }
        Ok(map)
    }
}
