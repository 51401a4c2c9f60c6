use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "media")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// TMDb identifier; rows added by hand may not have one.
    pub tmdb_id: Option<i32>,
    pub titulo: String,
    pub anio: Option<i32>,
    /// Comma-separated genre names, e.g. "Drama, Crimen"
    pub genero: Option<String>,
    pub sinopsis: Option<String>,
    pub director: Option<String>,
    /// Comma-separated top-billed cast
    pub elenco: Option<String>,
    pub imagen: Option<String>,
    /// "pelicula" or "serie"
    pub tipo: String,
    pub temporadas: Option<i32>,
    pub episodios: Option<i32>,
    pub nota_imdb: Option<f32>,
    pub original_title: Option<String>,
    pub runtime: Option<i32>,
    pub production_countries: Option<String>,
    /// TMDb lifecycle status ("Released", "Ended", "Returning Series", ...)
    pub status: Option<String>,
    pub certification: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    pub episode_runtime: Option<i32>,
    /// RFC 3339 timestamp of the last TMDb refresh
    pub last_updated_tmdb: Option<String>,
    pub auto_update_enabled: bool,
    /// Manual flag forcing a refresh on the next pass
    pub needs_update: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::usuario_media::Entity")]
    UsuarioMedia,
    #[sea_orm(has_many = "super::content_translations::Entity")]
    ContentTranslations,
}

impl Related<super::usuario_media::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsuarioMedia.def()
    }
}

impl Related<super::content_translations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContentTranslations.def()
    }
}

impl Related<super::keywords::Entity> for Entity {
    fn to() -> RelationDef {
        super::media_keywords::Relation::Keywords.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::media_keywords::Relation::Media.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
