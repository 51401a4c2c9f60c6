use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "keywords")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub tmdb_keyword_id: i32,
    pub nombre: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::media_keywords::Entity")]
    MediaKeywords,
}

impl Related<super::media_keywords::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MediaKeywords.def()
    }
}

impl Related<super::media::Entity> for Entity {
    fn to() -> RelationDef {
        super::media_keywords::Relation::Media.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::media_keywords::Relation::Keywords.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
