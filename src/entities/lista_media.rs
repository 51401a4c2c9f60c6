use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lista_media")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub lista_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub media_id: i32,
    /// Manual ordering within the list
    pub personal_position: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::listas::Entity",
        from = "Column::ListaId",
        to = "super::listas::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Listas,
    #[sea_orm(
        belongs_to = "super::media::Entity",
        from = "Column::MediaId",
        to = "super::media::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Media,
}

impl Related<super::listas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listas.def()
    }
}

impl Related<super::media::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Media.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
