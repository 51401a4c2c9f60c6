use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{media_tags, prelude::*, tags};

#[derive(Debug, Clone)]
pub struct TagRow {
    pub id: i32,
    pub usuario_id: i32,
    pub nombre: String,
}

pub struct TagRepository {
    conn: DatabaseConnection,
}

impl TagRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_tag_model(t: tags::Model) -> TagRow {
        TagRow {
            id: t.id,
            usuario_id: t.usuario_id,
            nombre: t.nombre,
        }
    }

    pub async fn get(&self, usuario_id: i32, tag_id: i32) -> Result<Option<TagRow>> {
        let row = Tags::find_by_id(tag_id)
            .filter(tags::Column::UsuarioId.eq(usuario_id))
            .one(&self.conn)
            .await?;
        Ok(row.map(Self::map_tag_model))
    }

    pub async fn find_by_name(&self, usuario_id: i32, nombre: &str) -> Result<Option<TagRow>> {
        let row = Tags::find()
            .filter(tags::Column::UsuarioId.eq(usuario_id))
            .filter(tags::Column::Nombre.eq(nombre))
            .one(&self.conn)
            .await?;
        Ok(row.map(Self::map_tag_model))
    }

    pub async fn list_for_user(&self, usuario_id: i32) -> Result<Vec<TagRow>> {
        let rows = Tags::find()
            .filter(tags::Column::UsuarioId.eq(usuario_id))
            .order_by_asc(tags::Column::Nombre)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Self::map_tag_model).collect())
    }

    pub async fn create(&self, usuario_id: i32, nombre: &str) -> Result<TagRow> {
        let active = tags::ActiveModel {
            usuario_id: Set(usuario_id),
            nombre: Set(nombre.to_string()),
            ..Default::default()
        };
        let res = Tags::insert(active).exec(&self.conn).await?;

        Ok(TagRow {
            id: res.last_insert_id,
            usuario_id,
            nombre: nombre.to_string(),
        })
    }

    pub async fn rename(&self, usuario_id: i32, tag_id: i32, nombre: &str) -> Result<bool> {
        let Some(row) = Tags::find_by_id(tag_id)
            .filter(tags::Column::UsuarioId.eq(usuario_id))
            .one(&self.conn)
            .await?
        else {
            return Ok(false);
        };

        let mut active: tags::ActiveModel = row.into();
        active.nombre = Set(nombre.to_string());
        active.update(&self.conn).await?;
        Ok(true)
    }

    pub async fn delete(&self, usuario_id: i32, tag_id: i32) -> Result<bool> {
        let Some(row) = Tags::find_by_id(tag_id)
            .filter(tags::Column::UsuarioId.eq(usuario_id))
            .one(&self.conn)
            .await?
        else {
            return Ok(false);
        };

        // Drop assignments first so no dangling links survive on sqlite
        MediaTags::delete_many()
            .filter(media_tags::Column::TagId.eq(tag_id))
            .exec(&self.conn)
            .await?;

        Tags::delete_by_id(row.id).exec(&self.conn).await?;
        Ok(true)
    }
}
