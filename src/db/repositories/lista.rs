use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{lista_media, listas, prelude::*};

#[derive(Debug, Clone)]
pub struct ListaRow {
    pub id: i32,
    pub usuario_id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub fecha_creacion: String,
}

#[derive(Debug, Clone)]
pub struct ListaItem {
    pub media_id: i32,
    pub personal_position: Option<i32>,
}

pub struct ListaRepository {
    conn: DatabaseConnection,
}

impl ListaRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_lista_model(l: listas::Model) -> ListaRow {
        ListaRow {
            id: l.id,
            usuario_id: l.usuario_id,
            nombre: l.nombre,
            descripcion: l.descripcion,
            fecha_creacion: l.fecha_creacion,
        }
    }

    pub async fn get(&self, usuario_id: i32, lista_id: i32) -> Result<Option<ListaRow>> {
        let row = Listas::find_by_id(lista_id)
            .filter(listas::Column::UsuarioId.eq(usuario_id))
            .one(&self.conn)
            .await?;
        Ok(row.map(Self::map_lista_model))
    }

    pub async fn find_by_name(&self, usuario_id: i32, nombre: &str) -> Result<Option<ListaRow>> {
        let row = Listas::find()
            .filter(listas::Column::UsuarioId.eq(usuario_id))
            .filter(listas::Column::Nombre.eq(nombre))
            .one(&self.conn)
            .await?;
        Ok(row.map(Self::map_lista_model))
    }

    pub async fn list_for_user(&self, usuario_id: i32) -> Result<Vec<ListaRow>> {
        let rows = Listas::find()
            .filter(listas::Column::UsuarioId.eq(usuario_id))
            .order_by_asc(listas::Column::FechaCreacion)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Self::map_lista_model).collect())
    }

    pub async fn create(
        &self,
        usuario_id: i32,
        nombre: &str,
        descripcion: Option<&str>,
    ) -> Result<ListaRow> {
        let now = chrono::Utc::now().to_rfc3339();
        let active = listas::ActiveModel {
            usuario_id: Set(usuario_id),
            nombre: Set(nombre.to_string()),
            descripcion: Set(descripcion.map(String::from)),
            fecha_creacion: Set(now.clone()),
            ..Default::default()
        };
        let res = Listas::insert(active).exec(&self.conn).await?;

        Ok(ListaRow {
            id: res.last_insert_id,
            usuario_id,
            nombre: nombre.to_string(),
            descripcion: descripcion.map(String::from),
            fecha_creacion: now,
        })
    }

    pub async fn update(
        &self,
        usuario_id: i32,
        lista_id: i32,
        nombre: Option<&str>,
        descripcion: Option<Option<&str>>,
    ) -> Result<bool> {
        let Some(row) = Listas::find_by_id(lista_id)
            .filter(listas::Column::UsuarioId.eq(usuario_id))
            .one(&self.conn)
            .await?
        else {
            return Ok(false);
        };

        let mut active: listas::ActiveModel = row.into();
        if let Some(nombre) = nombre {
            active.nombre = Set(nombre.to_string());
        }
        if let Some(descripcion) = descripcion {
            active.descripcion = Set(descripcion.map(String::from));
        }
        active.update(&self.conn).await?;
        Ok(true)
    }

    pub async fn delete(&self, usuario_id: i32, lista_id: i32) -> Result<bool> {
        let Some(row) = Listas::find_by_id(lista_id)
            .filter(listas::Column::UsuarioId.eq(usuario_id))
            .one(&self.conn)
            .await?
        else {
            return Ok(false);
        };

        ListaMedia::delete_many()
            .filter(lista_media::Column::ListaId.eq(lista_id))
            .exec(&self.conn)
            .await?;

        Listas::delete_by_id(row.id).exec(&self.conn).await?;
        Ok(true)
    }

    // ========================================================================
    // List Contents
    // ========================================================================

    pub async fn items(&self, lista_id: i32) -> Result<Vec<ListaItem>> {
        let rows = ListaMedia::find()
            .filter(lista_media::Column::ListaId.eq(lista_id))
            .order_by_asc(lista_media::Column::PersonalPosition)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| ListaItem {
                media_id: r.media_id,
                personal_position: r.personal_position,
            })
            .collect())
    }

    pub async fn add_media(
        &self,
        lista_id: i32,
        media_id: i32,
        personal_position: Option<i32>,
    ) -> Result<bool> {
        let existing = ListaMedia::find_by_id((lista_id, media_id))
            .one(&self.conn)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        let position = match personal_position {
            Some(p) => Some(p),
            None => {
                // Append at the end
                let count = self.items(lista_id).await?.len() as i32;
                Some(count + 1)
            }
        };

        let active = lista_media::ActiveModel {
            lista_id: Set(lista_id),
            media_id: Set(media_id),
            personal_position: Set(position),
        };
        ListaMedia::insert(active).exec(&self.conn).await?;
        Ok(true)
    }

    pub async fn remove_media(&self, lista_id: i32, media_id: i32) -> Result<bool> {
        let result = ListaMedia::delete_by_id((lista_id, media_id))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Rewrite positions to match the given media id order.
    pub async fn reorder(&self, lista_id: i32, media_ids: &[i32]) -> Result<()> {
        for (position, media_id) in media_ids.iter().enumerate() {
            let Some(row) = ListaMedia::find_by_id((lista_id, *media_id))
                .one(&self.conn)
                .await?
            else {
                continue;
            };

            let mut active: lista_media::ActiveModel = row.into();
            active.personal_position = Set(Some(position as i32 + 1));
            active.update(&self.conn).await?;
        }
        Ok(())
    }
}
