use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Media)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(UsuarioMedia)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Tags)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(MediaTags)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Listas)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ListaMedia)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Keywords)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(MediaKeywords)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ContentTranslations)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Uniqueness the entities cannot express column-locally
        manager
            .create_index(
                Index::create()
                    .name("idx_media_tmdb_id")
                    .table(Media)
                    .col(crate::entities::media::Column::TmdbId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tags_usuario_nombre")
                    .table(Tags)
                    .col(crate::entities::tags::Column::UsuarioId)
                    .col(crate::entities::tags::Column::Nombre)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listas_usuario_nombre")
                    .table(Listas)
                    .col(crate::entities::listas::Column::UsuarioId)
                    .col(crate::entities::listas::Column::Nombre)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_translations_media_lang")
                    .table(ContentTranslations)
                    .col(crate::entities::content_translations::Column::MediaId)
                    .col(crate::entities::content_translations::Column::LanguageCode)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContentTranslations).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MediaKeywords).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Keywords).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ListaMedia).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Listas).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MediaTags).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UsuarioMedia).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Media).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
