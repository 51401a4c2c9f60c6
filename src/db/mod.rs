use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::lista::{ListaItem, ListaRow};
pub use repositories::media::{
    CatalogEntry, MediaFilters, MediaRow, NewMedia, PersonalUpdate, RefreshedMetadata,
    SharedUpdate,
};
pub use repositories::tag::TagRow;
pub use repositories::translation::TranslationRow;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // File-backed sqlite needs the file to exist up front
        if db_url.starts_with("sqlite:") && !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn media_repo(&self) -> repositories::media::MediaRepository {
        repositories::media::MediaRepository::new(self.conn.clone())
    }

    fn tag_repo(&self) -> repositories::tag::TagRepository {
        repositories::tag::TagRepository::new(self.conn.clone())
    }

    fn lista_repo(&self) -> repositories::lista::ListaRepository {
        repositories::lista::ListaRepository::new(self.conn.clone())
    }

    fn translation_repo(&self) -> repositories::translation::TranslationRepository {
        repositories::translation::TranslationRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Media
    // ========================================================================

    pub async fn list_catalog(
        &self,
        usuario_id: i32,
        filters: &MediaFilters,
    ) -> Result<Vec<CatalogEntry>> {
        self.media_repo().list_for_user(usuario_id, filters).await
    }

    pub async fn count_catalog(&self, usuario_id: i32, filters: &MediaFilters) -> Result<u64> {
        self.media_repo().count_for_user(usuario_id, filters).await
    }

    pub async fn get_catalog_entry(
        &self,
        usuario_id: i32,
        media_id: i32,
    ) -> Result<Option<CatalogEntry>> {
        self.media_repo().get_entry(usuario_id, media_id).await
    }

    pub async fn get_media(&self, media_id: i32) -> Result<Option<MediaRow>> {
        self.media_repo().get(media_id).await
    }

    pub async fn find_media_by_tmdb_id(&self, tmdb_id: i32) -> Result<Option<MediaRow>> {
        self.media_repo().find_by_tmdb_id(tmdb_id).await
    }

    pub async fn find_media_by_titulo_anio(
        &self,
        titulo: &str,
        anio: Option<i32>,
    ) -> Result<Option<MediaRow>> {
        self.media_repo().find_by_titulo_anio(titulo, anio).await
    }

    pub async fn create_media(&self, nuevo: NewMedia) -> Result<i32> {
        self.media_repo().create(nuevo).await
    }

    pub async fn is_media_attached(&self, usuario_id: i32, media_id: i32) -> Result<bool> {
        self.media_repo().is_attached(usuario_id, media_id).await
    }

    pub async fn attach_media(&self, usuario_id: i32, media_id: i32) -> Result<()> {
        self.media_repo().attach_to_user(usuario_id, media_id).await
    }

    pub async fn detach_media(&self, usuario_id: i32, media_id: i32) -> Result<bool> {
        self.media_repo()
            .detach_from_user(usuario_id, media_id)
            .await
    }

    pub async fn update_personal(
        &self,
        usuario_id: i32,
        media_id: i32,
        update: PersonalUpdate,
    ) -> Result<bool> {
        self.media_repo()
            .update_personal(usuario_id, media_id, update)
            .await
    }

    pub async fn update_media(&self, media_id: i32, update: SharedUpdate) -> Result<bool> {
        self.media_repo().update_shared(media_id, update).await
    }

    pub async fn apply_media_refresh(
        &self,
        media_id: i32,
        refreshed: RefreshedMetadata,
    ) -> Result<()> {
        self.media_repo().apply_refresh(media_id, refreshed).await
    }

    pub async fn list_all_media(&self) -> Result<Vec<MediaRow>> {
        self.media_repo().list_all().await
    }

    pub async fn count_media(&self) -> Result<u64> {
        self.media_repo().count_all().await
    }

    pub async fn attach_tag(&self, usuario_id: i32, media_id: i32, tag_id: i32) -> Result<bool> {
        self.media_repo()
            .attach_tag(usuario_id, media_id, tag_id)
            .await
    }

    pub async fn detach_tag(&self, usuario_id: i32, media_id: i32, tag_id: i32) -> Result<bool> {
        self.media_repo()
            .detach_tag(usuario_id, media_id, tag_id)
            .await
    }

    pub async fn tag_ids_by_media(&self, usuario_id: i32) -> Result<HashMap<i32, Vec<i32>>> {
        self.media_repo().tag_ids_by_media(usuario_id).await
    }

    pub async fn set_media_keywords(&self, media_id: i32, kws: &[(i32, String)]) -> Result<()> {
        self.media_repo().set_keywords(media_id, kws).await
    }

    pub async fn keyword_ids_by_media(&self) -> Result<HashMap<i32, Vec<i32>>> {
        self.media_repo().keyword_ids_by_media().await
    }

    // ========================================================================
    // Tags
    // ========================================================================

    pub async fn get_tag(&self, usuario_id: i32, tag_id: i32) -> Result<Option<TagRow>> {
        self.tag_repo().get(usuario_id, tag_id).await
    }

    pub async fn find_tag_by_name(&self, usuario_id: i32, nombre: &str) -> Result<Option<TagRow>> {
        self.tag_repo().find_by_name(usuario_id, nombre).await
    }

    pub async fn list_tags(&self, usuario_id: i32) -> Result<Vec<TagRow>> {
        self.tag_repo().list_for_user(usuario_id).await
    }

    pub async fn create_tag(&self, usuario_id: i32, nombre: &str) -> Result<TagRow> {
        self.tag_repo().create(usuario_id, nombre).await
    }

    pub async fn rename_tag(&self, usuario_id: i32, tag_id: i32, nombre: &str) -> Result<bool> {
        self.tag_repo().rename(usuario_id, tag_id, nombre).await
    }

    pub async fn delete_tag(&self, usuario_id: i32, tag_id: i32) -> Result<bool> {
        self.tag_repo().delete(usuario_id, tag_id).await
    }

    // ========================================================================
    // Listas
    // ========================================================================

    pub async fn get_lista(&self, usuario_id: i32, lista_id: i32) -> Result<Option<ListaRow>> {
        self.lista_repo().get(usuario_id, lista_id).await
    }

    pub async fn find_lista_by_name(
        &self,
        usuario_id: i32,
        nombre: &str,
    ) -> Result<Option<ListaRow>> {
        self.lista_repo().find_by_name(usuario_id, nombre).await
    }

    pub async fn list_listas(&self, usuario_id: i32) -> Result<Vec<ListaRow>> {
        self.lista_repo().list_for_user(usuario_id).await
    }

    pub async fn create_lista(
        &self,
        usuario_id: i32,
        nombre: &str,
        descripcion: Option<&str>,
    ) -> Result<ListaRow> {
        self.lista_repo()
            .create(usuario_id, nombre, descripcion)
            .await
    }

    pub async fn update_lista(
        &self,
        usuario_id: i32,
        lista_id: i32,
        nombre: Option<&str>,
        descripcion: Option<Option<&str>>,
    ) -> Result<bool> {
        self.lista_repo()
            .update(usuario_id, lista_id, nombre, descripcion)
            .await
    }

    pub async fn delete_lista(&self, usuario_id: i32, lista_id: i32) -> Result<bool> {
        self.lista_repo().delete(usuario_id, lista_id).await
    }

    pub async fn lista_items(&self, lista_id: i32) -> Result<Vec<ListaItem>> {
        self.lista_repo().items(lista_id).await
    }

    pub async fn add_media_to_lista(
        &self,
        lista_id: i32,
        media_id: i32,
        personal_position: Option<i32>,
    ) -> Result<bool> {
        self.lista_repo()
            .add_media(lista_id, media_id, personal_position)
            .await
    }

    pub async fn remove_media_from_lista(&self, lista_id: i32, media_id: i32) -> Result<bool> {
        self.lista_repo().remove_media(lista_id, media_id).await
    }

    pub async fn reorder_lista(&self, lista_id: i32, media_ids: &[i32]) -> Result<()> {
        self.lista_repo().reorder(lista_id, media_ids).await
    }

    // ========================================================================
    // Translations
    // ========================================================================

    pub async fn get_translation(
        &self,
        media_id: i32,
        language_code: &str,
    ) -> Result<Option<TranslationRow>> {
        self.translation_repo().get(media_id, language_code).await
    }

    pub async fn upsert_translation(&self, translation: TranslationRow) -> Result<()> {
        self.translation_repo().upsert(translation).await
    }

    pub async fn delete_translation(&self, media_id: i32, language_code: &str) -> Result<bool> {
        self.translation_repo()
            .delete(media_id, language_code)
            .await
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        config: &crate::config::SecurityConfig,
    ) -> Result<User> {
        self.user_repo()
            .create(username, email, password, config)
            .await
    }

    pub async fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn update_password(
        &self,
        username: &str,
        new_password: &str,
        config: &crate::config::SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(username, new_password, config)
            .await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }

    pub async fn get_api_key(&self, username: &str) -> Result<Option<String>> {
        self.user_repo().get_api_key(username).await
    }

    pub async fn regenerate_api_key(&self, username: &str) -> Result<String> {
        self.user_repo().regenerate_api_key(username).await
    }
}
