pub use super::content_translations::Entity as ContentTranslations;
pub use super::keywords::Entity as Keywords;
pub use super::lista_media::Entity as ListaMedia;
pub use super::listas::Entity as Listas;
pub use super::media::Entity as Media;
pub use super::media_keywords::Entity as MediaKeywords;
pub use super::media_tags::Entity as MediaTags;
pub use super::tags::Entity as Tags;
pub use super::users::Entity as Users;
pub use super::usuario_media::Entity as UsuarioMedia;
