pub mod prelude;

pub mod content_translations;
pub mod keywords;
pub mod lista_media;
pub mod listas;
pub mod media;
pub mod media_keywords;
pub mod media_tags;
pub mod tags;
pub mod users;
pub mod usuario_media;
