pub mod lista;
pub mod media;
pub mod tag;
pub mod translation;
pub mod user;
