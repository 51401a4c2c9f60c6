use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::entities::{content_translations, prelude::*};

#[derive(Debug, Clone)]
pub struct TranslationRow {
    pub media_id: i32,
    pub language_code: String,
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub tagline: Option<String>,
    pub certification: Option<String>,
    pub release_date: Option<String>,
}

pub struct TranslationRepository {
    conn: DatabaseConnection,
}

impl TranslationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(t: content_translations::Model) -> TranslationRow {
        TranslationRow {
            media_id: t.media_id,
            language_code: t.language_code,
            title: t.title,
            synopsis: t.synopsis,
            poster_url: t.poster_url,
            backdrop_url: t.backdrop_url,
            tagline: t.tagline,
            certification: t.certification,
            release_date: t.release_date,
        }
    }

    pub async fn get(&self, media_id: i32, language_code: &str) -> Result<Option<TranslationRow>> {
        let row = ContentTranslations::find()
            .filter(content_translations::Column::MediaId.eq(media_id))
            .filter(content_translations::Column::LanguageCode.eq(language_code))
            .one(&self.conn)
            .await?;
        Ok(row.map(Self::map_model))
    }

    pub async fn upsert(&self, translation: TranslationRow) -> Result<()> {
        let existing = ContentTranslations::find()
            .filter(content_translations::Column::MediaId.eq(translation.media_id))
            .filter(content_translations::Column::LanguageCode.eq(&translation.language_code))
            .one(&self.conn)
            .await?;

        match existing {
            Some(row) => {
                let mut active: content_translations::ActiveModel = row.into();
                active.title = Set(translation.title);
                active.synopsis = Set(translation.synopsis);
                active.poster_url = Set(translation.poster_url);
                active.backdrop_url = Set(translation.backdrop_url);
                active.tagline = Set(translation.tagline);
                active.certification = Set(translation.certification);
                active.release_date = Set(translation.release_date);
                active.update(&self.conn).await?;
            }
            None => {
                let active = content_translations::ActiveModel {
                    media_id: Set(translation.media_id),
                    language_code: Set(translation.language_code),
                    title: Set(translation.title),
                    synopsis: Set(translation.synopsis),
                    poster_url: Set(translation.poster_url),
                    backdrop_url: Set(translation.backdrop_url),
                    tagline: Set(translation.tagline),
                    certification: Set(translation.certification),
                    release_date: Set(translation.release_date),
                    ..Default::default()
                };
                ContentTranslations::insert(active).exec(&self.conn).await?;
            }
        }

        Ok(())
    }

    pub async fn delete(&self, media_id: i32, language_code: &str) -> Result<bool> {
        let result = ContentTranslations::delete_many()
            .filter(content_translations::Column::MediaId.eq(media_id))
            .filter(content_translations::Column::LanguageCode.eq(language_code))
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
