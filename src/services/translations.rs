use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::clients::tmdb::TmdbMediaType;
use crate::db::{Store, TranslationRow};
use crate::services::enrichment::EnrichmentService;

/// Per-language cached title/synopsis/poster, fetched from TMDb on miss.
pub struct TranslationService {
    store: Store,
    enrichment: Arc<EnrichmentService>,
}

impl TranslationService {
    #[must_use]
    pub const fn new(store: Store, enrichment: Arc<EnrichmentService>) -> Self {
        Self { store, enrichment }
    }

    /// Cached translation, or fetch-and-cache. Rows without a TMDb id fall
    /// back to the catalog row's own fields so the caller always gets text.
    pub async fn get_or_fetch(
        &self,
        media_id: i32,
        language_code: &str,
    ) -> Result<Option<TranslationRow>> {
        if let Some(cached) = self.store.get_translation(media_id, language_code).await? {
            return Ok(Some(cached));
        }

        let Some(media) = self.store.get_media(media_id).await? else {
            return Ok(None);
        };

        let Some(tmdb_id) = media.tmdb_id else {
            return Ok(Some(TranslationRow {
                media_id,
                language_code: language_code.to_string(),
                title: Some(media.titulo),
                synopsis: media.sinopsis,
                poster_url: media.imagen,
                backdrop_url: None,
                tagline: None,
                certification: media.certification,
                release_date: media.first_air_date,
            }));
        };

        let media_type = TmdbMediaType::from_tipo(&media.tipo);
        let Some(translation) = self
            .enrichment
            .fetch_translation(media_type, tmdb_id, media_id, language_code)
            .await?
        else {
            return Ok(None);
        };

        self.store.upsert_translation(translation.clone()).await?;
        info!("Cached {language_code} translation for '{}'", media.titulo);

        Ok(Some(translation))
    }

    pub async fn evict(&self, media_id: i32, language_code: &str) -> Result<bool> {
        self.store.delete_translation(media_id, language_code).await
    }
}
