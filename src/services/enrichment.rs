use anyhow::Result;

use crate::clients::tmdb::{ImageEntry, TmdbClient, TmdbMediaType};
use crate::db::{NewMedia, RefreshedMetadata, TranslationRow};

/// Pick the best poster for a language: the requested language first, then
/// English, then language-neutral art, then anything, always by vote average.
#[must_use]
pub fn select_poster<'a>(posters: &'a [ImageEntry], lang_code: &str) -> Option<&'a ImageEntry> {
    let best_of = |pred: &dyn Fn(&&ImageEntry) -> bool| {
        posters
            .iter()
            .filter(pred)
            .max_by(|a, b| a.vote_average.total_cmp(&b.vote_average))
    };

    best_of(&|p| p.iso_639_1.as_deref() == Some(lang_code))
        .or_else(|| best_of(&|p| p.iso_639_1.as_deref() == Some("en")))
        .or_else(|| best_of(&|p| p.iso_639_1.is_none()))
        .or_else(|| best_of(&|_| true))
}

/// Maps TMDb payloads onto catalog rows.
pub struct EnrichmentService {
    tmdb: TmdbClient,
    language: String,
}

impl EnrichmentService {
    #[must_use]
    pub const fn new(tmdb: TmdbClient, language: String) -> Self {
        Self { tmdb, language }
    }

    #[must_use]
    pub const fn client(&self) -> &TmdbClient {
        &self.tmdb
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    fn lang_code<'a>(language: &'a str) -> &'a str {
        language.split('-').next().unwrap_or("en")
    }

    /// Best poster URL for a title, with the detail poster as last resort.
    pub async fn best_poster(
        &self,
        media_type: TmdbMediaType,
        tmdb_id: i32,
        language: &str,
    ) -> Result<Option<String>> {
        match self.tmdb.images(media_type, tmdb_id).await {
            Ok(Some(images)) if !images.posters.is_empty() => {
                let code = Self::lang_code(language);
                Ok(select_poster(&images.posters, code)
                    .map(|p| self.tmdb.image_url(&p.file_path)))
            }
            Ok(_) => self.detail_poster(media_type, tmdb_id, language).await,
            Err(err) => {
                tracing::warn!("TMDb images lookup failed for {tmdb_id}: {err}");
                self.detail_poster(media_type, tmdb_id, language).await
            }
        }
    }

    async fn detail_poster(
        &self,
        media_type: TmdbMediaType,
        tmdb_id: i32,
        language: &str,
    ) -> Result<Option<String>> {
        let poster_path = match media_type {
            TmdbMediaType::Movie => self
                .tmdb
                .movie_detail(tmdb_id, language)
                .await?
                .and_then(|d| d.poster_path),
            TmdbMediaType::Tv => self
                .tmdb
                .tv_detail(tmdb_id, language)
                .await?
                .and_then(|d| d.poster_path),
        };
        Ok(poster_path.map(|p| self.tmdb.image_url(&p)))
    }

    fn year_of(date: Option<&str>) -> Option<i32> {
        date.and_then(|d| d.split('-').next())
            .and_then(|y| y.parse().ok())
    }

    /// Full catalog row for a fresh TMDb title.
    pub async fn fetch_new_media(
        &self,
        media_type: TmdbMediaType,
        tmdb_id: i32,
    ) -> Result<Option<NewMedia>> {
        let credits = self.tmdb.credits(media_type, tmdb_id).await?;
        let director = credits
            .as_ref()
            .map(|c| c.director_string(media_type))
            .filter(|s| !s.is_empty());
        let elenco = credits
            .as_ref()
            .map(|c| c.cast_string())
            .filter(|s| !s.is_empty());
        let imagen = self.best_poster(media_type, tmdb_id, &self.language).await?;

        match media_type {
            TmdbMediaType::Movie => {
                let Some(detail) = self.tmdb.movie_detail(tmdb_id, &self.language).await? else {
                    return Ok(None);
                };

                Ok(Some(NewMedia {
                    tmdb_id: Some(tmdb_id),
                    titulo: detail.title.unwrap_or_default(),
                    anio: Self::year_of(detail.release_date.as_deref()),
                    genero: join_genres(&detail.genres),
                    sinopsis: detail.overview.filter(|s| !s.is_empty()),
                    director,
                    elenco,
                    imagen,
                    tipo: "pelicula".to_string(),
                    temporadas: None,
                    episodios: None,
                    nota_imdb: detail.vote_average,
                    original_title: detail.original_title,
                    runtime: detail.runtime,
                    production_countries: join_countries(&detail.production_countries),
                    status: detail.status,
                    certification: None,
                    first_air_date: detail.release_date,
                    last_air_date: None,
                    episode_runtime: None,
                }))
            }
            TmdbMediaType::Tv => {
                let Some(detail) = self.tmdb.tv_detail(tmdb_id, &self.language).await? else {
                    return Ok(None);
                };

                Ok(Some(NewMedia {
                    tmdb_id: Some(tmdb_id),
                    titulo: detail.name.unwrap_or_default(),
                    anio: Self::year_of(detail.first_air_date.as_deref()),
                    genero: join_genres(&detail.genres),
                    sinopsis: detail.overview.filter(|s| !s.is_empty()),
                    director,
                    elenco,
                    imagen,
                    tipo: "serie".to_string(),
                    temporadas: detail.number_of_seasons,
                    episodios: detail.number_of_episodes,
                    nota_imdb: detail.vote_average,
                    original_title: detail.original_name,
                    runtime: None,
                    production_countries: join_countries(&detail.production_countries),
                    status: detail.status,
                    certification: None,
                    first_air_date: detail.first_air_date,
                    last_air_date: detail.last_air_date,
                    episode_runtime: detail.episode_run_time.first().copied(),
                }))
            }
        }
    }

    /// Refreshed metadata for an existing row.
    pub async fn fetch_refreshed(
        &self,
        media_type: TmdbMediaType,
        tmdb_id: i32,
    ) -> Result<Option<RefreshedMetadata>> {
        let Some(nuevo) = self.fetch_new_media(media_type, tmdb_id).await? else {
            return Ok(None);
        };

        Ok(Some(RefreshedMetadata {
            titulo: Some(nuevo.titulo).filter(|s| !s.is_empty()),
            genero: nuevo.genero,
            sinopsis: nuevo.sinopsis,
            director: nuevo.director,
            elenco: nuevo.elenco,
            imagen: nuevo.imagen,
            temporadas: nuevo.temporadas,
            episodios: nuevo.episodios,
            nota_imdb: nuevo.nota_imdb,
            runtime: nuevo.runtime,
            status: nuevo.status,
            first_air_date: nuevo.first_air_date,
            last_air_date: nuevo.last_air_date,
            episode_runtime: nuevo.episode_runtime,
        }))
    }

    /// Localized title/synopsis/poster for the translations cache.
    pub async fn fetch_translation(
        &self,
        media_type: TmdbMediaType,
        tmdb_id: i32,
        media_id: i32,
        language_code: &str,
    ) -> Result<Option<TranslationRow>> {
        let lang = if language_code.contains('-') {
            language_code.to_string()
        } else {
            format!("{language_code}-{}", language_code.to_uppercase())
        };

        let poster_url = self.best_poster(media_type, tmdb_id, &lang).await?;

        match media_type {
            TmdbMediaType::Movie => {
                let Some(detail) = self.tmdb.movie_detail(tmdb_id, &lang).await? else {
                    return Ok(None);
                };
                Ok(Some(TranslationRow {
                    media_id,
                    language_code: language_code.to_string(),
                    title: detail.title,
                    synopsis: detail.overview.filter(|s| !s.is_empty()),
                    poster_url,
                    backdrop_url: detail.backdrop_path.map(|p| self.tmdb.image_url(&p)),
                    tagline: detail.tagline.filter(|s| !s.is_empty()),
                    certification: None,
                    release_date: detail.release_date,
                }))
            }
            TmdbMediaType::Tv => {
                let Some(detail) = self.tmdb.tv_detail(tmdb_id, &lang).await? else {
                    return Ok(None);
                };
                Ok(Some(TranslationRow {
                    media_id,
                    language_code: language_code.to_string(),
                    title: detail.name,
                    synopsis: detail.overview.filter(|s| !s.is_empty()),
                    poster_url,
                    backdrop_url: detail.backdrop_path.map(|p| self.tmdb.image_url(&p)),
                    tagline: detail.tagline.filter(|s| !s.is_empty()),
                    certification: None,
                    release_date: detail.first_air_date,
                }))
            }
        }
    }

    /// TMDb keywords as (tmdb keyword id, name) pairs.
    pub async fn fetch_keywords(
        &self,
        media_type: TmdbMediaType,
        tmdb_id: i32,
    ) -> Result<Vec<(i32, String)>> {
        let kws = self.tmdb.keywords(media_type, tmdb_id).await?;
        Ok(kws.into_iter().map(|k| (k.id, k.name)).collect())
    }
}

fn join_genres(genres: &[crate::clients::tmdb::GenreEntry]) -> Option<String> {
    if genres.is_empty() {
        return None;
    }
    Some(
        genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn join_countries(countries: &[crate::clients::tmdb::ProductionCountry]) -> Option<String> {
    if countries.is_empty() {
        return None;
    }
    Some(
        countries
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poster(lang: Option<&str>, votes: f32) -> ImageEntry {
        ImageEntry {
            file_path: format!("/{}-{votes}.jpg", lang.unwrap_or("null")),
            iso_639_1: lang.map(String::from),
            vote_average: votes,
        }
    }

    #[test]
    fn test_select_poster_prefers_requested_language() {
        let posters = vec![
            poster(Some("en"), 9.0),
            poster(Some("es"), 5.0),
            poster(Some("es"), 7.0),
        ];
        let best = select_poster(&posters, "es").unwrap();
        assert_eq!(best.iso_639_1.as_deref(), Some("es"));
        assert!((best.vote_average - 7.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_select_poster_falls_back_to_english() {
        let posters = vec![poster(Some("en"), 4.0), poster(None, 9.0)];
        let best = select_poster(&posters, "es").unwrap();
        assert_eq!(best.iso_639_1.as_deref(), Some("en"));
    }

    #[test]
    fn test_select_poster_falls_back_to_null_language() {
        let posters = vec![poster(Some("fr"), 8.0), poster(None, 3.0)];
        let best = select_poster(&posters, "es").unwrap();
        assert!(best.iso_639_1.is_none());
    }

    #[test]
    fn test_select_poster_any_as_last_resort() {
        let posters = vec![poster(Some("fr"), 2.0), poster(Some("de"), 8.0)];
        let best = select_poster(&posters, "es").unwrap();
        assert_eq!(best.iso_639_1.as_deref(), Some("de"));
    }

    #[test]
    fn test_select_poster_empty() {
        assert!(select_poster(&[], "es").is_none());
    }
}
