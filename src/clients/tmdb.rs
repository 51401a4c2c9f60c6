use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::TmdbConfig;

#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("TMDb API key is not configured")]
    MissingApiKey,

    #[error("TMDb API error: {status} - {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// TMDb media kind, mapped onto the catalog's "pelicula"/"serie" split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TmdbMediaType {
    Movie,
    Tv,
}

impl TmdbMediaType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    #[must_use]
    pub fn from_tipo(tipo: &str) -> Self {
        if tipo == "serie" { Self::Tv } else { Self::Movie }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(Self::Movie),
            "tv" => Some(Self::Tv),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: i32,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f32>,
    pub vote_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct GenreEntry {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductionCountry {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MovieDetail {
    pub id: i32,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<GenreEntry>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f32>,
    pub runtime: Option<i32>,
    pub status: Option<String>,
    #[serde(default)]
    pub production_countries: Vec<ProductionCountry>,
}

#[derive(Debug, Deserialize)]
pub struct TvDetail {
    pub id: i32,
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<GenreEntry>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f32>,
    pub number_of_seasons: Option<i32>,
    pub number_of_episodes: Option<i32>,
    #[serde(default)]
    pub episode_run_time: Vec<i32>,
    pub status: Option<String>,
    #[serde(default)]
    pub production_countries: Vec<ProductionCountry>,
}

#[derive(Debug, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Deserialize)]
pub struct CastMember {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CrewMember {
    pub name: String,
    pub job: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub posters: Vec<ImageEntry>,
    #[serde(default)]
    pub backdrops: Vec<ImageEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ImageEntry {
    pub file_path: String,
    pub iso_639_1: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
}

#[derive(Debug, Deserialize)]
struct VideoPage {
    #[serde(default)]
    results: Vec<Video>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    pub site: Option<String>,
    #[serde(rename = "type")]
    pub video_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MovieKeywords {
    #[serde(default)]
    keywords: Vec<KeywordEntry>,
}

#[derive(Debug, Deserialize)]
struct TvKeywords {
    #[serde(default)]
    results: Vec<KeywordEntry>,
}

#[derive(Debug, Deserialize)]
pub struct KeywordEntry {
    pub id: i32,
    pub name: String,
}

#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    image_base_url: String,
}

impl TmdbClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: &TmdbConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn image_url(&self, path: &str) -> String {
        format!("{}{path}", self.image_base_url)
    }

    async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<reqwest::Response> {
        if self.api_key.is_empty() {
            return Err(TmdbError::MissingApiKey.into());
        }

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .query(params)
            .send()
            .await?;

        Ok(response)
    }

    async fn get_optional<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let response = self.get(url, params).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TmdbError::Api { status, body }.into());
        }

        Ok(Some(response.json().await?))
    }

    pub async fn search_multi(&self, query: &str, language: &str) -> Result<Vec<SearchResult>> {
        let url = format!("{}/search/multi", self.base_url);
        let page: Option<SearchPage> = self
            .get_optional(
                &url,
                &[
                    ("query", query),
                    ("language", language),
                    ("include_adult", "false"),
                ],
            )
            .await?;

        Ok(page.map(|p| p.results).unwrap_or_default())
    }

    pub async fn movie_detail(&self, id: i32, language: &str) -> Result<Option<MovieDetail>> {
        let url = format!("{}/movie/{id}", self.base_url);
        self.get_optional(&url, &[("language", language)]).await
    }

    pub async fn tv_detail(&self, id: i32, language: &str) -> Result<Option<TvDetail>> {
        let url = format!("{}/tv/{id}", self.base_url);
        self.get_optional(&url, &[("language", language)]).await
    }

    pub async fn credits(&self, media_type: TmdbMediaType, id: i32) -> Result<Option<Credits>> {
        let url = format!("{}/{}/{id}/credits", self.base_url, media_type.as_str());
        self.get_optional(&url, &[]).await
    }

    pub async fn images(&self, media_type: TmdbMediaType, id: i32) -> Result<Option<ImageSet>> {
        let url = format!("{}/{}/{id}/images", self.base_url, media_type.as_str());
        self.get_optional(&url, &[]).await
    }

    pub async fn videos(
        &self,
        media_type: TmdbMediaType,
        id: i32,
        language: &str,
    ) -> Result<Vec<Video>> {
        let url = format!("{}/{}/{id}/videos", self.base_url, media_type.as_str());
        let page: Option<VideoPage> = self.get_optional(&url, &[("language", language)]).await?;
        Ok(page.map(|p| p.results).unwrap_or_default())
    }

    /// First YouTube trailer, falling back to en-US when the requested
    /// language has none.
    pub async fn trailer_url(
        &self,
        media_type: TmdbMediaType,
        id: i32,
        language: &str,
    ) -> Result<Option<String>> {
        let mut videos = self.videos(media_type, id, language).await?;

        let is_trailer = |v: &Video| {
            v.site.as_deref() == Some("YouTube") && v.video_type.as_deref() == Some("Trailer")
        };

        if !videos.iter().any(is_trailer) && language != "en-US" {
            videos = self.videos(media_type, id, "en-US").await?;
        }

        Ok(videos
            .into_iter()
            .find(is_trailer)
            .map(|v| format!("https://www.youtube.com/watch?v={}", v.key)))
    }

    pub async fn keywords(
        &self,
        media_type: TmdbMediaType,
        id: i32,
    ) -> Result<Vec<KeywordEntry>> {
        let url = format!("{}/{}/{id}/keywords", self.base_url, media_type.as_str());
        match media_type {
            TmdbMediaType::Movie => {
                let page: Option<MovieKeywords> = self.get_optional(&url, &[]).await?;
                Ok(page.map(|p| p.keywords).unwrap_or_default())
            }
            TmdbMediaType::Tv => {
                let page: Option<TvKeywords> = self.get_optional(&url, &[]).await?;
                Ok(page.map(|p| p.results).unwrap_or_default())
            }
        }
    }

    // The remaining proxy endpoints forward TMDb's JSON untouched.

    pub async fn watch_providers(
        &self,
        media_type: TmdbMediaType,
        id: i32,
    ) -> Result<Option<serde_json::Value>> {
        let url = format!(
            "{}/{}/{id}/watch/providers",
            self.base_url,
            media_type.as_str()
        );
        self.get_optional(&url, &[]).await
    }

    pub async fn external_ids(
        &self,
        media_type: TmdbMediaType,
        id: i32,
    ) -> Result<Option<serde_json::Value>> {
        let url = format!(
            "{}/{}/{id}/external_ids",
            self.base_url,
            media_type.as_str()
        );
        self.get_optional(&url, &[]).await
    }

    pub async fn recommendations(
        &self,
        media_type: TmdbMediaType,
        id: i32,
        language: &str,
        page: u32,
    ) -> Result<Option<serde_json::Value>> {
        let url = format!(
            "{}/{}/{id}/recommendations",
            self.base_url,
            media_type.as_str()
        );
        let page = page.to_string();
        self.get_optional(&url, &[("language", language), ("page", &page)])
            .await
    }

    pub async fn detail_raw(
        &self,
        media_type: TmdbMediaType,
        id: i32,
        language: &str,
    ) -> Result<Option<serde_json::Value>> {
        let url = format!("{}/{}/{id}", self.base_url, media_type.as_str());
        self.get_optional(&url, &[("language", language)]).await
    }

    pub async fn collection(
        &self,
        collection_id: i32,
        language: &str,
    ) -> Result<Option<serde_json::Value>> {
        let url = format!("{}/collection/{collection_id}", self.base_url);
        self.get_optional(&url, &[("language", language)]).await
    }

    pub async fn person_detail(
        &self,
        person_id: i32,
        language: &str,
    ) -> Result<Option<serde_json::Value>> {
        let url = format!("{}/person/{person_id}", self.base_url);
        self.get_optional(&url, &[("language", language)]).await
    }

    pub async fn person_combined_credits(
        &self,
        person_id: i32,
        language: &str,
    ) -> Result<Option<serde_json::Value>> {
        let url = format!("{}/person/{person_id}/combined_credits", self.base_url);
        self.get_optional(&url, &[("language", language)]).await
    }

    pub async fn person_external_ids(&self, person_id: i32) -> Result<Option<serde_json::Value>> {
        let url = format!("{}/person/{person_id}/external_ids", self.base_url);
        self.get_optional(&url, &[]).await
    }
}

impl Credits {
    /// Directors for movies, creators/directors deduplicated for series.
    #[must_use]
    pub fn director_string(&self, media_type: TmdbMediaType) -> String {
        let mut names: Vec<&str> = match media_type {
            TmdbMediaType::Movie => self
                .crew
                .iter()
                .filter(|c| c.job.as_deref() == Some("Director"))
                .map(|c| c.name.as_str())
                .collect(),
            TmdbMediaType::Tv => self
                .crew
                .iter()
                .filter(|c| matches!(c.job.as_deref(), Some("Creator" | "Director")))
                .map(|c| c.name.as_str())
                .collect(),
        };
        names.dedup();
        names.join(", ")
    }

    /// Top five billed cast members.
    #[must_use]
    pub fn cast_string(&self) -> String {
        self.cast
            .iter()
            .take(5)
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_director_string_movie() {
        let credits = Credits {
            cast: vec![],
            crew: vec![
                CrewMember {
                    name: "Jane Doe".to_string(),
                    job: Some("Director".to_string()),
                },
                CrewMember {
                    name: "John Roe".to_string(),
                    job: Some("Producer".to_string()),
                },
            ],
        };
        assert_eq!(credits.director_string(TmdbMediaType::Movie), "Jane Doe");
    }

    #[test]
    fn test_director_string_tv_includes_creators() {
        let credits = Credits {
            cast: vec![],
            crew: vec![
                CrewMember {
                    name: "Creator A".to_string(),
                    job: Some("Creator".to_string()),
                },
                CrewMember {
                    name: "Director B".to_string(),
                    job: Some("Director".to_string()),
                },
            ],
        };
        let s = credits.director_string(TmdbMediaType::Tv);
        assert!(s.contains("Creator A"));
        assert!(s.contains("Director B"));
    }

    #[test]
    fn test_cast_string_takes_top_five() {
        let credits = Credits {
            cast: (0..8)
                .map(|i| CastMember {
                    name: format!("Actor {i}"),
                })
                .collect(),
            crew: vec![],
        };
        let s = credits.cast_string();
        assert!(s.contains("Actor 4"));
        assert!(!s.contains("Actor 5"));
    }

    #[test]
    fn test_media_type_mapping() {
        assert_eq!(TmdbMediaType::from_tipo("serie"), TmdbMediaType::Tv);
        assert_eq!(TmdbMediaType::from_tipo("pelicula"), TmdbMediaType::Movie);
        assert_eq!(TmdbMediaType::parse("movie"), Some(TmdbMediaType::Movie));
        assert_eq!(TmdbMediaType::parse("book"), None);
    }
}
