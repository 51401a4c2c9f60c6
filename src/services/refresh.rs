use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::clients::tmdb::TmdbMediaType;
use crate::db::{MediaRow, Store};
use crate::services::enrichment::EnrichmentService;
use crate::services::similarity::normalize;

const ENDED_SERIES_STATUSES: &[&str] = &["Ended", "Canceled", "Cancelled"];
const ACTIVE_SERIES_STATUSES: &[&str] = &["Returning Series", "In Production", "Continuing"];
const UPCOMING_MOVIE_STATUSES: &[&str] =
    &["In Production", "Post Production", "Planned", "Announced"];

/// Days between refreshes for a (tipo, status) combination.
#[must_use]
pub fn refresh_interval_days(tipo: &str, status: Option<&str>) -> i64 {
    let tipo = normalize(tipo);
    let status = status.unwrap_or_default();

    if tipo == "serie" && ENDED_SERIES_STATUSES.contains(&status) {
        return 180;
    }
    if tipo == "pelicula" && status == "Released" {
        return 120;
    }
    if tipo == "serie" && ACTIVE_SERIES_STATUSES.contains(&status) {
        return 7;
    }
    if tipo == "pelicula" && UPCOMING_MOVIE_STATUSES.contains(&status) {
        return 3;
    }
    if status.is_empty() || status == "Unknown" {
        return 14;
    }
    30
}

/// Whether a catalog row is due for a TMDb refresh.
///
/// The manual flag wins over everything except the per-row kill switch;
/// rows without a TMDb id can never refresh; rows never refreshed always do.
#[must_use]
pub fn needs_refresh(media: &MediaRow, now: DateTime<Utc>) -> bool {
    if !media.auto_update_enabled {
        return false;
    }
    if media.needs_update {
        return true;
    }
    if media.tmdb_id.is_none() {
        return false;
    }

    let Some(last_updated) = media
        .last_updated_tmdb
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    else {
        return true;
    };

    let days_since_update = (now - last_updated.with_timezone(&Utc)).num_days();
    days_since_update >= refresh_interval_days(&media.tipo, media.status.as_deref())
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub updated: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct RefreshStats {
    pub total: u64,
    pub auto_update_disabled: u64,
    pub missing_tmdb_id: u64,
    pub marked_for_update: u64,
    pub stale: u64,
    pub fresh: u64,
}

/// Walks the catalog refreshing stale rows from TMDb, sequentially and with
/// a fixed sleep between requests to respect the third-party rate limit.
pub struct RefreshService {
    store: Store,
    enrichment: Arc<EnrichmentService>,
    request_delay: Duration,
}

impl RefreshService {
    #[must_use]
    pub const fn new(
        store: Store,
        enrichment: Arc<EnrichmentService>,
        request_delay: Duration,
    ) -> Self {
        Self {
            store,
            enrichment,
            request_delay,
        }
    }

    /// Refresh up to `limit` stale rows. TMDb failures are soft: the row is
    /// counted as failed and the walk continues.
    pub async fn run_batch(&self, limit: u64) -> Result<BatchReport> {
        let now = Utc::now();
        let all = self.store.list_all_media().await?;

        let candidates: Vec<MediaRow> = all
            .into_iter()
            .filter(|m| needs_refresh(m, now))
            .take(limit as usize)
            .collect();

        let mut report = BatchReport::default();

        info!("Refreshing {} stale catalog rows", candidates.len());

        for media in candidates {
            report.processed += 1;

            match self.refresh_one(&media).await {
                Ok(true) => report.updated += 1,
                Ok(false) => report.skipped += 1,
                Err(err) => {
                    warn!("Refresh failed for '{}' ({}): {err}", media.titulo, media.id);
                    report.failed += 1;
                }
            }

            tokio::time::sleep(self.request_delay).await;
        }

        info!(
            "Refresh batch done: {} updated, {} failed, {} skipped",
            report.updated, report.failed, report.skipped
        );

        Ok(report)
    }

    async fn refresh_one(&self, media: &MediaRow) -> Result<bool> {
        let Some(tmdb_id) = media.tmdb_id else {
            return Ok(false);
        };

        let media_type = TmdbMediaType::from_tipo(&media.tipo);
        let Some(refreshed) = self.enrichment.fetch_refreshed(media_type, tmdb_id).await? else {
            warn!("TMDb has no entry for '{}' ({tmdb_id})", media.titulo);
            return Ok(false);
        };

        log_significant_changes(media, &refreshed);

        self.store.apply_media_refresh(media.id, refreshed).await?;

        match self.enrichment.fetch_keywords(media_type, tmdb_id).await {
            Ok(kws) if !kws.is_empty() => {
                self.store.set_media_keywords(media.id, &kws).await?;
            }
            Ok(_) => {}
            Err(err) => warn!("Keyword refresh failed for '{}': {err}", media.titulo),
        }

        Ok(true)
    }

    /// Staleness breakdown across the whole catalog.
    pub async fn stats(&self) -> Result<RefreshStats> {
        let now = Utc::now();
        let all = self.store.list_all_media().await?;

        let mut stats = RefreshStats {
            total: all.len() as u64,
            ..RefreshStats::default()
        };

        for media in &all {
            if !media.auto_update_enabled {
                stats.auto_update_disabled += 1;
            } else if media.needs_update {
                stats.marked_for_update += 1;
            } else if media.tmdb_id.is_none() {
                stats.missing_tmdb_id += 1;
            } else if needs_refresh(media, now) {
                stats.stale += 1;
            } else {
                stats.fresh += 1;
            }
        }

        Ok(stats)
    }
}

/// New seasons, episode counts, a status flip, or a new air date are worth
/// surfacing in the log.
fn log_significant_changes(old: &MediaRow, new: &crate::db::RefreshedMetadata) {
    let mut changes: Vec<String> = Vec::new();

    if let Some(temporadas) = new.temporadas
        && old.temporadas != Some(temporadas)
    {
        changes.push(format!(
            "temporadas {:?} -> {temporadas}",
            old.temporadas
        ));
    }
    if let Some(episodios) = new.episodios
        && old.episodios != Some(episodios)
    {
        changes.push(format!("episodios {:?} -> {episodios}", old.episodios));
    }
    if let Some(status) = &new.status
        && old.status.as_deref() != Some(status)
    {
        changes.push(format!("status {:?} -> {status}", old.status));
    }
    if let Some(last_air) = &new.last_air_date
        && old.last_air_date.as_deref() != Some(last_air)
    {
        changes.push(format!("last_air_date {:?} -> {last_air}", old.last_air_date));
    }

    if !changes.is_empty() {
        info!("'{}' changed: {}", old.titulo, changes.join("; "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn row(tipo: &str, status: Option<&str>, days_ago: Option<i64>) -> MediaRow {
        let now = Utc::now();
        MediaRow {
            id: 1,
            tmdb_id: Some(42),
            titulo: "Test".to_string(),
            anio: Some(2020),
            genero: None,
            sinopsis: None,
            director: None,
            elenco: None,
            imagen: None,
            tipo: tipo.to_string(),
            temporadas: None,
            episodios: None,
            nota_imdb: None,
            original_title: None,
            runtime: None,
            production_countries: None,
            status: status.map(String::from),
            certification: None,
            first_air_date: None,
            last_air_date: None,
            episode_runtime: None,
            last_updated_tmdb: days_ago
                .map(|d| (now - ChronoDuration::days(d)).to_rfc3339()),
            auto_update_enabled: true,
            needs_update: false,
        }
    }

    #[test]
    fn test_disabled_never_refreshes() {
        let mut m = row("serie", Some("Returning Series"), Some(400));
        m.auto_update_enabled = false;
        m.needs_update = true;
        assert!(!needs_refresh(&m, Utc::now()));
    }

    #[test]
    fn test_manual_flag_forces_refresh() {
        let mut m = row("pelicula", Some("Released"), Some(1));
        m.needs_update = true;
        assert!(needs_refresh(&m, Utc::now()));
    }

    #[test]
    fn test_missing_tmdb_id_never_refreshes() {
        let mut m = row("pelicula", Some("Released"), Some(400));
        m.tmdb_id = None;
        assert!(!needs_refresh(&m, Utc::now()));
    }

    #[test]
    fn test_never_refreshed_is_stale() {
        let m = row("pelicula", Some("Released"), None);
        assert!(needs_refresh(&m, Utc::now()));
    }

    #[test]
    fn test_ended_series_interval() {
        assert_eq!(refresh_interval_days("serie", Some("Ended")), 180);
        assert_eq!(refresh_interval_days("serie", Some("Canceled")), 180);
        assert_eq!(refresh_interval_days("serie", Some("Cancelled")), 180);

        assert!(!needs_refresh(&row("serie", Some("Ended"), Some(179)), Utc::now()));
        assert!(needs_refresh(&row("serie", Some("Ended"), Some(181)), Utc::now()));
    }

    #[test]
    fn test_released_movie_interval() {
        assert_eq!(refresh_interval_days("pelicula", Some("Released")), 120);
        assert!(!needs_refresh(
            &row("pelicula", Some("Released"), Some(119)),
            Utc::now()
        ));
        assert!(needs_refresh(
            &row("pelicula", Some("Released"), Some(121)),
            Utc::now()
        ));
    }

    #[test]
    fn test_active_series_interval() {
        assert_eq!(refresh_interval_days("serie", Some("Returning Series")), 7);
        assert!(needs_refresh(
            &row("serie", Some("Returning Series"), Some(8)),
            Utc::now()
        ));
        assert!(!needs_refresh(
            &row("serie", Some("Returning Series"), Some(2)),
            Utc::now()
        ));
    }

    #[test]
    fn test_upcoming_movie_interval() {
        assert_eq!(refresh_interval_days("pelicula", Some("Post Production")), 3);
        assert!(needs_refresh(
            &row("pelicula", Some("Planned"), Some(4)),
            Utc::now()
        ));
    }

    #[test]
    fn test_unknown_status_interval() {
        assert_eq!(refresh_interval_days("pelicula", None), 14);
        assert_eq!(refresh_interval_days("serie", Some("")), 14);
        assert_eq!(refresh_interval_days("serie", Some("Unknown")), 14);
    }

    #[test]
    fn test_default_interval() {
        assert_eq!(refresh_interval_days("pelicula", Some("Rumored")), 30);
        assert_eq!(refresh_interval_days("serie", Some("Pilot")), 30);
    }

    #[test]
    fn test_accented_tipo_is_normalized() {
        assert_eq!(refresh_interval_days("película", Some("Released")), 120);
    }
}
