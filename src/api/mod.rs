use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::state::SharedState;

pub mod auth;
mod error;
mod listas;
mod medias;
mod observability;
mod system;
mod tags;
mod tmdb;
mod translations;
mod types;

pub use error::ApiError;
pub use types::*;

use crate::clients::tmdb::TmdbClient;
use crate::services::{EnrichmentService, RefreshService, TranslationService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn tmdb(&self) -> &TmdbClient {
        self.shared.enrichment.client()
    }

    #[must_use]
    pub fn enrichment(&self) -> &Arc<EnrichmentService> {
        &self.shared.enrichment
    }

    #[must_use]
    pub fn refresh(&self) -> &Arc<RefreshService> {
        &self.shared.refresh
    }

    #[must_use]
    pub fn translations(&self) -> &Arc<TranslationService> {
        &self.shared.translations
    }
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, session_minutes, secure_cookies) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.security.session_inactivity_minutes,
            config.server.secure_cookies,
        )
    };

    let protected_routes = create_protected_router(state.clone());

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/register", post(auth::register))
        .layer(session_layer)
        .with_state(state.clone());

    let health_router = Router::new()
        .route("/health", get(system::health))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .merge(health_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/medias", get(medias::list_medias))
        .route("/medias", post(medias::create_media))
        .route("/medias/stats/count", get(medias::stats_count))
        .route("/medias/stats/top5", get(medias::stats_top5))
        .route("/medias/stats/peor", get(medias::stats_peor))
        .route(
            "/medias/stats/distribucion-generos",
            get(medias::stats_distribucion_generos),
        )
        .route(
            "/medias/stats/generos-vistos",
            get(medias::stats_generos_vistos),
        )
        .route(
            "/medias/stats/vistos-por-anio",
            get(medias::stats_vistos_por_anio),
        )
        .route(
            "/medias/stats/top-personas",
            get(medias::stats_top_personas),
        )
        .route("/medias/{id}", get(medias::get_media))
        .route("/medias/{id}", patch(medias::update_media))
        .route("/medias/{id}", delete(medias::delete_media))
        .route("/medias/{id}/similares", get(medias::similares))
        .route("/medias/{id}/tags/{tag_id}", post(medias::attach_tag))
        .route("/medias/{id}/tags/{tag_id}", delete(medias::detach_tag))
        .route(
            "/medias/{id}/translation",
            get(translations::get_translation),
        )
        .route(
            "/medias/{id}/translation",
            delete(translations::evict_translation),
        )
        .route("/tags", get(tags::list_tags))
        .route("/tags", post(tags::create_tag))
        .route("/tags/{id}", get(tags::get_tag))
        .route("/tags/{id}", put(tags::rename_tag))
        .route("/tags/{id}", delete(tags::delete_tag))
        .route("/listas", get(listas::list_listas))
        .route("/listas", post(listas::create_lista))
        .route("/listas/{id}", get(listas::get_lista))
        .route("/listas/{id}", put(listas::update_lista))
        .route("/listas/{id}", delete(listas::delete_lista))
        .route("/listas/{id}/medias", get(listas::list_items))
        .route("/listas/{id}/medias", post(listas::add_media))
        .route(
            "/listas/{id}/medias/{media_id}",
            delete(listas::remove_media),
        )
        .route("/listas/{id}/reorder", post(listas::reorder))
        .route("/tmdb/search", get(tmdb::search))
        .route("/tmdb/collection/{id}", get(tmdb::collection))
        .route("/tmdb/person/{id}", get(tmdb::person))
        .route("/tmdb/person/{id}/credits", get(tmdb::person_credits))
        .route(
            "/tmdb/person/{id}/external-ids",
            get(tmdb::person_external_ids),
        )
        .route("/tmdb/{media_type}/{id}", get(tmdb::detail))
        .route("/tmdb/{media_type}/{id}/credits", get(tmdb::credits))
        .route("/tmdb/{media_type}/{id}/videos", get(tmdb::videos))
        .route("/tmdb/{media_type}/{id}/trailer", get(tmdb::trailer))
        .route(
            "/tmdb/{media_type}/{id}/providers",
            get(tmdb::watch_providers),
        )
        .route(
            "/tmdb/{media_type}/{id}/external-ids",
            get(tmdb::external_ids),
        )
        .route(
            "/tmdb/{media_type}/{id}/recommendations",
            get(tmdb::recommendations),
        )
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/password", put(auth::change_password))
        .route("/auth/api-key", get(auth::get_api_key))
        .route("/auth/api-key/regenerate", post(auth::regenerate_api_key))
        .route("/system/status", get(system::get_status))
        .route("/system/refresh/stats", get(system::refresh_stats))
        .route("/system/refresh/run", post(system::refresh_run))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
