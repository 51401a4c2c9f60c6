use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::clients::tmdb::TmdbClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{EnrichmentService, RefreshService, TranslationService};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused across all HTTP-based services to enable connection pooling.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent("Catalogo/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub enrichment: Arc<EnrichmentService>,

    pub refresh: Arc<RefreshService>,

    pub translations: Arc<TranslationService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client =
            build_shared_http_client(config.tmdb.request_timeout_seconds.into())?;

        let tmdb = TmdbClient::with_shared_client(http_client, &config.tmdb);
        let enrichment = Arc::new(EnrichmentService::new(tmdb, config.tmdb.language.clone()));

        let refresh = Arc::new(RefreshService::new(
            store.clone(),
            enrichment.clone(),
            Duration::from_millis(config.scheduler.request_delay_ms),
        ));

        let translations = Arc::new(TranslationService::new(store.clone(), enrichment.clone()));

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            enrichment,
            refresh,
            translations,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
