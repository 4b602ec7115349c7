// src/application/state.rs
//
// Application state shared by all command handlers.
// All fields are Arc-wrapped for thread-safe sharing across commands.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{
    create_connection_pool, initialize_database, verify_database_integrity, ConnectionPool,
};
use crate::error::AppResult;
use crate::events::EventBus;
use crate::integrations::{HttpTransport, JikanClient, MalClient, RateLimitedFetcher};
use crate::repositories::{
    CatalogRepository, ContextRepository, SearchRepository, SqliteCatalogRepository,
    SqliteContextRepository, SqliteSearchRepository, SqliteStatisticsRepository,
    StatisticsRepository,
};
use crate::services::{
    CatalogSyncService, CooccurrenceService, SearchService, StatisticsService, UpdateService,
};

pub struct AppState {
    pub pool: Arc<ConnectionPool>,
    pub event_bus: Arc<EventBus>,
    pub catalog_sync_service: Arc<CatalogSyncService>,
    pub update_service: Arc<UpdateService>,
    pub statistics_service: Arc<StatisticsService>,
    pub search_service: Arc<SearchService>,
}

impl AppState {
    /// Open the store at `config.database_path` and wire every service.
    ///
    /// One fetcher per upstream: all Jikan calls share a single rate limit,
    /// all MyAnimeList calls share another.
    pub fn initialize(config: &AppConfig, transport: Arc<dyn HttpTransport>) -> AppResult<Self> {
        // 1. INFRASTRUCTURE
        let pool = Arc::new(create_connection_pool(&config.database_path)?);
        {
            let conn = pool.get()?;
            initialize_database(&conn)?;
            verify_database_integrity(&conn)?;
        }
        let event_bus = Arc::new(EventBus::new());

        // 2. REPOSITORIES
        let catalog_repo: Arc<dyn CatalogRepository> =
            Arc::new(SqliteCatalogRepository::new(Arc::clone(&pool)));
        let context_repo: Arc<dyn ContextRepository> =
            Arc::new(SqliteContextRepository::new(Arc::clone(&pool)));
        let statistics_repo: Arc<dyn StatisticsRepository> =
            Arc::new(SqliteStatisticsRepository::new(Arc::clone(&pool)));
        let search_repo: Arc<dyn SearchRepository> =
            Arc::new(SqliteSearchRepository::new(Arc::clone(&pool)));

        // 3. INTEGRATIONS
        let jikan_fetcher = Arc::new(RateLimitedFetcher::new(
            "jikan",
            config.jikan_api_base.as_str(),
            config.fetch,
            Arc::clone(&transport),
        ));
        let jikan = Arc::new(JikanClient::new(jikan_fetcher));
        let mal = Arc::new(MalClient::from_config(config, transport)?);

        // 4. SERVICES
        let catalog_sync_service = Arc::new(CatalogSyncService::new(
            Arc::clone(&catalog_repo),
            jikan,
            Arc::clone(&event_bus),
        ));
        let cooccurrence_service = Arc::new(CooccurrenceService::new(catalog_repo, context_repo));
        let update_service = Arc::new(UpdateService::new(
            mal,
            Arc::clone(&catalog_sync_service),
            cooccurrence_service,
            Arc::clone(&event_bus),
            config.connections_limit,
        ));
        let statistics_service = Arc::new(StatisticsService::new(statistics_repo));
        let search_service = Arc::new(SearchService::new(search_repo));

        log::info!("Application state ready ({})", config.database_path.display());

        Ok(Self {
            pool,
            event_bus,
            catalog_sync_service,
            update_service,
            statistics_service,
            search_service,
        })
    }
}
