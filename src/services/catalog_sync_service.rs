// src/services/catalog_sync_service.rs
//
// Fetch → normalize → validate → persist, one item at a time.
// SQLite work runs on the blocking pool; the async side only awaits it.

use std::sync::Arc;

use crate::domain::{validate_catalog_item, CatalogItem};
use crate::error::{AppError, AppResult};
use crate::events::{CatalogItemSyncFailed, CatalogItemSynced, EventBus};
use crate::integrations::CatalogSource;
use crate::repositories::CatalogRepository;

pub struct CatalogSyncService {
    catalog_repo: Arc<dyn CatalogRepository>,
    source: Arc<dyn CatalogSource>,
    event_bus: Arc<EventBus>,
}

impl CatalogSyncService {
    pub fn new(
        catalog_repo: Arc<dyn CatalogRepository>,
        source: Arc<dyn CatalogSource>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            catalog_repo,
            source,
            event_bus,
        }
    }

    /// Validate and persist an already normalized item
    pub async fn sync_item(&self, item: CatalogItem) -> AppResult<()> {
        validate_catalog_item(&item).map_err(AppError::Domain)?;

        let repo = Arc::clone(&self.catalog_repo);
        let item = tokio::task::spawn_blocking(move || repo.sync_item(&item).map(|_| item)).await??;

        self.event_bus.emit(CatalogItemSynced::new(
            item.id,
            item.title.clone(),
            item.genres.len(),
        ));
        Ok(())
    }

    /// Fetch one item upstream and persist it.
    /// Failures are reported on the bus before being returned.
    pub async fn fetch_and_sync(&self, id: i64) -> AppResult<()> {
        let result = match self.source.fetch_item(id).await {
            Ok(item) => self.sync_item(item).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            self.event_bus
                .emit(CatalogItemSyncFailed::new(id, e.category(), e.to_string()));
        }
        result
    }

    pub async fn get_item(&self, id: i64) -> AppResult<Option<CatalogItem>> {
        let repo = Arc::clone(&self.catalog_repo);
        tokio::task::spawn_blocking(move || repo.get_item(id)).await?
    }
}
