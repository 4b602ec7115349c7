// src/services/update_service.rs
//
// Batch driver for one viewing context:
//   list IDs → fetch + sync each item → rebuild the genre graph
//
// - Updates of the same context run one at a time; different contexts overlap
// - A failing item is logged, counted and skipped
// - Configuration errors abort the whole update
// - If the graph rebuild fails, the previous graph stays in place

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

use crate::domain::{ContextSummary, GenreLink, ViewingContext};
use crate::error::{AppError, AppResult, ErrorCategory};
use crate::events::{ContextUpdated, EventBus};
use crate::integrations::ListSource;
use crate::services::{CatalogSyncService, CooccurrenceService};

/// One item that could not be synced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub id: i64,
    pub category: ErrorCategory,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    pub context: String,
    pub listed: usize,
    pub synced: usize,
    pub failed: usize,
    pub connections: usize,
    pub failures: Vec<ItemFailure>,
}

type ContextLocks = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// Exclusive hold on one context. On release the lock entry is removed
/// once no other update holds or awaits it.
struct ContextPermit<'a> {
    locks: &'a ContextLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ContextPermit<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.key);
        }
    }
}

pub struct UpdateService {
    list_source: Arc<dyn ListSource>,
    sync_service: Arc<CatalogSyncService>,
    cooccurrence_service: Arc<CooccurrenceService>,
    event_bus: Arc<EventBus>,
    connections_limit: usize,
    context_locks: ContextLocks,
}

impl UpdateService {
    pub fn new(
        list_source: Arc<dyn ListSource>,
        sync_service: Arc<CatalogSyncService>,
        cooccurrence_service: Arc<CooccurrenceService>,
        event_bus: Arc<EventBus>,
        connections_limit: usize,
    ) -> Self {
        Self {
            list_source,
            sync_service,
            cooccurrence_service,
            event_bus,
            connections_limit,
            context_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Wait until no other update of `context` is running
    async fn acquire_context(&self, context: &ViewingContext) -> ContextPermit<'_> {
        let key = context.key();
        let lock = {
            let mut locks = self
                .context_locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(locks.entry(key.clone()).or_default())
        };

        let mut permit = ContextPermit {
            locks: &self.context_locks,
            key,
            guard: None,
        };
        permit.guard = Some(lock.lock_owned().await);
        permit
    }

    /// Refresh every listed item of `context` and rebuild its genre graph
    pub async fn trigger_update(&self, context: &ViewingContext) -> AppResult<UpdateReport> {
        let _permit = self.acquire_context(context).await;

        log::info!("Updating context {}", context);
        let ids = self.list_source.list_source_ids(context).await?;
        log::info!("Context {} lists {} items", context, ids.len());

        let mut synced = 0;
        let mut failures = Vec::new();

        for (index, &id) in ids.iter().enumerate() {
            match self.sync_service.fetch_and_sync(id).await {
                Ok(()) => {
                    synced += 1;
                    log::debug!("[{}/{}] Synced item {}", index + 1, ids.len(), id);
                }
                Err(e @ AppError::Configuration(_)) => {
                    log::error!("Aborting update of {}: {}", context, e);
                    return Err(e);
                }
                Err(e) => {
                    log::warn!("[{}/{}] Skipping item {}: {}", index + 1, ids.len(), id, e);
                    failures.push(ItemFailure {
                        id,
                        category: e.category(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let summary = self.cooccurrence_service.recompute(context, &ids).await?;

        let report = UpdateReport {
            context: context.key(),
            listed: ids.len(),
            synced,
            failed: failures.len(),
            connections: summary.connections,
            failures,
        };

        self.event_bus.emit(ContextUpdated::new(
            context,
            report.listed,
            report.synced,
            report.failed,
            report.connections,
        ));

        log::info!(
            "Context {} updated: {} listed, {} synced, {} failed, {} connections",
            context,
            report.listed,
            report.synced,
            report.failed,
            report.connections
        );
        Ok(report)
    }

    /// Strongest connections of the context's current graph
    pub async fn get_connections(&self, context: &ViewingContext) -> AppResult<Vec<GenreLink>> {
        self.cooccurrence_service
            .top_connections(context, self.connections_limit)
            .await
    }

    pub async fn get_context_summary(&self, context: &ViewingContext) -> AppResult<ContextSummary> {
        self.cooccurrence_service.summary(context).await
    }

    /// `None` when the context was never updated
    pub async fn get_last_updated(
        &self,
        context: &ViewingContext,
    ) -> AppResult<Option<chrono::DateTime<chrono::Utc>>> {
        self.cooccurrence_service.last_updated(context).await
    }
}
