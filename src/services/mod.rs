// src/services/mod.rs
//
// Services Module - Orchestration Layer
//
// Services own validation, event emission and the async/blocking boundary.
// Repositories stay dumb; integrations stay unaware of the store.

pub mod catalog_sync_service;
pub mod cooccurrence_service;
pub mod search_service;
pub mod statistics_service;
pub mod update_service;

pub use catalog_sync_service::CatalogSyncService;
pub use cooccurrence_service::{count_genre_pairs, CooccurrenceService, SnapshotSummary};
pub use search_service::SearchService;
pub use statistics_service::StatisticsService;
pub use update_service::{ItemFailure, UpdateReport, UpdateService};
