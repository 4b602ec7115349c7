// src/lib.rs
// AnimeGraph - anime catalog ingestion and genre co-occurrence graphs
//
// Architecture:
// - Domain-centric: entities, value objects and invariants live in `domain`
// - Integrations fetch and normalize upstream data, never touch the store
// - Repositories are dumb SQL mappers; services own validation and events
// - Application layer: DTOs, command handlers and error responses

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;

// ============================================================================
// INTEGRATIONS & APPLICATION LAYER
// ============================================================================

pub mod application;
pub mod integrations;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use config::{AppConfig, FetchPolicy};

pub use domain::{
    validate_catalog_item, CatalogItem, CatalogSummary, ContextSummary, GenreConnection,
    GenreLink, GenrePair, ScoreBucket, SearchPage, SearchQuery, SeasonCount, SeasonTypeCount,
    SortField, SortOrder, StudioCount, StudioGraph, TypeScore, ViewingContext,
};

pub use error::{AppError, AppResult, ErrorCategory};

pub use events::{
    CatalogItemSyncFailed, CatalogItemSynced, ContextUpdated, DomainEvent,
    EventBus, EventLogEntry,
};

pub use db::{create_connection_pool, initialize_database, ConnectionPool};

pub use repositories::{
    CatalogRepository, ContextRepository, SearchRepository, SqliteCatalogRepository,
    SqliteContextRepository, SqliteSearchRepository, SqliteStatisticsRepository,
    StatisticsRepository,
};

pub use services::{
    count_genre_pairs, CatalogSyncService, CooccurrenceService, ItemFailure, SearchService,
    SnapshotSummary, StatisticsService, UpdateReport, UpdateService,
};

pub use integrations::{
    CatalogSource, HttpTransport, JikanClient, ListSource, MalClient, RateLimitedFetcher,
    ReqwestTransport,
};

pub use application::AppState;
pub use application::commands;
pub use application::dto;
