// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic
// - NO invariant enforcement
// - NO event emission
// - NO cross-repository calls (shared row mappers are fine)
// - Explicit SQL only
// - Multi-row writes that must land together run in one transaction

pub mod catalog_repository;
pub mod context_repository;
pub mod search_repository;
pub mod statistics_repository;

pub use catalog_repository::{CatalogRepository, SqliteCatalogRepository};
pub use context_repository::{ContextRepository, SqliteContextRepository};
pub use search_repository::{SearchRepository, SqliteSearchRepository};
pub use statistics_repository::{SqliteStatisticsRepository, StatisticsRepository};
