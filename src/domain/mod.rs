// src/domain/mod.rs
//
// Domain Root - entities, value objects and invariants.
// All other modules import from `crate::domain::*`

pub mod catalog;
pub mod context;
pub mod genre_connection;
pub mod search;
pub mod statistics;

pub use catalog::{
    validate_catalog_item, CatalogItem, Character, CharacterCredit, Company, CompanyCredit,
    CompanyRole, Genre, ItemStats, Person, RelatedEntry, StaffCredit, ThemeKind, ThemeSong,
    VoiceActorAssignment,
};
pub use context::{ContextSummary, ViewingContext};
pub use genre_connection::{GenreConnection, GenreLink, GenrePair};
pub use search::{validate_search_query, SearchPage, SearchQuery, SortField, SortOrder};
pub use statistics::{
    CatalogSummary, ScoreBucket, SeasonCount, SeasonTypeCount, StudioCount, StudioCredit,
    StudioGraph, StudioLink, StudioNode, TypeScore,
};

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Entity not found: {0}")]
    NotFound(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
