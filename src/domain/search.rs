// src/domain/search.rs
//
// Catalog search: filters, ordering and pagination

use serde::{Deserialize, Serialize};

use crate::domain::{CatalogSummary, DomainError, DomainResult};

pub const DEFAULT_PAGE_SIZE: usize = 24;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Popularity,
    Rank,
    Score,
    Title,
    Aired,
}

impl SortField {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "popularity" => Ok(SortField::Popularity),
            "rank" => Ok(SortField::Rank),
            "score" => Ok(SortField::Score),
            "title" => Ok(SortField::Title),
            "aired" => Ok(SortField::Aired),
            other => Err(DomainError::InvariantViolation(format!(
                "Unknown sort field '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(DomainError::InvariantViolation(format!(
                "Unknown sort order '{}'",
                other
            ))),
        }
    }
}

/// Every filter is optional; an item must match all that are set.
///
/// `genres` matches items carrying at least one of the names.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Substring of the default, English or Japanese title
    pub text: Option<String>,
    pub genres: Vec<String>,
    pub season: Option<String>,
    pub year: Option<i64>,
    pub media_type: Option<String>,
    pub min_score: Option<f64>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    /// 1-based
    pub page: usize,
    pub limit: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: None,
            genres: Vec::new(),
            season: None,
            year: None,
            media_type: None,
            min_score: None,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery {
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1)).saturating_mul(self.limit)
    }
}

/// Page numbers start at 1; page size is 1..=MAX_PAGE_SIZE
pub fn validate_search_query(query: &SearchQuery) -> DomainResult<()> {
    if query.page == 0 {
        return Err(DomainError::InvariantViolation(
            "Page numbers start at 1".to_string(),
        ));
    }
    if query.limit == 0 || query.limit > MAX_PAGE_SIZE {
        return Err(DomainError::InvariantViolation(format!(
            "Page size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, query.limit
        )));
    }
    if let Some(min_score) = query.min_score {
        if !(0.0..=10.0).contains(&min_score) {
            return Err(DomainError::InvariantViolation(format!(
                "Minimum score {} outside 0-10",
                min_score
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<CatalogSummary>,
    /// Matches across all pages
    pub total: i64,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

impl SearchPage {
    pub fn new(items: Vec<CatalogSummary>, total: i64, query: &SearchQuery) -> Self {
        let total_pages = (total.max(0) as usize).div_ceil(query.limit.max(1));
        Self {
            items,
            total,
            page: query.page,
            limit: query.limit,
            total_pages,
        }
    }
}
