// src/services/search_service.rs
//
// Catalog search and the option lists that drive search filters

use std::sync::Arc;

use crate::domain::{validate_search_query, Genre, SearchPage, SearchQuery};
use crate::error::AppResult;
use crate::repositories::SearchRepository;

pub struct SearchService {
    search_repo: Arc<dyn SearchRepository>,
}

impl SearchService {
    pub fn new(search_repo: Arc<dyn SearchRepository>) -> Self {
        Self { search_repo }
    }

    /// A page past the last one is empty but still reports the total
    pub fn search(&self, query: &SearchQuery) -> AppResult<SearchPage> {
        validate_search_query(query)?;

        let (items, total) = self.search_repo.search(query)?;
        log::debug!(
            "Search page {} ({} per page): {} of {} matches",
            query.page,
            query.limit,
            items.len(),
            total
        );
        Ok(SearchPage::new(items, total, query))
    }

    pub fn available_genres(&self) -> AppResult<Vec<Genre>> {
        self.search_repo.available_genres()
    }

    pub fn available_years(&self) -> AppResult<Vec<i64>> {
        self.search_repo.available_years()
    }
}
