// src/application/commands/search_commands.rs
//
// Search Command Handlers
//
// RULES:
// - Parse raw request fields into a SearchQuery
// - Malformed requests are validation errors and never reach the store

use std::sync::Arc;

use crate::application::{
    dto::*,
    error_handling::{ErrorResponse, ToErrorResponse},
    state::AppState,
};
use crate::domain::search::DEFAULT_PAGE_SIZE;
use crate::domain::{validate_search_query, SearchQuery, SortField, SortOrder};
use crate::error::AppResult;
use crate::services::SearchService;

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn to_query(request: SearchRequestDto) -> Result<SearchQuery, String> {
    let invalid = |e: crate::domain::DomainError| ErrorResponse::validation(e.to_string()).to_json();

    let sort_by = match non_blank(request.sort_by) {
        Some(raw) => SortField::parse(&raw).map_err(invalid)?,
        None => SortField::default(),
    };
    let sort_order = match non_blank(request.sort_order) {
        Some(raw) => SortOrder::parse(&raw).map_err(invalid)?,
        None => SortOrder::default(),
    };

    let query = SearchQuery {
        text: non_blank(request.query),
        genres: request
            .genres
            .into_iter()
            .filter_map(|g| non_blank(Some(g)))
            .collect(),
        season: non_blank(request.season),
        year: request.year,
        media_type: non_blank(request.media_type),
        min_score: request.min_score,
        sort_by,
        sort_order,
        page: request.page.unwrap_or(1),
        limit: request.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    };
    validate_search_query(&query).map_err(invalid)?;
    Ok(query)
}

async fn run_blocking<T, F>(state: &AppState, query: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&SearchService) -> AppResult<T> + Send + 'static,
{
    let service = Arc::clone(&state.search_service);
    let result = match tokio::task::spawn_blocking(move || query(service.as_ref())).await {
        Ok(result) => result,
        Err(join_error) => Err(join_error.into()),
    };
    result.to_error_response()
}

/// Filtered, sorted page of the catalog
pub async fn search_anime(
    request: SearchRequestDto,
    state: &AppState,
) -> Result<SearchResultDto, String> {
    let query = to_query(request)?;
    let page = run_blocking(state, move |s| s.search(&query)).await?;
    Ok(SearchResultDto::from(page))
}

pub async fn get_available_genres(state: &AppState) -> Result<Vec<GenreDto>, String> {
    let genres = run_blocking(state, |s| s.available_genres()).await?;
    Ok(genres.into_iter().map(GenreDto::from).collect())
}

pub async fn get_available_years(state: &AppState) -> Result<Vec<i64>, String> {
    run_blocking(state, |s| s.available_years()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::test_support::{seed, state};
    use crate::application::error_handling::ErrorType;

    const CATALOG: &str = "
        INSERT INTO anime (id, title, title_english, media_type, score, popularity, season, year)
        VALUES
            (1, 'Cowboy Bebop', 'Cowboy Bebop', 'TV', 8.75, 40, 'spring', 1998),
            (5, 'Cowboy Bebop: Tengoku no Tobira', 'Cowboy Bebop: The Movie', 'Movie', 8.38, 600, 'summer', 2001),
            (1535, 'Death Note', 'Death Note', 'TV', 8.62, 2, 'fall', 2006);
        INSERT INTO genres (id, name) VALUES (7, 'Mystery'), (1, 'Action');
        INSERT INTO anime_genres (anime_id, genre_id) VALUES (1, 1), (5, 1), (1535, 7);";

    fn error_type(json: &str) -> ErrorType {
        serde_json::from_str::<ErrorResponse>(json).unwrap().error_type
    }

    #[tokio::test]
    async fn test_search_with_filters() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        seed(&state, CATALOG);

        let request = SearchRequestDto {
            query: Some("bebop".to_string()),
            genres: vec!["Action".to_string(), " ".to_string()],
            media_type: Some("TV".to_string()),
            season: Some("".to_string()),
            ..Default::default()
        };
        let result = search_anime(request, &state).await.unwrap();

        let ids: Vec<i64> = result.data.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(result.pagination.total, 1);
        assert_eq!(result.pagination.limit, 24);
        assert_eq!(result.data[0].genres, vec!["Action"]);
    }

    #[tokio::test]
    async fn test_search_sorted_by_score() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        seed(&state, CATALOG);

        let request = SearchRequestDto {
            sort_by: Some("score".to_string()),
            sort_order: Some("desc".to_string()),
            ..Default::default()
        };
        let result = search_anime(request, &state).await.unwrap();

        let ids: Vec<i64> = result.data.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 1535, 5]);
    }

    #[tokio::test]
    async fn test_page_past_end_keeps_total() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        seed(&state, CATALOG);

        let request = SearchRequestDto {
            page: Some(5),
            limit: Some(2),
            ..Default::default()
        };
        let result = search_anime(request, &state).await.unwrap();

        assert!(result.data.is_empty());
        assert_eq!(result.pagination.total, 3);
        assert_eq!(result.pagination.total_pages, 2);
        assert_eq!(result.pagination.page, 5);
    }

    #[tokio::test]
    async fn test_page_zero_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);

        let request = SearchRequestDto {
            page: Some(0),
            ..Default::default()
        };
        let err = search_anime(request, &state).await.unwrap_err();

        assert_eq!(error_type(&err), ErrorType::Validation);
    }

    #[tokio::test]
    async fn test_unknown_sort_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);

        let request = SearchRequestDto {
            sort_by: Some("members".to_string()),
            ..Default::default()
        };
        let err = search_anime(request, &state).await.unwrap_err();

        assert_eq!(error_type(&err), ErrorType::Validation);
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: SearchRequestDto =
            serde_json::from_str(r#"{"query": "note", "type": "TV", "page": null}"#).unwrap();

        assert_eq!(request.query.as_deref(), Some("note"));
        assert_eq!(request.media_type.as_deref(), Some("TV"));
        assert!(request.genres.is_empty());
        assert_eq!(request.page, None);
    }

    #[tokio::test]
    async fn test_filter_options() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        seed(&state, CATALOG);

        let genres = get_available_genres(&state).await.unwrap();
        let names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();

        assert_eq!(names, vec!["Action", "Mystery"]);
        assert_eq!(get_available_years(&state).await.unwrap(), vec![2006, 2001, 1998]);
    }
}
