// src/application/commands/statistics_commands.rs
//
// Statistics queries run on the blocking pool; the service talks to SQLite.

use std::sync::Arc;

use crate::application::{dto::*, error_handling::ToErrorResponse, state::AppState};
use crate::error::AppResult;
use crate::services::statistics_service::{
    DEFAULT_COLLABORATION_ITEMS, DEFAULT_FEATURED_LIMIT, DEFAULT_STUDIO_LIMIT,
};
use crate::services::StatisticsService;

async fn run_blocking<T, F>(state: &AppState, query: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce(&StatisticsService) -> AppResult<T> + Send + 'static,
{
    let service = Arc::clone(&state.statistics_service);
    let result = match tokio::task::spawn_blocking(move || query(service.as_ref())).await {
        Ok(result) => result,
        Err(join_error) => Err(join_error.into()),
    };
    result.to_error_response()
}

/// Most popular items
pub async fn get_featured_anime(
    limit: Option<usize>,
    state: &AppState,
) -> Result<Vec<AnimeSummaryDto>, String> {
    let limit = limit.unwrap_or(DEFAULT_FEATURED_LIMIT);
    let featured = run_blocking(state, move |s| s.featured(limit)).await?;
    Ok(featured.into_iter().map(AnimeSummaryDto::from).collect())
}

pub async fn get_score_distribution(state: &AppState) -> Result<Vec<ScoreBucketDto>, String> {
    let buckets = run_blocking(state, |s| s.score_distribution()).await?;
    Ok(buckets.into_iter().map(ScoreBucketDto::from).collect())
}

pub async fn get_average_score_by_type(state: &AppState) -> Result<Vec<TypeScoreDto>, String> {
    let scores = run_blocking(state, |s| s.average_score_by_type()).await?;
    Ok(scores.into_iter().map(TypeScoreDto::from).collect())
}

pub async fn get_seasonal_trends(state: &AppState) -> Result<Vec<SeasonalTrendDto>, String> {
    let trends = run_blocking(state, |s| s.seasonal_trends()).await?;
    Ok(trends.into_iter().map(SeasonalTrendDto::from).collect())
}

/// Studios ranked by number of credited items
pub async fn get_top_studios(
    limit: Option<usize>,
    state: &AppState,
) -> Result<Vec<StudioDto>, String> {
    let limit = limit.unwrap_or(DEFAULT_STUDIO_LIMIT);
    let studios = run_blocking(state, move |s| s.top_studios(limit)).await?;
    Ok(studios.into_iter().map(StudioDto::from).collect())
}

pub async fn get_seasonal_trends_by_type(
    state: &AppState,
) -> Result<Vec<SeasonalTypeTrendDto>, String> {
    let trends = run_blocking(state, |s| s.seasonal_trends_by_type()).await?;
    Ok(trends.into_iter().map(SeasonalTypeTrendDto::from).collect())
}

/// Studios linked by the items they share, over the most popular `item_limit` items
pub async fn get_studio_collaborations(
    item_limit: Option<usize>,
    state: &AppState,
) -> Result<StudioGraphDto, String> {
    let item_limit = item_limit.unwrap_or(DEFAULT_COLLABORATION_ITEMS);
    let graph = run_blocking(state, move |s| s.studio_collaborations(item_limit)).await?;
    Ok(StudioGraphDto::from(graph))
}
