// src/application/commands/catalog_commands.rs

use crate::application::{
    dto::*,
    error_handling::{ErrorResponse, ToErrorResponse},
    state::AppState,
};

/// Full stored record of one item
pub async fn get_anime(anime_id: i64, state: &AppState) -> Result<AnimeDetailDto, String> {
    let item = state
        .catalog_sync_service
        .get_item(anime_id)
        .await
        .to_error_response()?;

    item.map(AnimeDetailDto::from)
        .ok_or_else(|| ErrorResponse::not_found(&format!("Anime {}", anime_id)).to_json())
}

/// Fetch one item upstream and store it, outside of any context update
pub async fn sync_anime(anime_id: i64, state: &AppState) -> Result<AnimeDetailDto, String> {
    state
        .catalog_sync_service
        .fetch_and_sync(anime_id)
        .await
        .to_error_response()?;

    get_anime(anime_id, state).await
}
