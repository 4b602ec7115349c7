// src/integrations/jikan/client.rs
//
// Jikan v4 client (unofficial MyAnimeList mirror)
//
// - Every request goes through the shared rate-limited fetcher
// - Returns raw payloads; normalization lives in `mapper`
// - `CatalogSource` is the seam the sync service depends on

use async_trait::async_trait;
use std::sync::Arc;

use super::mapper;
use super::types::{
    JikanAnimeRaw, JikanCharacterRaw, JikanCompleteData, JikanEnvelope, JikanStaffRaw,
};
use crate::domain::CatalogItem;
use crate::error::AppResult;
use crate::integrations::fetcher::RateLimitedFetcher;

/// Source of fully populated catalog items
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch and normalize one item with its characters and staff
    async fn fetch_item(&self, id: i64) -> AppResult<CatalogItem>;
}

pub struct JikanClient {
    fetcher: Arc<RateLimitedFetcher>,
}

impl JikanClient {
    pub fn new(fetcher: Arc<RateLimitedFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &Arc<RateLimitedFetcher> {
        &self.fetcher
    }

    async fn fetch_data<T>(&self, endpoint: &str) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let envelope: JikanEnvelope<T> = self.fetcher.fetch_json(endpoint).await?;
        Ok(envelope.data)
    }

    /// GET /anime/{id}/full
    pub async fn fetch_anime_full(&self, id: i64) -> AppResult<JikanAnimeRaw> {
        self.fetch_data(&format!("/anime/{}/full", id)).await
    }

    /// GET /anime/{id}/characters
    pub async fn fetch_characters(&self, id: i64) -> AppResult<Vec<JikanCharacterRaw>> {
        self.fetch_data(&format!("/anime/{}/characters", id)).await
    }

    /// GET /anime/{id}/staff
    pub async fn fetch_staff(&self, id: i64) -> AppResult<Vec<JikanStaffRaw>> {
        self.fetch_data(&format!("/anime/{}/staff", id)).await
    }

    /// All three payloads, requested in order. Any failure fails the whole item.
    pub async fn fetch_complete(&self, id: i64) -> AppResult<JikanCompleteData> {
        let anime = self.fetch_anime_full(id).await?;
        let characters = self.fetch_characters(id).await?;
        let staff = self.fetch_staff(id).await?;

        Ok(JikanCompleteData {
            anime,
            characters,
            staff,
        })
    }
}

#[async_trait]
impl CatalogSource for JikanClient {
    async fn fetch_item(&self, id: i64) -> AppResult<CatalogItem> {
        let data = self.fetch_complete(id).await?;
        Ok(mapper::normalize_complete(&data))
    }
}
