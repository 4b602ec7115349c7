// src/integrations/mal/client.rs
//
// MyAnimeList list source.
//
// Only item IDs are read here. Everything else about an item comes from
// Jikan, so list responses are decoded down to `data[].node.id` and the
// pagination link.

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::{AppConfig, FetchPolicy};
use crate::domain::ViewingContext;
use crate::error::{AppError, AppResult};
use crate::integrations::fetcher::RateLimitedFetcher;
use crate::integrations::http::HttpTransport;

const CLIENT_ID_HEADER: &str = "x-mal-client-id";

/// Largest page the list endpoint serves
const USER_LIST_PAGE_SIZE: usize = 1000;

/// Largest page the ranking endpoint serves
const RANKING_PAGE_SIZE: usize = 500;

/// Resolves a context to the item IDs it contains
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListSource: Send + Sync {
    async fn list_source_ids(&self, context: &ViewingContext) -> AppResult<Vec<i64>>;
}

#[derive(Debug, Deserialize)]
struct ListPage {
    #[serde(default)]
    data: Vec<ListEntry>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    node: ListNode,
}

#[derive(Debug, Deserialize)]
struct ListNode {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    next: Option<String>,
}

pub struct MalClient {
    /// `None` when no client ID is configured
    fetcher: Option<Arc<RateLimitedFetcher>>,
    ranking_limit: usize,
}

impl MalClient {
    pub fn new(
        base_url: &str,
        client_id: Option<&str>,
        ranking_limit: usize,
        policy: FetchPolicy,
        transport: Arc<dyn HttpTransport>,
    ) -> AppResult<Self> {
        let fetcher = match client_id {
            Some(id) => {
                let value = HeaderValue::from_str(id).map_err(|_| {
                    AppError::Configuration("MAL_CLIENT_ID contains invalid characters".to_string())
                })?;
                let fetcher = RateLimitedFetcher::new("mal", base_url, policy, transport)
                    .with_header(HeaderName::from_static(CLIENT_ID_HEADER), value);
                Some(Arc::new(fetcher))
            }
            None => {
                log::warn!("MAL_CLIENT_ID is not set; context updates will fail");
                None
            }
        };

        Ok(Self {
            fetcher,
            ranking_limit,
        })
    }

    pub fn from_config(config: &AppConfig, transport: Arc<dyn HttpTransport>) -> AppResult<Self> {
        Self::new(
            &config.mal_api_base,
            config.mal_client_id.as_deref(),
            config.global_ranking_limit,
            config.fetch,
            transport,
        )
    }

    fn fetcher(&self) -> AppResult<&RateLimitedFetcher> {
        self.fetcher.as_deref().ok_or_else(|| {
            AppError::Configuration("MAL_CLIENT_ID is not set in environment variables".to_string())
        })
    }

    /// Follow `paging.next` from `first` until exhausted or `limit` IDs are collected.
    /// IDs keep their listed order; repeats are dropped. A page link that was
    /// already visited ends the walk.
    async fn collect_ids(&self, first: String, limit: Option<usize>) -> AppResult<Vec<i64>> {
        let fetcher = self.fetcher()?;

        let mut ids = Vec::new();
        let mut seen = HashSet::new();
        let mut visited = HashSet::new();
        let mut next = Some(first);

        while let Some(endpoint) = next.take() {
            if !visited.insert(fetcher.resolve(&endpoint)) {
                log::warn!("[mal] Paging loops back to {}, stopping", endpoint);
                break;
            }
            let page: ListPage = fetcher.fetch_json(&endpoint).await?;

            for entry in page.data {
                if seen.insert(entry.node.id) {
                    ids.push(entry.node.id);
                }
            }

            if limit.is_some_and(|limit| ids.len() >= limit) {
                break;
            }
            next = page.paging.and_then(|p| p.next).filter(|n| !n.is_empty());
        }

        if let Some(limit) = limit {
            ids.truncate(limit);
        }
        Ok(ids)
    }

    /// Most popular items first
    pub async fn fetch_global_ids(&self) -> AppResult<Vec<i64>> {
        // Surface a missing credential even when nothing would be fetched
        self.fetcher()?;
        if self.ranking_limit == 0 {
            return Ok(Vec::new());
        }

        log::info!("[mal] Fetching top {} by popularity", self.ranking_limit);
        let endpoint = format!(
            "/anime/ranking?ranking_type=bypopularity&limit={}",
            self.ranking_limit.min(RANKING_PAGE_SIZE)
        );
        self.collect_ids(endpoint, Some(self.ranking_limit)).await
    }

    /// Every item on the user's list, whatever its watch status
    pub async fn fetch_user_ids(&self, username: &str) -> AppResult<Vec<i64>> {
        log::info!("[mal] Fetching anime list for user {}", username);
        let endpoint = format!(
            "/users/{}/animelist?limit={}&nsfw=true",
            username, USER_LIST_PAGE_SIZE
        );
        self.collect_ids(endpoint, None).await
    }
}

#[async_trait]
impl ListSource for MalClient {
    async fn list_source_ids(&self, context: &ViewingContext) -> AppResult<Vec<i64>> {
        match context {
            ViewingContext::Global => self.fetch_global_ids().await,
            ViewingContext::User(username) => self.fetch_user_ids(username).await,
        }
    }
}
