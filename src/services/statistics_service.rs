// src/services/statistics_service.rs
//
// Catalog-wide aggregates for dashboards: featured items, score
// distribution, per-type averages, seasonal trends and studio rankings.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::statistics::{empty_score_buckets, score_bucket_index, season_order};
use crate::domain::{
    CatalogSummary, ScoreBucket, SeasonCount, SeasonTypeCount, StudioCount, StudioCredit,
    StudioGraph, StudioLink, StudioNode, TypeScore,
};
use crate::error::AppResult;
use crate::repositories::StatisticsRepository;

pub const DEFAULT_FEATURED_LIMIT: usize = 6;
pub const DEFAULT_STUDIO_LIMIT: usize = 20;
/// Items scanned for the studio collaboration graph
pub const DEFAULT_COLLABORATION_ITEMS: usize = 100;

pub struct StatisticsService {
    statistics_repo: Arc<dyn StatisticsRepository>,
}

/// "fall" → "Fall"
fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Studios as nodes, shared items as links.
///
/// `credits` must be grouped by item; a studio credited twice on one item
/// counts once.
pub fn build_studio_graph(credits: &[StudioCredit]) -> StudioGraph {
    let mut nodes: BTreeMap<i64, StudioNode> = BTreeMap::new();
    let mut links: BTreeMap<(i64, i64), StudioLink> = BTreeMap::new();

    for item in credits.chunk_by(|a, b| a.item_id == b.item_id) {
        let mut studios: Vec<&StudioCredit> = Vec::with_capacity(item.len());
        for credit in item {
            if !studios.iter().any(|s| s.studio_id == credit.studio_id) {
                studios.push(credit);
            }
        }

        for studio in &studios {
            nodes
                .entry(studio.studio_id)
                .or_insert_with(|| StudioNode {
                    id: studio.studio_id,
                    name: studio.studio_name.clone(),
                    item_count: 0,
                })
                .item_count += 1;
        }

        for (i, first) in studios.iter().enumerate() {
            for second in &studios[i + 1..] {
                let key = (
                    first.studio_id.min(second.studio_id),
                    first.studio_id.max(second.studio_id),
                );
                let link = links.entry(key).or_insert_with(|| StudioLink {
                    source: key.0,
                    target: key.1,
                    value: 0,
                    titles: Vec::new(),
                });
                link.value += 1;
                link.titles.push(first.item_title.clone());
            }
        }
    }

    let mut nodes: Vec<StudioNode> = nodes.into_values().collect();
    nodes.sort_by(|a, b| b.item_count.cmp(&a.item_count).then_with(|| a.name.cmp(&b.name)));

    let mut links: Vec<StudioLink> = links.into_values().collect();
    links.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| (a.source, a.target).cmp(&(b.source, b.target)))
    });

    StudioGraph { nodes, links }
}

impl StatisticsService {
    pub fn new(statistics_repo: Arc<dyn StatisticsRepository>) -> Self {
        Self { statistics_repo }
    }

    /// Most popular items (popularity rank 1 first)
    pub fn featured(&self, limit: usize) -> AppResult<Vec<CatalogSummary>> {
        self.statistics_repo.featured(limit)
    }

    /// Ten one-point buckets from 0-1 to 9-10, unscored items excluded
    pub fn score_distribution(&self) -> AppResult<Vec<ScoreBucket>> {
        let mut buckets = empty_score_buckets();
        for score in self.statistics_repo.scores()? {
            buckets[score_bucket_index(score)].count += 1;
        }
        Ok(buckets)
    }

    pub fn average_score_by_type(&self) -> AppResult<Vec<TypeScore>> {
        self.statistics_repo.average_score_by_type()
    }

    /// Item counts per season, in calendar order
    pub fn seasonal_trends(&self) -> AppResult<Vec<SeasonCount>> {
        let mut trends: Vec<SeasonCount> = self
            .statistics_repo
            .season_counts()?
            .into_iter()
            .map(|(season, year, count)| SeasonCount {
                label: format!("{} {}", capitalize(&season), year),
                season,
                year,
                count,
            })
            .collect();

        trends.sort_by(|a, b| {
            a.year
                .cmp(&b.year)
                .then_with(|| season_order(&a.season).cmp(&season_order(&b.season)))
        });
        Ok(trends)
    }

    /// Item counts per season and media type, in calendar order then by type
    pub fn seasonal_trends_by_type(&self) -> AppResult<Vec<SeasonTypeCount>> {
        let mut trends: Vec<SeasonTypeCount> = self
            .statistics_repo
            .season_type_counts()?
            .into_iter()
            .map(|(season, year, media_type, count)| SeasonTypeCount {
                label: format!("{} {}", capitalize(&season), year),
                season,
                year,
                media_type,
                count,
            })
            .collect();

        trends.sort_by(|a, b| {
            a.year
                .cmp(&b.year)
                .then_with(|| season_order(&a.season).cmp(&season_order(&b.season)))
                .then_with(|| a.media_type.cmp(&b.media_type))
        });
        Ok(trends)
    }

    pub fn top_studios(&self, limit: usize) -> AppResult<Vec<StudioCount>> {
        self.statistics_repo.top_studios(limit)
    }

    /// Co-credit graph over the `item_limit` most popular studio-credited items
    pub fn studio_collaborations(&self, item_limit: usize) -> AppResult<StudioGraph> {
        let credits = self.statistics_repo.studio_credits(item_limit)?;
        let graph = build_studio_graph(&credits);
        log::debug!(
            "Studio graph: {} studios, {} links from {} credits",
            graph.nodes.len(),
            graph.links.len(),
            credits.len()
        );
        Ok(graph)
    }
}
