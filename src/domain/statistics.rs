// src/domain/statistics.rs
//
// Catalog-wide aggregates (derived data, read-only)

use serde::{Deserialize, Serialize};

/// Items whose score falls in [min_score, max_score); the last bucket includes 10
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBucket {
    pub range: String,
    pub min_score: i64,
    pub max_score: i64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeScore {
    pub media_type: String,
    pub average_score: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonCount {
    pub season: String,
    pub year: i64,
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioCount {
    pub id: i64,
    pub name: String,
    pub item_count: i64,
}

/// Seasonal count split by media type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonTypeCount {
    pub season: String,
    pub year: i64,
    pub media_type: String,
    pub label: String,
    pub count: i64,
}

/// One studio credit on one item, as loaded for the collaboration graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioCredit {
    pub item_id: i64,
    pub item_title: String,
    pub studio_id: i64,
    pub studio_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioNode {
    pub id: i64,
    pub name: String,
    pub item_count: i64,
}

/// Studios that share items; `source < target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioLink {
    pub source: i64,
    pub target: i64,
    pub value: i64,
    pub titles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudioGraph {
    pub nodes: Vec<StudioNode>,
    pub links: Vec<StudioLink>,
}

/// Summary row for listings (featured items, context members)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub id: i64,
    pub title: String,
    pub title_english: Option<String>,
    pub main_picture: Option<String>,
    pub score: Option<f64>,
    pub popularity: Option<i64>,
    pub genres: Vec<String>,
}

/// Empty buckets `0-1` through `9-10`
pub fn empty_score_buckets() -> Vec<ScoreBucket> {
    (0..10)
        .map(|i| ScoreBucket {
            range: format!("{}-{}", i, i + 1),
            min_score: i,
            max_score: i + 1,
            count: 0,
        })
        .collect()
}

/// Bucket index for a score; 10.0 lands in the last bucket
pub fn score_bucket_index(score: f64) -> usize {
    (score.floor().max(0.0) as usize).min(9)
}

/// Calendar order of season tokens, case-insensitive. Unknown tokens sort last.
pub fn season_order(season: &str) -> usize {
    match season.to_ascii_lowercase().as_str() {
        "winter" => 0,
        "spring" => 1,
        "summer" => 2,
        "fall" => 3,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_index() {
        assert_eq!(score_bucket_index(0.5), 0);
        assert_eq!(score_bucket_index(8.62), 8);
        assert_eq!(score_bucket_index(10.0), 9);
    }

    #[test]
    fn test_empty_buckets() {
        let buckets = empty_score_buckets();
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[9].range, "9-10");
    }

    #[test]
    fn test_season_order() {
        assert!(season_order("Winter") < season_order("fall"));
        assert_eq!(season_order("unknown"), 4);
    }
}
