// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are UI-friendly representations
// - DTOs are simple, serializable structs
// - Conversion FROM domain entities only (never TO)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    CatalogItem, CatalogSummary, CharacterCredit, CompanyCredit, ContextSummary, Genre, GenreLink,
    RelatedEntry, SearchPage,
    ScoreBucket, SeasonCount, SeasonTypeCount, StaffCredit, StudioCount, StudioGraph, ThemeSong,
    TypeScore,
};
use crate::services::{ItemFailure, UpdateReport};

// ============================================================================
// UPDATE DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponseDto {
    pub success: bool,
    pub context: String,
    pub listed: usize,
    pub synced: usize,
    pub failed: usize,
    pub connections: usize,
    pub failures: Vec<ItemFailureDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFailureDto {
    pub id: i64,
    pub error: String,
}

impl From<ItemFailure> for ItemFailureDto {
    fn from(failure: ItemFailure) -> Self {
        Self {
            id: failure.id,
            error: failure.error,
        }
    }
}

impl From<UpdateReport> for UpdateResponseDto {
    fn from(report: UpdateReport) -> Self {
        Self {
            success: true,
            context: report.context,
            listed: report.listed,
            synced: report.synced,
            failed: report.failed,
            connections: report.connections,
            failures: report.failures.into_iter().map(ItemFailureDto::from).collect(),
        }
    }
}

// ============================================================================
// GRAPH DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreLinkDto {
    pub source: String,
    pub target: String,
    pub value: i64,
}

impl From<GenreLink> for GenreLinkDto {
    fn from(link: GenreLink) -> Self {
        Self {
            source: link.source,
            target: link.target,
            value: link.value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSummaryDto {
    pub context: String,
    pub member_count: usize,
    pub members: Vec<i64>,
    pub connection_count: i64,
    pub last_updated: Option<String>,
}

impl From<ContextSummary> for ContextSummaryDto {
    fn from(summary: ContextSummary) -> Self {
        Self {
            context: summary.context.key(),
            member_count: summary.member_ids.len(),
            members: summary.member_ids,
            connection_count: summary.connection_count,
            last_updated: to_rfc3339(summary.last_updated),
        }
    }
}

// ============================================================================
// ANIME DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeDetailDto {
    pub id: i64,
    pub title: String,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    pub display_title: String,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub source: Option<String>,
    pub status: Option<String>,
    pub episodes: Option<i64>,
    pub duration: Option<String>,
    pub rating: Option<String>,
    pub synopsis: Option<String>,
    pub background: Option<String>,
    pub aired: Option<String>,
    pub aired_from: Option<String>,
    pub aired_to: Option<String>,
    pub season: Option<String>,
    pub year: Option<i64>,
    pub main_picture: Option<String>,
    pub score: Option<f64>,
    pub scored_by: Option<i64>,
    pub rank: Option<i64>,
    pub popularity: Option<i64>,
    pub members: Option<i64>,
    pub favorites: Option<i64>,
    pub genres: Vec<String>,
    pub companies: Vec<CompanyDto>,
    pub themes: Vec<ThemeDto>,
    pub related: Vec<RelatedDto>,
    pub characters: Vec<CharacterDto>,
    pub staff: Vec<StaffDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyDto {
    pub id: i64,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeDto {
    pub kind: String,
    pub position: i64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedDto {
    pub relation_type: String,
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceActorDto {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterDto {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub role: String,
    pub voice_actors: Vec<VoiceActorDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffDto {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub role: String,
}

impl From<CompanyCredit> for CompanyDto {
    fn from(credit: CompanyCredit) -> Self {
        Self {
            id: credit.company.id,
            name: credit.company.name,
            role: credit.role.to_string(),
        }
    }
}

impl From<ThemeSong> for ThemeDto {
    fn from(theme: ThemeSong) -> Self {
        Self {
            kind: theme.kind.to_string(),
            position: theme.position,
            text: theme.text,
        }
    }
}

impl From<RelatedEntry> for RelatedDto {
    fn from(entry: RelatedEntry) -> Self {
        Self {
            relation_type: entry.relation_type,
            id: entry.related_id,
            title: entry.related_title,
        }
    }
}

impl From<CharacterCredit> for CharacterDto {
    fn from(credit: CharacterCredit) -> Self {
        Self {
            id: credit.character.id,
            name: credit.character.name,
            image: credit.character.image,
            role: credit.role,
            voice_actors: credit
                .voice_actors
                .into_iter()
                .map(|va| VoiceActorDto {
                    id: va.person.id,
                    name: va.person.name,
                    image: va.person.image,
                    language: va.language,
                })
                .collect(),
        }
    }
}

impl From<StaffCredit> for StaffDto {
    fn from(credit: StaffCredit) -> Self {
        Self {
            id: credit.person.id,
            name: credit.person.name,
            image: credit.person.image,
            role: credit.role,
        }
    }
}

fn to_rfc3339(dt: Option<DateTime<Utc>>) -> Option<String> {
    dt.map(|dt| dt.to_rfc3339())
}

impl From<CatalogItem> for AnimeDetailDto {
    fn from(item: CatalogItem) -> Self {
        let display_title = item.display_title().to_string();
        Self {
            id: item.id,
            display_title,
            title: item.title,
            title_english: item.title_english,
            title_japanese: item.title_japanese,
            media_type: item.media_type,
            source: item.source,
            status: item.status,
            episodes: item.episodes,
            duration: item.duration,
            rating: item.rating,
            synopsis: item.synopsis,
            background: item.background,
            aired: item.aired_string,
            aired_from: to_rfc3339(item.aired_from),
            aired_to: to_rfc3339(item.aired_to),
            season: item.season,
            year: item.year,
            main_picture: item.main_picture,
            score: item.stats.score,
            scored_by: item.stats.scored_by,
            rank: item.stats.rank,
            popularity: item.stats.popularity,
            members: item.stats.members,
            favorites: item.stats.favorites,
            genres: item.genres.into_iter().map(|g| g.name).collect(),
            companies: item.companies.into_iter().map(CompanyDto::from).collect(),
            themes: item.themes.into_iter().map(ThemeDto::from).collect(),
            related: item.related.into_iter().map(RelatedDto::from).collect(),
            characters: item.characters.into_iter().map(CharacterDto::from).collect(),
            staff: item.staff.into_iter().map(StaffDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimeSummaryDto {
    pub id: i64,
    pub title: String,
    pub title_english: Option<String>,
    pub main_picture: Option<String>,
    pub score: Option<f64>,
    pub popularity: Option<i64>,
    pub genres: Vec<String>,
}

impl From<CatalogSummary> for AnimeSummaryDto {
    fn from(summary: CatalogSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            title_english: summary.title_english,
            main_picture: summary.main_picture,
            score: summary.score,
            popularity: summary.popularity,
            genres: summary.genres,
        }
    }
}

// ============================================================================
// STATISTICS DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBucketDto {
    pub range: String,
    pub min_score: i64,
    pub max_score: i64,
    pub count: i64,
}

impl From<ScoreBucket> for ScoreBucketDto {
    fn from(bucket: ScoreBucket) -> Self {
        Self {
            range: bucket.range,
            min_score: bucket.min_score,
            max_score: bucket.max_score,
            count: bucket.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeScoreDto {
    #[serde(rename = "type")]
    pub media_type: String,
    pub average_score: f64,
    pub count: i64,
}

impl From<TypeScore> for TypeScoreDto {
    fn from(score: TypeScore) -> Self {
        Self {
            media_type: score.media_type,
            average_score: score.average_score,
            count: score.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalTrendDto {
    pub season: String,
    pub year: i64,
    pub label: String,
    pub count: i64,
}

impl From<SeasonCount> for SeasonalTrendDto {
    fn from(season: SeasonCount) -> Self {
        Self {
            season: season.season,
            year: season.year,
            label: season.label,
            count: season.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioDto {
    pub id: i64,
    pub name: String,
    pub anime_count: i64,
}

impl From<StudioCount> for StudioDto {
    fn from(studio: StudioCount) -> Self {
        Self {
            id: studio.id,
            name: studio.name,
            anime_count: studio.item_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalTypeTrendDto {
    pub season: String,
    pub year: i64,
    pub label: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub count: i64,
}

impl From<SeasonTypeCount> for SeasonalTypeTrendDto {
    fn from(trend: SeasonTypeCount) -> Self {
        Self {
            season: trend.season,
            year: trend.year,
            label: trend.label,
            media_type: trend.media_type,
            count: trend.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioGraphDto {
    pub nodes: Vec<StudioDto>,
    pub links: Vec<StudioLinkDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioLinkDto {
    pub source: i64,
    pub target: i64,
    pub value: i64,
    pub anime: Vec<String>,
}

impl From<StudioGraph> for StudioGraphDto {
    fn from(graph: StudioGraph) -> Self {
        Self {
            nodes: graph
                .nodes
                .into_iter()
                .map(|node| StudioDto {
                    id: node.id,
                    name: node.name,
                    anime_count: node.item_count,
                })
                .collect(),
            links: graph
                .links
                .into_iter()
                .map(|link| StudioLinkDto {
                    source: link.source,
                    target: link.target,
                    value: link.value,
                    anime: link.titles,
                })
                .collect(),
        }
    }
}

// ============================================================================
// SEARCH DTOs
// ============================================================================

/// Raw search parameters; blank strings count as unset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequestDto {
    pub query: Option<String>,
    pub genres: Vec<String>,
    pub season: Option<String>,
    pub year: Option<i64>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub min_score: Option<f64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationDto {
    pub total: i64,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultDto {
    pub data: Vec<AnimeSummaryDto>,
    pub pagination: PaginationDto,
}

impl From<SearchPage> for SearchResultDto {
    fn from(page: SearchPage) -> Self {
        Self {
            data: page.items.into_iter().map(AnimeSummaryDto::from).collect(),
            pagination: PaginationDto {
                total: page.total,
                page: page.page,
                limit: page.limit,
                total_pages: page.total_pages,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreDto {
    pub id: i64,
    pub name: String,
}

impl From<Genre> for GenreDto {
    fn from(genre: Genre) -> Self {
        Self {
            id: genre.id,
            name: genre.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ThemeKind;

    #[test]
    fn test_detail_dto_flattens_item() {
        let mut item = CatalogItem::new(1, "Cowboy Bebop".to_string());
        item.media_type = Some("TV".to_string());
        item.genres = vec![Genre {
            id: 1,
            name: "Action".to_string(),
        }];
        item.themes = vec![ThemeSong {
            kind: ThemeKind::Opening,
            position: 0,
            text: "\"Tank!\" by The Seatbelts".to_string(),
        }];

        let dto = AnimeDetailDto::from(item);

        assert_eq!(dto.display_title, "Cowboy Bebop");
        assert_eq!(dto.genres, vec!["Action"]);
        assert_eq!(dto.themes[0].kind, "Opening");

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["type"], "TV");
    }

    #[test]
    fn test_update_response_from_report() {
        let report = UpdateReport {
            context: "global".to_string(),
            listed: 3,
            synced: 2,
            failed: 1,
            connections: 4,
            failures: vec![ItemFailure {
                id: 9,
                category: crate::error::ErrorCategory::Upstream,
                error: "boom".to_string(),
            }],
        };

        let dto = UpdateResponseDto::from(report);

        assert!(dto.success);
        assert_eq!(dto.failed, 1);
        assert_eq!(dto.failures[0].id, 9);
    }
}
