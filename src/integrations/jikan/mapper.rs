// src/integrations/jikan/mapper.rs
//
// Raw Jikan payloads → catalog entities.
//
// Pure functions, no I/O. Nothing here fails: missing or malformed optional
// data degrades to `None` / empty collections.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;

use super::types::{
    JikanAnimeRaw, JikanCharacterRaw, JikanCompleteData, JikanImageSet, JikanMeta, JikanStaffRaw,
};
use crate::domain::{
    CatalogItem, Character, CharacterCredit, Company, CompanyCredit, CompanyRole, Genre,
    ItemStats, Person, RelatedEntry, StaffCredit, ThemeKind, ThemeSong, VoiceActorAssignment,
};

/// Relation entries of this type point at another anime; anything else
/// (manga, light novels) is dropped
const ANIME_ENTRY_TYPE: &str = "anime";

/// Best cover image: large, then default, then none. Empty strings count as absent.
pub fn extract_image_url(images: Option<&JikanImageSet>) -> Option<String> {
    let jpg = images?.jpg.as_ref()?;
    [jpg.large_image_url.as_deref(), jpg.image_url.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(str::to_string)
}

/// RFC 3339 timestamps or plain `YYYY-MM-DD`; anything else is `None`
pub fn parse_date(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn map_stats(raw: &JikanAnimeRaw) -> ItemStats {
    ItemStats {
        score: raw.score,
        scored_by: raw.scored_by,
        rank: raw.rank,
        popularity: raw.popularity,
        members: raw.members,
        favorites: raw.favorites,
    }
}

/// Genres, explicit genres, themes and demographics as one list, deduped by ID
pub fn map_genres(raw: &JikanAnimeRaw) -> Vec<Genre> {
    let mut seen = HashSet::new();

    [
        &raw.genres,
        &raw.explicit_genres,
        &raw.themes,
        &raw.demographics,
    ]
    .into_iter()
    .flat_map(|group| group.iter().flatten())
    .filter(|meta| seen.insert(meta.mal_id))
    .map(|meta| Genre {
        id: meta.mal_id,
        name: meta.name.clone(),
    })
    .collect()
}

fn company_credits(metas: &Option<Vec<JikanMeta>>, role: CompanyRole) -> Vec<CompanyCredit> {
    metas
        .iter()
        .flatten()
        .map(|meta| CompanyCredit {
            company: Company {
                id: meta.mal_id,
                name: meta.name.clone(),
            },
            role,
        })
        .collect()
}

/// Producers, licensors and studios as typed credits
pub fn map_companies(raw: &JikanAnimeRaw) -> Vec<CompanyCredit> {
    let mut seen = HashSet::new();

    let mut credits = company_credits(&raw.producers, CompanyRole::Producer);
    credits.extend(company_credits(&raw.licensors, CompanyRole::Licensor));
    credits.extend(company_credits(&raw.studios, CompanyRole::Studio));

    credits.retain(|credit| seen.insert((credit.company.id, credit.role)));
    credits
}

/// Openings then endings, positioned within their kind
pub fn map_themes(raw: &JikanAnimeRaw) -> Vec<ThemeSong> {
    let Some(theme) = raw.theme.as_ref() else {
        return Vec::new();
    };

    let songs = |list: &Option<Vec<String>>, kind: ThemeKind| -> Vec<ThemeSong> {
        list.iter()
            .flatten()
            .enumerate()
            .map(|(position, text)| ThemeSong {
                kind,
                position: position as i64,
                text: text.clone(),
            })
            .collect()
    };

    let mut themes = songs(&theme.openings, ThemeKind::Opening);
    themes.extend(songs(&theme.endings, ThemeKind::Ending));
    themes
}

/// Relations whose entry is itself an anime
pub fn map_related_entries(raw: &JikanAnimeRaw) -> Vec<RelatedEntry> {
    let mut seen = HashSet::new();

    raw.relations
        .iter()
        .flatten()
        .flat_map(|relation| {
            relation
                .entry
                .iter()
                .filter(|entry| {
                    entry
                        .kind
                        .as_deref()
                        .is_some_and(|k| k.eq_ignore_ascii_case(ANIME_ENTRY_TYPE))
                })
                .map(move |entry| RelatedEntry {
                    relation_type: relation.relation.clone(),
                    related_id: entry.mal_id,
                    related_title: entry.name.clone(),
                })
        })
        .filter(|related| seen.insert((related.related_id, related.relation_type.clone())))
        .collect()
}

/// Characters with every voice actor assignment preserved.
/// A character listed twice keeps its first occurrence.
pub fn map_characters(raw_characters: &[JikanCharacterRaw]) -> Vec<CharacterCredit> {
    let mut seen = HashSet::new();

    raw_characters
        .iter()
        .filter(|raw| seen.insert(raw.character.mal_id))
        .map(|raw| {
            let mut seen_assignments = HashSet::new();
            let voice_actors = raw
                .voice_actors
                .iter()
                .filter(|va| seen_assignments.insert((va.person.mal_id, va.language.clone())))
                .map(|va| VoiceActorAssignment {
                    person: Person {
                        id: va.person.mal_id,
                        name: va.person.name.clone(),
                        image: extract_image_url(va.person.images.as_ref()),
                    },
                    language: va.language.clone(),
                })
                .collect();

            CharacterCredit {
                character: Character {
                    id: raw.character.mal_id,
                    name: raw.character.name.clone(),
                    image: extract_image_url(raw.character.images.as_ref()),
                },
                role: raw.role.clone(),
                voice_actors,
            }
        })
        .collect()
}

/// One credit per (person, position): a director who also wrote the script
/// yields two credits
pub fn map_staff(raw_staff: &[JikanStaffRaw]) -> Vec<StaffCredit> {
    let mut seen = HashSet::new();

    raw_staff
        .iter()
        .flat_map(|raw| {
            let person = Person {
                id: raw.person.mal_id,
                name: raw.person.name.clone(),
                image: extract_image_url(raw.person.images.as_ref()),
            };
            raw.positions.iter().map(move |role| StaffCredit {
                person: person.clone(),
                role: role.clone(),
            })
        })
        .filter(|credit| seen.insert((credit.person.id, credit.role.clone())))
        .collect()
}

/// Build the full catalog item from the three Jikan payloads
pub fn normalize(
    raw: &JikanAnimeRaw,
    raw_characters: &[JikanCharacterRaw],
    raw_staff: &[JikanStaffRaw],
) -> CatalogItem {
    let aired = raw.aired.clone().unwrap_or_default();

    CatalogItem {
        id: raw.mal_id,
        title: raw.title.clone(),
        title_english: non_empty(raw.title_english.clone()),
        title_japanese: non_empty(raw.title_japanese.clone()),
        media_type: non_empty(raw.media_type.clone()),
        source: non_empty(raw.source.clone()),
        status: non_empty(raw.status.clone()),
        episodes: raw.episodes,
        duration: non_empty(raw.duration.clone()),
        rating: non_empty(raw.rating.clone()),
        synopsis: non_empty(raw.synopsis.clone()),
        background: non_empty(raw.background.clone()),
        aired_string: non_empty(aired.string.clone()),
        aired_from: parse_date(aired.from.as_deref()),
        aired_to: parse_date(aired.to.as_deref()),
        season: non_empty(raw.season.clone()),
        year: raw.year,
        main_picture: extract_image_url(raw.images.as_ref()),
        stats: map_stats(raw),
        genres: map_genres(raw),
        companies: map_companies(raw),
        themes: map_themes(raw),
        related: map_related_entries(raw),
        characters: map_characters(raw_characters),
        staff: map_staff(raw_staff),
    }
}

pub fn normalize_complete(data: &JikanCompleteData) -> CatalogItem {
    normalize(&data.anime, &data.characters, &data.staff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::jikan::types::JikanImageUrls;
    use serde_json::json;

    fn raw_anime(value: serde_json::Value) -> JikanAnimeRaw {
        serde_json::from_value(value).unwrap()
    }

    fn death_note() -> JikanAnimeRaw {
        raw_anime(json!({
            "mal_id": 1535,
            "title": "Death Note",
            "title_english": "Death Note",
            "title_japanese": "デスノート",
            "type": "TV",
            "source": "Manga",
            "episodes": 37,
            "status": "Finished Airing",
            "aired": {
                "from": "2006-10-04T00:00:00+00:00",
                "to": "2007-06-27T00:00:00+00:00",
                "string": "Oct 4, 2006 to Jun 27, 2007"
            },
            "duration": "23 min per ep",
            "rating": "R - 17+ (violence & profanity)",
            "score": 8.62,
            "scored_by": 2800000,
            "rank": 89,
            "popularity": 2,
            "members": 4000000,
            "favorites": 170000,
            "season": "fall",
            "year": 2006,
            "images": { "jpg": { "image_url": "https://cdn/1535.jpg", "large_image_url": "https://cdn/1535l.jpg" } },
            "producers": [
                { "mal_id": 29, "type": "anime", "name": "VAP" },
                { "mal_id": 29, "type": "anime", "name": "VAP" }
            ],
            "licensors": [ { "mal_id": 119, "type": "anime", "name": "VIZ Media" } ],
            "studios": [ { "mal_id": 11, "type": "anime", "name": "Madhouse" } ],
            "genres": [
                { "mal_id": 37, "type": "anime", "name": "Supernatural" },
                { "mal_id": 41, "type": "anime", "name": "Suspense" }
            ],
            "explicit_genres": [],
            "themes": [
                { "mal_id": 40, "type": "anime", "name": "Psychological" },
                { "mal_id": 37, "type": "anime", "name": "Supernatural" }
            ],
            "demographics": [ { "mal_id": 27, "type": "anime", "name": "Shounen" } ],
            "relations": [
                { "relation": "Adaptation", "entry": [ { "mal_id": 21, "type": "manga", "name": "Death Note" } ] },
                { "relation": "Summary", "entry": [ { "mal_id": 2994, "type": "anime", "name": "Death Note: Rewrite" } ] }
            ],
            "theme": {
                "openings": ["1: \"the WORLD\" by Nightmare", "2: \"What's up, people?!\" by Maximum the Hormone"],
                "endings": ["1: \"Alumina\" by Nightmare"]
            }
        }))
    }

    #[test]
    fn test_image_prefers_large_then_default() {
        let both = JikanImageSet {
            jpg: Some(JikanImageUrls {
                image_url: Some("small.jpg".to_string()),
                large_image_url: Some("large.jpg".to_string()),
            }),
        };
        assert_eq!(extract_image_url(Some(&both)).as_deref(), Some("large.jpg"));

        let default_only = JikanImageSet {
            jpg: Some(JikanImageUrls {
                image_url: Some("small.jpg".to_string()),
                large_image_url: Some(String::new()),
            }),
        };
        assert_eq!(extract_image_url(Some(&default_only)).as_deref(), Some("small.jpg"));

        assert_eq!(extract_image_url(Some(&JikanImageSet::default())), None);
        assert_eq!(extract_image_url(None), None);
    }

    #[test]
    fn test_parse_date() {
        let parsed = parse_date(Some("2006-10-04T00:00:00+00:00")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2006-10-04T00:00:00+00:00");

        assert!(parse_date(Some("2011-04-06")).is_some());
        assert!(parse_date(Some("not a date")).is_none());
        assert!(parse_date(Some("")).is_none());
        assert!(parse_date(None).is_none());
    }

    #[test]
    fn test_genres_flattened_and_deduped() {
        let genres = map_genres(&death_note());
        let ids: Vec<i64> = genres.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![37, 41, 40, 27]);
    }

    #[test]
    fn test_companies_split_by_role() {
        let companies = map_companies(&death_note());

        assert_eq!(companies.len(), 3);
        assert_eq!(companies[0].role, CompanyRole::Producer);
        assert_eq!(companies[1].role, CompanyRole::Licensor);
        assert_eq!(companies[2].role, CompanyRole::Studio);
        assert_eq!(companies[2].company.name, "Madhouse");
    }

    #[test]
    fn test_themes_flattened() {
        let themes = map_themes(&death_note());

        assert_eq!(themes.len(), 3);
        assert_eq!(themes[0].kind, ThemeKind::Opening);
        assert_eq!(themes[1].position, 1);
        assert_eq!(themes[2].kind, ThemeKind::Ending);
        assert_eq!(themes[2].position, 0);
    }

    #[test]
    fn test_related_keeps_only_anime() {
        let related = map_related_entries(&death_note());

        assert_eq!(related.len(), 1);
        assert_eq!(related[0].related_id, 2994);
        assert_eq!(related[0].relation_type, "Summary");
    }

    #[test]
    fn test_staff_fans_out_positions() {
        let staff: Vec<JikanStaffRaw> = serde_json::from_value(json!([
            {
                "person": { "mal_id": 2928, "name": "Araki, Tetsurou", "images": { "jpg": { "image_url": "araki.jpg" } } },
                "positions": ["Director", "Writer"]
            }
        ]))
        .unwrap();

        let credits = map_staff(&staff);

        assert_eq!(credits.len(), 2);
        assert_eq!(credits[0].person.id, 2928);
        assert_eq!(credits[0].role, "Director");
        assert_eq!(credits[1].person.id, 2928);
        assert_eq!(credits[1].role, "Writer");
        assert_eq!(credits[0].person.image.as_deref(), Some("araki.jpg"));
    }

    #[test]
    fn test_characters_keep_all_voice_actors() {
        let characters: Vec<JikanCharacterRaw> = serde_json::from_value(json!([
            {
                "character": { "mal_id": 80, "name": "Yagami, Light" },
                "role": "Main",
                "voice_actors": [
                    { "person": { "mal_id": 1, "name": "Miyano, Mamoru" }, "language": "Japanese" },
                    { "person": { "mal_id": 2, "name": "Vincent, Brad" }, "language": "English" },
                    { "person": { "mal_id": 3, "name": "Someone" }, "language": "Italian" }
                ]
            },
            {
                "character": { "mal_id": 71, "name": "Ryuk" },
                "role": "Supporting",
                "voice_actors": null
            }
        ]))
        .unwrap();

        let credits = map_characters(&characters);

        assert_eq!(credits.len(), 2);
        assert_eq!(credits[0].voice_actors.len(), 3);
        assert_eq!(credits[0].voice_actor_for("Japanese").unwrap().id, 1);
        assert!(credits[1].voice_actors.is_empty());
        assert!(credits[1].character.image.is_none());
    }

    #[test]
    fn test_normalize_full_record() {
        let item = normalize(&death_note(), &[], &[]);

        assert_eq!(item.id, 1535);
        assert_eq!(item.title, "Death Note");
        assert_eq!(item.media_type.as_deref(), Some("TV"));
        assert_eq!(item.main_picture.as_deref(), Some("https://cdn/1535l.jpg"));
        assert_eq!(item.stats.popularity, Some(2));
        assert_eq!(item.season.as_deref(), Some("fall"));
        assert!(item.aired_from.is_some());
        assert_eq!(item.genres.len(), 4);
    }

    #[test]
    fn test_normalize_sparse_record() {
        let raw = raw_anime(json!({
            "mal_id": 5,
            "title": "Cowboy Bebop: Tengoku no Tobira",
            "title_english": null,
            "aired": { "from": "garbage", "to": null, "string": null },
            "images": null,
            "genres": null,
            "theme": { "openings": null, "endings": null },
            "relations": null
        }));

        let item = normalize(&raw, &[], &[]);

        assert_eq!(item.id, 5);
        assert!(item.title_english.is_none());
        assert!(item.aired_from.is_none());
        assert!(item.main_picture.is_none());
        assert!(item.genres.is_empty());
        assert!(item.themes.is_empty());
        assert!(item.related.is_empty());
        assert_eq!(item.stats, ItemStats::default());
    }
}
