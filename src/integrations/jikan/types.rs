// src/integrations/jikan/types.rs
//
// Raw Jikan v4 payloads. Only the fields the mapper reads are declared.
// Everything except IDs is optional or defaulted: partial records are the
// common case upstream, not the exceptional one.

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{ "data": ... }` wrapper used by every Jikan endpoint
#[derive(Debug, Deserialize)]
pub struct JikanEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JikanImageSet {
    #[serde(default)]
    pub jpg: Option<JikanImageUrls>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JikanImageUrls {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

/// Generic `{mal_id, type, name}` reference (genres, companies, relation entries)
#[derive(Debug, Clone, Deserialize)]
pub struct JikanMeta {
    pub mal_id: i64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JikanDateRange {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub string: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanRelation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub relation: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entry: Vec<JikanMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JikanThemeSongs {
    #[serde(default)]
    pub openings: Option<Vec<String>>,
    #[serde(default)]
    pub endings: Option<Vec<String>>,
}

/// GET /anime/{id}/full
#[derive(Debug, Clone, Deserialize)]
pub struct JikanAnimeRaw {
    pub mal_id: i64,
    #[serde(default)]
    pub images: Option<JikanImageSet>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub title_japanese: Option<String>,
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub episodes: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub aired: Option<JikanDateRange>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub scored_by: Option<i64>,
    #[serde(default)]
    pub rank: Option<i64>,
    #[serde(default)]
    pub popularity: Option<i64>,
    #[serde(default)]
    pub members: Option<i64>,
    #[serde(default)]
    pub favorites: Option<i64>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub producers: Option<Vec<JikanMeta>>,
    #[serde(default)]
    pub licensors: Option<Vec<JikanMeta>>,
    #[serde(default)]
    pub studios: Option<Vec<JikanMeta>>,
    #[serde(default)]
    pub genres: Option<Vec<JikanMeta>>,
    #[serde(default)]
    pub explicit_genres: Option<Vec<JikanMeta>>,
    #[serde(default)]
    pub themes: Option<Vec<JikanMeta>>,
    #[serde(default)]
    pub demographics: Option<Vec<JikanMeta>>,
    #[serde(default)]
    pub relations: Option<Vec<JikanRelation>>,
    #[serde(default)]
    pub theme: Option<JikanThemeSongs>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanPersonRef {
    pub mal_id: i64,
    #[serde(default)]
    pub images: Option<JikanImageSet>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JikanVoiceActorRaw {
    pub person: JikanPersonRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: String,
}

/// One entry of GET /anime/{id}/characters
#[derive(Debug, Clone, Deserialize)]
pub struct JikanCharacterRaw {
    pub character: JikanPersonRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub voice_actors: Vec<JikanVoiceActorRaw>,
}

/// One entry of GET /anime/{id}/staff
#[derive(Debug, Clone, Deserialize)]
pub struct JikanStaffRaw {
    pub person: JikanPersonRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub positions: Vec<String>,
}

/// The three payloads needed to build one catalog item
#[derive(Debug, Clone)]
pub struct JikanCompleteData {
    pub anime: JikanAnimeRaw,
    pub characters: Vec<JikanCharacterRaw>,
    pub staff: Vec<JikanStaffRaw>,
}
