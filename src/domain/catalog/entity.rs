use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One catalog entry, keyed by its external (MyAnimeList) ID.
/// This is the root entity for everything the sync pipeline persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// External immutable identifier
    pub id: i64,

    /// Primary (romanized) title
    pub title: String,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,

    /// "TV", "Movie", "OVA", ...
    pub media_type: Option<String>,
    /// Source material ("Manga", "Original", ...)
    pub source: Option<String>,
    pub status: Option<String>,
    pub episodes: Option<i64>,
    pub duration: Option<String>,
    pub rating: Option<String>,

    pub synopsis: Option<String>,
    pub background: Option<String>,

    /// Human readable airing range as published upstream
    pub aired_string: Option<String>,
    pub aired_from: Option<DateTime<Utc>>,
    pub aired_to: Option<DateTime<Utc>>,
    /// Lower-case season token ("winter", "spring", ...)
    pub season: Option<String>,
    pub year: Option<i64>,

    pub main_picture: Option<String>,

    pub stats: ItemStats,

    pub genres: Vec<Genre>,
    pub companies: Vec<CompanyCredit>,
    pub themes: Vec<ThemeSong>,
    pub related: Vec<RelatedEntry>,
    pub characters: Vec<CharacterCredit>,
    pub staff: Vec<StaffCredit>,
}

/// Popularity and quality statistics. Absent until the first successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemStats {
    pub score: Option<f64>,
    pub scored_by: Option<i64>,
    pub rank: Option<i64>,
    /// Popularity rank: 1 is the most popular entry
    pub popularity: Option<i64>,
    pub members: Option<i64>,
    pub favorites: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
}

/// Role a company played for an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanyRole {
    Producer,
    Licensor,
    Studio,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyCredit {
    pub company: Company,
    pub role: CompanyRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeKind {
    Opening,
    Ending,
}

/// Opening or ending song. `position` is the index within its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSong {
    pub kind: ThemeKind,
    pub position: i64,
    pub text: String,
}

/// Link to another catalog item (sequel, prequel, side story, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedEntry {
    pub relation_type: String,
    pub related_id: i64,
    pub related_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceActorAssignment {
    pub person: Person,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterCredit {
    pub character: Character,
    /// "Main" or "Supporting"
    pub role: String,
    pub voice_actors: Vec<VoiceActorAssignment>,
}

/// One (person, role) pair. A person with several roles yields several credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffCredit {
    pub person: Person,
    pub role: String,
}

impl CatalogItem {
    /// Create an item with only the mandatory fields set
    pub fn new(id: i64, title: String) -> Self {
        Self {
            id,
            title,
            title_english: None,
            title_japanese: None,
            media_type: None,
            source: None,
            status: None,
            episodes: None,
            duration: None,
            rating: None,
            synopsis: None,
            background: None,
            aired_string: None,
            aired_from: None,
            aired_to: None,
            season: None,
            year: None,
            main_picture: None,
            stats: ItemStats::default(),
            genres: Vec::new(),
            companies: Vec::new(),
            themes: Vec::new(),
            related: Vec::new(),
            characters: Vec::new(),
            staff: Vec::new(),
        }
    }

    pub fn genre_ids(&self) -> Vec<i64> {
        self.genres.iter().map(|g| g.id).collect()
    }

    /// Title to show in listings: English when known, else the primary title
    pub fn display_title(&self) -> &str {
        self.title_english
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.title)
    }
}

impl CharacterCredit {
    /// Pick the voice actor for a given language (e.g. "Japanese").
    /// Presentation helper; the credit itself keeps every assignment.
    pub fn voice_actor_for(&self, language: &str) -> Option<&Person> {
        self.voice_actors
            .iter()
            .find(|va| va.language.eq_ignore_ascii_case(language))
            .map(|va| &va.person)
    }
}

impl std::fmt::Display for CompanyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompanyRole::Producer => write!(f, "Producer"),
            CompanyRole::Licensor => write!(f, "Licensor"),
            CompanyRole::Studio => write!(f, "Studio"),
        }
    }
}

impl std::str::FromStr for CompanyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Producer" => Ok(CompanyRole::Producer),
            "Licensor" => Ok(CompanyRole::Licensor),
            "Studio" => Ok(CompanyRole::Studio),
            other => Err(format!("Unknown company role: {}", other)),
        }
    }
}

impl std::fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeKind::Opening => write!(f, "Opening"),
            ThemeKind::Ending => write!(f, "Ending"),
        }
    }
}

impl std::str::FromStr for ThemeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Opening" => Ok(ThemeKind::Opening),
            "Ending" => Ok(ThemeKind::Ending),
            other => Err(format!("Unknown theme kind: {}", other)),
        }
    }
}
