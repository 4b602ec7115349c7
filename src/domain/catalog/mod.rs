pub mod entity;
pub mod invariants;

pub use entity::{
    CatalogItem, Character, CharacterCredit, Company, CompanyCredit, CompanyRole, Genre,
    ItemStats, Person, RelatedEntry, StaffCredit, ThemeKind, ThemeSong, VoiceActorAssignment,
};
pub use invariants::validate_catalog_item;
