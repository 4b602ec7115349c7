// src/domain/context.rs
//
// Viewing contexts: the scope a genre graph is computed over.
// Textual form is `global` or `user:<name>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

const USER_PREFIX: &str = "user:";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ViewingContext {
    Global,
    User(String),
}

impl ViewingContext {
    /// Parse `global` or `user:<name>`
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("global") {
            return Ok(ViewingContext::Global);
        }
        match raw.strip_prefix(USER_PREFIX) {
            Some(name) => Self::for_user(name),
            None => Err(DomainError::InvariantViolation(format!(
                "Unknown viewing context '{}': expected 'global' or 'user:<name>'",
                raw
            ))),
        }
    }

    pub fn for_user(name: &str) -> DomainResult<Self> {
        validate_username(name)?;
        Ok(ViewingContext::User(name.to_string()))
    }

    /// Stable storage key
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ViewingContext::Global => "global",
            ViewingContext::User(_) => "user",
        }
    }
}

/// Current snapshot of one context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextSummary {
    pub context: ViewingContext,
    pub member_ids: Vec<i64>,
    pub connection_count: i64,
    /// `None` until the first successful update
    pub last_updated: Option<DateTime<Utc>>,
}

/// MyAnimeList usernames: ASCII alphanumerics, '_' and '-', 2..=16 chars.
/// Restricting the alphabet keeps names safe to embed in endpoint paths.
fn validate_username(name: &str) -> DomainResult<()> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if name.len() < 2 || name.len() > 16 || !valid_chars {
        return Err(DomainError::InvariantViolation(format!(
            "Invalid username '{}'",
            name
        )));
    }
    Ok(())
}

impl std::fmt::Display for ViewingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewingContext::Global => write!(f, "global"),
            ViewingContext::User(name) => write!(f, "{}{}", USER_PREFIX, name),
        }
    }
}

impl std::str::FromStr for ViewingContext {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ViewingContext {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ViewingContext> for String {
    fn from(value: ViewingContext) -> Self {
        value.to_string()
    }
}
