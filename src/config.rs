// src/config.rs
//
// Runtime configuration, read from environment variables.
// Every setting has a default except the MyAnimeList client ID,
// whose absence only surfaces when a list source is queried.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const DEFAULT_JIKAN_API_BASE: &str = "https://api.jikan.moe/v4";
pub const DEFAULT_MAL_API_BASE: &str = "https://api.myanimelist.net/v2";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jikan_api_base: String,
    pub mal_api_base: String,
    pub mal_client_id: Option<String>,
    pub fetch: FetchPolicy,
    pub global_ranking_limit: usize,
    pub connections_limit: usize,
    pub database_path: PathBuf,
}

/// Scheduling policy of a rate-limited fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Minimum time between two dispatched requests
    pub min_interval: Duration,
    /// Extra attempts after the first one for retryable failures
    pub retries: u32,
    /// Fixed pause between attempts
    pub retry_delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(1000),
            retries: 3,
            retry_delay: Duration::from_millis(2000),
        }
    }
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup (tests pass a map here)
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = FetchPolicy::default();

        let fetch = FetchPolicy {
            min_interval: Duration::from_millis(parse_or(
                &get,
                "JIKAN_RATE_LIMIT_MS",
                defaults.min_interval.as_millis() as u64,
            )?),
            retries: parse_or(&get, "JIKAN_RETRIES", defaults.retries)?,
            retry_delay: Duration::from_millis(parse_or(
                &get,
                "JIKAN_RETRY_DELAY_MS",
                defaults.retry_delay.as_millis() as u64,
            )?),
        };

        let database_path = match get("ANIMEGRAPH_DATABASE") {
            Some(path) => PathBuf::from(path),
            None => default_database_path()?,
        };

        Ok(Self {
            jikan_api_base: get("JIKAN_API_BASE")
                .unwrap_or_else(|| DEFAULT_JIKAN_API_BASE.to_string()),
            mal_api_base: get("MAL_API_BASE").unwrap_or_else(|| DEFAULT_MAL_API_BASE.to_string()),
            mal_client_id: get("MAL_CLIENT_ID"),
            fetch,
            global_ranking_limit: parse_or(&get, "GLOBAL_RANKING_LIMIT", 500)?,
            connections_limit: parse_or(&get, "CONNECTIONS_LIMIT", 50)?,
            database_path,
        })
    }
}

fn parse_or<T, F>(get: &F, key: &str, default: T) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| {
            AppError::Configuration(format!("{} has invalid value '{}': {}", key, raw, e))
        }),
        None => Ok(default),
    }
}

/// Database file in the application data directory:
/// {APP_DATA}/animegraph/animegraph.db
pub fn default_database_path() -> AppResult<PathBuf> {
    let app_data_dir = dirs::data_dir().ok_or_else(|| {
        AppError::Configuration("Could not determine app data directory".to_string())
    })?;

    Ok(app_data_dir.join("animegraph").join("animegraph.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("ANIMEGRAPH_DATABASE", "/tmp/a.db")])).unwrap();

        assert_eq!(config.jikan_api_base, DEFAULT_JIKAN_API_BASE);
        assert_eq!(config.mal_api_base, DEFAULT_MAL_API_BASE);
        assert!(config.mal_client_id.is_none());
        assert_eq!(config.fetch, FetchPolicy::default());
        assert_eq!(config.global_ranking_limit, 500);
        assert_eq!(config.connections_limit, 50);
        assert_eq!(config.database_path, PathBuf::from("/tmp/a.db"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ANIMEGRAPH_DATABASE", "/tmp/a.db"),
            ("JIKAN_RATE_LIMIT_MS", "350"),
            ("JIKAN_RETRIES", "5"),
            ("MAL_CLIENT_ID", "abc123"),
            ("GLOBAL_RANKING_LIMIT", "100"),
        ]))
        .unwrap();

        assert_eq!(config.fetch.min_interval, Duration::from_millis(350));
        assert_eq!(config.fetch.retries, 5);
        assert_eq!(config.mal_client_id.as_deref(), Some("abc123"));
        assert_eq!(config.global_ranking_limit, 100);
    }

    #[test]
    fn test_blank_client_id_is_absent() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ANIMEGRAPH_DATABASE", "/tmp/a.db"),
            ("MAL_CLIENT_ID", "   "),
        ]))
        .unwrap();
        assert!(config.mal_client_id.is_none());
    }

    #[test]
    fn test_invalid_number_is_configuration_error() {
        let result = AppConfig::from_lookup(lookup(&[
            ("ANIMEGRAPH_DATABASE", "/tmp/a.db"),
            ("JIKAN_RETRIES", "three"),
        ]));
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
