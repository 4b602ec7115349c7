// src/repositories/search_repository.rs
//
// Filtered, sorted and paged catalog listings

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::sync::Arc;

use crate::db::ConnectionPool;
use crate::domain::{CatalogSummary, Genre, SearchQuery, SortField, SortOrder};
use crate::error::AppResult;
use crate::repositories::statistics_repository::{load_summary_genres, row_to_summary};

pub trait SearchRepository: Send + Sync {
    /// One page of matches plus the total match count
    fn search(&self, query: &SearchQuery) -> AppResult<(Vec<CatalogSummary>, i64)>;
    /// Every stored genre, by name
    fn available_genres(&self) -> AppResult<Vec<Genre>>;
    /// Distinct premiere years, newest first
    fn available_years(&self) -> AppResult<Vec<i64>>;
}

pub struct SqliteSearchRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteSearchRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards; pairs with `ESCAPE '\'`
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `WHERE ...` (or empty) and its bound values, in placeholder order
fn filter_clause(query: &SearchQuery) -> (String, Vec<Value>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(text) = query.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        conditions.push(
            "(title LIKE ? ESCAPE '\\' OR title_english LIKE ? ESCAPE '\\' \
             OR title_japanese LIKE ? ESCAPE '\\')"
                .to_string(),
        );
        let pattern = like_pattern(text);
        values.extend(std::iter::repeat(Value::Text(pattern)).take(3));
    }

    if !query.genres.is_empty() {
        let placeholders = vec!["?"; query.genres.len()].join(", ");
        conditions.push(format!(
            "id IN (SELECT ag.anime_id FROM anime_genres ag \
             JOIN genres g ON g.id = ag.genre_id WHERE g.name IN ({}))",
            placeholders
        ));
        values.extend(query.genres.iter().cloned().map(Value::Text));
    }

    if let Some(season) = &query.season {
        conditions.push("season = lower(?)".to_string());
        values.push(Value::Text(season.trim().to_string()));
    }

    if let Some(year) = query.year {
        conditions.push("year = ?".to_string());
        values.push(Value::Integer(year));
    }

    if let Some(media_type) = &query.media_type {
        conditions.push("media_type = ?".to_string());
        values.push(Value::Text(media_type.clone()));
    }

    if let Some(min_score) = query.min_score {
        conditions.push("score >= ?".to_string());
        values.push(Value::Real(min_score));
    }

    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!("WHERE {}", conditions.join(" AND ")), values)
    }
}

/// Missing values sort last in either direction; ties break on id
fn order_clause(sort_by: SortField, order: SortOrder) -> String {
    // popularity and rank 0 mean "unranked"
    let key = match sort_by {
        SortField::Popularity => "NULLIF(popularity, 0)",
        SortField::Rank => "NULLIF(ranked, 0)",
        SortField::Score => "score",
        SortField::Title => "COALESCE(title_english, title) COLLATE NOCASE",
        SortField::Aired => "aired_from",
    };
    let direction = match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    format!("ORDER BY ({}) IS NULL, {} {}, id ASC", key, key, direction)
}

fn count_matches(conn: &Connection, filter: &str, values: &[Value]) -> rusqlite::Result<i64> {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM anime {}", filter),
        params_from_iter(values.iter()),
        |row| row.get(0),
    )
}

impl SearchRepository for SqliteSearchRepository {
    fn search(&self, query: &SearchQuery) -> AppResult<(Vec<CatalogSummary>, i64)> {
        let conn = self.pool.get()?;
        let (filter, mut values) = filter_clause(query);

        let total = count_matches(&conn, &filter, &values)?;

        let sql = format!(
            "SELECT id, title, title_english, main_picture, score, popularity
             FROM anime
             {}
             {}
             LIMIT ? OFFSET ?",
            filter,
            order_clause(query.sort_by, query.sort_order)
        );
        values.push(Value::Integer(query.limit as i64));
        values.push(Value::Integer(query.offset() as i64));

        let mut stmt = conn.prepare(&sql)?;
        let mut items = stmt
            .query_map(params_from_iter(values.iter()), row_to_summary)?
            .collect::<Result<Vec<_>, _>>()?;

        load_summary_genres(&conn, &mut items)?;
        Ok((items, total))
    }

    fn available_genres(&self) -> AppResult<Vec<Genre>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT id, name FROM genres ORDER BY name ASC, id ASC")?;
        let genres = stmt
            .query_map([], |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(genres)
    }

    fn available_years(&self) -> AppResult<Vec<i64>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT year FROM anime WHERE year IS NOT NULL ORDER BY year DESC",
        )?;
        let years = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(years)
    }
}
