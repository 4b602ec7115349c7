// src/repositories/statistics_repository.rs
//
// Read-only aggregate queries over the catalog

use rusqlite::{params, Connection, Row};
use std::sync::Arc;

use crate::db::ConnectionPool;
use crate::domain::{CatalogSummary, StudioCount, StudioCredit, TypeScore};
use crate::error::AppResult;

pub trait StatisticsRepository: Send + Sync {
    /// Items with a known popularity rank, most popular first
    fn featured(&self, limit: usize) -> AppResult<Vec<CatalogSummary>>;
    /// Every positive score in the catalog
    fn scores(&self) -> AppResult<Vec<f64>>;
    fn average_score_by_type(&self) -> AppResult<Vec<TypeScore>>;
    /// Raw `(season, year, count)` groups, unordered
    fn season_counts(&self) -> AppResult<Vec<(String, i64, i64)>>;
    fn top_studios(&self, limit: usize) -> AppResult<Vec<StudioCount>>;
    /// Raw `(season, year, media_type, count)` groups, unordered
    fn season_type_counts(&self) -> AppResult<Vec<(String, i64, String, i64)>>;
    /// Studio credits of the `item_limit` most popular items that have one,
    /// grouped by item in popularity order
    fn studio_credits(&self, item_limit: usize) -> AppResult<Vec<StudioCredit>>;
}

/// Columns: id, title, title_english, main_picture, score, popularity
pub(crate) fn row_to_summary(row: &Row) -> rusqlite::Result<CatalogSummary> {
    Ok(CatalogSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        title_english: row.get(2)?,
        main_picture: row.get(3)?,
        score: row.get(4)?,
        popularity: row.get(5)?,
        genres: Vec::new(),
    })
}

/// Fill in genre names, alphabetically
pub(crate) fn load_summary_genres(
    conn: &Connection,
    summaries: &mut [CatalogSummary],
) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached(
        "SELECT g.name FROM anime_genres ag
         JOIN genres g ON g.id = ag.genre_id
         WHERE ag.anime_id = ?1
         ORDER BY g.name",
    )?;
    for summary in summaries.iter_mut() {
        summary.genres = stmt
            .query_map(params![summary.id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
    }
    Ok(())
}

pub struct SqliteStatisticsRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteStatisticsRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

impl StatisticsRepository for SqliteStatisticsRepository {
    fn featured(&self, limit: usize) -> AppResult<Vec<CatalogSummary>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, title_english, main_picture, score, popularity
             FROM anime
             WHERE popularity > 0
             ORDER BY popularity ASC, id ASC
             LIMIT ?1",
        )?;
        let mut summaries = stmt
            .query_map(params![limit as i64], row_to_summary)?
            .collect::<Result<Vec<_>, _>>()?;

        load_summary_genres(&conn, &mut summaries)?;
        Ok(summaries)
    }

    fn scores(&self) -> AppResult<Vec<f64>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT score FROM anime WHERE score > 0")?;
        let scores = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(scores)
    }

    fn average_score_by_type(&self) -> AppResult<Vec<TypeScore>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT media_type, AVG(score), COUNT(*)
             FROM anime
             WHERE score > 0 AND media_type IS NOT NULL
             GROUP BY media_type
             ORDER BY media_type",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TypeScore {
                    media_type: row.get(0)?,
                    average_score: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn season_counts(&self) -> AppResult<Vec<(String, i64, i64)>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT season, year, COUNT(*)
             FROM anime
             WHERE season IS NOT NULL AND year IS NOT NULL
             GROUP BY season, year",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn top_studios(&self, limit: usize) -> AppResult<Vec<StudioCount>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.name, COUNT(DISTINCT ac.anime_id) AS item_count
             FROM anime_companies ac
             JOIN companies c ON c.id = ac.company_id
             WHERE ac.role = 'Studio'
             GROUP BY c.id, c.name
             ORDER BY item_count DESC, c.name ASC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(StudioCount {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    item_count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn season_type_counts(&self) -> AppResult<Vec<(String, i64, String, i64)>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT season, year, media_type, COUNT(*)
             FROM anime
             WHERE season IS NOT NULL AND year IS NOT NULL AND media_type IS NOT NULL
             GROUP BY season, year, media_type",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn studio_credits(&self, item_limit: usize) -> AppResult<Vec<StudioCredit>> {
        let conn = self.pool.get()?;
        // Unranked items (popularity NULL or 0) come after every ranked one
        let mut stmt = conn.prepare(
            "WITH credited AS (
                 SELECT a.id, a.title, COALESCE(a.popularity, 0) <= 0 AS unranked, a.popularity
                 FROM anime a
                 WHERE EXISTS (
                     SELECT 1 FROM anime_companies ac
                     WHERE ac.anime_id = a.id AND ac.role = 'Studio'
                 )
                 ORDER BY unranked, a.popularity, a.id
                 LIMIT ?1
             )
             SELECT cr.id, cr.title, c.id, c.name
             FROM credited cr
             JOIN anime_companies ac ON ac.anime_id = cr.id AND ac.role = 'Studio'
             JOIN companies c ON c.id = ac.company_id
             ORDER BY cr.unranked, cr.popularity, cr.id, c.id",
        )?;
        let rows = stmt
            .query_map(params![item_limit as i64], |row| {
                Ok(StudioCredit {
                    item_id: row.get(0)?,
                    item_title: row.get(1)?,
                    studio_id: row.get(2)?,
                    studio_name: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn seeded_repo(dir: &tempfile::TempDir) -> SqliteStatisticsRepository {
        let pool = create_test_pool(dir);
        pool.get()
            .unwrap()
            .execute_batch(
                "INSERT INTO anime (id, title, media_type, score, popularity, season, year) VALUES
                    (1, 'Cowboy Bebop', 'TV', 8.75, 40, 'spring', 1998),
                    (5, 'Cowboy Bebop: The Movie', 'Movie', 8.38, 600, 'summer', 2001),
                    (1535, 'Death Note', 'TV', 8.62, 2, 'fall', 2006),
                    (9999, 'Unaired', 'TV', NULL, 0, NULL, NULL),
                    (30, 'Evangelion', 'TV', 8.35, 30, 'fall', 1995);
                 INSERT INTO genres (id, name) VALUES (1, 'Action'), (24, 'Sci-Fi');
                 INSERT INTO anime_genres (anime_id, genre_id) VALUES (1, 1), (1, 24);
                 INSERT INTO companies (id, name) VALUES (14, 'Sunrise'), (11, 'Madhouse'), (6, 'Gainax');
                 INSERT INTO anime_companies (anime_id, company_id, role) VALUES
                    (1, 14, 'Studio'), (5, 14, 'Studio'), (5, 11, 'Producer'),
                    (1535, 11, 'Studio'), (30, 6, 'Studio');",
            )
            .unwrap();
        SqliteStatisticsRepository::new(pool)
    }

    #[test]
    fn test_featured_most_popular_first() {
        let dir = tempfile::tempdir().unwrap();
        let repo = seeded_repo(&dir);

        let featured = repo.featured(3).unwrap();
        let ids: Vec<i64> = featured.iter().map(|s| s.id).collect();

        assert_eq!(ids, vec![1535, 30, 1]);
        assert_eq!(featured[2].genres, vec!["Action", "Sci-Fi"]);
    }

    #[test]
    fn test_scores_exclude_unscored() {
        let dir = tempfile::tempdir().unwrap();
        let repo = seeded_repo(&dir);

        assert_eq!(repo.scores().unwrap().len(), 4);
    }

    #[test]
    fn test_average_score_by_type() {
        let dir = tempfile::tempdir().unwrap();
        let repo = seeded_repo(&dir);

        let averages = repo.average_score_by_type().unwrap();

        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].media_type, "Movie");
        assert_eq!(averages[1].media_type, "TV");
        assert_eq!(averages[1].count, 3);
        assert!((averages[1].average_score - (8.75 + 8.62 + 8.35) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_studios_counts_only_studio_role() {
        let dir = tempfile::tempdir().unwrap();
        let repo = seeded_repo(&dir);

        let studios = repo.top_studios(10).unwrap();
        let summary: Vec<(&str, i64)> = studios
            .iter()
            .map(|s| (s.name.as_str(), s.item_count))
            .collect();

        assert_eq!(summary, vec![("Sunrise", 2), ("Gainax", 1), ("Madhouse", 1)]);
    }

    #[test]
    fn test_season_counts() {
        let dir = tempfile::tempdir().unwrap();
        let repo = seeded_repo(&dir);

        let mut counts = repo.season_counts().unwrap();
        counts.sort();

        assert_eq!(counts.len(), 4);
        assert!(counts.contains(&("fall".to_string(), 2006, 1)));
    }

    #[test]
    fn test_season_type_counts_skip_untyped() {
        let dir = tempfile::tempdir().unwrap();
        let repo = seeded_repo(&dir);
        repo.pool
            .get()
            .unwrap()
            .execute_batch(
                "INSERT INTO anime (id, title, media_type, season, year) VALUES
                    (2000, 'Fall Movie', 'Movie', 'fall', 2006),
                    (2001, 'Fall Special', NULL, 'fall', 2006),
                    (2002, 'Second Fall TV', 'TV', 'fall', 2006);",
            )
            .unwrap();

        let mut counts = repo.season_type_counts().unwrap();
        counts.sort();

        let fall_2006: Vec<(String, i64)> = counts
            .into_iter()
            .filter(|(season, year, _, _)| season == "fall" && *year == 2006)
            .map(|(_, _, media_type, count)| (media_type, count))
            .collect();
        assert_eq!(
            fall_2006,
            vec![("Movie".to_string(), 1), ("TV".to_string(), 2)]
        );
    }

    #[test]
    fn test_studio_credits_follow_popularity() {
        let dir = tempfile::tempdir().unwrap();
        let repo = seeded_repo(&dir);
        repo.pool
            .get()
            .unwrap()
            .execute_batch(
                "INSERT INTO companies (id, name) VALUES (2, 'Bones');
                 INSERT INTO anime_companies (anime_id, company_id, role) VALUES
                    (1, 2, 'Studio'), (9999, 6, 'Studio');",
            )
            .unwrap();

        let credits = repo.studio_credits(100).unwrap();
        let pairs: Vec<(i64, i64)> = credits.iter().map(|c| (c.item_id, c.studio_id)).collect();

        // 9999 is unranked so it comes last; producers are not studios
        assert_eq!(
            pairs,
            vec![(1535, 11), (30, 6), (1, 2), (1, 14), (5, 14), (9999, 6)]
        );
        assert_eq!(credits[2].item_title, "Cowboy Bebop");
        assert_eq!(credits[2].studio_name, "Bones");
    }

    #[test]
    fn test_studio_credits_limit_counts_items() {
        let dir = tempfile::tempdir().unwrap();
        let repo = seeded_repo(&dir);
        repo.pool
            .get()
            .unwrap()
            .execute_batch(
                "INSERT INTO companies (id, name) VALUES (2, 'Bones');
                 INSERT INTO anime_companies (anime_id, company_id, role) VALUES (30, 2, 'Studio');",
            )
            .unwrap();

        let credits = repo.studio_credits(2).unwrap();
        let items: Vec<i64> = credits.iter().map(|c| c.item_id).collect();

        assert_eq!(items, vec![1535, 30, 30]);
    }
}
