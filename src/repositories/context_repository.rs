// src/repositories/context_repository.rs
//
// Viewing contexts: member sets and genre co-occurrence snapshots.
//
// Members and connections of a context are only ever written together, so a
// reader sees either the previous snapshot or the new one, never a mix.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use std::sync::Arc;

use crate::db::ConnectionPool;
use crate::domain::{GenreConnection, GenreLink, ViewingContext};
use crate::error::AppResult;

pub trait ContextRepository: Send + Sync {
    /// Upsert the context (stamped `updated_at`) and replace its members and
    /// connections in one transaction
    fn replace_snapshot(
        &self,
        context: &ViewingContext,
        member_ids: &[i64],
        connections: &[GenreConnection],
        updated_at: DateTime<Utc>,
    ) -> AppResult<()>;

    fn member_ids(&self, context: &ViewingContext) -> AppResult<Vec<i64>>;

    /// `None` until the first successful snapshot
    fn last_updated(&self, context: &ViewingContext) -> AppResult<Option<DateTime<Utc>>>;

    /// Strongest connections, by count desc then pair key asc
    fn top_connections(&self, context: &ViewingContext, limit: usize) -> AppResult<Vec<GenreLink>>;

    fn connection_count(&self, context: &ViewingContext) -> AppResult<i64>;
}

pub struct SqliteContextRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteContextRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

impl ContextRepository for SqliteContextRepository {
    fn replace_snapshot(
        &self,
        context: &ViewingContext,
        member_ids: &[i64],
        connections: &[GenreConnection],
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let key = context.key();
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO viewing_contexts (id, kind, last_updated) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET last_updated = excluded.last_updated",
            params![key, context.kind(), updated_at.to_rfc3339()],
        )?;

        tx.execute("DELETE FROM context_anime WHERE context_id = ?1", params![key])?;
        {
            let mut insert = tx.prepare_cached(
                "INSERT OR IGNORE INTO context_anime (context_id, anime_id) VALUES (?1, ?2)",
            )?;
            for id in member_ids {
                insert.execute(params![key, id])?;
            }
        }

        tx.execute("DELETE FROM genre_connections WHERE context_id = ?1", params![key])?;
        {
            let mut insert = tx.prepare_cached(
                "INSERT INTO genre_connections (context_id, genre_a, genre_b, count)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for connection in connections {
                insert.execute(params![
                    key,
                    connection.pair.genre_a,
                    connection.pair.genre_b,
                    connection.count
                ])?;
            }
        }

        tx.commit()?;

        log::debug!(
            "Context {} snapshot: {} members, {} connections",
            key,
            member_ids.len(),
            connections.len()
        );
        Ok(())
    }

    fn member_ids(&self, context: &ViewingContext) -> AppResult<Vec<i64>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT anime_id FROM context_anime WHERE context_id = ?1 ORDER BY anime_id",
        )?;
        let ids = stmt
            .query_map(params![context.key()], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    fn last_updated(&self, context: &ViewingContext) -> AppResult<Option<DateTime<Utc>>> {
        let conn = self.pool.get()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT last_updated FROM viewing_contexts WHERE id = ?1",
                params![context.key()],
                |row| row.get(0),
            )
            .optional()?;

        let parsed = raw
            .map(|s| DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)))
            .transpose()?;
        Ok(parsed)
    }

    fn top_connections(&self, context: &ViewingContext, limit: usize) -> AppResult<Vec<GenreLink>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT ga.name, gb.name, gc.count
             FROM genre_connections gc
             JOIN genres ga ON ga.id = gc.genre_a
             JOIN genres gb ON gb.id = gc.genre_b
             WHERE gc.context_id = ?1
             ORDER BY gc.count DESC, gc.genre_a ASC, gc.genre_b ASC
             LIMIT ?2",
        )?;

        let links = stmt
            .query_map(params![context.key(), limit as i64], |row| {
                Ok(GenreLink {
                    source: row.get(0)?,
                    target: row.get(1)?,
                    value: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    fn connection_count(&self, context: &ViewingContext) -> AppResult<i64> {
        let conn = self.pool.get()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM genre_connections WHERE context_id = ?1",
            params![context.key()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::domain::GenrePair;
    use crate::error::AppError;
    use chrono::TimeZone;

    fn seed(pool: &ConnectionPool) {
        pool.get()
            .unwrap()
            .execute_batch(
                "INSERT INTO anime (id, title) VALUES (1, 'A'), (2, 'B'), (3, 'C');
                 INSERT INTO genres (id, name) VALUES
                    (1, 'Action'), (2, 'Adventure'), (4, 'Comedy'), (8, 'Drama');",
            )
            .unwrap();
    }

    fn connection(a: i64, b: i64, count: i64) -> GenreConnection {
        GenreConnection {
            pair: GenrePair::new(a, b).unwrap(),
            count,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_unknown_context_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteContextRepository::new(create_test_pool(&dir));
        let context = ViewingContext::Global;

        assert!(repo.last_updated(&context).unwrap().is_none());
        assert!(repo.member_ids(&context).unwrap().is_empty());
        assert!(repo.top_connections(&context, 50).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool(&dir);
        seed(&pool);
        let repo = SqliteContextRepository::new(pool);
        let context = ViewingContext::for_user("Xinil").unwrap();

        repo.replace_snapshot(
            &context,
            &[1, 2, 3],
            &[connection(1, 2, 3), connection(1, 8, 1)],
            at(10),
        )
        .unwrap();
        repo.replace_snapshot(&context, &[2], &[connection(2, 4, 1)], at(12))
            .unwrap();

        assert_eq!(repo.member_ids(&context).unwrap(), vec![2]);
        assert_eq!(repo.connection_count(&context).unwrap(), 1);
        assert_eq!(repo.last_updated(&context).unwrap(), Some(at(12)));
        assert_eq!(
            repo.top_connections(&context, 50).unwrap(),
            vec![GenreLink {
                source: "Adventure".to_string(),
                target: "Comedy".to_string(),
                value: 1,
            }]
        );
    }

    #[test]
    fn test_contexts_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool(&dir);
        seed(&pool);
        let repo = SqliteContextRepository::new(pool);
        let user = ViewingContext::for_user("Xinil").unwrap();

        repo.replace_snapshot(&ViewingContext::Global, &[1, 2], &[connection(1, 2, 2)], at(1))
            .unwrap();
        repo.replace_snapshot(&user, &[], &[], at(2)).unwrap();

        assert_eq!(repo.connection_count(&ViewingContext::Global).unwrap(), 1);
        assert_eq!(repo.connection_count(&user).unwrap(), 0);
        assert_eq!(repo.last_updated(&user).unwrap(), Some(at(2)));
    }

    #[test]
    fn test_top_connections_order_and_limit() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool(&dir);
        seed(&pool);
        let repo = SqliteContextRepository::new(pool);
        let context = ViewingContext::Global;

        repo.replace_snapshot(
            &context,
            &[1, 2, 3],
            &[
                connection(4, 8, 2),
                connection(1, 2, 5),
                connection(2, 8, 2),
                connection(1, 4, 1),
            ],
            at(1),
        )
        .unwrap();

        let top = repo.top_connections(&context, 3).unwrap();
        let pairs: Vec<(&str, &str, i64)> = top
            .iter()
            .map(|l| (l.source.as_str(), l.target.as_str(), l.value))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("Action", "Adventure", 5),
                ("Adventure", "Drama", 2),
                ("Comedy", "Drama", 2),
            ]
        );
        assert_eq!(repo.top_connections(&context, 3).unwrap(), top);
    }

    #[test]
    fn test_failed_snapshot_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool(&dir);
        seed(&pool);
        let repo = SqliteContextRepository::new(pool.clone());
        let context = ViewingContext::Global;

        repo.replace_snapshot(&context, &[1, 2], &[connection(1, 2, 2)], at(1))
            .unwrap();

        pool.get()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER fail_connections BEFORE INSERT ON genre_connections
                 BEGIN SELECT RAISE(ABORT, 'connection insert rejected'); END;",
            )
            .unwrap();

        let err = repo
            .replace_snapshot(&context, &[3], &[connection(4, 8, 1)], at(2))
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        assert_eq!(repo.member_ids(&context).unwrap(), vec![1, 2]);
        assert_eq!(repo.last_updated(&context).unwrap(), Some(at(1)));
        assert_eq!(repo.top_connections(&context, 50).unwrap()[0].value, 2);
    }
}
