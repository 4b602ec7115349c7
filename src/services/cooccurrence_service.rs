// src/services/cooccurrence_service.rs
//
// Genre co-occurrence per viewing context.
//
// Two genres co-occur once for every member item carrying both. Counts are
// recomputed from scratch on every update and stored as a whole snapshot.

use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::domain::{ContextSummary, GenreConnection, GenreLink, GenrePair, ViewingContext};
use crate::error::AppResult;
use crate::repositories::{CatalogRepository, ContextRepository};

/// Count unordered genre pairs across items. Output is sorted by pair.
///
/// Repeated genres within one item count once; self-pairs never appear.
pub fn count_genre_pairs(genre_sets: &[Vec<i64>]) -> Vec<GenreConnection> {
    let mut counts: BTreeMap<GenrePair, i64> = BTreeMap::new();

    for genres in genre_sets {
        let unique: Vec<i64> = genres.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();

        for (i, &a) in unique.iter().enumerate() {
            for &b in &unique[i + 1..] {
                if let Some(pair) = GenrePair::new(a, b) {
                    *counts.entry(pair).or_insert(0) += 1;
                }
            }
        }
    }

    counts
        .into_iter()
        .map(|(pair, count)| GenreConnection { pair, count })
        .collect()
}

pub struct CooccurrenceService {
    catalog_repo: Arc<dyn CatalogRepository>,
    context_repo: Arc<dyn ContextRepository>,
}

/// Outcome of one recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub members: usize,
    pub connections: usize,
}

impl CooccurrenceService {
    pub fn new(
        catalog_repo: Arc<dyn CatalogRepository>,
        context_repo: Arc<dyn ContextRepository>,
    ) -> Self {
        Self {
            catalog_repo,
            context_repo,
        }
    }

    /// Rebuild the context's member set and genre graph from `listed_ids`.
    ///
    /// Members are the listed items present in the catalog. The previous
    /// snapshot stays in place if anything fails.
    pub async fn recompute(
        &self,
        context: &ViewingContext,
        listed_ids: &[i64],
    ) -> AppResult<SnapshotSummary> {
        let catalog_repo = Arc::clone(&self.catalog_repo);
        let context_repo = Arc::clone(&self.context_repo);
        let context = context.clone();
        let listed_ids = listed_ids.to_vec();

        tokio::task::spawn_blocking(move || -> AppResult<SnapshotSummary> {
            let members = catalog_repo.existing_ids(&listed_ids)?;
            let genre_sets = catalog_repo.genre_sets(&members)?;
            let connections = count_genre_pairs(&genre_sets);

            context_repo.replace_snapshot(&context, &members, &connections, Utc::now())?;

            log::info!(
                "Context {}: {} members, {} genre connections",
                context,
                members.len(),
                connections.len()
            );
            Ok(SnapshotSummary {
                members: members.len(),
                connections: connections.len(),
            })
        })
        .await?
    }

    pub async fn top_connections(
        &self,
        context: &ViewingContext,
        limit: usize,
    ) -> AppResult<Vec<GenreLink>> {
        let context_repo = Arc::clone(&self.context_repo);
        let context = context.clone();
        tokio::task::spawn_blocking(move || context_repo.top_connections(&context, limit)).await?
    }

    /// Members, connection count and update time of the stored snapshot
    pub async fn summary(&self, context: &ViewingContext) -> AppResult<ContextSummary> {
        let context_repo = Arc::clone(&self.context_repo);
        let context = context.clone();
        tokio::task::spawn_blocking(move || -> AppResult<ContextSummary> {
            Ok(ContextSummary {
                member_ids: context_repo.member_ids(&context)?,
                connection_count: context_repo.connection_count(&context)?,
                last_updated: context_repo.last_updated(&context)?,
                context,
            })
        })
        .await?
    }

    pub async fn last_updated(
        &self,
        context: &ViewingContext,
    ) -> AppResult<Option<chrono::DateTime<Utc>>> {
        let context_repo = Arc::clone(&self.context_repo);
        let context = context.clone();
        tokio::task::spawn_blocking(move || context_repo.last_updated(&context)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::domain::{CatalogItem, Genre};
    use crate::error::AppError;
    use crate::repositories::{SqliteCatalogRepository, SqliteContextRepository};

    const ACTION: i64 = 1;
    const ADVENTURE: i64 = 2;
    const COMEDY: i64 = 4;

    fn counts(connections: &[GenreConnection]) -> Vec<(i64, i64, i64)> {
        connections
            .iter()
            .map(|c| (c.pair.genre_a, c.pair.genre_b, c.count))
            .collect()
    }

    #[test]
    fn test_count_genre_pairs() {
        let sets = vec![
            vec![ACTION, ADVENTURE],
            vec![ADVENTURE, COMEDY],
            vec![COMEDY, ACTION, ADVENTURE],
        ];

        let connections = count_genre_pairs(&sets);

        assert_eq!(
            counts(&connections),
            vec![(ACTION, ADVENTURE, 2), (ACTION, COMEDY, 1), (ADVENTURE, COMEDY, 2)]
        );
    }

    #[test]
    fn test_count_ignores_repeats_and_singletons() {
        let sets = vec![vec![ACTION, ACTION, ADVENTURE], vec![COMEDY], vec![]];

        assert_eq!(counts(&count_genre_pairs(&sets)), vec![(ACTION, ADVENTURE, 1)]);
        assert!(count_genre_pairs(&[]).is_empty());
    }

    #[test]
    fn test_count_is_order_independent() {
        let forward = count_genre_pairs(&[vec![1, 2, 3], vec![3, 4]]);
        let backward = count_genre_pairs(&[vec![4, 3], vec![3, 2, 1]]);

        assert_eq!(forward, backward);
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        catalog: Arc<SqliteCatalogRepository>,
        service: CooccurrenceService,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool(&dir);
        let catalog = Arc::new(SqliteCatalogRepository::new(Arc::clone(&pool)));
        let context = Arc::new(SqliteContextRepository::new(pool));
        let service = CooccurrenceService::new(catalog.clone(), context);
        Fixture {
            _dir: dir,
            catalog,
            service,
        }
    }

    fn store(catalog: &SqliteCatalogRepository, id: i64, genres: &[(i64, &str)]) {
        let mut item = CatalogItem::new(id, format!("Item {}", id));
        item.genres = genres
            .iter()
            .map(|(id, name)| Genre {
                id: *id,
                name: name.to_string(),
            })
            .collect();
        catalog.sync_item(&item).unwrap();
    }

    #[tokio::test]
    async fn test_recompute_builds_graph() {
        let f = fixture();
        store(&f.catalog, 10, &[(ACTION, "Action"), (ADVENTURE, "Adventure")]);
        store(&f.catalog, 11, &[(ADVENTURE, "Adventure"), (COMEDY, "Comedy")]);
        store(&f.catalog, 12, &[(ACTION, "Action"), (ADVENTURE, "Adventure"), (COMEDY, "Comedy")]);
        let context = ViewingContext::Global;

        // 99 was listed but never synced
        let summary = f.service.recompute(&context, &[10, 11, 12, 99]).await.unwrap();

        assert_eq!(summary, SnapshotSummary { members: 3, connections: 3 });
        let links = f.service.top_connections(&context, 50).await.unwrap();
        let rendered: Vec<(String, String, i64)> = links
            .into_iter()
            .map(|l| (l.source, l.target, l.value))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("Action".to_string(), "Adventure".to_string(), 2),
                ("Adventure".to_string(), "Comedy".to_string(), 2),
                ("Action".to_string(), "Comedy".to_string(), 1),
            ]
        );
        assert!(f.service.last_updated(&context).await.unwrap().is_some());

        let summary = f.service.summary(&context).await.unwrap();
        assert_eq!(summary.member_ids, vec![10, 11, 12]);
        assert_eq!(summary.connection_count, 3);
        assert!(summary.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_summary_of_unknown_context() {
        let f = fixture();

        let summary = f
            .service
            .summary(&ViewingContext::for_user("nobody").unwrap())
            .await
            .unwrap();

        assert!(summary.member_ids.is_empty());
        assert_eq!(summary.connection_count, 0);
        assert_eq!(summary.last_updated, None);
    }

    #[tokio::test]
    async fn test_empty_context_has_no_connections() {
        let f = fixture();
        let context = ViewingContext::for_user("nobody").unwrap();

        let summary = f.service.recompute(&context, &[]).await.unwrap();

        assert_eq!(summary, SnapshotSummary { members: 0, connections: 0 });
        assert!(f.service.top_connections(&context, 50).await.unwrap().is_empty());
        assert!(f.service.last_updated(&context).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_recompute_drops_stale_connections() {
        let f = fixture();
        store(&f.catalog, 10, &[(ACTION, "Action"), (ADVENTURE, "Adventure")]);
        store(&f.catalog, 11, &[(COMEDY, "Comedy"), (ADVENTURE, "Adventure")]);
        let context = ViewingContext::Global;

        f.service.recompute(&context, &[10, 11]).await.unwrap();
        f.service.recompute(&context, &[11]).await.unwrap();

        let links = f.service.top_connections(&context, 50).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].source, "Adventure");
        assert_eq!(links[0].target, "Comedy");
    }

    #[tokio::test]
    async fn test_failed_recompute_keeps_previous_graph() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool(&dir);
        let catalog = Arc::new(SqliteCatalogRepository::new(Arc::clone(&pool)));
        let service = CooccurrenceService::new(
            catalog.clone(),
            Arc::new(SqliteContextRepository::new(Arc::clone(&pool))),
        );
        store(&catalog, 10, &[(ACTION, "Action"), (ADVENTURE, "Adventure")]);
        store(&catalog, 11, &[(ACTION, "Action"), (COMEDY, "Comedy")]);
        let context = ViewingContext::Global;
        service.recompute(&context, &[10]).await.unwrap();
        let before = service.last_updated(&context).await.unwrap();

        pool.get()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER fail_connections BEFORE INSERT ON genre_connections
                 BEGIN SELECT RAISE(ABORT, 'connection insert rejected'); END;",
            )
            .unwrap();

        let err = service.recompute(&context, &[10, 11]).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        let links = service.top_connections(&context, 50).await.unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, "Adventure");
        assert_eq!(service.last_updated(&context).await.unwrap(), before);
    }
}
