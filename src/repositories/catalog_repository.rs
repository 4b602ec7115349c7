// src/repositories/catalog_repository.rs
//
// Catalog persistence
//
// - Items and shared entities (genres, companies, people, characters) are
//   keyed by their external ID and upserted, never duplicated
// - Relation rows scoped to one item are replaced wholesale on every sync
// - One sync = one transaction; a failure leaves the previous state intact

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::Arc;

use crate::db::ConnectionPool;
use crate::domain::{
    CatalogItem, Character, CharacterCredit, Company, CompanyCredit, Genre, ItemStats, Person,
    RelatedEntry, StaffCredit, ThemeSong, VoiceActorAssignment,
};
use crate::error::AppResult;

pub trait CatalogRepository: Send + Sync {
    /// Upsert the item and replace all of its relations atomically
    fn sync_item(&self, item: &CatalogItem) -> AppResult<()>;
    /// Item with every relation loaded
    fn get_item(&self, id: i64) -> AppResult<Option<CatalogItem>>;
    /// The subset of `ids` present in the store, in input order
    fn existing_ids(&self, ids: &[i64]) -> AppResult<Vec<i64>>;
    /// Genre IDs of each stored item among `ids`, in input order
    fn genre_sets(&self, ids: &[i64]) -> AppResult<Vec<Vec<i64>>>;
}

pub struct SqliteCatalogRepository {
    pool: Arc<ConnectionPool>,
}

fn to_sql_error<E>(e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::ToSqlConversionFailure(Box::new(e))
}

fn parse_timestamp(raw: Option<String>) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(to_sql_error)
    })
    .transpose()
}

fn parse_enum<T>(raw: String) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e,
        )))
    })
}

impl SqliteCatalogRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map the scalar columns of an `anime` row; relations are loaded separately
    fn row_to_item(row: &Row) -> Result<CatalogItem, rusqlite::Error> {
        Ok(CatalogItem {
            id: row.get("id")?,
            title: row.get("title")?,
            title_english: row.get("title_english")?,
            title_japanese: row.get("title_japanese")?,
            media_type: row.get("media_type")?,
            source: row.get("source")?,
            status: row.get("status")?,
            episodes: row.get("episodes")?,
            duration: row.get("duration")?,
            rating: row.get("rating")?,
            synopsis: row.get("synopsis")?,
            background: row.get("background")?,
            aired_string: row.get("aired_string")?,
            aired_from: parse_timestamp(row.get("aired_from")?)?,
            aired_to: parse_timestamp(row.get("aired_to")?)?,
            season: row.get("season")?,
            year: row.get("year")?,
            main_picture: row.get("main_picture")?,
            stats: ItemStats {
                score: row.get("score")?,
                scored_by: row.get("scored_by")?,
                rank: row.get("ranked")?,
                popularity: row.get("popularity")?,
                members: row.get("members")?,
                favorites: row.get("favorites")?,
            },
            genres: Vec::new(),
            companies: Vec::new(),
            themes: Vec::new(),
            related: Vec::new(),
            characters: Vec::new(),
            staff: Vec::new(),
        })
    }

    fn upsert_item_row(tx: &Transaction, item: &CatalogItem) -> rusqlite::Result<()> {
        tx.execute(
            "INSERT INTO anime (
                id, title, title_english, title_japanese, media_type, source, status,
                episodes, duration, rating, synopsis, background, aired_string,
                aired_from, aired_to, season, year, main_picture,
                score, scored_by, ranked, popularity, members, favorites
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                      ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                title_english = excluded.title_english,
                title_japanese = excluded.title_japanese,
                media_type = excluded.media_type,
                source = excluded.source,
                status = excluded.status,
                episodes = excluded.episodes,
                duration = excluded.duration,
                rating = excluded.rating,
                synopsis = excluded.synopsis,
                background = excluded.background,
                aired_string = excluded.aired_string,
                aired_from = excluded.aired_from,
                aired_to = excluded.aired_to,
                season = excluded.season,
                year = excluded.year,
                main_picture = excluded.main_picture,
                score = excluded.score,
                scored_by = excluded.scored_by,
                ranked = excluded.ranked,
                popularity = excluded.popularity,
                members = excluded.members,
                favorites = excluded.favorites",
            params![
                item.id,
                item.title,
                item.title_english,
                item.title_japanese,
                item.media_type,
                item.source,
                item.status,
                item.episodes,
                item.duration,
                item.rating,
                item.synopsis,
                item.background,
                item.aired_string,
                item.aired_from.map(|dt| dt.to_rfc3339()),
                item.aired_to.map(|dt| dt.to_rfc3339()),
                item.season,
                item.year,
                item.main_picture,
                item.stats.score,
                item.stats.scored_by,
                item.stats.rank,
                item.stats.popularity,
                item.stats.members,
                item.stats.favorites,
            ],
        )?;
        Ok(())
    }

    /// Genres are connected, never pruned: a genre dropped upstream keeps its link
    fn connect_genres(tx: &Transaction, item_id: i64, genres: &[Genre]) -> rusqlite::Result<()> {
        let mut upsert = tx.prepare_cached(
            "INSERT INTO genres (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        )?;
        let mut connect = tx.prepare_cached(
            "INSERT OR IGNORE INTO anime_genres (anime_id, genre_id) VALUES (?1, ?2)",
        )?;

        for genre in genres {
            upsert.execute(params![genre.id, genre.name])?;
            connect.execute(params![item_id, genre.id])?;
        }
        Ok(())
    }

    fn clear_relations(tx: &Transaction, item_id: i64) -> rusqlite::Result<()> {
        // voice_actor_assignments go with anime_characters (ON DELETE CASCADE)
        for table in [
            "anime_companies",
            "anime_themes",
            "related_anime",
            "anime_characters",
            "anime_staff",
        ] {
            tx.execute(
                &format!("DELETE FROM {} WHERE anime_id = ?1", table),
                params![item_id],
            )?;
        }
        Ok(())
    }

    fn upsert_person(tx: &Transaction, person: &Person) -> rusqlite::Result<()> {
        tx.prepare_cached(
            "INSERT INTO people (id, name, image) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                image = excluded.image",
        )?
        .execute(params![person.id, person.name, person.image])?;
        Ok(())
    }

    fn insert_companies(
        tx: &Transaction,
        item_id: i64,
        companies: &[CompanyCredit],
    ) -> rusqlite::Result<()> {
        let mut upsert = tx.prepare_cached(
            "INSERT INTO companies (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        )?;
        let mut link = tx.prepare_cached(
            "INSERT OR IGNORE INTO anime_companies (anime_id, company_id, role) VALUES (?1, ?2, ?3)",
        )?;

        for credit in companies {
            upsert.execute(params![credit.company.id, credit.company.name])?;
            link.execute(params![item_id, credit.company.id, credit.role.to_string()])?;
        }
        Ok(())
    }

    fn insert_themes(tx: &Transaction, item_id: i64, themes: &[ThemeSong]) -> rusqlite::Result<()> {
        let mut insert = tx.prepare_cached(
            "INSERT OR IGNORE INTO anime_themes (anime_id, kind, position, text) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for theme in themes {
            insert.execute(params![item_id, theme.kind.to_string(), theme.position, theme.text])?;
        }
        Ok(())
    }

    fn insert_related(
        tx: &Transaction,
        item_id: i64,
        related: &[RelatedEntry],
    ) -> rusqlite::Result<()> {
        let mut insert = tx.prepare_cached(
            "INSERT OR IGNORE INTO related_anime (anime_id, related_id, relation_type, related_title)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for entry in related {
            insert.execute(params![
                item_id,
                entry.related_id,
                entry.relation_type,
                entry.related_title
            ])?;
        }
        Ok(())
    }

    fn insert_characters(
        tx: &Transaction,
        item_id: i64,
        characters: &[CharacterCredit],
    ) -> rusqlite::Result<()> {
        let mut upsert = tx.prepare_cached(
            "INSERT INTO characters (id, name, image) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                image = excluded.image",
        )?;
        let mut link = tx.prepare_cached(
            "INSERT OR IGNORE INTO anime_characters (anime_id, character_id, role, position)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        let mut assign = tx.prepare_cached(
            "INSERT OR IGNORE INTO voice_actor_assignments (anime_id, character_id, person_id, language)
             VALUES (?1, ?2, ?3, ?4)",
        )?;

        for (position, credit) in characters.iter().enumerate() {
            let character = &credit.character;
            upsert.execute(params![character.id, character.name, character.image])?;
            link.execute(params![item_id, character.id, credit.role, position as i64])?;

            for va in &credit.voice_actors {
                Self::upsert_person(tx, &va.person)?;
                assign.execute(params![item_id, character.id, va.person.id, va.language])?;
            }
        }
        Ok(())
    }

    fn insert_staff(tx: &Transaction, item_id: i64, staff: &[StaffCredit]) -> rusqlite::Result<()> {
        let mut link = tx.prepare_cached(
            "INSERT OR IGNORE INTO anime_staff (anime_id, person_id, role, position)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (position, credit) in staff.iter().enumerate() {
            Self::upsert_person(tx, &credit.person)?;
            link.execute(params![item_id, credit.person.id, credit.role, position as i64])?;
        }
        Ok(())
    }

    fn load_genres(conn: &Connection, item_id: i64) -> rusqlite::Result<Vec<Genre>> {
        let mut stmt = conn.prepare_cached(
            "SELECT g.id, g.name FROM anime_genres ag
             JOIN genres g ON g.id = ag.genre_id
             WHERE ag.anime_id = ?1
             ORDER BY g.id",
        )?;
        let rows = stmt.query_map(params![item_id], |row| {
            Ok(Genre {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        rows.collect()
    }

    fn load_companies(conn: &Connection, item_id: i64) -> rusqlite::Result<Vec<CompanyCredit>> {
        let mut stmt = conn.prepare_cached(
            "SELECT c.id, c.name, ac.role FROM anime_companies ac
             JOIN companies c ON c.id = ac.company_id
             WHERE ac.anime_id = ?1
             ORDER BY CASE ac.role WHEN 'Producer' THEN 0 WHEN 'Licensor' THEN 1 ELSE 2 END, c.name",
        )?;
        let rows = stmt.query_map(params![item_id], |row| {
            Ok(CompanyCredit {
                company: Company {
                    id: row.get(0)?,
                    name: row.get(1)?,
                },
                role: parse_enum(row.get(2)?)?,
            })
        })?;
        rows.collect()
    }

    fn load_themes(conn: &Connection, item_id: i64) -> rusqlite::Result<Vec<ThemeSong>> {
        let mut stmt = conn.prepare_cached(
            "SELECT kind, position, text FROM anime_themes
             WHERE anime_id = ?1
             ORDER BY CASE kind WHEN 'Opening' THEN 0 ELSE 1 END, position",
        )?;
        let rows = stmt.query_map(params![item_id], |row| {
            Ok(ThemeSong {
                kind: parse_enum(row.get(0)?)?,
                position: row.get(1)?,
                text: row.get(2)?,
            })
        })?;
        rows.collect()
    }

    fn load_related(conn: &Connection, item_id: i64) -> rusqlite::Result<Vec<RelatedEntry>> {
        let mut stmt = conn.prepare_cached(
            "SELECT relation_type, related_id, related_title FROM related_anime
             WHERE anime_id = ?1
             ORDER BY relation_type, related_id",
        )?;
        let rows = stmt.query_map(params![item_id], |row| {
            Ok(RelatedEntry {
                relation_type: row.get(0)?,
                related_id: row.get(1)?,
                related_title: row.get(2)?,
            })
        })?;
        rows.collect()
    }

    fn load_characters(conn: &Connection, item_id: i64) -> rusqlite::Result<Vec<CharacterCredit>> {
        let mut stmt = conn.prepare_cached(
            "SELECT c.id, c.name, c.image, ac.role FROM anime_characters ac
             JOIN characters c ON c.id = ac.character_id
             WHERE ac.anime_id = ?1
             ORDER BY ac.position",
        )?;
        let mut credits: Vec<CharacterCredit> = stmt
            .query_map(params![item_id], |row| {
                Ok(CharacterCredit {
                    character: Character {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        image: row.get(2)?,
                    },
                    role: row.get(3)?,
                    voice_actors: Vec::new(),
                })
            })?
            .collect::<Result<_, _>>()?;

        let mut voices = conn.prepare_cached(
            "SELECT p.id, p.name, p.image, va.language FROM voice_actor_assignments va
             JOIN people p ON p.id = va.person_id
             WHERE va.anime_id = ?1 AND va.character_id = ?2
             ORDER BY va.language, p.name",
        )?;
        for credit in &mut credits {
            credit.voice_actors = voices
                .query_map(params![item_id, credit.character.id], |row| {
                    Ok(VoiceActorAssignment {
                        person: Person {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            image: row.get(2)?,
                        },
                        language: row.get(3)?,
                    })
                })?
                .collect::<Result<_, _>>()?;
        }

        Ok(credits)
    }

    fn load_staff(conn: &Connection, item_id: i64) -> rusqlite::Result<Vec<StaffCredit>> {
        let mut stmt = conn.prepare_cached(
            "SELECT p.id, p.name, p.image, s.role FROM anime_staff s
             JOIN people p ON p.id = s.person_id
             WHERE s.anime_id = ?1
             ORDER BY s.position",
        )?;
        let rows = stmt.query_map(params![item_id], |row| {
            Ok(StaffCredit {
                person: Person {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    image: row.get(2)?,
                },
                role: row.get(3)?,
            })
        })?;
        rows.collect()
    }
}

impl CatalogRepository for SqliteCatalogRepository {
    fn sync_item(&self, item: &CatalogItem) -> AppResult<()> {
        let mut conn = self.pool.get()?;
        // Dropping `tx` without commit rolls everything back
        let tx = conn.transaction()?;

        Self::upsert_item_row(&tx, item)?;
        Self::connect_genres(&tx, item.id, &item.genres)?;
        Self::clear_relations(&tx, item.id)?;
        Self::insert_companies(&tx, item.id, &item.companies)?;
        Self::insert_themes(&tx, item.id, &item.themes)?;
        Self::insert_related(&tx, item.id, &item.related)?;
        Self::insert_characters(&tx, item.id, &item.characters)?;
        Self::insert_staff(&tx, item.id, &item.staff)?;

        tx.commit()?;

        log::debug!(
            "Synced item {} ({} genres, {} characters, {} staff)",
            item.id,
            item.genres.len(),
            item.characters.len(),
            item.staff.len()
        );
        Ok(())
    }

    fn get_item(&self, id: i64) -> AppResult<Option<CatalogItem>> {
        let conn = self.pool.get()?;

        let item = conn
            .query_row("SELECT * FROM anime WHERE id = ?1", params![id], Self::row_to_item)
            .optional()?;

        let Some(mut item) = item else {
            return Ok(None);
        };

        item.genres = Self::load_genres(&conn, id)?;
        item.companies = Self::load_companies(&conn, id)?;
        item.themes = Self::load_themes(&conn, id)?;
        item.related = Self::load_related(&conn, id)?;
        item.characters = Self::load_characters(&conn, id)?;
        item.staff = Self::load_staff(&conn, id)?;

        Ok(Some(item))
    }

    fn existing_ids(&self, ids: &[i64]) -> AppResult<Vec<i64>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare_cached("SELECT EXISTS(SELECT 1 FROM anime WHERE id = ?1)")?;

        let mut existing = Vec::with_capacity(ids.len());
        for &id in ids {
            let found: bool = stmt.query_row(params![id], |row| row.get(0))?;
            if found {
                existing.push(id);
            }
        }
        Ok(existing)
    }

    fn genre_sets(&self, ids: &[i64]) -> AppResult<Vec<Vec<i64>>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare_cached(
            "SELECT genre_id FROM anime_genres WHERE anime_id = ?1 ORDER BY genre_id",
        )?;

        let mut sets = Vec::with_capacity(ids.len());
        for &id in ids {
            let genres: Vec<i64> = stmt
                .query_map(params![id], |row| row.get(0))?
                .collect::<Result<_, _>>()?;
            sets.push(genres);
        }
        Ok(sets)
    }
}
