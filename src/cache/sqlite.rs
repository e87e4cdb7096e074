//! SQLite cache store implementation

use crate::cache::schema::initialize_schema;
use crate::cache::traits::{CacheStore, StoreError, StoreResult};
use crate::cache::{CacheEntry, CacheKey};
use crate::listing::{Film, FilmMap, Listing, ResourceKind, SlugSet};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite-backed cache store
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Opens (or creates) the cache database at the given path.
    ///
    /// Parent directories are created as needed.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory cache, for tests and throwaway sessions
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl CacheStore for SqliteCache {
    fn lookup(&self, key: &CacheKey) -> StoreResult<Option<CacheEntry>> {
        let loaded_at: Option<String> = self
            .conn
            .query_row(
                "SELECT loaded_at FROM listings WHERE username = ?1 AND kind = ?2",
                params![key.username, key.kind.to_db_string()],
                |row| row.get(0),
            )
            .optional()?;

        let loaded_at = match loaded_at {
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map_err(|e| StoreError::Corrupt {
                    key: describe_key(key),
                    reason: format!("bad timestamp {:?}: {}", raw, e),
                })?
                .with_timezone(&Utc),
            None => return Ok(None),
        };

        let listing = match key.kind {
            ResourceKind::Films => {
                let mut stmt = self.conn.prepare(
                    "SELECT slug, name, year, rating, liked FROM films WHERE username = ?1",
                )?;
                let rows = stmt.query_map(params![key.username], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        Film {
                            name: row.get(1)?,
                            year: row.get(2)?,
                            rating: row.get(3)?,
                            liked: row.get::<_, i64>(4)? != 0,
                        },
                    ))
                })?;

                let mut films = FilmMap::new();
                for row in rows {
                    let (slug, film) = row?;
                    films.insert(slug, film);
                }
                Listing::Films(films)
            }
            ResourceKind::Watchlist => {
                let mut stmt = self
                    .conn
                    .prepare("SELECT slug FROM watchlist WHERE username = ?1")?;
                let rows = stmt.query_map(params![key.username], |row| row.get::<_, String>(0))?;

                let mut slugs = SlugSet::new();
                for row in rows {
                    slugs.insert(row?);
                }
                Listing::Watchlist(slugs)
            }
        };

        Ok(Some(CacheEntry { loaded_at, listing }))
    }

    fn store(&mut self, key: &CacheKey, entry: &CacheEntry) -> StoreResult<()> {
        debug_assert_eq!(key.kind, entry.listing.kind());

        // One transaction per entry: delete-then-insert so readers never
        // see a partial entry
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO listings (username, kind, loaded_at) VALUES (?1, ?2, ?3)
             ON CONFLICT (username, kind) DO UPDATE SET loaded_at = excluded.loaded_at",
            params![
                key.username,
                key.kind.to_db_string(),
                entry.loaded_at.to_rfc3339()
            ],
        )?;

        match &entry.listing {
            Listing::Films(films) => {
                tx.execute("DELETE FROM films WHERE username = ?1", params![key.username])?;
                let mut stmt = tx.prepare(
                    "INSERT INTO films (username, slug, name, year, rating, liked)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;
                for (slug, film) in films {
                    stmt.execute(params![
                        key.username,
                        slug,
                        film.name,
                        film.year,
                        film.rating,
                        film.liked as i64
                    ])?;
                }
            }
            Listing::Watchlist(slugs) => {
                tx.execute(
                    "DELETE FROM watchlist WHERE username = ?1",
                    params![key.username],
                )?;
                let mut stmt =
                    tx.prepare("INSERT INTO watchlist (username, slug) VALUES (?1, ?2)")?;
                for slug in slugs {
                    stmt.execute(params![key.username, slug])?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }
}

fn describe_key(key: &CacheKey) -> String {
    format!("{}/{}", key.username, key.kind.to_db_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_films() -> Listing {
        Listing::Films(FilmMap::from([
            (
                "the-godfather".to_string(),
                Film {
                    name: "The Godfather".to_string(),
                    year: Some(1972),
                    rating: Some(9),
                    liked: true,
                },
            ),
            (
                "jaws".to_string(),
                Film {
                    name: "Jaws".to_string(),
                    year: None,
                    rating: None,
                    liked: false,
                },
            ),
        ]))
    }

    #[test]
    fn test_lookup_absent() {
        let cache = SqliteCache::open_in_memory().unwrap();
        let key = CacheKey::new("jane", ResourceKind::Films);
        assert!(cache.lookup(&key).unwrap().is_none());
    }

    #[test]
    fn test_store_lookup_roundtrip_films() {
        let mut cache = SqliteCache::open_in_memory().unwrap();
        let key = CacheKey::new("jane", ResourceKind::Films);
        let entry = CacheEntry::new(Utc::now(), sample_films());

        cache.store(&key, &entry).unwrap();
        let loaded = cache.lookup(&key).unwrap().unwrap();

        assert_eq!(loaded.listing, entry.listing);
        // RFC 3339 keeps sub-second precision, so timestamps survive intact
        assert_eq!(loaded.loaded_at, entry.loaded_at);
    }

    #[test]
    fn test_store_lookup_roundtrip_watchlist() {
        let mut cache = SqliteCache::open_in_memory().unwrap();
        let key = CacheKey::new("jane", ResourceKind::Watchlist);
        let entry = CacheEntry::new(
            Utc::now(),
            Listing::Watchlist(SlugSet::from(["aa".to_string(), "bb".to_string()])),
        );

        cache.store(&key, &entry).unwrap();
        let loaded = cache.lookup(&key).unwrap().unwrap();
        assert_eq!(loaded.listing, entry.listing);
    }

    #[test]
    fn test_store_overwrites_previous_entry() {
        let mut cache = SqliteCache::open_in_memory().unwrap();
        let key = CacheKey::new("jane", ResourceKind::Films);

        let first = CacheEntry::new(Utc::now() - Duration::days(10), sample_films());
        cache.store(&key, &first).unwrap();

        let second = CacheEntry::new(
            Utc::now(),
            Listing::Films(FilmMap::from([(
                "alien".to_string(),
                Film {
                    name: "Alien".to_string(),
                    year: Some(1979),
                    rating: Some(10),
                    liked: true,
                },
            )])),
        );
        cache.store(&key, &second).unwrap();

        let loaded = cache.lookup(&key).unwrap().unwrap();
        assert_eq!(loaded.listing, second.listing);
        assert_eq!(loaded.loaded_at, second.loaded_at);
        assert_eq!(loaded.listing.len(), 1);
    }

    #[test]
    fn test_films_and_watchlist_entries_coexist() {
        let mut cache = SqliteCache::open_in_memory().unwrap();
        let films_key = CacheKey::new("jane", ResourceKind::Films);
        let watch_key = CacheKey::new("jane", ResourceKind::Watchlist);

        cache
            .store(&films_key, &CacheEntry::new(Utc::now(), sample_films()))
            .unwrap();
        cache
            .store(
                &watch_key,
                &CacheEntry::new(
                    Utc::now(),
                    Listing::Watchlist(SlugSet::from(["cc".to_string()])),
                ),
            )
            .unwrap();

        assert_eq!(cache.lookup(&films_key).unwrap().unwrap().listing.len(), 2);
        assert_eq!(cache.lookup(&watch_key).unwrap().unwrap().listing.len(), 1);
    }

    #[test]
    fn test_empty_listing_roundtrips() {
        // A cached-empty watchlist must read back as present-but-empty,
        // not as a missing entry
        let mut cache = SqliteCache::open_in_memory().unwrap();
        let key = CacheKey::new("jane", ResourceKind::Watchlist);
        cache
            .store(
                &key,
                &CacheEntry::new(Utc::now(), Listing::empty(ResourceKind::Watchlist)),
            )
            .unwrap();

        let loaded = cache.lookup(&key).unwrap().unwrap();
        assert!(loaded.listing.is_empty());
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let key = CacheKey::new("jane", ResourceKind::Films);

        {
            let mut cache = SqliteCache::open(&path).unwrap();
            cache
                .store(&key, &CacheEntry::new(Utc::now(), sample_films()))
                .unwrap();
        }

        let cache = SqliteCache::open(&path).unwrap();
        let loaded = cache.lookup(&key).unwrap().unwrap();
        assert_eq!(loaded.listing.len(), 2);
    }
}
