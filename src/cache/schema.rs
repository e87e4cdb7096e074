//! SQLite schema for the listing cache

use rusqlite::Connection;

/// Creates the cache tables if they do not exist.
///
/// `listings` holds one row per cached (username, kind) entry with its
/// load timestamp; `films` and `watchlist` hold that entry's items. Item
/// rows are only meaningful alongside their `listings` row, and both are
/// rewritten together inside one transaction.
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS listings (
            username   TEXT NOT NULL,
            kind       TEXT NOT NULL,
            loaded_at  TEXT NOT NULL,
            PRIMARY KEY (username, kind)
        );

        CREATE TABLE IF NOT EXISTS films (
            username TEXT NOT NULL,
            slug     TEXT NOT NULL,
            name     TEXT NOT NULL,
            year     INTEGER,
            rating   INTEGER,
            liked    INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (username, slug)
        );

        CREATE TABLE IF NOT EXISTS watchlist (
            username TEXT NOT NULL,
            slug     TEXT NOT NULL,
            PRIMARY KEY (username, slug)
        );
        ",
    )
}
