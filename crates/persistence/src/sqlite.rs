//! SQLite save store: named save slots holding encoded snapshots.

use crate::snapshot::{decode, encode};
use crate::{PlayerSnapshot, Result};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS saves (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    note TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    snapshot BLOB
)";

/// Returns the default SQLite URL used for local saves.
pub fn default_sqlite_url() -> &'static str {
    "sqlite://./saves/main.db"
}

/// Opens (creating if missing) the database at `url` and applies the schema.
pub async fn init_db(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    // A single long-lived connection keeps `sqlite::memory:` databases alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    sqlx::query(SCHEMA).execute(&pool).await?;
    info!(url, "save database ready");
    Ok(pool)
}

/// Creates a named save slot if absent and returns its id.
pub async fn create_save(pool: &SqlitePool, name: &str, note: Option<&str>) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT OR IGNORE INTO saves (name, note, created_at, updated_at) VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(note)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;
    let (id,): (i64,) = sqlx::query_as("SELECT id FROM saves WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

/// Stores `snapshot` in the named slot, creating the slot if needed.
pub async fn write_snapshot(pool: &SqlitePool, name: &str, snapshot: &PlayerSnapshot) -> Result<()> {
    let blob = encode(snapshot)?;
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO saves (name, created_at, updated_at, snapshot) VALUES (?, ?, ?, ?)
         ON CONFLICT(name) DO UPDATE SET snapshot = excluded.snapshot, updated_at = excluded.updated_at",
    )
    .bind(name)
    .bind(&now)
    .bind(&now)
    .bind(blob)
    .execute(pool)
    .await?;
    Ok(())
}

/// Reads the snapshot of a slot; `None` for a missing or empty slot.
pub async fn read_snapshot(pool: &SqlitePool, name: &str) -> Result<Option<PlayerSnapshot>> {
    let row: Option<(Option<Vec<u8>>,)> =
        sqlx::query_as("SELECT snapshot FROM saves WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;
    match row {
        Some((Some(blob),)) => decode(&blob).map(Some),
        _ => Ok(None),
    }
}
