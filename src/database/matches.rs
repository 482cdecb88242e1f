use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::connection::DbConn;

pub fn find_serialized(conn: &DbConn, match_id: i64) -> Result<Option<String>> {
    let sql = "SELECT serialized FROM matches WHERE id = ?1";

    conn.query_row(sql, params![match_id], |row| row.get(0))
        .optional()
        .context("Failed to query match by id")
}

/// Insert a serialized match record. A row that already exists is left
/// untouched; the primary key on `id` makes racing inserts for the same
/// match id collapse into one row. Returns whether a new row was written.
pub fn insert_serialized(conn: &DbConn, match_id: i64, serialized: &str) -> Result<bool> {
    let sql = "INSERT OR IGNORE INTO matches (id, serialized, cached_at) VALUES (?1, ?2, ?3)";
    let cached_at = Utc::now().naive_utc();

    let inserted = conn
        .execute(sql, params![match_id, serialized, cached_at])
        .context("Failed to insert match row")?;
    Ok(inserted > 0)
}

pub fn count_rows(conn: &DbConn) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM matches", [], |row| row.get(0))
        .context("Failed to count match rows")
}
