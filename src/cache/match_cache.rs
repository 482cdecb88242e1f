use anyhow::{Context, Result};
use log::debug;

use crate::database::{self, DbPool};
use crate::domain::MatchRecord;

/// Durable match cache keyed by match id, backed by the `matches` table.
///
/// Entries are immutable once written: a put for an id that already holds a
/// row is a no-op, so concurrent writers for the same match id cannot
/// produce conflicting rows.
pub struct MatchCache {
    pool: DbPool,
}

impl MatchCache {
    /// Open (or create) the cache at the given SQLite path.
    pub fn open(path: &str) -> Result<Self> {
        let pool = database::create_pool(path)?;
        Self::with_pool(pool)
    }

    /// Wrap an existing pool, ensuring the schema is present.
    pub fn with_pool(pool: DbPool) -> Result<Self> {
        let conn = database::get_connection(&pool)?;
        database::setup::ensure_schema(&conn)?;
        Ok(Self { pool })
    }

    pub fn get(&self, match_id: i64) -> Result<Option<MatchRecord>> {
        let conn = database::get_connection(&self.pool)?;
        let Some(serialized) = database::matches::find_serialized(&conn, match_id)? else {
            return Ok(None);
        };

        let record = serde_json::from_str(&serialized)
            .with_context(|| format!("Failed to deserialize cached match {match_id}"))?;
        Ok(Some(record))
    }

    pub fn put(&self, record: &MatchRecord) -> Result<()> {
        let serialized = serde_json::to_string(record)
            .with_context(|| format!("Failed to serialize match {}", record.match_id))?;

        let conn = database::get_connection(&self.pool)?;
        let inserted = database::matches::insert_serialized(&conn, record.match_id, &serialized)?;
        if !inserted {
            debug!("Match {} already cached", record.match_id);
        }
        Ok(())
    }

    pub fn count(&self) -> Result<i64> {
        let conn = database::get_connection(&self.pool)?;
        database::matches::count_rows(&conn)
    }
}
