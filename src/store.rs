//! SQLite-backed cache of resolved titles.

use std::collections::BTreeSet;

use camino::Utf8Path;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::{CacheRecord, Category};
use crate::error::EpgError;

/// Persistent mapping of (name, category) to a resolved record.
pub struct CacheStore {
    conn: Connection,
}

impl CacheStore {
    /// Open the cache file, creating it and its table if needed.
    pub fn open(path: &Utf8Path) -> Result<Self, EpgError> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            std::fs::create_dir_all(parent.as_std_path())
                .map_err(|err| EpgError::Filesystem(err.to_string()))?;
        }
        let conn = Connection::open(path.as_std_path())?;
        Self::initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory cache, used by tests.
    pub fn in_memory() -> Result<Self, EpgError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), EpgError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache (
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                artwork TEXT,
                origin_name TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (name, category)
            );

            CREATE INDEX IF NOT EXISTS idx_cache_category ON cache(category);
            "#,
        )?;
        Ok(())
    }

    /// Upsert a record; the stored timestamp is always the time of this call.
    pub fn put(
        &self,
        name: &str,
        category: Category,
        record: &CacheRecord,
    ) -> Result<CacheRecord, EpgError> {
        let updated_at = Utc::now();
        self.conn.execute(
            "INSERT OR REPLACE INTO cache
                (name, category, title, description, artwork, origin_name, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                name,
                category.as_str(),
                record.title,
                record.description,
                record.artwork,
                record.origin_name,
                updated_at.to_rfc3339(),
            ],
        )?;
        Ok(CacheRecord {
            updated_at,
            ..record.clone()
        })
    }

    pub fn get(&self, name: &str, category: Category) -> Result<Option<CacheRecord>, EpgError> {
        let record = self
            .conn
            .query_row(
                "SELECT title, description, artwork, origin_name, updated_at
                 FROM cache WHERE name = ?1 AND category = ?2",
                params![name, category.as_str()],
                row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Remove one record. Returns whether anything was deleted.
    pub fn delete(&self, name: &str, category: Category) -> Result<bool, EpgError> {
        let affected = self.conn.execute(
            "DELETE FROM cache WHERE name = ?1 AND category = ?2",
            params![name, category.as_str()],
        )?;
        Ok(affected > 0)
    }

    pub fn list(&self, category: Category) -> Result<BTreeSet<String>, EpgError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM cache WHERE category = ?1")?;
        let rows = stmt.query_map(params![category.as_str()], |row| row.get::<_, String>(0))?;

        let mut names = BTreeSet::new();
        for row in rows {
            names.insert(row?);
        }
        Ok(names)
    }

    /// Drop every record in every category. Returns the number removed.
    pub fn clear(&self) -> Result<usize, EpgError> {
        let affected = self.conn.execute("DELETE FROM cache", [])?;
        Ok(affected)
    }

    pub fn count(&self) -> Result<usize, EpgError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<CacheRecord> {
    let updated_at_str: String = row.get(4)?;
    let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(err))
        })?;

    Ok(CacheRecord {
        title: row.get(0)?,
        description: row.get(1)?,
        artwork: row.get(2)?,
        origin_name: row.get(3)?,
        updated_at,
    })
}
