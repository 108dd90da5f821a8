//! SQLite-based state storage.
//!
//! Provides persistent storage for:
//! - Key-value application state (streak anchor, consistency score)
//! - Relapse history
//! - Journal entries

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::journal::{JournalEntry, Mood};

use super::data_dir;
use super::state::StateStore;

/// A logged relapse and the streak it ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelapseRecord {
    pub id: i64,
    pub occurred_at: DateTime<Utc>,
    /// Length of the streak that this relapse ended.
    pub streak_seconds: i64,
    pub note: Option<String>,
}

/// SQLite database for tracker state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/soberstreak.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("soberstreak.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS relapses (
                    id             INTEGER PRIMARY KEY AUTOINCREMENT,
                    occurred_at    TEXT NOT NULL,
                    streak_seconds INTEGER NOT NULL,
                    note           TEXT
                );

                CREATE TABLE IF NOT EXISTS journal (
                    id         TEXT PRIMARY KEY,
                    created_at TEXT NOT NULL,
                    mood       INTEGER,
                    body       TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_relapses_occurred_at ON relapses(occurred_at);
                CREATE INDEX IF NOT EXISTS idx_journal_created_at ON journal(created_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Log a relapse.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_relapse(
        &self,
        occurred_at: DateTime<Utc>,
        streak_seconds: i64,
        note: Option<&str>,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO relapses (occurred_at, streak_seconds, note) VALUES (?1, ?2, ?3)",
            params![occurred_at.to_rfc3339(), streak_seconds, note],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Relapse history, newest first.
    pub fn relapses(&self) -> Result<Vec<RelapseRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, occurred_at, streak_seconds, note
             FROM relapses
             ORDER BY occurred_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, occurred_at, streak_seconds, note) = row?;
            let Some(occurred_at) = parse_timestamp(&occurred_at) else {
                tracing::warn!(id, "skipping relapse with unreadable timestamp");
                continue;
            };
            out.push(RelapseRecord {
                id,
                occurred_at,
                streak_seconds,
                note,
            });
        }
        Ok(out)
    }

    /// Longest streak ended by a logged relapse.
    pub fn longest_logged_streak(&self) -> Result<Option<i64>, rusqlite::Error> {
        self.conn
            .query_row("SELECT MAX(streak_seconds) FROM relapses", [], |row| {
                row.get::<_, Option<i64>>(0)
            })
    }

    pub fn add_journal_entry(&self, entry: &JournalEntry) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO journal (id, created_at, mood, body) VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.id.to_string(),
                entry.created_at.to_rfc3339(),
                entry.mood.map(|m| m.value()),
                entry.text,
            ],
        )?;
        Ok(())
    }

    /// Journal entries, newest first.
    pub fn journal_entries(&self, limit: usize) -> Result<Vec<JournalEntry>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, created_at, mood, body
             FROM journal
             ORDER BY created_at DESC
             LIMIT ?1",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<u8>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, created_at, mood, text) = row?;
            let (Ok(id), Some(created_at)) = (Uuid::parse_str(&id), parse_timestamp(&created_at))
            else {
                tracing::warn!(%id, "skipping unreadable journal entry");
                continue;
            };
            out.push(JournalEntry {
                id,
                created_at,
                mood: mood.and_then(|m| Mood::new(m).ok()),
                text,
            });
        }
        Ok(out)
    }
}

impl StateStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.kv_get(key)?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        Ok(self.kv_set(key, value)?)
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "again").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "again");
    }

    #[test]
    fn relapses_newest_first() {
        let db = Database::open_memory().unwrap();
        let t0: DateTime<Utc> = "2024-01-01T10:00:00Z".parse().unwrap();
        db.record_relapse(t0, 3_600, None).unwrap();
        db.record_relapse(t0 + Duration::days(9), 777_600, Some("party"))
            .unwrap();

        let history = db.relapses().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].note.as_deref(), Some("party"));
        assert_eq!(history[1].occurred_at, t0);
        assert_eq!(db.longest_logged_streak().unwrap(), Some(777_600));
    }

    #[test]
    fn longest_streak_empty() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.longest_logged_streak().unwrap(), None);
    }

    #[test]
    fn journal_round_trip() {
        let db = Database::open_memory().unwrap();
        let t0: DateTime<Utc> = "2024-01-01T10:00:00Z".parse().unwrap();
        let first = JournalEntry::new("craving after work", Some(2), t0).unwrap();
        let second = JournalEntry::new("good walk", None, t0 + Duration::hours(5)).unwrap();
        db.add_journal_entry(&first).unwrap();
        db.add_journal_entry(&second).unwrap();

        let entries = db.journal_entries(10).unwrap();
        assert_eq!(entries, vec![second.clone(), first]);
        assert_eq!(db.journal_entries(1).unwrap(), vec![second]);
    }

    #[test]
    fn open_at_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        {
            let mut db = Database::open_at(&path).unwrap();
            db.set("consistencyScore", "61").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.get("consistencyScore").unwrap().as_deref(), Some("61"));
    }
}
