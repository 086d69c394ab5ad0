// src/db/models/revision.rs

//! Revision model - one nixpkgs commit known to the index

use crate::error::Result;
use chrono::{DateTime, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use std::cmp::Ordering;

/// An immutable snapshot of the package set, identified by its commit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Revision {
    pub id: String,
    /// Seconds since the epoch, as reported by the build source
    pub timestamp: i64,
    pub nar_hash: Option<String>,
}

impl Revision {
    /// Create a new Revision
    pub fn new(id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            timestamp,
            nar_hash: None,
        }
    }

    pub fn with_nar_hash(mut self, nar_hash: impl Into<String>) -> Self {
        self.nar_hash = Some(nar_hash.into());
        self
    }

    /// Recency order: newest first, then smaller identifier first
    pub fn recency_cmp(&self, other: &Revision) -> Ordering {
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// UTC calendar day of the revision timestamp
    pub fn day(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp(self.timestamp, 0).map(|dt| dt.date_naive())
    }

    /// Insert this revision unless one with the same id already exists
    ///
    /// Returns true if a row was written. An existing row is never modified.
    pub fn insert_if_absent(&self, conn: &Connection) -> Result<bool> {
        let changed = conn.execute(
            "INSERT INTO revisions (id, timestamp, nar_hash) VALUES (?1, ?2, ?3)
             ON CONFLICT (id) DO NOTHING",
            params![&self.id, self.timestamp, &self.nar_hash],
        )?;
        Ok(changed > 0)
    }

    /// Find a revision by id
    pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT id, timestamp, nar_hash FROM revisions WHERE id = ?1")?;
        let revision = stmt.query_row([id], Self::from_row).optional()?;
        Ok(revision)
    }

    /// Revisions at or after a timestamp, newest first
    pub fn list_since(conn: &Connection, timestamp: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, nar_hash FROM revisions
             WHERE timestamp >= ?1
             ORDER BY timestamp DESC, id ASC",
        )?;

        let revisions = stmt
            .query_map([timestamp], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(revisions)
    }

    /// Number of revisions per UTC day, most recent day first
    pub fn count_per_day(conn: &Connection) -> Result<Vec<(String, i64)>> {
        let mut stmt = conn.prepare(
            "SELECT date(timestamp, 'unixepoch') AS day, COUNT(*)
             FROM revisions GROUP BY day ORDER BY day DESC",
        )?;

        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Convert a database row to a Revision
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            nar_hash: row.get(2)?,
        })
    }
}

impl PartialOrd for Revision {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Revision {
    /// Newest revisions sort first
    fn cmp(&self, other: &Self) -> Ordering {
        self.recency_cmp(other)
            .then_with(|| self.nar_hash.cmp(&other.nar_hash))
    }
}
