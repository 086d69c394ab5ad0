// src/db/models/index_entry.rs

//! IndexEntry model - "this revision offers this package at this version"

use super::Revision;
use crate::error::Result;
use crate::version::Version;
use rusqlite::{Connection, Row, params};

/// A single (revision, package, version) fact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub revision: Revision,
    pub package: String,
    pub version: Version,
}

impl IndexEntry {
    pub fn new(revision: Revision, package: impl Into<String>, version: Version) -> Self {
        Self {
            revision,
            package: package.into(),
            version,
        }
    }

    /// Record this fact, inserting the revision first if it is new
    ///
    /// Returns true if the triple was not already present.
    pub fn insert(&self, conn: &Connection) -> Result<bool> {
        self.revision.insert_if_absent(conn)?;

        let changed = conn.execute(
            "INSERT INTO index_entries (revision_id, package, version) VALUES (?1, ?2, ?3)
             ON CONFLICT (revision_id, package, version) DO NOTHING",
            params![&self.revision.id, &self.package, self.version.to_string()],
        )?;

        Ok(changed > 0)
    }

    /// All facts for a package, newest revision first
    pub fn find_by_package(conn: &Connection, package: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT r.id, r.timestamp, r.nar_hash, e.package, e.version
             FROM index_entries e JOIN revisions r ON e.revision_id = r.id
             WHERE e.package = ?1
             ORDER BY r.timestamp DESC, r.id ASC",
        )?;

        let mut entries = stmt
            .query_map([package], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Versions order numerically, not as stored text
        entries.sort_by(|a, b| {
            a.revision
                .recency_cmp(&b.revision)
                .then_with(|| b.version.cmp(&a.version))
        });

        Ok(entries)
    }

    /// Distinct package names recorded in the index
    pub fn package_names(conn: &Connection) -> Result<Vec<String>> {
        let mut stmt =
            conn.prepare("SELECT DISTINCT package FROM index_entries ORDER BY package")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Total number of recorded facts
    pub fn count(conn: &Connection) -> Result<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM index_entries", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Convert a joined database row to an IndexEntry
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let version_text: String = row.get(4)?;
        let version = Version::parse(&version_text).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Self {
            revision: Revision {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                nar_hash: row.get(2)?,
            },
            package: row.get(3)?,
            version,
        })
    }
}
