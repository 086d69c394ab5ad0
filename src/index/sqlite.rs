// src/index/sqlite.rs

//! SQLite-backed package index

use super::{Checkpoint, IndexEntry, IndexSummary, PackageIndex, Revision};
use crate::db::{self, models::IngestCursor};
use crate::error::Result;
use crate::version::Version;
use rusqlite::Connection;
use tracing::debug;

/// Durable index stored in a SQLite database
///
/// A `Connection` is not shared between threads; open one `SqliteIndex`
/// per thread against the same database file.
pub struct SqliteIndex {
    conn: Connection,
}

impl SqliteIndex {
    /// Open the index stored at `db_path`
    pub fn open(db_path: &str) -> Result<Self> {
        Ok(Self {
            conn: db::open(db_path)?,
        })
    }

    /// Create a throwaway index that lives only as long as this value
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: db::open_in_memory()?,
        })
    }
}

impl PackageIndex for SqliteIndex {
    fn record_batch(
        &self,
        entries: &[IndexEntry],
        checkpoint: Option<Checkpoint<'_>>,
    ) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;

        let mut inserted = 0;
        for entry in entries {
            if entry.insert(&tx)? {
                inserted += 1;
            }
        }

        if let Some(checkpoint) = checkpoint {
            IngestCursor::save(&tx, checkpoint.source, checkpoint.cursor)?;
        }

        tx.commit()?;
        debug!(
            "Committed batch: {} of {} entries new",
            inserted,
            entries.len()
        );
        Ok(inserted)
    }

    fn versions_of(&self, package: &str) -> Result<Vec<(Revision, Version)>> {
        let entries = IndexEntry::find_by_package(&self.conn, package)?;
        Ok(entries
            .into_iter()
            .map(|entry| (entry.revision, entry.version))
            .collect())
    }

    fn revisions_since(&self, timestamp: i64) -> Result<Vec<Revision>> {
        Revision::list_since(&self.conn, timestamp)
    }

    fn cursor(&self, source: &str) -> Result<Option<String>> {
        Ok(IngestCursor::find(&self.conn, source)?.map(|c| c.cursor))
    }

    fn revision_count_per_day(&self) -> Result<Vec<(String, i64)>> {
        Revision::count_per_day(&self.conn)
    }

    fn summary(&self) -> Result<IndexSummary> {
        let revisions: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM revisions", [], |row| row.get(0))?;
        Ok(IndexSummary {
            revisions: revisions as usize,
            packages: IndexEntry::package_names(&self.conn)?.len(),
            entries: IndexEntry::count(&self.conn)? as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_batch_with_checkpoint_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("index.db");
        let db_path = db_path.to_str().unwrap();
        db::init(db_path).unwrap();

        {
            let index = SqliteIndex::open(db_path).unwrap();
            let entries = vec![IndexEntry::new(
                Revision::new("r1", 1000),
                "uv",
                Version::parse("0.5.0").unwrap(),
            )];
            let checkpoint = Checkpoint {
                source: "hydra",
                cursor: "page=4",
            };
            assert_eq!(index.record_batch(&entries, Some(checkpoint)).unwrap(), 1);
        }

        let reopened = SqliteIndex::open(db_path).unwrap();
        assert_eq!(reopened.cursor("hydra").unwrap().as_deref(), Some("page=4"));
        assert_eq!(reopened.versions_of("uv").unwrap().len(), 1);
    }

    #[test]
    fn test_two_handles_see_each_others_commits() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("index.db");
        let db_path = db_path.to_str().unwrap();
        db::init(db_path).unwrap();

        let writer = SqliteIndex::open(db_path).unwrap();
        let reader = SqliteIndex::open(db_path).unwrap();

        writer
            .record_version(
                &Revision::new("r1", 1000),
                "ruff",
                &Version::parse("0.11.0").unwrap(),
            )
            .unwrap();

        assert_eq!(reader.versions_of("ruff").unwrap().len(), 1);
    }
}
