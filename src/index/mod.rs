// src/index/mod.rs

//! The package index: which revision offers which package version
//!
//! The index is injected wherever it is needed through the [`PackageIndex`]
//! trait. [`SqliteIndex`] is the durable implementation used by the CLI;
//! [`MemoryIndex`] holds the same facts in process memory for tests and
//! one-off replays.
//!
//! Facts are append-only. Recording a triple that is already present is a
//! no-op, so concurrent or repeated writers never conflict.

mod memory;
mod sqlite;

pub use crate::db::models::{IndexEntry, Revision};
pub use memory::MemoryIndex;
pub use sqlite::SqliteIndex;

use crate::error::Result;
use crate::version::Version;
use serde::Serialize;

/// Ingestion position committed together with a batch of entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint<'a> {
    pub source: &'a str,
    pub cursor: &'a str,
}

/// Size of the index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub revisions: usize,
    pub packages: usize,
    pub entries: usize,
}

/// Storage interface for (revision, package, version) facts
pub trait PackageIndex {
    /// Atomically record a batch of entries and, optionally, the cursor the
    /// batch advances to. Returns how many entries were new.
    fn record_batch(&self, entries: &[IndexEntry], checkpoint: Option<Checkpoint<'_>>)
    -> Result<usize>;

    /// Every (revision, version) ever recorded for a package, newest
    /// revision first and, within a revision, highest version first
    fn versions_of(&self, package: &str) -> Result<Vec<(Revision, Version)>>;

    /// Revisions with a timestamp at or after `timestamp`, newest first
    fn revisions_since(&self, timestamp: i64) -> Result<Vec<Revision>>;

    /// Last cursor committed for a build source
    fn cursor(&self, source: &str) -> Result<Option<String>>;

    /// Number of revisions per UTC day (`YYYY-MM-DD`), most recent day first
    fn revision_count_per_day(&self) -> Result<Vec<(String, i64)>>;

    fn summary(&self) -> Result<IndexSummary>;

    /// Record that `revision` offers `package` at `version`
    ///
    /// Returns true if the fact was new.
    fn record_version(&self, revision: &Revision, package: &str, version: &Version) -> Result<bool> {
        let entry = IndexEntry::new(revision.clone(), package, version.clone());
        Ok(self.record_batch(std::slice::from_ref(&entry), None)? > 0)
    }
}
