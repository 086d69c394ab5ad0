// src/ingest/mod.rs

//! Ingestion of build results into the package index
//!
//! Raw build records are pulled from a [`BuildSource`] batch by batch,
//! normalized into index entries, and committed together with the cursor of
//! the next batch. A run that fails part way leaves every earlier batch and
//! its cursor committed, so [`Ingester::resume`] continues where it stopped.
//! Re-reading records that are already indexed is harmless. Records a source
//! cannot decode are skipped like any other unusable record.

mod http;
mod source;

pub use http::{DEFAULT_RETRIES, HttpFeedSource};
pub use source::{
    BuildBatch, BuildRecord, BuildSource, DEFAULT_BATCH_SIZE, JsonLinesSource, MemorySource,
};

use crate::error::Result;
use crate::index::{Checkpoint, IndexEntry, PackageIndex, Revision};
use crate::version::Version;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Nix systems that appear as attribute or job name components
const SYSTEMS: &[&str] = &[
    "x86_64-linux",
    "aarch64-linux",
    "i686-linux",
    "armv7l-linux",
    "riscv64-linux",
    "x86_64-darwin",
    "aarch64-darwin",
];

/// Attribute tails that name derivation internals rather than packages
const NON_PACKAGE_TAILS: &[&str] = &[
    "tests",
    "passthru",
    "meta",
    "src",
    "override",
    "overrideAttrs",
    "overrideDerivation",
    "outPath",
    "drvPath",
];

/// Flake output roots followed by a system component
const FLAKE_ROOTS: &[&str] = &["legacyPackages", "packages"];

/// Reduce a raw attribute path or hydra job name to a package name
///
/// `legacyPackages.x86_64-linux.ruff` and `ruff.x86_64-linux` both become
/// `ruff`. Returns `None` for names that do not denote a package.
pub fn normalize_package_name(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
        return None;
    }

    let mut segments: Vec<&str> = raw.split('.').collect();

    if segments.len() > 2 && FLAKE_ROOTS.contains(&segments[0]) {
        segments.drain(..2);
    }
    if segments.len() > 1 && segments.last().is_some_and(|s| SYSTEMS.contains(s)) {
        segments.pop();
    }

    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }
    if segments
        .last()
        .is_some_and(|tail| NON_PACKAGE_TAILS.contains(tail))
    {
        return None;
    }

    Some(segments.join("."))
}

/// Parse a raw version string, tolerating surrounding whitespace and a
/// leading `v`
pub fn normalize_version(raw: &str) -> Option<Version> {
    Version::parse(raw.trim()).ok()
}

/// Turn a raw record into an index entry, or `None` if it must be skipped
pub fn normalize(record: &BuildRecord) -> Option<IndexEntry> {
    if !record.build_succeeded {
        debug!(
            "Skipping failed build of {} at {}",
            record.package_name, record.revision_id
        );
        return None;
    }
    if record.revision_id.trim().is_empty() {
        debug!("Skipping record without revision: {}", record.package_name);
        return None;
    }

    let Some(package) = normalize_package_name(&record.package_name) else {
        debug!("Skipping non-package output '{}'", record.package_name);
        return None;
    };
    let Some(version) = normalize_version(&record.raw_version) else {
        debug!(
            "Skipping {}: unparseable version '{}'",
            package, record.raw_version
        );
        return None;
    };

    let mut revision = Revision::new(record.revision_id.trim(), record.timestamp);
    if let Some(hash) = &record.nar_hash {
        revision = revision.with_nar_hash(hash.clone());
    }
    Some(IndexEntry::new(revision, package, version))
}

/// Outcome of an ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Records read from the source
    pub records: usize,
    /// Entries that were not already in the index
    pub new_entries: usize,
    /// Records dropped by normalization
    pub skipped: usize,
    /// Batches committed
    pub batches: usize,
    /// Cursor stored with the last committed batch
    pub cursor: Option<String>,
    /// Whether the source reported no further batches
    pub exhausted: bool,
}

/// Drives a build source into a package index
pub struct Ingester<'a> {
    index: &'a dyn PackageIndex,
    max_batches: Option<usize>,
}

impl<'a> Ingester<'a> {
    pub fn new(index: &'a dyn PackageIndex) -> Self {
        Self {
            index,
            max_batches: None,
        }
    }

    /// Stop after `max_batches` committed batches
    pub fn with_max_batches(mut self, max_batches: usize) -> Self {
        self.max_batches = Some(max_batches);
        self
    }

    /// Ingest from the cursor last stored for this source
    pub fn resume(&self, source: &dyn BuildSource) -> Result<IngestReport> {
        let cursor = self.index.cursor(source.name())?;
        if let Some(cursor) = &cursor {
            info!("Resuming {} from cursor {}", source.name(), cursor);
        }
        self.ingest(source, cursor.as_deref())
    }

    /// Ingest batches from `source` starting at `cursor`
    ///
    /// Each batch is committed together with the cursor to continue from,
    /// so a failed run can be resumed without losing committed work.
    pub fn ingest(&self, source: &dyn BuildSource, cursor: Option<&str>) -> Result<IngestReport> {
        let name = source.name();
        let mut cursor = cursor.map(str::to_string);
        let mut report = IngestReport {
            cursor: cursor.clone(),
            ..IngestReport::default()
        };

        info!("Ingesting build results from {}", name);

        loop {
            if self.max_batches.is_some_and(|max| report.batches >= max) {
                info!("Batch limit reached for {}", name);
                break;
            }

            let batch = match source.fetch(cursor.as_deref()) {
                Ok(batch) => batch,
                Err(e) => {
                    if report.batches > 0 {
                        warn!(
                            "Ingestion from {} stopped after {} batch(es): {}",
                            name, report.batches, e
                        );
                    }
                    return Err(e);
                }
            };

            let entries: Vec<IndexEntry> = batch.records.iter().filter_map(normalize).collect();
            let read = batch.records.len() + batch.undecodable;
            let skipped = read - entries.len();

            let next_cursor = batch.next_cursor.or_else(|| cursor.clone());
            let checkpoint = next_cursor.as_deref().map(|c| Checkpoint {
                source: name,
                cursor: c,
            });
            let inserted = self.index.record_batch(&entries, checkpoint)?;

            report.records += read;
            report.new_entries += inserted;
            report.skipped += skipped;
            report.batches += 1;
            report.cursor = next_cursor.clone();

            debug!(
                "Batch {} from {}: {} records, {} new, {} skipped",
                report.batches,
                name,
                read,
                inserted,
                skipped
            );

            if batch.exhausted {
                report.exhausted = true;
                break;
            }
            if next_cursor == cursor {
                warn!("Source {} did not advance its cursor, stopping", name);
                break;
            }
            cursor = next_cursor;
        }

        info!(
            "Ingested {} new entries from {} ({} records, {} skipped, {} batches)",
            report.new_entries, name, report.records, report.skipped, report.batches
        );
        Ok(report)
    }
}
