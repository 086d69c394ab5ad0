// src/ingest/source.rs

//! Build-result sources
//!
//! A source hands out build records one batch at a time. The cursor is
//! opaque to the ingester: it is whatever the source returned as
//! `next_cursor` last time, persisted alongside the batch it came with.
//! An exhausted source still returns a cursor, so records appended later
//! are picked up by the next run.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default number of records per batch for file-backed sources
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// One raw build outcome from the build farm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    #[serde(alias = "rev", alias = "revision")]
    pub revision_id: String,
    /// Unix timestamp of the revision
    pub timestamp: i64,
    #[serde(default, alias = "hash")]
    pub nar_hash: Option<String>,
    /// Attribute path or job name as reported by the source
    #[serde(alias = "package", alias = "job")]
    pub package_name: String,
    #[serde(alias = "version")]
    pub raw_version: String,
    #[serde(default = "default_succeeded", alias = "success")]
    pub build_succeeded: bool,
}

fn default_succeeded() -> bool {
    true
}

impl BuildRecord {
    pub fn new(
        revision_id: impl Into<String>,
        timestamp: i64,
        package_name: impl Into<String>,
        raw_version: impl Into<String>,
    ) -> Self {
        Self {
            revision_id: revision_id.into(),
            timestamp,
            nar_hash: None,
            package_name: package_name.into(),
            raw_version: raw_version.into(),
            build_succeeded: true,
        }
    }

    pub fn failed(mut self) -> Self {
        self.build_succeeded = false;
        self
    }

    pub fn with_nar_hash(mut self, nar_hash: impl Into<String>) -> Self {
        self.nar_hash = Some(nar_hash.into());
        self
    }
}

/// Records fetched in one call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildBatch {
    pub records: Vec<BuildRecord>,
    /// Records read but not decodable into a [`BuildRecord`]
    pub undecodable: usize,
    /// Where the next run should continue from, stored with this batch
    pub next_cursor: Option<String>,
    /// No further records are available at the moment
    pub exhausted: bool,
}

/// Where build records come from
pub trait BuildSource {
    /// Stable name under which this source's cursor is stored
    fn name(&self) -> &str;

    /// Fetch the batch starting at `cursor` (`None` = from the beginning)
    fn fetch(&self, cursor: Option<&str>) -> Result<BuildBatch>;
}

/// Scripted batches held in memory
///
/// The cursor is the batch number. A failure can be injected at a given
/// batch to exercise partial runs.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    batches: Vec<Vec<BuildRecord>>,
    fail_at: Option<usize>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, batches: Vec<Vec<BuildRecord>>) -> Self {
        Self {
            name: name.into(),
            batches,
            fail_at: None,
        }
    }

    /// Make the fetch of batch `batch` fail
    pub fn failing_at(mut self, batch: usize) -> Self {
        self.fail_at = Some(batch);
        self
    }

    /// Clear an injected failure
    pub fn recover(&mut self) {
        self.fail_at = None;
    }
}

impl BuildSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, cursor: Option<&str>) -> Result<BuildBatch> {
        let position = parse_offset(cursor)?;

        if self.fail_at == Some(position) {
            return Err(Error::SourceUnavailable(format!(
                "{}: batch {} unavailable",
                self.name, position
            )));
        }

        let records = self.batches.get(position).cloned().unwrap_or_default();
        let next = (position + 1).min(self.batches.len().max(position));
        Ok(BuildBatch {
            records,
            undecodable: 0,
            next_cursor: Some(next.to_string()),
            exhausted: next >= self.batches.len(),
        })
    }
}

/// A local export with one JSON record per line
///
/// The cursor is the number of lines already consumed.
#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    name: String,
    path: PathBuf,
    batch_size: usize,
}

impl JsonLinesSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = format!("file:{}", path.display());
        Self {
            name,
            path,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

impl BuildSource for JsonLinesSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, cursor: Option<&str>) -> Result<BuildBatch> {
        let offset = parse_offset(cursor)?;
        let file = File::open(&self.path).map_err(|e| {
            Error::SourceUnavailable(format!("Failed to open {}: {}", self.path.display(), e))
        })?;

        let mut lines = BufReader::new(file).lines().enumerate().skip(offset);
        let mut records = Vec::new();
        let mut undecodable = 0;
        let mut consumed = 0;
        while consumed < self.batch_size {
            let Some((line_no, line)) = lines.next() else {
                break;
            };
            let line = line.map_err(|e| {
                Error::SourceUnavailable(format!("Failed to read {}: {}", self.path.display(), e))
            })?;
            consumed += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<BuildRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        "{}:{}: skipping invalid build record: {}",
                        self.path.display(),
                        line_no + 1,
                        e
                    );
                    undecodable += 1;
                }
            }
        }

        let exhausted = consumed < self.batch_size || lines.next().is_none();
        Ok(BuildBatch {
            records,
            undecodable,
            next_cursor: Some((offset + consumed).to_string()),
            exhausted,
        })
    }
}

/// Numeric cursor used by the local sources
fn parse_offset(cursor: Option<&str>) -> Result<usize> {
    match cursor {
        None => Ok(0),
        Some(c) => c
            .parse()
            .map_err(|_| Error::ParseError(format!("Invalid cursor '{}': expected an offset", c))),
    }
}
