// src/index/memory.rs

//! In-memory package index

use super::{Checkpoint, IndexEntry, IndexSummary, PackageIndex, Revision};
use crate::error::Result;
use crate::version::Version;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Default)]
struct State {
    revisions: HashMap<String, Revision>,
    /// package -> (revision id, version) in insertion order
    facts: HashMap<String, Vec<(String, Version)>>,
    /// (revision id, package, rendered version), mirroring the SQL uniqueness rule
    seen: HashSet<(String, String, String)>,
    cursors: HashMap<String, String>,
}

/// Package index held in process memory
///
/// A whole batch is applied under one write lock, so readers never observe
/// part of a batch.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    state: RwLock<State>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from (revision, package, version) triples
    pub fn from_entries(entries: impl IntoIterator<Item = IndexEntry>) -> Self {
        let index = Self::new();
        {
            let mut state = index.state.write();
            for entry in entries {
                insert(&mut state, &entry);
            }
        }
        index
    }
}

fn insert(state: &mut State, entry: &IndexEntry) -> bool {
    let revision_id = entry.revision.id.clone();
    state
        .revisions
        .entry(revision_id.clone())
        .or_insert_with(|| entry.revision.clone());

    let key = (
        revision_id.clone(),
        entry.package.clone(),
        entry.version.to_string(),
    );
    if !state.seen.insert(key) {
        return false;
    }

    state
        .facts
        .entry(entry.package.clone())
        .or_default()
        .push((revision_id, entry.version.clone()));
    true
}

impl PackageIndex for MemoryIndex {
    fn record_batch(
        &self,
        entries: &[IndexEntry],
        checkpoint: Option<Checkpoint<'_>>,
    ) -> Result<usize> {
        let mut state = self.state.write();

        let inserted = entries
            .iter()
            .filter(|entry| insert(&mut state, entry))
            .count();

        if let Some(checkpoint) = checkpoint {
            state
                .cursors
                .insert(checkpoint.source.to_string(), checkpoint.cursor.to_string());
        }

        Ok(inserted)
    }

    fn versions_of(&self, package: &str) -> Result<Vec<(Revision, Version)>> {
        let state = self.state.read();
        let Some(facts) = state.facts.get(package) else {
            return Ok(Vec::new());
        };

        let mut versions: Vec<(Revision, Version)> = facts
            .iter()
            .filter_map(|(revision_id, version)| {
                state
                    .revisions
                    .get(revision_id)
                    .map(|revision| (revision.clone(), version.clone()))
            })
            .collect();

        versions.sort_by(|(ra, va), (rb, vb)| ra.recency_cmp(rb).then_with(|| vb.cmp(va)));
        Ok(versions)
    }

    fn revisions_since(&self, timestamp: i64) -> Result<Vec<Revision>> {
        let state = self.state.read();
        let mut revisions: Vec<Revision> = state
            .revisions
            .values()
            .filter(|revision| revision.timestamp >= timestamp)
            .cloned()
            .collect();
        revisions.sort_by(Revision::recency_cmp);
        Ok(revisions)
    }

    fn cursor(&self, source: &str) -> Result<Option<String>> {
        Ok(self.state.read().cursors.get(source).cloned())
    }

    fn revision_count_per_day(&self) -> Result<Vec<(String, i64)>> {
        let state = self.state.read();
        let mut per_day: BTreeMap<String, i64> = BTreeMap::new();
        for revision in state.revisions.values() {
            if let Some(day) = revision.day() {
                *per_day.entry(day.format("%Y-%m-%d").to_string()).or_insert(0) += 1;
            }
        }
        Ok(per_day.into_iter().rev().collect())
    }

    fn summary(&self) -> Result<IndexSummary> {
        let state = self.state.read();
        Ok(IndexSummary {
            revisions: state.revisions.len(),
            packages: state.facts.len(),
            entries: state.seen.len(),
        })
    }
}
