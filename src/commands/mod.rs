// src/commands/mod.rs
//! Command handlers for the wooper CLI

mod index;
mod ingest;
mod query;
mod resolve;

pub use index::{cmd_init, cmd_stats};
pub use ingest::{IngestArgs, cmd_ingest};
pub use query::{cmd_revisions, cmd_versions};
pub use resolve::{cmd_resolve, cmd_rev};

use wooper::Revision;

/// Render a revision's timestamp as a UTC day
pub(crate) fn revision_day(revision: &Revision) -> String {
    revision
        .day()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown date".to_string())
}

/// Shorten a revision id for tabular output
pub(crate) fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
