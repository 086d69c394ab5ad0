// src/lib.rs

//! Wooper: minimal historical nixpkgs revisions for pinned package versions
//!
//! Given package requirements such as `uv~=0.5.0;ruff`, wooper finds the
//! fewest nixpkgs revisions that together provide a matching version of
//! every package.
//!
//! # Architecture
//!
//! - Index: append-only (revision, package, version) facts in SQLite
//! - Ingestion: build-farm results pulled in resumable, idempotent batches
//! - Resolver: greedy revision cover with a local merge pass
//! - Projector: solution grouped per revision for renderers

pub mod config;
pub mod db;
mod error;
pub mod index;
pub mod ingest;
pub mod projector;
pub mod resolver;
pub mod version;

pub use config::WooperConfig;
pub use error::{Error, Result};
pub use index::{IndexEntry, MemoryIndex, PackageIndex, Revision, SqliteIndex};
pub use ingest::{BuildRecord, BuildSource, IngestReport, Ingester};
pub use projector::{RevisionGroup, project};
pub use resolver::{PackageSpec, Request, Resolver, ResolverOptions, Solution, Strategy};
pub use version::{Constraint, Version, best_match};
