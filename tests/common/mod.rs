// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use wooper::db;
use wooper::db::models::{IndexEntry, Revision};
use wooper::{BuildRecord, Version};

/// 2024-11-01T00:00:00Z
pub const DAY_ONE: i64 = 1_730_419_200;

/// One day in seconds
pub const DAY: i64 = 86_400;

/// Create an empty index database.
///
/// Returns (TempDir, db_path) - keep the TempDir alive to prevent cleanup.
pub fn setup_test_db() -> (TempDir, String) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir
        .path()
        .join("index.db")
        .to_str()
        .unwrap()
        .to_string();

    db::init(&db_path).unwrap();
    (temp_dir, db_path)
}

/// Create an index where `r1` offers uv 0.5.0 and ruff 0.11.0 and, a day
/// later, `r2` offers uv 0.6.0 and ruff 0.11.10.
pub fn setup_uv_ruff_db() -> (TempDir, String) {
    let (temp_dir, db_path) = setup_test_db();
    let mut conn = db::open(&db_path).unwrap();

    db::transaction(&mut conn, |tx| {
        let r1 = Revision::new("r1", DAY_ONE).with_nar_hash("sha256-r1");
        let r2 = Revision::new("r2", DAY_ONE + DAY).with_nar_hash("sha256-r2");

        for (revision, package, version) in [
            (&r1, "uv", "0.5.0"),
            (&r1, "ruff", "0.11.0"),
            (&r2, "uv", "0.6.0"),
            (&r2, "ruff", "0.11.10"),
        ] {
            IndexEntry::new(revision.clone(), package, Version::parse(version)?).insert(tx)?;
        }
        Ok(())
    })
    .unwrap();

    (temp_dir, db_path)
}

/// Write build records as a JSON-lines export inside `dir`
pub fn write_export(dir: &TempDir, name: &str, records: &[BuildRecord]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for record in records {
        writeln!(file, "{}", serde_json::to_string(record).unwrap()).unwrap();
    }
    path
}
