// src/commands/index.rs
//! Index lifecycle and statistics commands

use anyhow::Result;
use serde_json::json;
use tracing::info;
use wooper::{PackageIndex, SqliteIndex};

/// Create the index database
pub fn cmd_init(db_path: &str) -> Result<()> {
    info!("Initializing index database at: {}", db_path);
    wooper::db::init(db_path)?;
    println!("Index initialized at: {}", db_path);
    Ok(())
}

/// Print index size and the most recent per-day revision counts
pub fn cmd_stats(db_path: &str, days: usize, json: bool) -> Result<()> {
    let index = SqliteIndex::open(db_path)?;
    let summary = index.summary()?;
    let per_day: Vec<(String, i64)> = index
        .revision_count_per_day()?
        .into_iter()
        .take(days)
        .collect();

    if json {
        let per_day: Vec<_> = per_day
            .iter()
            .map(|(day, count)| json!({ "day": day, "revisions": count }))
            .collect();
        let output = json!({ "summary": summary, "revisions_per_day": per_day });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Index: {}", db_path);
    println!("  Revisions: {}", summary.revisions);
    println!("  Packages:  {}", summary.packages);
    println!("  Entries:   {}", summary.entries);

    if !per_day.is_empty() {
        println!("Revisions per day:");
        for (day, count) in per_day {
            println!("  {}  {}", day, count);
        }
    }
    Ok(())
}
