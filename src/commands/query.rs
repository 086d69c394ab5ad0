// src/commands/query.rs
//! Index query commands

use super::{revision_day, short_id};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::json;
use std::collections::BTreeMap;
use wooper::{PackageIndex, Revision, SqliteIndex, Version};

/// List each version of a package with the newest revision offering it
pub fn cmd_versions(db_path: &str, package: &str, json: bool) -> Result<()> {
    let index = SqliteIndex::open(db_path)?;
    let offered = index.versions_of(package)?;

    // versions_of is newest first, so the first revision seen per version wins
    let mut versions: BTreeMap<Version, (Revision, usize)> = BTreeMap::new();
    for (revision, version) in offered {
        versions
            .entry(version)
            .and_modify(|(_, count)| *count += 1)
            .or_insert((revision, 1));
    }

    if json {
        let rows: Vec<_> = versions
            .iter()
            .rev()
            .map(|(version, (revision, count))| {
                json!({ "version": version, "latest_revision": revision, "revisions": count })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if versions.is_empty() {
        println!("No versions of {} in the index", package);
        return Ok(());
    }

    println!("{}:", package);
    for (version, (revision, count)) in versions.iter().rev() {
        println!(
            "  {:<16} {}  ({}, {} revision(s))",
            version.to_string(),
            short_id(&revision.id),
            revision_day(revision),
            count
        );
    }
    Ok(())
}

/// List revisions indexed since a UTC day
pub fn cmd_revisions(db_path: &str, since: &str, json: bool) -> Result<()> {
    let day = NaiveDate::parse_from_str(since, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}': expected YYYY-MM-DD", since))?;
    let timestamp = day
        .and_hms_opt(0, 0, 0)
        .context("Invalid start of day")?
        .and_utc()
        .timestamp();

    let index = SqliteIndex::open(db_path)?;
    let revisions = index.revisions_since(timestamp)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&revisions)?);
        return Ok(());
    }

    if revisions.is_empty() {
        println!("No revisions since {}", since);
        return Ok(());
    }

    println!("Revisions since {} ({}):", since, revisions.len());
    for revision in &revisions {
        println!("  {}  {}", revision_day(revision), revision.id);
    }
    Ok(())
}
