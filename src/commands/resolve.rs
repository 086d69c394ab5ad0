// src/commands/resolve.rs
//! Resolution commands

use super::{revision_day, short_id};
use anyhow::Result;
use serde_json::json;
use tracing::info;
use wooper::resolver::Assignment;
use wooper::{PackageSpec, Resolver, SqliteIndex, WooperConfig, project};

/// Resolve requirements to the fewest revisions
///
/// Each argument may hold several `;`-separated requirements.
pub fn cmd_resolve(
    db_path: &str,
    config: &WooperConfig,
    packages: &[String],
    json: bool,
) -> Result<()> {
    let index = SqliteIndex::open(db_path)?;
    let resolver = Resolver::with_options(&index, config.resolver_options());
    let request = resolver.parse_request(packages.iter().flat_map(|arg| arg.split(';')))?;
    info!("Resolving {} package(s)", request.len());

    let solution = resolver.resolve(&request)?;
    let groups = project(&solution);

    if json {
        let output = json!({
            "revisions": groups,
            "strategy": solution.strategy,
            "certified_minimal": solution.is_certified_minimal(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for group in &groups {
        println!(
            "{}  {}  ({})",
            group.input,
            group.revision.id,
            revision_day(&group.revision)
        );
        for package in &group.packages {
            println!("    {} {}", package.name, package.version);
        }
    }
    if !solution.is_certified_minimal() {
        println!(
            "note: {} revisions found by greedy cover; a smaller set may exist",
            groups.len()
        );
    }
    Ok(())
}

/// Find the most recent revision offering one requirement
pub fn cmd_rev(db_path: &str, config: &WooperConfig, requirement: &str, json: bool) -> Result<()> {
    let spec = PackageSpec::parse(requirement)?;
    let index = SqliteIndex::open(db_path)?;
    let resolver = Resolver::with_options(&index, config.resolver_options());

    match resolver.resolve_one(&spec)? {
        Some(found) if json => println!("{}", serde_json::to_string_pretty(&found)?),
        Some(found) => print_assignment(&found),
        None if json => println!("null"),
        None => println!("No revision offers {}", spec),
    }
    Ok(())
}

fn print_assignment(found: &Assignment) {
    println!(
        "{} {}  {}  ({})",
        found.package,
        found.version,
        short_id(&found.revision.id),
        revision_day(&found.revision)
    );
    println!("  revision: {}", found.revision.id);
    if let Some(hash) = &found.revision.nar_hash {
        println!("  nar hash: {}", hash);
    }
}
