// src/cli/mod.rs
//! CLI definitions for wooper
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "wooper")]
#[command(author = "Wooper Contributors")]
#[command(version)]
#[command(about = "Find the fewest nixpkgs revisions providing pinned package versions", long_about = None)]
pub struct Cli {
    /// Path to the index database (overrides WOOPER_DB and the config file)
    #[arg(short, long, global = true)]
    pub db_path: Option<String>,

    /// Configuration file (default: $WOOPER_CONFIG if set)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new index database
    Init,

    /// Ingest build results into the index
    ///
    /// Reads either a paged JSON feed (--feed, or ingest.feed_url from the
    /// config) or a local JSON-lines export (--file). Runs resume from the
    /// cursor stored for the source unless --from-start is given.
    Ingest {
        /// Paged JSON build feed URL
        #[arg(long, conflicts_with = "file")]
        feed: Option<String>,

        /// JSON-lines export, one build record per line
        #[arg(long)]
        file: Option<PathBuf>,

        /// Name the source cursor is stored under
        #[arg(long)]
        name: Option<String>,

        /// Stop after this many batches
        #[arg(long)]
        max_batches: Option<usize>,

        /// Records per batch for --file
        #[arg(long, default_value = "1000")]
        batch_size: usize,

        /// Ignore the stored cursor and read the source from the beginning
        #[arg(long)]
        from_start: bool,
    },

    /// Resolve package requirements to the fewest revisions
    ///
    /// Each argument is a requirement such as `ruff` or `uv~=0.5.0`; an
    /// argument may also hold several requirements separated by `;`.
    Resolve {
        /// Package requirements
        #[arg(required = true)]
        packages: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Find the most recent revision offering one requirement
    Rev {
        /// Package requirement, e.g. `nodejs>=20`
        requirement: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List the versions of a package seen in the index
    Versions {
        /// Package name
        package: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List indexed revisions since a date
    Revisions {
        /// First day to include (YYYY-MM-DD, UTC)
        #[arg(long)]
        since: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show index size and revisions per day
    Stats {
        /// Number of most recent days to show
        #[arg(long, default_value = "14")]
        days: usize,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::try_parse_from(["wooper", "resolve", "uv~=0.5.0", "ruff", "--json"]).unwrap();
        match cli.command {
            Some(Commands::Resolve { packages, json }) => {
                assert_eq!(packages, vec!["uv~=0.5.0", "ruff"]);
                assert!(json);
            }
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_global_db_path() {
        let cli = Cli::try_parse_from(["wooper", "stats", "--db-path", "/tmp/x.db"]).unwrap();
        assert_eq!(cli.db_path.as_deref(), Some("/tmp/x.db"));
    }

    #[test]
    fn test_ingest_sources_conflict() {
        assert!(
            Cli::try_parse_from(["wooper", "ingest", "--feed", "http://x", "--file", "a.jsonl"])
                .is_err()
        );
    }
}
