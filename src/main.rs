// src/main.rs

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use wooper::WooperConfig;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Logs go to stderr so --json output stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = WooperConfig::discover(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let db_path = config.db_path(cli.db_path.as_deref());

    match cli.command {
        Some(Commands::Init) => commands::cmd_init(&db_path),

        Some(Commands::Ingest {
            feed,
            file,
            name,
            max_batches,
            batch_size,
            from_start,
        }) => commands::cmd_ingest(
            &db_path,
            &config,
            commands::IngestArgs {
                feed,
                file,
                name,
                max_batches,
                batch_size,
                from_start,
            },
        ),

        Some(Commands::Resolve { packages, json }) => {
            commands::cmd_resolve(&db_path, &config, &packages, json)
        }

        Some(Commands::Rev { requirement, json }) => {
            commands::cmd_rev(&db_path, &config, &requirement, json)
        }

        Some(Commands::Versions { package, json }) => {
            commands::cmd_versions(&db_path, &package, json)
        }

        Some(Commands::Revisions { since, json }) => {
            commands::cmd_revisions(&db_path, &since, json)
        }

        Some(Commands::Stats { days, json }) => commands::cmd_stats(&db_path, days, json),

        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
