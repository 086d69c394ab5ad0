// src/commands/ingest.rs
//! Build-result ingestion command

use anyhow::{Result, bail};
use std::path::PathBuf;
use tracing::info;
use wooper::ingest::{BuildSource, HttpFeedSource, IngestReport, Ingester, JsonLinesSource};
use wooper::{SqliteIndex, WooperConfig};

/// Options for one ingestion run
#[derive(Debug, Default)]
pub struct IngestArgs {
    pub feed: Option<String>,
    pub file: Option<PathBuf>,
    pub name: Option<String>,
    pub max_batches: Option<usize>,
    pub batch_size: usize,
    pub from_start: bool,
}

/// Ingest build results from a feed or a JSON-lines export
pub fn cmd_ingest(db_path: &str, config: &WooperConfig, args: IngestArgs) -> Result<()> {
    let index = SqliteIndex::open(db_path)?;

    let source: Box<dyn BuildSource> = if let Some(file) = &args.file {
        let mut source = JsonLinesSource::new(file).with_batch_size(args.batch_size);
        if let Some(name) = &args.name {
            source = source.with_name(name.clone());
        }
        Box::new(source)
    } else {
        let Some(url) = args.feed.clone().or_else(|| config.ingest.feed_url.clone()) else {
            bail!("No build source given: pass --feed or --file, or set ingest.feed_url");
        };
        let mut source = HttpFeedSource::new(url)?.with_retries(config.ingest.retries);
        if let Some(name) = args.name.clone().or_else(|| config.ingest.source_name.clone()) {
            source = source.with_name(name);
        }
        Box::new(source)
    };

    let mut ingester = Ingester::new(&index);
    if let Some(max) = args.max_batches.or_else(|| config.max_batches()) {
        ingester = ingester.with_max_batches(max);
    }

    info!("Ingesting into {} from {}", db_path, source.name());
    let report = if args.from_start {
        ingester.ingest(source.as_ref(), None)?
    } else {
        ingester.resume(source.as_ref())?
    };

    print_report(source.name(), &report);
    Ok(())
}

fn print_report(source: &str, report: &IngestReport) {
    println!("Ingested from {}", source);
    println!("  Batches:     {}", report.batches);
    println!("  Records:     {}", report.records);
    println!("  New entries: {}", report.new_entries);
    println!("  Skipped:     {}", report.skipped);
    match &report.cursor {
        Some(cursor) if report.exhausted => println!("  Cursor:      {} (source exhausted)", cursor),
        Some(cursor) => println!("  Cursor:      {}", cursor),
        None => println!("  Cursor:      none"),
    }
}
