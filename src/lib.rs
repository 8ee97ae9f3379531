#![allow(clippy::const_is_empty)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod errors;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use analysis::{CollectionReport, SymbolReport, run_collection, run_symbol};
pub use data::{CacheFile, CandleCollection};
pub use domain::{Candle, Timeframe};
pub use errors::DetectError;
pub use models::{AnnotatedZone, CandleSeries, Zone, flat_record};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
// CLI argument parsing
use clap::Parser;
use serde_json::{Map, Value};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Candle cache to analyze (bincode, written by make_demo_cache or a backfill job)
    #[arg(long, default_value = config::DEFAULT_CACHE_PATH)]
    pub cache: PathBuf,

    /// Only analyze this symbol (default: every symbol in the cache)
    #[arg(long)]
    pub symbol: Option<String>,

    /// Write JSON-lines records here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Pretty-print each record instead of one line per zone
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// JSON file overriding the built-in per-symbol thresholds
    #[arg(long)]
    pub threshold_book: Option<PathBuf>,
}

/// Batch entry point: load the cache, run detection on every symbol, emit
/// one flat JSON record per zone.
/// This is the public API for the binary to call.
pub fn run_cli(args: &Cli) -> anyhow::Result<()> {
    let cache = CacheFile::load_from_path(&args.cache)?;
    log::info!(
        "Loaded cache {:?} ({} series, created {})",
        args.cache,
        cache.collection.series.len(),
        utils::time_utils::epoch_ms_to_utc(cache.created_at_ms)
    );
    let mut collection = cache.collection;
    if let Some(symbol) = &args.symbol {
        collection.retain_symbol(symbol);
        anyhow::ensure!(
            !collection.series.is_empty(),
            "No series for symbol {} in {:?}",
            symbol,
            args.cache
        );
    }

    let book = match &args.threshold_book {
        Some(path) => config::ThresholdBook::load(path)?,
        None => config::ThresholdBook::builtin(),
    };

    let mut ath_store = analysis::ath::MemoryAthStore::new();
    let report = run_collection(&collection, &book, &mut ath_store);

    log::info!(
        "Analyzed {} symbol(s), {} failure(s)",
        report.reports.len(),
        report.failures.len()
    );
    if report.reports.is_empty() && !report.failures.is_empty() {
        anyhow::bail!("All {} symbol(s) failed detection", report.failures.len());
    }

    let mut rows: Vec<Map<String, Value>> = Vec::new();
    for symbol_report in &report.reports {
        for annotated in &symbol_report.zones {
            rows.push(flat_record(annotated));
        }
        // The ATH marker is exported like any other zone row
        rows.push(flat_record(&AnnotatedZone::bare(symbol_report.ath.clone())));
    }
    write_rows(&rows, args)
}

fn write_rows(rows: &[Map<String, Value>], args: &Cli) -> anyhow::Result<()> {
    let mut out: Box<dyn Write> = match &args.out {
        Some(path) => {
            let file = File::create(path)
                .context(format!("Failed to create output file {:?}", path))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout().lock()),
    };

    for row in rows {
        if args.pretty {
            serde_json::to_writer_pretty(&mut out, row)?;
        } else {
            serde_json::to_writer(&mut out, row)?;
        }
        out.write_all(b"\n")?;
    }
    out.flush()?;

    if let Some(path) = &args.out {
        log::info!("Wrote {} record(s) to {:?}", rows.len(), path);
    }
    Ok(())
}
