//! paperharvest - batch abstract extraction for paper lists
//!
//! Reads a CSV of paper records (Link + optional DOI), fetches each paper's
//! abstract and keywords with a two-tier fallback (publisher page, then
//! CrossRef), checkpoints progress every batch so an interrupted run can
//! resume, and writes the enriched CSV plus a summary.
//!
//! ```bash
//! paperharvest --input papers.csv --output papers_out.csv
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use paperharvest::crossref::DoiClient;
use paperharvest::processor::PaperProcessor;
use paperharvest::runner::{RateLimit, RunConfig, Runner};
use paperharvest::scopus::PageExtractor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Batch abstract/keyword harvester with checkpointed resume
#[derive(Parser)]
#[command(name = "paperharvest")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input CSV with Link and DOI columns
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV (input columns plus Abstract and Keywords)
    #[arg(short, long, default_value = "papers_out.csv")]
    output: PathBuf,

    /// Checkpoint file (removed after a clean run)
    #[arg(long, default_value = "progress_checkpoint.csv")]
    checkpoint: PathBuf,

    /// Records between checkpoint snapshots
    #[arg(long, default_value = "50")]
    batch_size: usize,

    /// Pause between records, in seconds
    #[arg(long, default_value = "2")]
    delay_secs: u64,

    /// Log file (receives the same stream as the console)
    #[arg(long, default_value = "harvest.log")]
    log_file: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_file, cli.debug)?;

    println!("{}", "=".repeat(60));
    println!("Paper Abstract Extraction");
    println!("{}", "=".repeat(60));

    let config = RunConfig {
        input: cli.input,
        output: cli.output.clone(),
        checkpoint: cli.checkpoint,
        batch_size: cli.batch_size,
        rate: RateLimit::new(Duration::from_secs(cli.delay_secs)),
    };

    let processor = PaperProcessor::new(
        PageExtractor::new().context("Failed to build page client")?,
        DoiClient::new().context("Failed to build CrossRef client")?,
    );

    let stats = Runner::new(config, processor)
        .run()
        .await
        .context("Extraction run failed")?;

    println!();
    println!("{}", "=".repeat(60));
    println!("EXTRACTION COMPLETE");
    println!("{}", "=".repeat(60));
    println!("Total papers: {}", stats.total);
    println!("Successfully extracted: {}", stats.succeeded);
    println!("Success rate: {:.2}%", stats.success_rate());
    println!("Output saved to: {}", cli.output.display());
    println!("{}", "=".repeat(60));

    Ok(())
}

/// Initialize tracing with a console layer and a mirrored log-file layer.
fn init_logging(log_file: &Path, debug: bool) -> Result<()> {
    let log_level = if debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}
