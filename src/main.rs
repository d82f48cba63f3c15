//! Feedwalk main entry point
//!
//! This is the command-line interface for the Feedwalk feed crawler.

use clap::Parser;
use feedwalk::config::{load_config_with_hash, Config};
use feedwalk::crawler::run_crawl;
use feedwalk::output::{
    generate_markdown, load_statistics, print_crawl_stats, print_statistics, reprocess_checkpoint,
};
use feedwalk::record::{Cursor, TopicSummary};
use feedwalk::storage::open_store;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Feedwalk: a resumable feed crawler
///
/// Feedwalk pages backwards through a newest-first JSON list endpoint,
/// deduplicates records by identifier and checkpoints after every page.
#[derive(Parser, Debug)]
#[command(name = "feedwalk")]
#[command(version)]
#[command(about = "A resumable cursor-paginated feed crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Continue from the last checkpoint instead of starting over
    #[arg(long)]
    resume: bool,

    /// Start from an explicit timestamp cursor (e.g. 2024-03-01T09:15:42.123+0800)
    #[arg(long, value_name = "TIMESTAMP")]
    since: Option<String>,

    /// Re-parse the raw checkpoint without fetching, then export markdown
    #[arg(long, conflicts_with_all = ["stats", "export_markdown", "resume", "since"])]
    local_only: bool,

    /// Show statistics from the checkpoint and exit
    #[arg(long, conflicts_with_all = ["export_markdown", "resume", "since"])]
    stats: bool,

    /// Generate markdown from the checkpoint and exit
    #[arg(long, conflicts_with_all = ["resume", "since"])]
    export_markdown: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.local_only {
        handle_local_only(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_markdown {
        handle_export_markdown(&config)?;
    } else {
        let seed = match cli.since.as_deref().map(Cursor::parse).transpose() {
            Ok(seed) => seed,
            Err(e) => {
                tracing::error!("{}", e);
                return Err(e.into());
            }
        };
        handle_crawl(&config, seed, cli.resume).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("feedwalk=info,warn"),
            1 => EnvFilter::new("feedwalk=debug,info"),
            2 => EnvFilter::new("feedwalk=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Heading of the markdown export, derived from the output file name
fn export_title(config: &Config) -> String {
    Path::new(&config.output.markdown_path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Topics".to_string())
}

fn write_markdown(
    config: &Config,
    summaries: &[TopicSummary],
) -> Result<(), Box<dyn std::error::Error>> {
    generate_markdown(
        summaries,
        &export_title(config),
        Path::new(&config.output.markdown_path),
    )?;
    tracing::info!(
        "Markdown export written to {} ({} topics)",
        config.output.markdown_path,
        summaries.len()
    );
    Ok(())
}

/// Handles the --local-only mode: rebuild outputs from the raw checkpoint
fn handle_local_only(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config);
    let summaries = reprocess_checkpoint(&mut store)?;
    if summaries.is_empty() {
        println!("Nothing to parse in {}", config.output.raw_path);
        return Ok(());
    }
    write_markdown(config, &summaries)
}

/// Handles the --stats mode: shows statistics from the processed checkpoint
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config);
    println!("Checkpoint: {}\n", config.output.processed_path);

    match store.load_summaries()? {
        Some(summaries) => print_statistics(&load_statistics(&summaries)),
        None => println!("No checkpoint found"),
    }
    Ok(())
}

/// Handles the --export-markdown mode
fn handle_export_markdown(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config);
    match store.load_summaries()? {
        Some(summaries) => {
            write_markdown(config, &summaries)?;
            println!("✓ Markdown exported to: {}", config.output.markdown_path);
        }
        None => println!("No checkpoint found at {}", config.output.processed_path),
    }
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    seed: Option<Cursor>,
    resume: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if resume {
        tracing::info!("Resuming crawl from {}", config.output.raw_path);
    } else {
        tracing::info!("Starting fresh crawl (checkpoint files will be overwritten)");
    }

    let outcome = match run_crawl(config, seed, resume).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if let Some(reason) = &outcome.stats.stop_reason {
        if reason.is_failure() {
            tracing::warn!("Crawl stopped early ({}); rerun with --resume to continue", reason);
        } else {
            tracing::info!("Crawl finished: {}", reason);
        }
    }

    if !outcome.records.is_empty() {
        let summaries: Vec<TopicSummary> = outcome.records.iter().map(|r| r.summary()).collect();
        write_markdown(config, &summaries)?;
    }

    print_crawl_stats(&outcome.stats);
    Ok(())
}
