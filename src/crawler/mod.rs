//! Crawler module for paginated list fetching
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of one page per request
//! - The page loop with deduplication, cursor advance and stall detection
//! - Checkpointing after every page

mod controller;
mod fetcher;

pub use controller::{CrawlOutcome, Crawler, CrawlerSettings, StopReason};
pub use fetcher::{build_http_client, parse_page, FetchResult, HttpPageSource, PageSource};

use crate::config::Config;
use crate::record::Cursor;
use crate::storage::open_store;
use crate::FeedwalkError;

/// Runs a complete crawl against the configured endpoint
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP page source from the request configuration
/// 2. Open the JSON checkpoint store
/// 3. Run the page loop, optionally resuming from the checkpoint
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed_cursor` - Explicit timestamp to start from
/// * `resume` - Continue from the last checkpoint
///
/// # Example
///
/// ```no_run
/// use feedwalk::config::load_config;
/// use feedwalk::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("feedwalk.toml"))?;
/// let outcome = run_crawl(&config, None, true).await?;
/// println!("{} records", outcome.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    seed_cursor: Option<Cursor>,
    resume: bool,
) -> Result<CrawlOutcome, FeedwalkError> {
    let source = HttpPageSource::new(config)?;
    let store = open_store(config);
    let mut crawler = Crawler::new(source, store, CrawlerSettings::from_config(config));
    crawler.run(seed_cursor, resume).await
}
