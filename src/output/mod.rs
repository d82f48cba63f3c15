//! Output module for crawl reports and exports
//!
//! This module handles:
//! - Counters of a crawl run and reports over persisted checkpoints
//! - Markdown export of processed records
//! - Rebuilding the processed projection from the raw mirror

mod markdown;
pub mod stats;

pub use markdown::{format_markdown, generate_markdown};
pub use stats::{
    load_statistics, print_crawl_stats, print_statistics, CheckpointStatistics, CrawlStats,
};

use crate::record::TopicSummary;
use crate::storage::{CheckpointStore, JsonFileStore};
use crate::FeedwalkError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Re-parses the raw checkpoint and rewrites the processed file
///
/// This is the offline path: no request is made. Returns the rebuilt
/// summaries, or an empty list if there is no raw checkpoint.
pub fn reprocess_checkpoint(store: &mut JsonFileStore) -> Result<Vec<TopicSummary>, FeedwalkError> {
    let Some(set) = store.load()? else {
        tracing::warn!("No raw checkpoint at {}", store.raw_path().display());
        return Ok(Vec::new());
    };

    let summaries = set.summaries();
    store.save(&summaries, &set.raw_items())?;
    tracing::info!(
        "Rebuilt {} summaries into {}",
        summaries.len(),
        store.processed_path().display()
    );
    Ok(summaries)
}
