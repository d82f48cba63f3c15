//! Crawl and checkpoint statistics
//!
//! This module provides the counters produced by a crawl run and a report
//! computed from persisted summaries, plus plain-text printing for both.

use crate::crawler::StopReason;
use crate::record::{parse_timestamp, ContentKind, Cursor, TopicSummary};
use std::collections::{BTreeMap, HashMap};

/// How many authors the report lists
const TOP_AUTHORS: usize = 10;

/// Counters for one crawl run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStats {
    /// Pages that returned a parseable item list
    pub pages_fetched: u64,

    /// Records added to the working set by this run
    pub new_records: u64,

    /// Items dropped because their identifier was already seen
    pub duplicates_skipped: u64,

    /// Items dropped because they lacked an identifier or timestamp
    pub skipped_malformed: u64,

    /// Checkpoint rewrites performed
    pub checkpoints_written: u64,

    /// Size of the working set at the end of the run
    pub total_records: u64,

    /// Cursor the next run would start from
    pub last_cursor: Option<Cursor>,

    /// Why the loop ended
    pub stop_reason: Option<StopReason>,
}

/// Report over a persisted set of summaries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckpointStatistics {
    pub total_records: u64,
    pub by_kind: BTreeMap<ContentKind, u64>,
    pub newest: Option<String>,
    pub oldest: Option<String>,
    pub top_authors: Vec<(String, u64)>,
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_images: u64,
}

/// Computes statistics from processed summaries
pub fn load_statistics(summaries: &[TopicSummary]) -> CheckpointStatistics {
    let mut stats = CheckpointStatistics {
        total_records: summaries.len() as u64,
        ..Default::default()
    };
    let mut authors: HashMap<&str, u64> = HashMap::new();

    for summary in summaries {
        *stats.by_kind.entry(summary.kind).or_insert(0) += 1;
        if let Some(author) = &summary.author {
            *authors.entry(author.as_str()).or_insert(0) += 1;
        }
        stats.total_likes += summary.likes;
        stats.total_comments += summary.comments;
        stats.total_images += summary.image_count as u64;
    }

    let mut by_time: Vec<&TopicSummary> = summaries.iter().collect();
    by_time.sort_by(|a, b| {
        match (parse_timestamp(&a.created_at), parse_timestamp(&b.created_at)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => a.created_at.cmp(&b.created_at),
        }
    });
    stats.oldest = by_time.first().map(|s| s.created_at.clone());
    stats.newest = by_time.last().map(|s| s.created_at.clone());

    let mut top: Vec<(String, u64)> = authors
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top.truncate(TOP_AUTHORS);
    stats.top_authors = top;

    stats
}

/// Prints checkpoint statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CheckpointStatistics) {
    println!("=== Checkpoint Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", stats.total_records);
    if let (Some(newest), Some(oldest)) = (&stats.newest, &stats.oldest) {
        println!("  Newest: {}", newest);
        println!("  Oldest: {}", oldest);
    }
    println!("  Likes: {}", stats.total_likes);
    println!("  Comments: {}", stats.total_comments);
    println!("  Images: {}", stats.total_images);
    println!();

    println!("Records by Kind:");
    for (kind, count) in &stats.by_kind {
        let percentage = if stats.total_records > 0 {
            (*count as f64 / stats.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", kind.label(), count, percentage);
    }
    println!();

    if !stats.top_authors.is_empty() {
        println!("Top Authors:");
        for (author, count) in &stats.top_authors {
            println!("  - {} ({})", author, count);
        }
    }
}

/// Prints the counters of a finished crawl run
pub fn print_crawl_stats(stats: &CrawlStats) {
    println!("=== Crawl Run ===\n");
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  New records: {}", stats.new_records);
    println!("  Duplicates skipped: {}", stats.duplicates_skipped);
    if stats.skipped_malformed > 0 {
        println!("  Items without id/timestamp: {}", stats.skipped_malformed);
    }
    println!("  Checkpoints written: {}", stats.checkpoints_written);
    println!("  Total records: {}", stats.total_records);
    if let Some(cursor) = &stats.last_cursor {
        println!("  Last cursor: {}", cursor);
    }
    if let Some(reason) = &stats.stop_reason {
        println!("  Stopped: {}", reason);
    }
}
