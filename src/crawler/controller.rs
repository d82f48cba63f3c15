//! Paginated crawl and resume controller
//!
//! This module contains the page loop that drives a crawl:
//! - Seeding the working set and cursor from a checkpoint or an explicit timestamp
//! - Requesting pages and deduplicating items by identifier
//! - Advancing the cursor and detecting stalls
//! - Checkpointing after every page

use crate::config::Config;
use crate::crawler::fetcher::{FetchResult, PageSource};
use crate::output::CrawlStats;
use crate::record::{AccumulatedSet, Cursor, CursorBoundary, FieldMap, Record};
use crate::storage::CheckpointStore;
use crate::FeedwalkError;
use std::fmt;
use std::time::Duration;

/// Explicit settings for one crawler instance
#[derive(Debug, Clone)]
pub struct CrawlerSettings {
    /// Items requested per page; a shorter page ends the crawl
    pub page_size: u32,

    /// Where identity and timestamp live in an item
    pub fields: FieldMap,

    /// How the next cursor is derived from the last timestamp
    pub boundary: CursorBoundary,

    /// Fixed pause between pages
    pub delay: Duration,

    /// Upper bound of the random pause added to `delay`
    pub jitter: Duration,

    /// Stop after this many pages
    pub max_pages: Option<u32>,
}

impl CrawlerSettings {
    /// Settings with no pauses, inclusive cursors and no page limit
    pub fn new(page_size: u32, fields: FieldMap) -> Self {
        Self {
            page_size,
            fields,
            boundary: CursorBoundary::default(),
            delay: Duration::ZERO,
            jitter: Duration::ZERO,
            max_pages: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.source.page_size,
            fields: FieldMap::from(&config.response),
            boundary: config.pagination.cursor_boundary,
            delay: Duration::from_millis(config.pagination.delay_ms),
            jitter: Duration::from_millis(config.pagination.jitter_ms),
            max_pages: config.pagination.max_pages,
        }
    }
}

/// Why the page loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A page came back empty
    Exhausted,

    /// A page had fewer items than requested
    ShortPage { received: usize },

    /// The cursor computed from a page equals the one used to request it
    Stalled { cursor: Cursor },

    /// The configured page limit was reached
    PageLimit { pages: u64 },

    /// The request never got an HTTP response
    Transport { error: String },

    /// The endpoint answered with a non-success status
    HttpStatus { status: u16, body_snippet: String },

    /// The body lacked the success flag, the item list or timestamps
    Malformed { reason: String },
}

impl StopReason {
    /// True when the crawl ended on an error rather than reaching the end
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::HttpStatus { .. } | Self::Malformed { .. }
        )
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "no more data"),
            Self::ShortPage { received } => write!(f, "final page ({} items)", received),
            Self::Stalled { cursor } => write!(f, "cursor stalled at {}", cursor),
            Self::PageLimit { pages } => write!(f, "page limit reached ({} pages)", pages),
            Self::Transport { error } => write!(f, "transport failure: {}", error),
            Self::HttpStatus {
                status,
                body_snippet,
            } => write!(f, "HTTP {}: {}", status, body_snippet),
            Self::Malformed { reason } => write!(f, "malformed response: {}", reason),
        }
    }
}

/// Records accumulated by a run, and how the run went
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub records: Vec<Record>,
    pub stats: CrawlStats,
}

/// Drives a [`PageSource`] until the stream ends, checkpointing into a
/// [`CheckpointStore`]
pub struct Crawler<S, C> {
    source: S,
    store: C,
    settings: CrawlerSettings,
}

impl<S: PageSource, C: CheckpointStore> Crawler<S, C> {
    pub fn new(source: S, store: C, settings: CrawlerSettings) -> Self {
        Self {
            source,
            store,
            settings,
        }
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    /// Runs the page loop
    ///
    /// # Arguments
    ///
    /// * `seed_cursor` - Explicit starting point; overrides a resumed cursor
    /// * `resume_from_disk` - Seed the working set (and cursor) from the store
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - The loop ended; see `stats.stop_reason`. Fetch
    ///   failures end the loop but are not errors: what was checkpointed stays
    ///   valid for a rerun.
    /// * `Err(FeedwalkError)` - The store failed to load or write a checkpoint
    pub async fn run(
        &mut self,
        seed_cursor: Option<Cursor>,
        resume_from_disk: bool,
    ) -> Result<CrawlOutcome, FeedwalkError> {
        let mut set = if resume_from_disk {
            match self.store.load()? {
                Some(set) => {
                    tracing::info!("Resuming with {} records from checkpoint", set.len());
                    set
                }
                None => {
                    tracing::info!("No checkpoint found, starting from the newest page");
                    AccumulatedSet::new()
                }
            }
        } else {
            AccumulatedSet::new()
        };

        let mut cursor = match seed_cursor {
            Some(seed) => Some(seed),
            None => set
                .last()
                .map(|record| self.settings.boundary.next_cursor(&record.created_at)),
        };
        if let Some(cursor) = &cursor {
            tracing::info!("Starting at cursor {}", cursor);
        }

        let mut stats = CrawlStats::default();
        let page_size = self.settings.page_size;

        let stop_reason = loop {
            let items = match self.source.fetch_page(cursor.as_ref(), page_size).await {
                FetchResult::Page { items } => items,
                FetchResult::HttpError {
                    status_code,
                    body_snippet,
                } => {
                    tracing::error!("HTTP {} from endpoint: {}", status_code, body_snippet);
                    break StopReason::HttpStatus {
                        status: status_code,
                        body_snippet,
                    };
                }
                FetchResult::NetworkError { error } => {
                    tracing::error!("Request failed: {}", error);
                    break StopReason::Transport { error };
                }
                FetchResult::Malformed { reason } => {
                    tracing::warn!("Unexpected response: {}", reason);
                    break StopReason::Malformed { reason };
                }
            };

            stats.pages_fetched += 1;

            if items.is_empty() {
                tracing::info!("Page {} is empty, no more data", stats.pages_fetched);
                break StopReason::Exhausted;
            }

            let received = items.len();
            let next_cursor = items
                .iter()
                .rev()
                .find_map(|item| self.settings.fields.timestamp_of(item))
                .map(|ts| self.settings.boundary.next_cursor(ts));

            let (mut added, mut duplicates, mut malformed) = (0u64, 0u64, 0u64);
            for item in items {
                match Record::from_item(item, &self.settings.fields) {
                    Some(record) => {
                        if set.insert(record) {
                            added += 1;
                        } else {
                            duplicates += 1;
                        }
                    }
                    None => malformed += 1,
                }
            }
            stats.new_records += added;
            stats.duplicates_skipped += duplicates;
            stats.skipped_malformed += malformed;

            if malformed > 0 {
                tracing::warn!(
                    "Skipped {} items without '{}' or '{}'",
                    malformed,
                    self.settings.fields.id_field,
                    self.settings.fields.time_field
                );
            }
            tracing::info!(
                "Page {}: {} items, {} new, {} duplicates, {} total",
                stats.pages_fetched,
                received,
                added,
                duplicates,
                set.len()
            );

            self.store.save_set(&set)?;
            stats.checkpoints_written += 1;

            let Some(next_cursor) = next_cursor else {
                break StopReason::Malformed {
                    reason: "no item on the page carries a timestamp".to_string(),
                };
            };

            if cursor.as_ref() == Some(&next_cursor) {
                tracing::warn!(
                    "Cursor did not advance past {}, stopping to avoid a loop",
                    next_cursor
                );
                break StopReason::Stalled {
                    cursor: next_cursor,
                };
            }
            cursor = Some(next_cursor);

            if received < page_size as usize {
                tracing::info!("Short page ({} < {}), reached the end", received, page_size);
                break StopReason::ShortPage { received };
            }

            if let Some(max) = self.settings.max_pages {
                if stats.pages_fetched >= u64::from(max) {
                    break StopReason::PageLimit {
                        pages: stats.pages_fetched,
                    };
                }
            }

            self.pause().await;
        };

        stats.total_records = set.len() as u64;
        stats.last_cursor = cursor;
        stats.stop_reason = Some(stop_reason);

        Ok(CrawlOutcome {
            records: set.into_records(),
            stats,
        })
    }

    /// Politeness delay between pages
    async fn pause(&self) {
        let jitter_ms = self.settings.jitter.as_millis() as u64;
        let jitter = if jitter_ms > 0 {
            Duration::from_millis(fastrand::u64(0..=jitter_ms))
        } else {
            Duration::ZERO
        };

        let wait = self.settings.delay + jitter;
        if !wait.is_zero() {
            tracing::debug!("Sleeping {:?} before next page", wait);
            tokio::time::sleep(wait).await;
        }
    }
}
