//! Feedwalk: a resumable cursor-paginated feed crawler
//!
//! This crate walks a newest-first JSON list endpoint page by page, using the
//! creation timestamp of the last record as the cursor for the next request.
//! Records are deduplicated by identifier and checkpointed to disk after every
//! page so an interrupted crawl can be resumed.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod storage;

use thiserror::Error;

/// Main error type for Feedwalk operations
#[derive(Debug, Error)]
pub enum FeedwalkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Feedwalk operations
pub type Result<T> = std::result::Result<T, FeedwalkError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOutcome, Crawler, StopReason};
pub use output::CrawlStats;
pub use record::{AccumulatedSet, Cursor, CursorBoundary, Record};
