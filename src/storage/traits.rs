//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::record::{AccumulatedSet, TopicSummary};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence of crawl progress
///
/// A checkpoint is a full rewrite of both outputs. Implementations must not
/// append: saving the same set twice leaves the same state behind.
pub trait CheckpointStore {
    /// Loads the accumulated set written by an earlier run
    ///
    /// Returns `Ok(None)` when there is nothing to resume from.
    fn load(&self) -> StorageResult<Option<AccumulatedSet>>;

    /// Writes the processed projection and the raw mirror
    fn save(&mut self, processed: &[TopicSummary], raw: &[Value]) -> StorageResult<()>;

    /// Convenience wrapper checkpointing a whole set
    fn save_set(&mut self, set: &AccumulatedSet) -> StorageResult<()> {
        self.save(&set.summaries(), &set.raw_items())
    }
}
