//! Storage module for persisting crawl progress
//!
//! This module handles checkpointing for the crawler:
//! - The [`CheckpointStore`] trait implemented by every backend
//! - The JSON file backend writing processed and raw outputs
//! - Reloading the accumulated set to resume a crawl

mod json;
mod traits;

pub use json::JsonFileStore;
pub use traits::{CheckpointStore, StorageError, StorageResult};

use crate::config::Config;
use crate::record::FieldMap;

/// Opens the JSON checkpoint store described by the configuration
pub fn open_store(config: &Config) -> JsonFileStore {
    JsonFileStore::new(
        &config.output.processed_path,
        &config.output.raw_path,
        FieldMap::from(&config.response),
    )
}
