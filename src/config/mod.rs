//! Configuration module for Feedwalk
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use feedwalk::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("feedwalk.toml")).unwrap();
//! println!("Page size: {}", config.source.page_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, OutputConfig, PaginationConfig, RequestConfig, ResponseConfig, SourceConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
