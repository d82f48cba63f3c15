use crate::record::CursorBoundary;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Feedwalk
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub response: ResponseConfig,
    pub request: RequestConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    pub output: OutputConfig,
}

/// The paginated endpoint being crawled
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// List endpoint, without the paging query parameters
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Number of items requested per page
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Query parameter carrying the page size
    #[serde(rename = "count-param", default = "default_count_param")]
    pub count_param: String,

    /// Query parameter carrying the cursor
    #[serde(rename = "cursor-param", default = "default_cursor_param")]
    pub cursor_param: String,

    /// Extra query parameters sent with every request
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

/// Where the interesting parts live in a response body
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseConfig {
    /// Top-level boolean that must be `true` for the page to count
    #[serde(rename = "success-field", default)]
    pub success_field: Option<String>,

    /// JSON pointer to the item array (e.g. "/resp_data/topics")
    #[serde(rename = "items-pointer")]
    pub items_pointer: String,

    /// Item field holding the unique identifier
    #[serde(rename = "id-field")]
    pub id_field: String,

    /// Item field holding the creation timestamp
    #[serde(rename = "time-field")]
    pub time_field: String,
}

/// Static request identity: headers and auth tokens passed through verbatim
#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(default)]
    pub origin: Option<String>,

    #[serde(default)]
    pub referer: Option<String>,

    /// Raw cookie header value
    #[serde(default)]
    pub cookie: Option<String>,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Additional headers, e.g. a signature/timestamp/version triplet
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Pacing and termination of the page loop
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    /// Fixed delay between page requests (milliseconds)
    #[serde(rename = "delay-ms", default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Upper bound of the random delay added on top of `delay_ms`
    #[serde(rename = "jitter-ms", default)]
    pub jitter_ms: u64,

    /// Whether the upstream treats the cursor as inclusive or exclusive
    #[serde(rename = "cursor-boundary", default)]
    pub cursor_boundary: CursorBoundary,

    /// Stop after this many pages
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            jitter_ms: 0,
            cursor_boundary: CursorBoundary::default(),
            max_pages: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Summaries of every accumulated record
    #[serde(rename = "processed-path")]
    pub processed_path: String,

    /// Unmodified items as returned by the endpoint
    #[serde(rename = "raw-path")]
    pub raw_path: String,

    /// Markdown export of the processed records
    #[serde(rename = "markdown-path")]
    pub markdown_path: String,
}

fn default_count_param() -> String {
    "count".to_string()
}

fn default_cursor_param() -> String {
    "end_time".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_delay_ms() -> u64 {
    1000
}
