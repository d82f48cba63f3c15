//! HTTP page fetcher
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured static headers
//! - Issuing one list request per page with the cursor parameter
//! - Classifying transport, status and body-shape failures

use crate::config::{Config, RequestConfig, ResponseConfig};
use crate::record::Cursor;
use crate::{ConfigError, FeedwalkError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, ORIGIN, REFERER};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Longest body excerpt kept for an HTTP error
const BODY_SNIPPET_CHARS: usize = 200;

/// Result of a page fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// The endpoint answered with an item list (possibly empty)
    Page {
        /// Items in the order the endpoint returned them
        items: Vec<Value>,
    },

    /// Non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// Start of the response body
        body_snippet: String,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },

    /// The body did not have the expected shape
    Malformed {
        /// What was missing or wrong
        reason: String,
    },
}

/// Something that can serve pages of a newest-first item list
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches up to `count` items created at or before `cursor`
    ///
    /// The first page of a crawl is requested with no cursor.
    async fn fetch_page(&self, cursor: Option<&Cursor>, count: u32) -> FetchResult;
}

/// Builds an HTTP client carrying the configured static headers
///
/// # Arguments
///
/// * `config` - The request identity configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(FeedwalkError)` - A header was invalid or the client failed to build
pub fn build_http_client(config: &RequestConfig) -> Result<Client, FeedwalkError> {
    let mut headers = HeaderMap::new();

    for (name, value) in [
        (ORIGIN, &config.origin),
        (REFERER, &config.referer),
        (COOKIE, &config.cookie),
    ] {
        if let Some(value) = value {
            let value = header_value(name.as_str(), value)?;
            headers.insert(name, value);
        }
    }

    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::Validation(format!("Invalid header name '{}'", name)))?;
        let value = header_value(name.as_str(), value)?;
        headers.insert(name, value);
    }

    let client = Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value)
        .map_err(|_| ConfigError::Validation(format!("Invalid value for header '{}'", name)))
}

/// Page source backed by the configured HTTP endpoint
pub struct HttpPageSource {
    client: Client,
    base_url: String,
    count_param: String,
    cursor_param: String,
    extra_query: Vec<(String, String)>,
    response: ResponseConfig,
}

impl HttpPageSource {
    /// Creates a page source with a client built from `config.request`
    pub fn new(config: &Config) -> Result<Self, FeedwalkError> {
        let client = build_http_client(&config.request)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a page source reusing an existing client
    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.source.base_url.clone(),
            count_param: config.source.count_param.clone(),
            cursor_param: config.source.cursor_param.clone(),
            extra_query: config
                .source
                .query
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            response: config.response.clone(),
        }
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, cursor: Option<&Cursor>, count: u32) -> FetchResult {
        let mut query: Vec<(&str, String)> = vec![(self.count_param.as_str(), count.to_string())];
        if let Some(cursor) = cursor {
            query.push((self.cursor_param.as_str(), cursor.as_str().to_string()));
        }
        for (name, value) in &self.extra_query {
            query.push((name.as_str(), value.clone()));
        }

        tracing::debug!(
            "GET {} (count={}, cursor={})",
            self.base_url,
            count,
            cursor.map(Cursor::as_str).unwrap_or("-")
        );

        let response = match self.client.get(&self.base_url).query(&query).send().await {
            Ok(response) => response,
            Err(e) => return network_error(e),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return FetchResult::HttpError {
                status_code: status.as_u16(),
                body_snippet: body.chars().take(BODY_SNIPPET_CHARS).collect(),
            };
        }

        match response.text().await {
            Ok(body) => parse_page(&body, &self.response),
            Err(e) => network_error(e),
        }
    }
}

fn network_error(e: reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}

/// Extracts the item list from a response body
///
/// The success field, when configured, must be a literal `true`. The items
/// pointer must resolve to an array; an empty pointer means the body itself is
/// the array.
pub fn parse_page(body: &str, config: &ResponseConfig) -> FetchResult {
    let mut value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            return FetchResult::Malformed {
                reason: format!("invalid JSON: {}", e),
            }
        }
    };

    if let Some(field) = &config.success_field {
        if value.get(field).and_then(Value::as_bool) != Some(true) {
            return FetchResult::Malformed {
                reason: format!("'{}' is not true", field),
            };
        }
    }

    let items = if config.items_pointer.is_empty() {
        Some(value.take())
    } else {
        value.pointer_mut(&config.items_pointer).map(Value::take)
    };

    match items {
        Some(Value::Array(items)) => FetchResult::Page { items },
        _ => FetchResult::Malformed {
            reason: format!("no item array at '{}'", config.items_pointer),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn response_config() -> ResponseConfig {
        ResponseConfig {
            success_field: Some("succeeded".to_string()),
            items_pointer: "/resp_data/topics".to_string(),
            id_field: "topic_id".to_string(),
            time_field: "create_time".to_string(),
        }
    }

    fn request_config() -> RequestConfig {
        let mut headers = BTreeMap::new();
        headers.insert("x-signature".to_string(), "abc".to_string());
        RequestConfig {
            user_agent: "TestAgent/1.0".to_string(),
            origin: Some("https://wx.example.com".to_string()),
            referer: Some("https://wx.example.com/".to_string()),
            cookie: Some("token=1".to_string()),
            timeout_secs: 5,
            headers,
        }
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&request_config()).is_ok());
    }

    #[test]
    fn test_build_http_client_rejects_bad_header() {
        let mut config = request_config();
        config.cookie = Some("bad\r\nvalue".to_string());
        assert!(matches!(
            build_http_client(&config),
            Err(FeedwalkError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn test_parse_page_items() {
        let body = json!({
            "succeeded": true,
            "resp_data": {"topics": [{"topic_id": 1}, {"topic_id": 2}]}
        })
        .to_string();

        match parse_page(&body, &response_config()) {
            FetchResult::Page { items } => assert_eq!(items.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_page_not_succeeded() {
        let body = json!({"succeeded": false, "code": 1059}).to_string();
        assert!(matches!(
            parse_page(&body, &response_config()),
            FetchResult::Malformed { .. }
        ));
    }

    #[test]
    fn test_parse_page_missing_items() {
        let body = json!({"succeeded": true, "resp_data": {}}).to_string();
        assert!(matches!(
            parse_page(&body, &response_config()),
            FetchResult::Malformed { .. }
        ));
    }

    #[test]
    fn test_parse_page_invalid_json() {
        assert!(matches!(
            parse_page("<html>oops</html>", &response_config()),
            FetchResult::Malformed { .. }
        ));
    }

    #[test]
    fn test_parse_page_bare_array() {
        let config = ResponseConfig {
            success_field: None,
            items_pointer: String::new(),
            ..response_config()
        };
        assert_eq!(
            parse_page("[]", &config),
            FetchResult::Page { items: vec![] }
        );
    }
}
