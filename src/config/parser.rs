use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at start-up so two runs can be told apart when the auth tokens or
/// paging parameters were edited in between.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CursorBoundary;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"
[source]
base-url = "https://api.example.com/v2/groups/42/topics"
page-size = 20
[source.query]
scope = "all"

[response]
success-field = "succeeded"
items-pointer = "/resp_data/topics"
id-field = "topic_id"
time-field = "create_time"

[request]
user-agent = "Mozilla/5.0"
origin = "https://wx.example.com"
referer = "https://wx.example.com/"
cookie = "access_token=abc"
[request.headers]
x-version = "2.0"

[pagination]
delay-ms = 500
jitter-ms = 250
cursor-boundary = "exclusive"

[output]
processed-path = "topics.json"
raw-path = "topics_raw.json"
markdown-path = "topics.md"
"#;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.source.page_size, 20);
        assert_eq!(config.source.count_param, "count");
        assert_eq!(config.source.cursor_param, "end_time");
        assert_eq!(config.source.query.get("scope").unwrap(), "all");
        assert_eq!(config.response.success_field.as_deref(), Some("succeeded"));
        assert_eq!(config.request.timeout_secs, 30);
        assert_eq!(config.request.headers.len(), 1);
        assert_eq!(config.pagination.delay_ms, 500);
        assert_eq!(config.pagination.cursor_boundary, CursorBoundary::Exclusive);
        assert_eq!(config.pagination.max_pages, None);
    }

    #[test]
    fn test_pagination_section_is_optional() {
        let content = VALID.replace(
            "[pagination]\ndelay-ms = 500\njitter-ms = 250\ncursor-boundary = \"exclusive\"\n",
            "",
        );
        let config = parse_config(&content).unwrap();
        assert_eq!(config.pagination.delay_ms, 1000);
        assert_eq!(config.pagination.jitter_ms, 0);
        assert_eq!(config.pagination.cursor_boundary, CursorBoundary::Inclusive);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/feedwalk.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let result = parse_config("this is not valid TOML {{{");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let content = VALID.replace("page-size = 20", "page-size = 0");
        let result = parse_config(&content);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
