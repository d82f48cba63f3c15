use crate::config::types::{
    Config, OutputConfig, PaginationConfig, RequestConfig, ResponseConfig, SourceConfig,
};
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

/// Largest page size any known endpoint accepts
const MAX_PAGE_SIZE: u32 = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_response_config(&config.response)?;
    validate_request_config(&config.request)?;
    validate_pagination_config(&config.pagination)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the endpoint configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.page_size < 1 || config.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.page_size
        )));
    }

    require_non_empty("count-param", &config.count_param)?;
    require_non_empty("cursor-param", &config.cursor_param)?;

    if config.count_param == config.cursor_param {
        return Err(ConfigError::Validation(format!(
            "count-param and cursor-param must differ, both are '{}'",
            config.count_param
        )));
    }

    for name in config.query.keys() {
        if name == &config.count_param || name == &config.cursor_param {
            return Err(ConfigError::Validation(format!(
                "extra query parameter '{}' collides with a paging parameter",
                name
            )));
        }
    }

    Ok(())
}

/// Validates the response field mapping
fn validate_response_config(config: &ResponseConfig) -> Result<(), ConfigError> {
    if !config.items_pointer.is_empty() && !config.items_pointer.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "items-pointer must be empty or start with '/', got '{}'",
            config.items_pointer
        )));
    }

    if let Some(field) = &config.success_field {
        require_non_empty("success-field", field)?;
    }

    require_non_empty("id-field", &config.id_field)?;
    require_non_empty("time-field", &config.time_field)?;

    Ok(())
}

/// Validates request identity and headers
fn validate_request_config(config: &RequestConfig) -> Result<(), ConfigError> {
    require_non_empty("user-agent", &config.user_agent)?;
    validate_header_value("user-agent", &config.user_agent)?;

    for (name, value) in [
        ("origin", &config.origin),
        ("referer", &config.referer),
        ("cookie", &config.cookie),
    ] {
        if let Some(value) = value {
            validate_header_value(name, value)?;
        }
    }

    if let Some(origin) = &config.origin {
        Url::parse(origin)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin: {}", e)))?;
    }

    if let Some(referer) = &config.referer {
        Url::parse(referer)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid referer: {}", e)))?;
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    for (name, value) in &config.headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ConfigError::Validation(format!("Invalid header name '{}'", name))
        })?;
        validate_header_value(name, value)?;
    }

    Ok(())
}

/// Validates pacing settings
fn validate_pagination_config(config: &PaginationConfig) -> Result<(), ConfigError> {
    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    require_non_empty("processed-path", &config.processed_path)?;
    require_non_empty("raw-path", &config.raw_path)?;
    require_non_empty("markdown-path", &config.markdown_path)?;

    let paths = [
        &config.processed_path,
        &config.raw_path,
        &config.markdown_path,
    ];
    for (i, a) in paths.iter().enumerate() {
        if paths[i + 1..].contains(a) {
            return Err(ConfigError::Validation(format!(
                "output paths must be distinct, '{}' is used twice",
                a
            )));
        }
    }

    Ok(())
}

fn require_non_empty(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }
    Ok(())
}

fn validate_header_value(name: &str, value: &str) -> Result<(), ConfigError> {
    HeaderValue::from_str(value)
        .map(|_| ())
        .map_err(|_| ConfigError::Validation(format!("Invalid value for header '{}'", name)))
}
