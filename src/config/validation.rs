use crate::config::types::{
    Config, CrawlerConfig, RendererConfig, RendererKind, SeedsConfig, WarehouseConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound for any configured pause, cooldown or wait
const MAX_DELAY_MS: u64 = 10 * 60 * 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_renderer_config(&config.renderer)?;
    validate_seeds_config(&config.seeds)?;
    validate_warehouse_config(&config.warehouse)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let root = Url::parse(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root-url: {}", e)))?;

    if root.scheme() != "http" && root.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root-url must use http or https, got '{}'",
            config.root_url
        )));
    }

    // Seeds are appended as "<city>/<category>"
    if !config.root_url.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "root-url must end with '/', got '{}'",
            config.root_url
        )));
    }

    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry-attempts must be >= 1, got {}",
            config.retry_attempts
        )));
    }

    for (name, value) in [
        ("pre-request-pause-ms", config.pre_request_pause_ms),
        ("retry-cooldown-ms", config.retry_cooldown_ms),
        ("page-wait-ms", config.page_wait_ms),
    ] {
        if value > MAX_DELAY_MS {
            return Err(ConfigError::Validation(format!(
                "{} must be <= {}ms, got {}ms",
                name, MAX_DELAY_MS, value
            )));
        }
    }

    Ok(())
}

/// Validates renderer configuration
fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    if config.kind == RendererKind::Webdriver {
        Url::parse(&config.webdriver_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver-url: {}", e)))?;
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_seeds_config(config: &SeedsConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "seeds path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates warehouse configuration
fn validate_warehouse_config(config: &WarehouseConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if !is_valid_country_code(&config.country) {
        return Err(ConfigError::Validation(format!(
            "country must be 2-8 uppercase letters, digits or underscores, got '{}'",
            config.country
        )));
    }

    Ok(())
}

/// Checks that a country code is safe to template into table names
pub fn is_valid_country_code(country: &str) -> bool {
    (2..=8).contains(&country.len())
        && country
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
