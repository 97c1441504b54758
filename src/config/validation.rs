use crate::config::types::{Config, CrawlerConfig, OutputConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Longest accepted delay between requests (milliseconds)
const MAX_DELAY_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.delay_ms > MAX_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "delay_ms must be <= {}ms, got {}ms",
            MAX_DELAY_MS, config.delay_ms
        )));
    }

    if config.page_load_timeout_secs < 1 || config.wait_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got page load {}s and wait {}s",
            config.page_load_timeout_secs, config.wait_timeout_secs
        )));
    }

    if config.max_pages < 1 || config.load_more_ceiling < 1 || config.empty_page_tolerance < 1 {
        return Err(ConfigError::Validation(format!(
            "pagination ceilings must be >= 1, got max_pages={}, load_more_ceiling={}, empty_page_tolerance={}",
            config.max_pages, config.load_more_ceiling, config.empty_page_tolerance
        )));
    }

    if config.max_products_per_category == Some(0) {
        return Err(ConfigError::Validation(
            "max_products_per_category must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must be HTTP or HTTPS, got scheme '{}'",
            base.scheme()
        )));
    }

    for (slug, path) in &config.categories {
        if slug.is_empty() || path.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{}' must have a non-empty slug and path",
                slug
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.json_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "json_path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.debug_html_dir, Some(dir) if dir.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "debug_html_dir cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}
