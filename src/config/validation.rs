use crate::config::types::{
    Config, CrawlerConfig, DelayRange, DownloadConfig, HttpConfig, RunConfig, SiteConfig,
    TemplateConfig,
};
use crate::state::Source;
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_run_config(&config.run)?;
    validate_site_config(&config.site, &config.run)?;
    validate_http_config(&config.http)?;
    validate_crawler_config(&config.crawler)?;
    validate_download_config(&config.download)?;
    validate_template_config(&config.template)?;
    Ok(())
}

/// Validates the run parameters and source list
fn validate_run_config(config: &RunConfig) -> Result<(), ConfigError> {
    if config.sources.is_empty() {
        return Err(ConfigError::Validation(
            "run.sources must list at least one source".to_string(),
        ));
    }

    for source in &config.sources {
        validate_path_segment("source", source)?;
    }
    validate_path_segment("category", &config.category)?;
    validate_path_segment("directory", &config.directory)?;

    if !(1900..=2100).contains(&config.year) {
        return Err(ConfigError::Validation(format!(
            "year must be between 1900 and 2100, got {}",
            config.year
        )));
    }

    Ok(())
}

/// Validates the listing URL template by expanding it for the first source
fn validate_site_config(config: &SiteConfig, run: &RunConfig) -> Result<(), ConfigError> {
    for placeholder in ["{source}", "{page}"] {
        if !config.listing_url_template.contains(placeholder) {
            return Err(ConfigError::Validation(format!(
                "listing-url-template must contain {}",
                placeholder
            )));
        }
    }

    let sample = Source {
        id: run.sources.first().cloned().unwrap_or_default(),
        category: run.category.clone(),
        year: run.year,
        directory: run.directory.clone(),
    };
    let expanded = config.listing_url(&sample, 1);
    let url = Url::parse(&expanded).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid listing URL '{}': {}", expanded, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Listing URL '{}' must use HTTP or HTTPS",
            expanded
        )));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agents.is_empty() || config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user-agents must contain at least one non-empty entry".to_string(),
        ));
    }

    if config.page_timeout_secs == 0 || config.download_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request timeouts must be greater than zero".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_consecutive_errors < 1 {
        return Err(ConfigError::Validation(format!(
            "max-consecutive-errors must be >= 1, got {}",
            config.max_consecutive_errors
        )));
    }

    validate_delay("retry-delay", &config.retry_delay)?;
    validate_delay("page-delay", &config.page_delay)?;
    validate_delay("detail-delay", &config.detail_delay)?;

    Ok(())
}

fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 100 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 100, got {}",
            config.workers
        )));
    }

    if config.max_consecutive_failures < 1 {
        return Err(ConfigError::Validation(format!(
            "max-consecutive-failures must be >= 1, got {}",
            config.max_consecutive_failures
        )));
    }

    Ok(())
}

/// Checks that every selector parses and field names are usable columns
fn validate_template_config(config: &TemplateConfig) -> Result<(), ConfigError> {
    for (name, selector) in [
        ("link-selector", &config.link_selector),
        ("next-page-selector", &config.next_page_selector),
        ("label-cell-selector", &config.label_cell_selector),
    ] {
        Selector::parse(selector).map_err(|e| {
            ConfigError::Validation(format!("Invalid {} '{}': {:?}", name, selector, e))
        })?;
    }

    if config.fields.is_empty() {
        return Err(ConfigError::Validation(
            "template must define at least one field".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for field in &config.fields {
        if field.name.trim().is_empty() || field.label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "template fields need a non-empty name and label".to_string(),
            ));
        }
        if crate::state::RESERVED_COLUMNS.contains(&field.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "field name '{}' collides with a reserved column",
                field.name
            )));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate field name '{}'",
                field.name
            )));
        }
    }

    if !seen.contains(config.identifier_field.as_str()) {
        return Err(ConfigError::Validation(format!(
            "identifier-field '{}' is not one of the template fields",
            config.identifier_field
        )));
    }

    Ok(())
}

fn validate_delay(name: &str, delay: &DelayRange) -> Result<(), ConfigError> {
    if delay.min_ms > delay.max_ms {
        return Err(ConfigError::Validation(format!(
            "{}: min-ms ({}) must not exceed max-ms ({})",
            name, delay.min_ms, delay.max_ms
        )));
    }
    Ok(())
}

/// A value substituted into a URL path must be a single, non-empty segment
fn validate_path_segment(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    if !value
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "{} must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            name, value
        )));
    }

    Ok(())
}
