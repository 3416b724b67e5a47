use crate::config::types::{Config, LanguagesConfig, OutputConfig, ScraperConfig, SourcesConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_sources_config(&config.sources)?;
    validate_scraper_config(&config.scraper)?;
    validate_languages_config(&config.languages)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates source URLs and their placeholders
fn validate_sources_config(config: &SourcesConfig) -> Result<(), ConfigError> {
    validate_url("ranking-url", &config.ranking_url)?;

    validate_template("entity-url", &config.entity_url, &["%entity%"])?;
    validate_template("topic-url", &config.topic_url, &["%topic%", "%page%"])?;

    Ok(())
}

/// Validates scrape engine settings
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.max_parallel < 1 || config.max_parallel > 100 {
        return Err(ConfigError::Validation(format!(
            "max-parallel must be between 1 and 100, got {}",
            config.max_parallel
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.interest.trim().is_empty() {
        return Err(ConfigError::Validation(
            "interest cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    for (name, slug) in &config.aliases {
        if slug.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "alias for '{}' cannot be empty",
                name
            )));
        }
    }

    Ok(())
}

/// Validates the fixed language list
fn validate_languages_config(config: &LanguagesConfig) -> Result<(), ConfigError> {
    if config.use_fixed_list && config.list.is_empty() {
        return Err(ConfigError::Validation(
            "use-fixed-list is set but the language list is empty".to_string(),
        ));
    }

    if config.list.iter().any(|lang| lang.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "language list contains an empty entry".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.result_path.is_empty() {
        return Err(ConfigError::Validation(
            "result-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that a configured address is an absolute http(s) URL
fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

/// Validates a URL template: every placeholder present, and a parseable URL
/// once the placeholders are filled
fn validate_template(field: &str, template: &str, placeholders: &[&str]) -> Result<(), ConfigError> {
    let mut filled = template.to_string();
    for placeholder in placeholders {
        if !template.contains(placeholder) {
            return Err(ConfigError::InvalidTemplate(format!(
                "{} '{}' is missing the {} placeholder",
                field, template, placeholder
            )));
        }
        filled = filled.replace(placeholder, "x");
    }

    validate_url(field, &filled)
}
