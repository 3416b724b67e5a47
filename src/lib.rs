//! lang-pulse: programming language popularity signals
//!
//! This crate scrapes a ranked language index and per-language repository
//! counts, plus recent tag mentions for a topic, using a bounded-parallel
//! fetch/retry/extract pipeline.

pub mod config;
pub mod output;
pub mod scrape;
pub mod state;

use thiserror::Error;

/// Main error type for lang-pulse operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connection, DNS, TLS or body read failure. Never retried.
    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    /// Non-success status after the retry policy was exhausted
    #[error("Last status code for {url} was {status}")]
    Status { url: String, status: u16 },

    /// An expected pattern was missing from the page
    #[error("Could not parse {0}")]
    Parse(&'static str),

    #[error("Number does not fit the count width: {0}")]
    NumericOverflow(#[from] std::num::ParseIntError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// The concurrency gate was closed while a task waited for a slot
    #[error("Concurrency gate closed")]
    GateClosed,
}

impl ScrapeError {
    /// Returns the HTTP status carried by a status error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid URL template: {0}")]
    InvalidTemplate(String),
}

/// Result type alias for lang-pulse operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use scrape::{AliasTable, RetryPolicy, Scraper};
pub use state::TaskState;
