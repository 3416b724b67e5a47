//! Configuration module for lang-pulse
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use lang_pulse::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("lang-pulse.toml")).unwrap();
//! println!("Fetching with {} parallel requests", config.scraper.max_parallel);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, LanguagesConfig, OutputConfig, ScraperConfig, SourcesConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_or_default};
pub use validation::validate;
