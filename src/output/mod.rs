//! Output module for reporting scrape results
//!
//! This module handles:
//! - Scoring language counts against the min/max of the result set
//! - Sorting and printing language and tag reports
//! - Saving language counts to the result file

mod languages;
mod tags;

pub use languages::{normalized_score, LanguageRecord, LanguageReport};
pub use tags::{TagRecord, TagReport};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
