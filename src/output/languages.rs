//! Language count report with normalized scores

use crate::output::OutputResult;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One language with its repository count and score
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageRecord {
    pub name: String,
    pub count: u32,
    /// `(count - min) / (max - min) * 100`, or 100 when every count is equal
    pub score: f64,
}

impl fmt::Display for LanguageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {:.6}, {}", self.name, self.score, self.count)
    }
}

/// Computes the normalized score of `value` within `[min, max]`
///
/// When `max == min` every value ties for the top and scores 100.
pub fn normalized_score(value: u32, min: u32, max: u32) -> f64 {
    if max == min {
        return 100.0;
    }
    (value as f64 - min as f64) / (max as f64 - min as f64) * 100.0
}

/// Scored language counts, ready for printing and saving
#[derive(Debug, Clone, Default)]
pub struct LanguageReport {
    records: Vec<LanguageRecord>,
    min: u32,
    max: u32,
}

impl LanguageReport {
    /// Builds a report from a language -> count map
    ///
    /// Records start sorted by name so the output is stable.
    pub fn from_counts(counts: &HashMap<String, u32>) -> Self {
        let min = counts.values().copied().min().unwrap_or(0);
        let max = counts.values().copied().max().unwrap_or(0);
        tracing::trace!("Report bounds: min {}, max {}", min, max);

        let mut records: Vec<LanguageRecord> = counts
            .iter()
            .map(|(name, &count)| LanguageRecord {
                name: name.clone(),
                count,
                score: normalized_score(count, min, max),
            })
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));

        Self { records, min, max }
    }

    pub fn records(&self) -> &[LanguageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Sorts by score, highest first
    pub fn sort_by_score(&mut self) {
        self.records.sort_by(|a, b| b.score.total_cmp(&a.score));
    }

    /// Sorts by repository count, highest first
    pub fn sort_by_count(&mut self) {
        self.records.sort_by(|a, b| b.count.cmp(&a.count));
    }

    /// The first `n` records in the current order
    pub fn top(&self, n: usize) -> &[LanguageRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Writes one `name,count` line per record
    pub fn save_counts(&self, path: &Path) -> OutputResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for record in &self.records {
            writeln!(writer, "{},{}", record.name, record.count)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Display for LanguageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}
