//! Tag mention report for the interest scrape

use std::collections::HashMap;
use std::fmt;

/// One tag and how many recent items carried it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    pub tag: String,
    pub count: u32,
}

impl fmt::Display for TagRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<30}: {}", self.tag, self.count)
    }
}

/// Tag counts sorted by mentions, highest first; ties ordered by tag
#[derive(Debug, Clone, Default)]
pub struct TagReport {
    records: Vec<TagRecord>,
}

impl TagReport {
    pub fn from_counts(counts: &HashMap<String, u32>) -> Self {
        let mut records: Vec<TagRecord> = counts
            .iter()
            .map(|(tag, &count)| TagRecord {
                tag: tag.clone(),
                count,
            })
            .collect();
        records.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));

        Self { records }
    }

    pub fn records(&self) -> &[TagRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The `n` most mentioned tags
    pub fn top(&self, n: usize) -> &[TagRecord] {
        &self.records[..n.min(self.records.len())]
    }
}

impl fmt::Display for TagReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}
